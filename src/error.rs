//! Run-aborting failures.
//!
//! Problems with individual resource references never show up here: the inliner absorbs
//! them and reports them through [`crate::inline::InlineFailure`].

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by every fallible bundling stage.
pub type BundleResult<T> = Result<T, BundleError>;

/// Fatal errors that stop a bundling run before any output is written.
#[derive(Debug, Error)]
pub enum BundleError {
  /// No input paths were supplied.
  #[error("no input paths supplied")]
  NoInputs,
  /// A top-level input does not exist or cannot be inspected.
  #[error("cannot access input {}: {source}", path.display())]
  InputNotFound {
    /// Offending input path.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },
  /// Walking an input directory failed.
  #[error("failed to walk directory {}: {source}", path.display())]
  WalkDirectory {
    /// Directory being walked.
    path: PathBuf,
    /// Underlying traversal error.
    source: walkdir::Error,
  },
  /// A discovered input file could not be read.
  #[error("failed to read input {}: {source}", path.display())]
  ReadInput {
    /// File that failed to read.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },
  /// Nothing survived discovery and processing.
  #[error("no valid input files processed")]
  EmptyBundle,
  /// A custom page template could not be read.
  #[error("failed to read template {}: {source}", path.display())]
  ReadTemplate {
    /// Template path.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },
  /// The page template is malformed.
  #[error("invalid template: {0}")]
  Template(String),
  /// Entry data could not be serialised for embedding.
  #[error("failed to encode bundle entries: {0}")]
  Encode(#[from] serde_json::Error),
  /// The output document could not be written.
  #[error("failed to write output {}: {source}", path.display())]
  WriteOutput {
    /// Destination path.
    path: PathBuf,
    /// Underlying I/O error.
    source: std::io::Error,
  },
  /// An explicitly requested configuration file is unusable.
  #[error("failed to load config {}: {message}", path.display())]
  Config {
    /// Configuration file path.
    path: PathBuf,
    /// Description of the read or parse failure.
    message: String,
  },
  /// The HTTP client for remote fetching could not be constructed.
  #[error("failed to build HTTP client: {0}")]
  HttpClient(#[from] reqwest::Error),
}
