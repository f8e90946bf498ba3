//! Data structures produced while assembling a bundle.

use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose};
use serde::Serialize;

use crate::error::{BundleError, BundleResult};

/// Processing strategy chosen for an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
  /// HTML document whose local resources get inlined.
  Html,
  /// Image shown through a generated preview page.
  Image,
  /// Anything else, shown as escaped text.
  Other,
}

/// An input file after discovery, read exactly once.
#[derive(Debug, Clone)]
pub struct ResolvedFile {
  /// Absolute path of the file.
  pub path: PathBuf,
  /// Raw file content.
  pub bytes: Vec<u8>,
}

/// One processed input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
  /// Path relative to the common root, always `/` separated.
  pub display_name: String,
  /// Sniffed MIME type of the original bytes.
  pub content_type: String,
  /// Classification that selected the processing strategy.
  pub kind: ContentKind,
  /// Self-contained HTML document shown for this entry.
  pub html: String,
  /// Base64 of the original bytes, when originals are embedded.
  pub original_base64: Option<String>,
}

/// Ordered, non-empty collection of entries handed to rendering.
#[derive(Debug, Clone)]
pub struct Bundle {
  entries: Vec<BundleEntry>,
}

impl Bundle {
  /// Wrap the entries, refusing an empty list.
  pub fn new(entries: Vec<BundleEntry>) -> BundleResult<Self> {
    if entries.is_empty() {
      return Err(BundleError::EmptyBundle);
    }
    Ok(Self { entries })
  }

  /// Entries in discovery order.
  pub fn entries(&self) -> &[BundleEntry] {
    &self.entries
  }

  /// Number of entries; never zero.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Always `false`; present for API symmetry with `len`.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

/// Serialised form of an entry inside the rendered page.
///
/// `html` is the base64 of the UTF-8 encoded entry document; it is the only form in which
/// processed HTML reaches the page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedEntry<'a> {
  /// Display path relative to the common root.
  pub path: &'a str,
  /// Final path segment, used as the link label.
  pub name: &'a str,
  /// Sniffed MIME type of the original file.
  pub content_type: &'a str,
  /// Processing strategy applied.
  pub kind: ContentKind,
  /// Base64 encoded entry document.
  pub html: String,
  /// Base64 encoded original bytes.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub original: Option<&'a str>,
}

impl<'a> From<&'a BundleEntry> for EmbeddedEntry<'a> {
  fn from(entry: &'a BundleEntry) -> Self {
    Self {
      path: &entry.display_name,
      name: entry
        .display_name
        .rsplit('/')
        .next()
        .unwrap_or(&entry.display_name),
      content_type: &entry.content_type,
      kind: entry.kind,
      html: general_purpose::STANDARD.encode(entry.html.as_bytes()),
      original: entry.original_base64.as_deref(),
    }
  }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct BundleReport {
  /// Path the bundle was written to.
  pub output: PathBuf,
  /// Number of entries in the bundle.
  pub entries: usize,
  /// Resource references replaced with inline content.
  pub inlined: usize,
  /// Resource references left untouched because they could not be read.
  pub failed: usize,
  /// Skipped inputs and other non-fatal problems.
  pub warnings: Vec<String>,
}
