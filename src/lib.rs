#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod builder;
pub mod bundle;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod inline;
pub mod models;
pub mod preview;

pub use builder::{Bundler, CollectedBundle};
pub use config::{BundlerConfig, InputPolicy, NavigationLayout};
pub use error::{BundleError, BundleResult};
pub use inline::{InlineOptions, Inliner, ResourceSource};
pub use models::{Bundle, BundleEntry, BundleReport, ContentKind};
