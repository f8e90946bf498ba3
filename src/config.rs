//! Bundler configuration loaded from an optional JSON file and overridden by the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::error::{BundleError, BundleResult};
use crate::inline::InlineOptions;

/// File name searched for in the working directory when no explicit config is given.
pub const DEFAULT_CONFIG_FILE: &str = "offline-html.config.json";

/// Seconds a remote fetch may take before it is abandoned.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// How a missing or unreadable top-level input is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
  /// Abort the whole run.
  #[default]
  Fail,
  /// Log a warning, record it in the report and continue.
  Skip,
}

/// Navigation markup rendered by the built-in viewer page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NavigationLayout {
  /// Directory tree in a side panel.
  #[default]
  Sidebar,
  /// Flat strip of tabs above the frame.
  Tabs,
}

impl NavigationLayout {
  /// Class name applied to the page body.
  pub fn css_class(self) -> &'static str {
    match self {
      NavigationLayout::Sidebar => "layout-sidebar",
      NavigationLayout::Tabs => "layout-tabs",
    }
  }
}

/// Options controlling discovery, inlining and rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BundlerConfig {
  /// Title of the generated page.
  pub title: String,
  /// Navigation layout for the built-in template.
  pub layout: NavigationLayout,
  /// Fetch and inline `http(s)://` and `//` references.
  pub fetch_remote: bool,
  /// Timeout applied to each remote fetch.
  pub fetch_timeout_secs: u64,
  /// Handling of missing or unreadable top-level inputs.
  pub input_policy: InputPolicy,
  /// Embed the base64 of each original file so the viewer can offer a download.
  pub embed_originals: bool,
  /// Custom page template replacing the built-in viewer.
  pub template: Option<PathBuf>,
}

impl Default for BundlerConfig {
  fn default() -> Self {
    Self {
      title: "Combined Files".into(),
      layout: NavigationLayout::default(),
      fetch_remote: false,
      fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
      input_policy: InputPolicy::default(),
      embed_originals: true,
      template: None,
    }
  }
}

impl BundlerConfig {
  /// Look for [`DEFAULT_CONFIG_FILE`] in `dir`.
  ///
  /// A missing or malformed file yields the defaults so the CLI keeps working without one.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    match Self::from_path(&candidate) {
      Ok(config) => config,
      Err(err) => {
        if candidate.exists() {
          log::warn!("ignoring {err}");
        }
        Self::default()
      }
    }
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> BundleResult<Self> {
    let content = fs::read_to_string(path).map_err(|err| BundleError::Config {
      path: path.to_path_buf(),
      message: err.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|err| BundleError::Config {
      path: path.to_path_buf(),
      message: err.to_string(),
    })
  }

  /// Inliner settings derived from this configuration.
  pub fn inline_options(&self) -> InlineOptions {
    InlineOptions {
      fetch_remote: self.fetch_remote,
      fetch_timeout: Duration::from_secs(self.fetch_timeout_secs),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn discover_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = BundlerConfig::discover(dir.path());

    assert_eq!(config.title, "Combined Files");
    assert_eq!(config.input_policy, InputPolicy::Fail);
    assert_eq!(config.layout, NavigationLayout::Sidebar);
    assert!(!config.fetch_remote);
    assert!(config.embed_originals);
  }

  #[test]
  fn reads_partial_config_with_defaults() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join(DEFAULT_CONFIG_FILE),
      r#"{ "layout": "tabs", "input_policy": "skip", "fetch_timeout_secs": 3 }"#,
    )
    .unwrap();

    let config = BundlerConfig::discover(dir.path());
    assert_eq!(config.layout, NavigationLayout::Tabs);
    assert_eq!(config.input_policy, InputPolicy::Skip);
    assert_eq!(
      config.inline_options().fetch_timeout,
      Duration::from_secs(3)
    );
    assert_eq!(config.title, "Combined Files");
  }

  #[test]
  fn explicit_config_reports_parse_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = BundlerConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, BundleError::Config { .. }));
  }
}
