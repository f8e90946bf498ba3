//! Byte sources the inliner reads referenced resources from.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use reqwest::blocking::Client;

use crate::inline::InlineOptions;

/// Access to referenced resources, injected into [`crate::inline::Inliner`].
pub trait ResourceSource {
  /// Read a file referenced by a local path.
  fn read_local(&self, path: &Path) -> Result<Vec<u8>>;

  /// Fetch an `http(s)` URL. Only called when remote fetching is enabled.
  fn fetch_remote(&self, url: &str) -> Result<Vec<u8>>;
}

/// Reads from the filesystem and, when enabled, over HTTP with a fixed timeout.
#[derive(Debug, Clone)]
pub struct FsResourceSource {
  client: Option<Client>,
}

impl FsResourceSource {
  /// Build a source for the given options; the HTTP client only exists when fetching is on.
  pub fn new(options: &InlineOptions) -> reqwest::Result<Self> {
    let client = if options.fetch_remote {
      Some(Client::builder().timeout(options.fetch_timeout).build()?)
    } else {
      None
    };
    Ok(Self { client })
  }
}

impl ResourceSource for FsResourceSource {
  fn read_local(&self, path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
  }

  fn fetch_remote(&self, url: &str) -> Result<Vec<u8>> {
    let Some(client) = &self.client else {
      bail!("remote fetching is disabled");
    };

    let response = client
      .get(url)
      .send()
      .with_context(|| format!("failed to fetch {url}"))?;
    if !response.status().is_success() {
      return Err(anyhow!("{url} responded with status {}", response.status()));
    }

    let body = response
      .bytes()
      .with_context(|| format!("failed to read response body from {url}"))?;
    Ok(body.to_vec())
  }
}
