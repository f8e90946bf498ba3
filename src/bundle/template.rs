//! Page templates with `{{placeholder}}` substitution.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::error::{BundleError, BundleResult};

const BUILTIN_VIEWER: &str = include_str!("viewer.html");

const KNOWN_PLACEHOLDERS: &[&str] = &["title", "layout", "navigation", "entries"];
const REQUIRED_PLACEHOLDERS: &[&str] = &["navigation", "entries"];

fn placeholder_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("invalid placeholder regex")
  })
}

/// Values substituted into a template.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
  /// Plain-text page title; escaped on substitution.
  pub title: &'a str,
  /// Class name for the page body.
  pub layout: &'a str,
  /// Navigation markup.
  pub navigation: &'a str,
  /// Script-safe JSON array of entries.
  pub entries: &'a str,
}

/// A validated page template.
#[derive(Debug, Clone)]
pub struct PageTemplate {
  source: String,
}

impl PageTemplate {
  /// The built-in viewer page.
  pub fn builtin() -> Self {
    Self {
      source: BUILTIN_VIEWER.to_string(),
    }
  }

  /// Read and validate a template from disk.
  pub fn load(path: &Path) -> BundleResult<Self> {
    let source = fs::read_to_string(path).map_err(|source| BundleError::ReadTemplate {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(source)
  }

  /// Validate template text: every placeholder must be known and the required ones present.
  pub fn parse(source: String) -> BundleResult<Self> {
    let mut seen = Vec::new();
    for captures in placeholder_pattern().captures_iter(&source) {
      let name = &captures[1];
      if !KNOWN_PLACEHOLDERS.contains(&name) {
        return Err(BundleError::Template(format!(
          "unknown placeholder {{{{{name}}}}}"
        )));
      }
      seen.push(name.to_string());
    }

    if let Some(missing) = REQUIRED_PLACEHOLDERS
      .iter()
      .find(|required| !seen.iter().any(|name| name == *required))
    {
      return Err(BundleError::Template(format!(
        "missing required placeholder {{{{{missing}}}}}"
      )));
    }

    Ok(Self { source })
  }

  /// Substitute the context in a single pass; inserted values are never rescanned.
  pub fn render(&self, context: &PageContext<'_>) -> String {
    placeholder_pattern()
      .replace_all(&self.source, |captures: &Captures<'_>| match &captures[1] {
        "title" => html_escape::encode_text(context.title).into_owned(),
        "layout" => html_escape::encode_double_quoted_attribute(context.layout).into_owned(),
        "navigation" => context.navigation.to_string(),
        "entries" => context.entries.to_string(),
        _ => captures[0].to_string(),
      })
      .into_owned()
  }
}
