//! Classification of `href`/`src` values found in HTML documents.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use url::{ParseError, Url};

/// Where a resource reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
  /// Already embedded as a `data:` URI.
  Embedded,
  /// `http://`, `https://` or protocol-relative URL, resolved to a fetchable URL.
  Remote(Url),
  /// Empty value or another scheme (`mailto:`, `javascript:`, `blob:` ...); never touched.
  Ignored,
  /// File on disk, resolved against the referencing document's directory.
  Local(PathBuf),
}

/// Base that protocol-relative references are joined onto.
fn https_base() -> &'static Url {
  static BASE: OnceLock<Url> = OnceLock::new();
  BASE.get_or_init(|| Url::parse("https://localhost/").expect("invalid https base URL"))
}

/// Classify a raw attribute value relative to `base_dir`.
///
/// Query strings and fragments are dropped from local references, and a leading `/` is
/// resolved against `base_dir` rather than the filesystem root.
pub fn classify_reference(value: &str, base_dir: &Path) -> Reference {
  let value = value.trim();
  if value.is_empty() {
    return Reference::Ignored;
  }
  if value.starts_with("//") {
    return https_base()
      .join(value)
      .map_or(Reference::Ignored, Reference::Remote);
  }

  match Url::parse(value) {
    Ok(url) => match url.scheme() {
      "data" => Reference::Embedded,
      "http" | "https" => Reference::Remote(url),
      _ => Reference::Ignored,
    },
    Err(ParseError::RelativeUrlWithoutBase) => local_reference(value, base_dir),
    Err(_) => Reference::Ignored,
  }
}

fn local_reference(value: &str, base_dir: &Path) -> Reference {
  let path = value
    .split(['?', '#'])
    .next()
    .unwrap_or(value)
    .trim_start_matches('/');
  if path.is_empty() {
    return Reference::Ignored;
  }

  Reference::Local(base_dir.join(path))
}
