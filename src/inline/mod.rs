//! Inlining of stylesheets, scripts and images referenced by HTML documents.
//!
//! Documents are streamed through [`lol_html`], which rewrites three shapes:
//!
//! - `<link rel="stylesheet" href=…>` becomes `<style>…</style>` holding the file content.
//! - `<script src=…></script>` with an empty body becomes `<script>…</script>`.
//! - `<img src=…>` keeps its tag, with only `src` swapped for a base64 `data:` URI.
//!
//! Remote references are left alone unless [`InlineOptions::fetch_remote`] is set. A
//! reference that cannot be read never fails the document: the tag stays byte-for-byte
//! as it was and the failure is logged and returned in [`InlineOutcome::failures`].

mod references;
mod source;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Result, anyhow};
use base64::{Engine as _, engine::general_purpose};
use lol_html::html_content::{ContentType, Element};
use lol_html::{HtmlRewriter, Settings, element, text};

use crate::classify::image_mime;
use crate::config::DEFAULT_FETCH_TIMEOUT_SECS;

pub use references::{Reference, classify_reference};
pub use source::{FsResourceSource, ResourceSource};

/// Script attributes that lose their meaning once the code is inline.
const DROPPED_SCRIPT_ATTRIBUTES: &[&str] = &["src", "async", "defer", "integrity", "crossorigin"];

/// Settings for a single inliner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineOptions {
  /// Fetch and inline `http://`, `https://` and `//` references.
  pub fetch_remote: bool,
  /// Timeout applied to each remote fetch.
  pub fetch_timeout: Duration,
}

impl Default for InlineOptions {
  fn default() -> Self {
    Self {
      fetch_remote: false,
      fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
    }
  }
}

/// Kind of resource a reference points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  /// `<link rel="stylesheet">`
  Stylesheet,
  /// `<script src>`
  Script,
  /// `<img src>`
  Image,
}

impl fmt::Display for ResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ResourceKind::Stylesheet => write!(f, "CSS"),
      ResourceKind::Script => write!(f, "JS"),
      ResourceKind::Image => write!(f, "image"),
    }
  }
}

/// A reference that was left in place because it could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineFailure {
  /// Attribute value as written in the document.
  pub reference: String,
  /// Kind of resource.
  pub kind: ResourceKind,
  /// Description of the read or fetch error.
  pub error: String,
}

/// Result of inlining one document.
#[derive(Debug, Clone)]
pub struct InlineOutcome {
  /// Rewritten document.
  pub html: String,
  /// Number of references replaced.
  pub inlined: usize,
  /// References left untouched after a failed read or fetch.
  pub failures: Vec<InlineFailure>,
}

struct Loaded {
  bytes: Vec<u8>,
  name: PathBuf,
}

/// Running totals shared by the element handlers of one rewrite.
#[derive(Default)]
struct Tally {
  inlined: Cell<usize>,
  failures: RefCell<Vec<InlineFailure>>,
}

impl Tally {
  fn record(&self, html_path: &Path, result: Option<Result<(), InlineFailure>>) {
    match result {
      Some(Ok(())) => self.inlined.set(self.inlined.get() + 1),
      Some(Err(failure)) => {
        log::warn!(
          "failed to inline {} resource {} in {}: {}",
          failure.kind,
          failure.reference,
          html_path.display(),
          failure.error
        );
        self.failures.borrow_mut().push(failure);
      }
      None => {}
    }
  }
}

/// Rewrites HTML documents so their resources are embedded.
#[derive(Debug, Clone)]
pub struct Inliner<S = FsResourceSource> {
  source: S,
  fetch_remote: bool,
}

impl Inliner<FsResourceSource> {
  /// Inliner reading from disk and, if enabled, the network.
  pub fn new(options: &InlineOptions) -> reqwest::Result<Self> {
    Ok(Self::with_source(
      FsResourceSource::new(options)?,
      options.fetch_remote,
    ))
  }
}

impl<S: ResourceSource> Inliner<S> {
  /// Inliner reading through a custom source.
  pub fn with_source(source: S, fetch_remote: bool) -> Self {
    Self {
      source,
      fetch_remote,
    }
  }

  /// Inline the resources of `content`, resolving local references against the directory
  /// of `html_path`.
  ///
  /// A document the rewriter cannot process is returned unchanged.
  pub fn inline_document(&self, html_path: &Path, content: &str) -> InlineOutcome {
    match self.rewrite(html_path, content) {
      Ok(outcome) => outcome,
      Err(err) => {
        log::warn!("failed to rewrite {}: {err:#}", html_path.display());
        InlineOutcome {
          html: content.to_string(),
          inlined: 0,
          failures: Vec::new(),
        }
      }
    }
  }

  fn rewrite(&self, html_path: &Path, content: &str) -> Result<InlineOutcome> {
    let base_dir = html_path.parent().unwrap_or(Path::new(""));
    let script_has_body = script_bodies(content)?;
    let script_index = Cell::new(0);
    let tally = Tally::default();
    let mut output = Vec::with_capacity(content.len());

    let mut rewriter = HtmlRewriter::new(
      Settings {
        element_content_handlers: vec![
          element!("link[rel][href]", |el| {
            tally.record(html_path, self.inline_stylesheet(el, base_dir));
            Ok(())
          }),
          element!("script[src]", |el| {
            let index = script_index.get();
            script_index.set(index + 1);
            if !script_has_body.get(index).copied().unwrap_or(true) {
              tally.record(html_path, self.inline_script(el, base_dir));
            }
            Ok(())
          }),
          element!("img[src]", |el| {
            tally.record(html_path, self.inline_image(el, base_dir));
            Ok(())
          }),
        ],
        ..Settings::default()
      },
      |chunk: &[u8]| output.extend_from_slice(chunk),
    );

    rewriter
      .write(content.as_bytes())
      .map_err(|err| anyhow!("HTML rewrite error: {err}"))?;
    rewriter
      .end()
      .map_err(|err| anyhow!("HTML rewrite finalization error: {err}"))?;

    let html = String::from_utf8(output)
      .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
    Ok(InlineOutcome {
      html,
      inlined: tally.inlined.get(),
      failures: tally.failures.into_inner(),
    })
  }

  fn inline_stylesheet(
    &self,
    el: &mut Element<'_, '_>,
    base_dir: &Path,
  ) -> Option<Result<(), InlineFailure>> {
    let is_stylesheet = el
      .get_attribute("rel")
      .is_some_and(|rel| rel.trim().eq_ignore_ascii_case("stylesheet"));
    if !is_stylesheet {
      return None;
    }
    let href = el.get_attribute("href")?;

    let loaded = match self.load(&href, base_dir)? {
      Ok(loaded) => loaded,
      Err(err) => return Some(Err(failure(&href, ResourceKind::Stylesheet, err))),
    };
    let media = el
      .get_attribute("media")
      .map(|media| {
        let media = html_escape::decode_html_entities(&media);
        format!(
          " media=\"{}\"",
          html_escape::encode_double_quoted_attribute(&media)
        )
      })
      .unwrap_or_default();
    let css = String::from_utf8_lossy(&loaded.bytes);
    el.replace(&format!("<style{media}>{css}</style>"), ContentType::Html);
    Some(Ok(()))
  }

  fn inline_script(
    &self,
    el: &mut Element<'_, '_>,
    base_dir: &Path,
  ) -> Option<Result<(), InlineFailure>> {
    let src = el.get_attribute("src")?;

    let loaded = match self.load(&src, base_dir)? {
      Ok(loaded) => loaded,
      Err(err) => return Some(Err(failure(&src, ResourceKind::Script, err))),
    };
    for name in DROPPED_SCRIPT_ATTRIBUTES {
      el.remove_attribute(name);
    }
    el.set_inner_content(&String::from_utf8_lossy(&loaded.bytes), ContentType::Html);
    Some(Ok(()))
  }

  fn inline_image(
    &self,
    el: &mut Element<'_, '_>,
    base_dir: &Path,
  ) -> Option<Result<(), InlineFailure>> {
    let src = el.get_attribute("src")?;

    let loaded = match self.load(&src, base_dir)? {
      Ok(loaded) => loaded,
      Err(err) => return Some(Err(failure(&src, ResourceKind::Image, err))),
    };
    let mime = image_mime(&loaded.bytes, &loaded.name);
    let encoded = general_purpose::STANDARD.encode(&loaded.bytes);
    Some(
      el.set_attribute("src", &format!("data:{mime};base64,{encoded}"))
        .map_err(|err| failure(&src, ResourceKind::Image, err.into())),
    )
  }

  /// Load the target of a reference, or `None` when it is not eligible for inlining.
  fn load(&self, raw: &str, base_dir: &Path) -> Option<Result<Loaded>> {
    let decoded = html_escape::decode_html_entities(raw);
    match classify_reference(&decoded, base_dir) {
      Reference::Local(path) => Some(
        self
          .source
          .read_local(&path)
          .map(|bytes| Loaded { bytes, name: path }),
      ),
      Reference::Remote(url) if self.fetch_remote => Some(
        self
          .source
          .fetch_remote(url.as_str())
          .map(|bytes| Loaded {
            bytes,
            name: PathBuf::from(url.path()),
          }),
      ),
      Reference::Remote(_) | Reference::Embedded | Reference::Ignored => None,
    }
  }
}

/// For each `<script src>` in document order, whether it has a non-blank body.
///
/// Such scripts carry fallback code and are never inlined.
fn script_bodies(content: &str) -> Result<Vec<bool>> {
  let bodies = RefCell::new(Vec::new());

  let mut rewriter = HtmlRewriter::new(
    Settings {
      element_content_handlers: vec![
        element!("script[src]", |_el| {
          bodies.borrow_mut().push(false);
          Ok(())
        }),
        text!("script[src]", |chunk| {
          if !chunk.as_str().trim().is_empty() {
            if let Some(has_body) = bodies.borrow_mut().last_mut() {
              *has_body = true;
            }
          }
          Ok(())
        }),
      ],
      ..Settings::default()
    },
    |_: &[u8]| {},
  );

  rewriter
    .write(content.as_bytes())
    .map_err(|err| anyhow!("HTML scan error: {err}"))?;
  rewriter
    .end()
    .map_err(|err| anyhow!("HTML scan finalization error: {err}"))?;
  Ok(bodies.into_inner())
}

fn failure(reference: &str, kind: ResourceKind, err: anyhow::Error) -> InlineFailure {
  InlineFailure {
    reference: reference.to_string(),
    kind,
    error: format!("{err:#}"),
  }
}
