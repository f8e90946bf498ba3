//! Bundling orchestrator: discovery, per-file processing, rendering and the final write.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose};
use same_file::is_same_file;

use crate::bundle::{PageTemplate, render_page, write_atomic};
use crate::classify::classify;
use crate::config::{BundlerConfig, InputPolicy};
use crate::discovery::{common_root, display_name, resolve_inputs, skip_or_fail};
use crate::error::{BundleError, BundleResult};
use crate::inline::{FsResourceSource, Inliner, ResourceSource};
use crate::models::{Bundle, BundleEntry, BundleReport, ContentKind, ResolvedFile};
use crate::preview::{image_preview, text_preview};

/// Entries gathered from the inputs together with run statistics.
#[derive(Debug, Clone)]
pub struct CollectedBundle {
  /// The non-empty bundle.
  pub bundle: Bundle,
  /// Resource references replaced with inline content.
  pub inlined: usize,
  /// Resource references left in place.
  pub failed: usize,
  /// Skipped inputs and similar non-fatal problems.
  pub warnings: Vec<String>,
}

/// Turns input paths into a single self-contained HTML page.
pub struct Bundler<S = FsResourceSource> {
  config: BundlerConfig,
  inliner: Inliner<S>,
}

impl Bundler<FsResourceSource> {
  /// Bundler reading resources from disk and, when configured, the network.
  pub fn new(config: BundlerConfig) -> BundleResult<Self> {
    let inliner = Inliner::new(&config.inline_options())?;
    Ok(Self::with_inliner(config, inliner))
  }
}

impl<S: ResourceSource> Bundler<S> {
  /// Bundler using a preconfigured inliner.
  pub fn with_inliner(config: BundlerConfig, inliner: Inliner<S>) -> Self {
    Self { config, inliner }
  }

  /// Active configuration.
  pub fn config(&self) -> &BundlerConfig {
    &self.config
  }

  /// Discover and process every input into bundle entries.
  ///
  /// `exclude` names a file that must never become an entry, typically the output of a
  /// previous run sitting inside an input directory.
  pub fn collect(&self, inputs: &[PathBuf], exclude: Option<&Path>) -> BundleResult<CollectedBundle> {
    let policy = self.config.input_policy;
    let resolved = resolve_inputs(inputs, policy)?;
    let mut warnings = resolved.warnings;

    let files: Vec<PathBuf> = resolved
      .files
      .into_iter()
      .filter(|path| match exclude {
        Some(excluded) if is_same_file(path, excluded).unwrap_or(false) => {
          log::warn!("skipping {}: it is the output file", path.display());
          warnings.push(format!("skipped output file {}", path.display()));
          false
        }
        _ => true,
      })
      .collect();

    let root = common_root(&files).ok_or(BundleError::EmptyBundle)?;
    log::debug!("common root {}", root.display());

    let mut entries = Vec::with_capacity(files.len());
    let mut inlined = 0;
    let mut failed = 0;

    for path in files {
      let Some(file) = read_input(path, policy, &mut warnings)? else {
        continue;
      };
      let (entry, stats) = self.process_file(&root, &file);
      inlined += stats.0;
      failed += stats.1;
      entries.push(entry);
    }

    Ok(CollectedBundle {
      bundle: Bundle::new(entries)?,
      inlined,
      failed,
      warnings,
    })
  }

  fn process_file(&self, root: &Path, file: &ResolvedFile) -> (BundleEntry, (usize, usize)) {
    let classification = classify(&file.bytes, &file.path);
    let display = display_name(root, &file.path);
    log::debug!("processing {display} as {}", classification.content_type);

    let mut stats = (0, 0);
    let html = match classification.kind {
      ContentKind::Html => {
        let content = match std::str::from_utf8(&file.bytes) {
          Ok(text) => Cow::Borrowed(text),
          Err(_) => {
            log::warn!("{display} is not valid UTF-8; invalid bytes were replaced");
            String::from_utf8_lossy(&file.bytes)
          }
        };
        let outcome = self.inliner.inline_document(&file.path, &content);
        stats = (outcome.inlined, outcome.failures.len());
        outcome.html
      }
      ContentKind::Image => image_preview(&classification.content_type, &file.bytes),
      ContentKind::Other => text_preview(&file.bytes),
    };

    let original_base64 = self
      .config
      .embed_originals
      .then(|| general_purpose::STANDARD.encode(&file.bytes));

    let entry = BundleEntry {
      display_name: display,
      content_type: classification.content_type,
      kind: classification.kind,
      html,
      original_base64,
    };
    (entry, stats)
  }

  /// Load the configured page template, or the built-in viewer.
  pub fn template(&self) -> BundleResult<PageTemplate> {
    match &self.config.template {
      Some(path) => PageTemplate::load(path),
      None => Ok(PageTemplate::builtin()),
    }
  }

  /// Render `bundle` into the final page.
  pub fn render(&self, template: &PageTemplate, bundle: &Bundle) -> BundleResult<String> {
    render_page(template, bundle, &self.config.title, self.config.layout)
  }

  /// Bundle `inputs` into `output`.
  ///
  /// The output is written only after everything rendered; a fatal error leaves any existing
  /// file untouched.
  pub fn bundle_to(&self, inputs: &[PathBuf], output: &Path) -> BundleResult<BundleReport> {
    let template = self.template()?;
    let collected = self.collect(inputs, Some(output))?;
    let page = self.render(&template, &collected.bundle)?;
    write_atomic(output, page.as_bytes())?;

    log::info!(
      "wrote {} entries to {} ({} resources inlined, {} failed)",
      collected.bundle.len(),
      output.display(),
      collected.inlined,
      collected.failed
    );

    Ok(BundleReport {
      output: output.to_path_buf(),
      entries: collected.bundle.len(),
      inlined: collected.inlined,
      failed: collected.failed,
      warnings: collected.warnings,
    })
  }
}

/// Read one discovered file, applying the input policy to read failures.
fn read_input(
  path: PathBuf,
  policy: InputPolicy,
  warnings: &mut Vec<String>,
) -> BundleResult<Option<ResolvedFile>> {
  match fs::read(&path) {
    Ok(bytes) => Ok(Some(ResolvedFile { path, bytes })),
    Err(source) => {
      skip_or_fail(policy, BundleError::ReadInput { path, source }, warnings)?;
      Ok(None)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn bundler(config: BundlerConfig) -> Bundler {
    Bundler::new(config).unwrap()
  }

  #[test]
  fn collects_entries_with_relative_names() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("a/x.html"), "<p>x</p>").unwrap();
    fs::write(dir.path().join("b/y.txt"), "why").unwrap();

    let collected = bundler(BundlerConfig::default())
      .collect(&[dir.path().join("a/x.html"), dir.path().join("b/y.txt")], None)
      .unwrap();

    let names: Vec<&str> = collected
      .bundle
      .entries()
      .iter()
      .map(|entry| entry.display_name.as_str())
      .collect();
    assert_eq!(names, ["a/x.html", "b/y.txt"]);
    assert_eq!(collected.bundle.entries()[0].kind, ContentKind::Html);
    assert_eq!(collected.bundle.entries()[1].kind, ContentKind::Other);
  }

  #[test]
  fn single_file_is_named_by_its_file_name() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    fs::write(&file, "hello").unwrap();

    let collected = bundler(BundlerConfig::default()).collect(&[file], None).unwrap();
    assert_eq!(collected.bundle.entries()[0].display_name, "notes.txt");
  }

  #[test]
  fn originals_are_optional() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "abc").unwrap();

    let with = bundler(BundlerConfig::default())
      .collect(std::slice::from_ref(&file), None)
      .unwrap();
    assert_eq!(
      with.bundle.entries()[0].original_base64.as_deref(),
      Some("YWJj")
    );

    let config = BundlerConfig {
      embed_originals: false,
      ..BundlerConfig::default()
    };
    let without = bundler(config).collect(&[file], None).unwrap();
    assert!(without.bundle.entries()[0].original_base64.is_none());
  }

  #[test]
  fn excluded_file_is_skipped_with_warning() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("out.html"), "old bundle").unwrap();

    let collected = bundler(BundlerConfig::default())
      .collect(
        &[dir.path().to_path_buf()],
        Some(&dir.path().join("out.html")),
      )
      .unwrap();

    assert_eq!(collected.bundle.len(), 1);
    assert_eq!(collected.warnings.len(), 1);
  }

  #[test]
  fn empty_directory_is_an_empty_bundle() {
    let dir = tempdir().unwrap();
    let err = bundler(BundlerConfig::default())
      .collect(&[dir.path().to_path_buf()], None)
      .unwrap_err();
    assert!(matches!(err, BundleError::EmptyBundle));
  }

  #[test]
  fn skip_policy_tolerates_missing_inputs() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "a").unwrap();
    let config = BundlerConfig {
      input_policy: InputPolicy::Skip,
      ..BundlerConfig::default()
    };

    let collected = bundler(config)
      .collect(&[file, dir.path().join("missing.txt")], None)
      .unwrap();
    assert_eq!(collected.bundle.len(), 1);
    assert_eq!(collected.warnings.len(), 1);
  }

  #[test]
  fn unreadable_input_fails_by_default() {
    let dir = tempdir().unwrap();
    let mut warnings = Vec::new();

    let err = read_input(dir.path().to_path_buf(), InputPolicy::Fail, &mut warnings).unwrap_err();
    assert!(matches!(err, BundleError::ReadInput { .. }));
    assert!(warnings.is_empty());
  }

  #[test]
  fn unreadable_input_is_skipped_with_warning() {
    let dir = tempdir().unwrap();
    let mut warnings = Vec::new();

    let file = read_input(dir.path().to_path_buf(), InputPolicy::Skip, &mut warnings).unwrap();
    assert!(file.is_none());
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("failed to read input"));
  }

  #[test]
  fn non_utf8_html_is_still_inlined() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("style.css"), "p{}").unwrap();
    let file = dir.path().join("latin1.html");
    fs::write(
      &file,
      b"<link rel=\"stylesheet\" href=\"style.css\"><p>caf\xE9</p>",
    )
    .unwrap();

    let collected = bundler(BundlerConfig::default()).collect(&[file], None).unwrap();
    let html = &collected.bundle.entries()[0].html;
    assert!(html.contains("<style>p{}</style>"));
    assert!(html.contains("caf\u{FFFD}"));
  }
}
