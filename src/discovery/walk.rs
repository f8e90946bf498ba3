//! Expansion of file and directory arguments into leaf files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use normpath::PathExt;
use walkdir::{DirEntry, WalkDir};

use crate::config::InputPolicy;
use crate::error::{BundleError, BundleResult};

/// Leaf files discovered from the inputs, plus warnings for anything skipped.
#[derive(Debug, Default)]
pub struct ResolvedInputs {
  /// Absolute, de-duplicated paths: direct file arguments first, then directory contents.
  pub files: Vec<PathBuf>,
  /// Inputs skipped under [`InputPolicy::Skip`].
  pub warnings: Vec<String>,
}

/// Resolve the user supplied inputs into an ordered list of absolute file paths.
///
/// Directories are walked recursively in file name order. Files whose name starts with
/// `.` are skipped; hidden directories are still descended into. Missing inputs and
/// walk failures abort the run under [`InputPolicy::Fail`] and become warnings under
/// [`InputPolicy::Skip`].
pub fn resolve_inputs(inputs: &[PathBuf], policy: InputPolicy) -> BundleResult<ResolvedInputs> {
  if inputs.is_empty() {
    return Err(BundleError::NoInputs);
  }

  let mut resolved = ResolvedInputs::default();
  let mut direct = Vec::new();
  let mut walked = Vec::new();

  for input in inputs {
    let absolute = match absolute_input(input) {
      Ok(path) => path,
      Err(source) => {
        let err = BundleError::InputNotFound {
          path: input.clone(),
          source,
        };
        skip_or_fail(policy, err, &mut resolved.warnings)?;
        continue;
      }
    };

    if absolute.is_dir() {
      walk_directory(&absolute, policy, &mut walked, &mut resolved.warnings)?;
    } else {
      direct.push(absolute);
    }
  }

  let mut seen = HashSet::new();
  resolved.files = direct
    .into_iter()
    .chain(walked)
    .filter(|path| seen.insert(path.clone()))
    .collect();

  log::debug!("discovered {} input files", resolved.files.len());
  Ok(resolved)
}

fn absolute_input(input: &Path) -> std::io::Result<PathBuf> {
  fs::metadata(input)?;
  Ok(input.normalize()?.into_path_buf())
}

fn walk_directory(
  dir: &Path,
  policy: InputPolicy,
  files: &mut Vec<PathBuf>,
  warnings: &mut Vec<String>,
) -> BundleResult<()> {
  let walker = WalkDir::new(dir)
    .follow_links(true)
    .sort_by_file_name();

  for entry in walker {
    match entry {
      Ok(entry) if !entry.file_type().is_dir() && !is_hidden(&entry) => {
        files.push(entry.into_path())
      }
      Ok(_) => {}
      Err(source) => {
        let err = BundleError::WalkDirectory {
          path: dir.to_path_buf(),
          source,
        };
        skip_or_fail(policy, err, warnings)?;
      }
    }
  }

  Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
  entry.file_name().to_string_lossy().starts_with('.')
}

pub(crate) fn skip_or_fail(
  policy: InputPolicy,
  err: BundleError,
  warnings: &mut Vec<String>,
) -> BundleResult<()> {
  match policy {
    InputPolicy::Fail => Err(err),
    InputPolicy::Skip => {
      log::warn!("skipping input: {err}");
      warnings.push(err.to_string());
      Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn canonical(path: &Path) -> PathBuf {
    path.normalize().unwrap().into_path_buf()
  }

  #[test]
  fn rejects_empty_input_list() {
    let err = resolve_inputs(&[], InputPolicy::Fail).unwrap_err();
    assert!(matches!(err, BundleError::NoInputs));
  }

  #[test]
  fn lists_direct_files_before_directory_contents() {
    let dir = tempdir().unwrap();
    let root = canonical(dir.path());
    fs::create_dir_all(root.join("docs/nested")).unwrap();
    fs::write(root.join("docs/b.txt"), "b").unwrap();
    fs::write(root.join("docs/a.txt"), "a").unwrap();
    fs::write(root.join("docs/nested/c.txt"), "c").unwrap();
    fs::write(root.join("z.html"), "<p>z</p>").unwrap();

    let resolved = resolve_inputs(
      &[root.join("docs"), root.join("z.html")],
      InputPolicy::Fail,
    )
    .unwrap();

    assert_eq!(resolved.files, vec![
      root.join("z.html"),
      root.join("docs/a.txt"),
      root.join("docs/b.txt"),
      root.join("docs/nested/c.txt"),
    ]);
  }

  #[test]
  fn skips_hidden_files_but_walks_hidden_directories() {
    let dir = tempdir().unwrap();
    let root = canonical(dir.path());
    fs::create_dir_all(root.join(".config")).unwrap();
    fs::write(root.join(".config/settings.txt"), "x").unwrap();
    fs::write(root.join(".config/.secret"), "x").unwrap();
    fs::write(root.join(".env"), "x").unwrap();
    fs::write(root.join("a.txt"), "x").unwrap();

    let resolved = resolve_inputs(&[root.clone()], InputPolicy::Fail).unwrap();
    assert_eq!(
      resolved.files,
      vec![root.join(".config/settings.txt"), root.join("a.txt")]
    );
  }

  #[test]
  fn deduplicates_repeated_inputs() {
    let dir = tempdir().unwrap();
    let root = canonical(dir.path());
    fs::write(root.join("a.txt"), "a").unwrap();

    let resolved = resolve_inputs(
      &[root.join("a.txt"), root.clone(), root.join("./a.txt")],
      InputPolicy::Fail,
    )
    .unwrap();
    assert_eq!(resolved.files, vec![root.join("a.txt")]);
  }

  #[test]
  fn missing_input_fails_under_fail_policy() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.html");

    let err = resolve_inputs(&[missing], InputPolicy::Fail).unwrap_err();
    assert!(matches!(err, BundleError::InputNotFound { .. }));
  }

  #[test]
  fn missing_input_becomes_warning_under_skip_policy() {
    let dir = tempdir().unwrap();
    let root = canonical(dir.path());
    fs::write(root.join("a.txt"), "a").unwrap();

    let resolved = resolve_inputs(
      &[root.join("missing.html"), root.join("a.txt")],
      InputPolicy::Skip,
    )
    .unwrap();

    assert_eq!(resolved.files, vec![root.join("a.txt")]);
    assert_eq!(resolved.warnings.len(), 1);
    assert!(resolved.warnings[0].contains("missing.html"));
  }

  #[test]
  fn empty_directory_yields_no_files() {
    let dir = tempdir().unwrap();
    let resolved = resolve_inputs(&[dir.path().to_path_buf()], InputPolicy::Fail).unwrap();
    assert!(resolved.files.is_empty());
  }
}
