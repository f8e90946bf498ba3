//! Common ancestor and display names for discovered files.

use std::path::{Component, Path, PathBuf};

/// Deepest directory containing every file in `files`.
///
/// Starts from the first file's directory and walks up until it is an ancestor of each
/// other file's directory, stopping at the filesystem root. Comparison is per path
/// component, so `/proj/ab` is not treated as being inside `/proj/a`.
pub fn common_root(files: &[PathBuf]) -> Option<PathBuf> {
  let (first, rest) = files.split_first()?;
  let mut root = first.parent().unwrap_or(first.as_path()).to_path_buf();

  for file in rest {
    let dir = file.parent().unwrap_or(file.as_path());
    while !dir.starts_with(&root) {
      match root.parent() {
        Some(parent) => root = parent.to_path_buf(),
        None => break,
      }
    }
  }

  Some(root)
}

/// Display name of `file` relative to `root`, using forward slashes.
///
/// Falls back to the bare file name when `file` is not below `root`.
pub fn display_name(root: &Path, file: &Path) -> String {
  let relative = file.strip_prefix(root).ok().and_then(|relative| {
    let segments: Vec<String> = relative
      .components()
      .filter_map(|component| match component {
        Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
        _ => None,
      })
      .collect();
    (!segments.is_empty()).then(|| segments.join("/"))
  });

  relative.unwrap_or_else(|| {
    file
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| file.to_string_lossy().into_owned())
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sibling_directories_share_their_parent() {
    let files = vec![
      PathBuf::from("/proj/a/x.html"),
      PathBuf::from("/proj/b/y.html"),
    ];
    let root = common_root(&files).unwrap();

    assert_eq!(root, PathBuf::from("/proj"));
    assert_eq!(display_name(&root, &files[0]), "a/x.html");
    assert_eq!(display_name(&root, &files[1]), "b/y.html");
  }

  #[test]
  fn single_file_root_is_its_directory() {
    let files = vec![PathBuf::from("/proj/docs/readme.txt")];
    assert_eq!(common_root(&files).unwrap(), PathBuf::from("/proj/docs"));
  }

  #[test]
  fn nested_file_keeps_shallower_root() {
    let files = vec![
      PathBuf::from("/proj/index.html"),
      PathBuf::from("/proj/assets/img/logo.png"),
    ];
    let root = common_root(&files).unwrap();
    assert_eq!(root, PathBuf::from("/proj"));
    assert_eq!(display_name(&root, &files[1]), "assets/img/logo.png");
  }

  #[test]
  fn compares_whole_components() {
    let files = vec![
      PathBuf::from("/proj/ab/x.txt"),
      PathBuf::from("/proj/a/y.txt"),
    ];
    assert_eq!(common_root(&files).unwrap(), PathBuf::from("/proj"));
  }

  #[test]
  fn unrelated_trees_meet_at_filesystem_root() {
    let files = vec![PathBuf::from("/srv/x.txt"), PathBuf::from("/home/y.txt")];
    let root = common_root(&files).unwrap();
    assert_eq!(root, PathBuf::from("/"));
    assert_eq!(display_name(&root, &files[1]), "home/y.txt");
  }

  #[test]
  fn falls_back_to_file_name_outside_root() {
    let name = display_name(Path::new("/proj/a"), Path::new("/other/z.css"));
    assert_eq!(name, "z.css");
  }

  #[test]
  fn no_files_has_no_root() {
    assert!(common_root(&[]).is_none());
  }
}
