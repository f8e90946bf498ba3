//! Atomic output writes.

use std::fs::{self, Permissions};
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{BundleError, BundleResult};

/// Write `contents` to `path` through a temporary file in the same directory.
///
/// The destination is either left untouched or replaced as a whole. An existing
/// destination keeps its permissions; a new one is created `0644` on Unix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> BundleResult<()> {
  let to_error = |source: std::io::Error| BundleError::WriteOutput {
    path: path.to_path_buf(),
    source,
  };

  let parent = path
    .parent()
    .filter(|parent| !parent.as_os_str().is_empty())
    .unwrap_or(Path::new("."));

  let mut temp_file = NamedTempFile::new_in(parent).map_err(to_error)?;
  temp_file.write_all(contents).map_err(to_error)?;
  temp_file.flush().map_err(to_error)?;
  if let Some(permissions) = output_permissions(path) {
    temp_file
      .as_file()
      .set_permissions(permissions)
      .map_err(to_error)?;
  }
  temp_file
    .persist(path)
    .map_err(|err| to_error(err.error))?;
  Ok(())
}

fn output_permissions(path: &Path) -> Option<Permissions> {
  match fs::metadata(path) {
    Ok(metadata) => Some(metadata.permissions()),
    Err(_) => new_file_permissions(),
  }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
  use std::os::unix::fs::PermissionsExt;
  Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
  None
}
