//! Filesystem helpers.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Create `path` and any missing parents.
///
/// An existing directory is not an error. Anything else (a regular file in
/// the way, permission denied, a full disk) is returned to the caller.
pub fn ensure_directory(path: &Path) -> io::Result<()> {
  match fs::create_dir_all(path) {
    Ok(()) => Ok(()),
    Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
    Err(err) => Err(err),
  }
}

/// Replace the contents of an existing file.
///
/// Symlinks are followed: the file they point at is replaced and the link
/// itself is kept. The new contents are written to a temporary file next to
/// the target and then renamed over it, so readers never observe a
/// half-written file. The target's permissions are carried over.
pub fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
  let target = fs::canonicalize(path)?;
  let dir = target.parent().unwrap_or(Path::new("/"));
  let permissions = fs::metadata(&target)?.permissions();

  let mut tmp = NamedTempFile::new_in(dir)?;
  tmp.write_all(contents)?;
  tmp.as_file().sync_all()?;
  tmp.as_file().set_permissions(permissions)?;
  tmp.persist(&target).map_err(|e| e.error)?;

  Ok(())
}
