//! Filesystem layout of a build.
//!
//! All paths are derived once from the project root and passed explicitly to
//! every step. Nothing changes the process's current directory.

use std::env;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{ConfigError, DriverConfig};
use crate::consts::ROOT_ENV;

/// Absolute paths used by a single driver run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPaths {
  /// Project root everything else is resolved against.
  pub root: PathBuf,
  /// Working directory for the configure and build steps.
  pub build_dir: PathBuf,
  /// Source tree handed to the configure step.
  pub source_dir: PathBuf,
  /// Install prefix for the build step.
  pub install_prefix: PathBuf,
  /// The artifact the fix-up step rewrites.
  pub artifact: PathBuf,
}

impl BuildPaths {
  pub fn resolve(root: &Path, config: &DriverConfig) -> Self {
    let install_prefix = root.join(&config.install_prefix);
    Self {
      root: root.to_path_buf(),
      build_dir: root.join(&config.build_dir),
      source_dir: root.join(&config.source_dir),
      artifact: install_prefix.join(&config.artifact),
      install_prefix,
    }
  }
}

/// Determine the project root.
///
/// Priority order:
/// 1. `explicit`, when given
/// 2. `$ASMBUILD_ROOT`, when set and non-empty
/// 3. the current working directory
///
/// The result is canonicalized and must be an existing directory.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
  let root = match explicit {
    Some(path) => path.to_path_buf(),
    None => match env::var_os(ROOT_ENV).filter(|v| !v.is_empty()) {
      Some(value) => PathBuf::from(value),
      None => env::current_dir().map_err(ConfigError::CurrentDir)?,
    },
  };

  let root = dunce::canonicalize(&root).map_err(|source| ConfigError::Root { path: root, source })?;
  if !root.is_dir() {
    return Err(ConfigError::RootNotDirectory { path: root });
  }

  Ok(root)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;
  use tempfile::TempDir;

  #[test]
  fn resolve_uses_stock_layout() {
    let root = PathBuf::from("/work/project");
    let paths = BuildPaths::resolve(&root, &DriverConfig::default());

    assert_eq!(paths.build_dir, root.join("asm-build"));
    assert_eq!(paths.source_dir, root.join("lib").join("compression"));
    assert_eq!(paths.install_prefix, root.join("lib").join("compression").join("asm"));
    assert_eq!(
      paths.artifact,
      root.join("lib").join("compression").join("asm").join("compression.asm.js")
    );
  }

  #[test]
  #[cfg(unix)]
  fn resolve_keeps_absolute_paths() {
    let config = DriverConfig {
      install_prefix: PathBuf::from("/opt/asm"),
      ..DriverConfig::default()
    };
    let paths = BuildPaths::resolve(Path::new("/work/project"), &config);

    assert_eq!(paths.install_prefix, PathBuf::from("/opt/asm"));
    assert_eq!(paths.artifact, PathBuf::from("/opt/asm/compression.asm.js"));
  }

  #[test]
  #[serial]
  fn explicit_root_wins_over_env() {
    let explicit = TempDir::new().unwrap();
    let from_env = TempDir::new().unwrap();

    temp_env::with_var(ROOT_ENV, Some(from_env.path()), || {
      let root = resolve_root(Some(explicit.path())).unwrap();
      assert_eq!(root, dunce::canonicalize(explicit.path()).unwrap());
    });
  }

  #[test]
  #[serial]
  fn env_root_used_when_no_explicit_root() {
    let from_env = TempDir::new().unwrap();

    temp_env::with_var(ROOT_ENV, Some(from_env.path()), || {
      let root = resolve_root(None).unwrap();
      assert_eq!(root, dunce::canonicalize(from_env.path()).unwrap());
    });
  }

  #[test]
  #[serial]
  fn empty_env_falls_back_to_current_dir() {
    temp_env::with_var(ROOT_ENV, Some(""), || {
      let root = resolve_root(None).unwrap();
      assert_eq!(root, dunce::canonicalize(env::current_dir().unwrap()).unwrap());
    });
  }

  #[test]
  fn missing_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist");

    let err = resolve_root(Some(&missing)).unwrap_err();

    assert!(matches!(err, ConfigError::Root { .. }));
  }

  #[test]
  fn file_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file");
    std::fs::write(&file, "").unwrap();

    let err = resolve_root(Some(&file)).unwrap_err();

    assert!(matches!(err, ConfigError::RootNotDirectory { .. }));
  }
}
