//! Driver configuration.
//!
//! Every knob of the configure and build steps is a named field here. The
//! defaults reproduce the stock layout: sources in `lib/compression`, a
//! scratch build in `asm-build`, and the asm.js artifact installed to
//! `lib/compression/asm/compression.asm.js`. An `asmbuild.toml` in the
//! project root can override any of them:
//!
//! ```toml
//! install_prefix = "dist"
//!
//! [configure]
//! build_type = "RelWithDebInfo"
//!
//! [configure.defines]
//! BUILD_WASM = "OFF"
//!
//! [fixup]
//! mode = "strip-shebang"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::consts::{
  CONFIG_FILENAME, DEFAULT_ARTIFACT, DEFAULT_BUILD_DIR, DEFAULT_INSTALL_PREFIX, DEFAULT_SOURCE_DIR,
};
use crate::fixup::FixupMode;

/// Errors that can occur while resolving the root or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to determine current directory: {0}")]
  CurrentDir(#[source] io::Error),

  #[error("project root {} is not accessible: {source}", path.display())]
  Root { path: PathBuf, source: io::Error },

  #[error("project root {} is not a directory", path.display())]
  RootNotDirectory { path: PathBuf },

  #[error("failed to read config file {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to parse config file {}: {source}", path.display())]
  Parse { path: PathBuf, source: toml::de::Error },

  #[error("invalid config: {field} {message}")]
  Invalid { field: &'static str, message: String },
}

/// Options for the configure step (`emcmake cmake ...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigureConfig {
  /// Toolchain wrapper placed in front of `program`. Empty runs `program` directly.
  pub wrapper: String,
  /// The configuration tool.
  pub program: String,
  /// Passed as `-DCMAKE_BUILD_TYPE`.
  pub build_type: String,
  /// Passed as `-G`.
  pub generator: String,
  /// Extra `-D<KEY>=<VALUE>` cache entries, emitted in key order.
  pub defines: BTreeMap<String, String>,
}

impl Default for ConfigureConfig {
  fn default() -> Self {
    Self {
      wrapper: "emcmake".to_string(),
      program: "cmake".to_string(),
      build_type: "Release".to_string(),
      generator: "Unix Makefiles".to_string(),
      defines: BTreeMap::from([("BUILD_WASM".to_string(), "OFF".to_string())]),
    }
  }
}

/// Options for the build-and-install step (`emmake make all install`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildStepConfig {
  /// Toolchain wrapper placed in front of `program`. Empty runs `program` directly.
  pub wrapper: String,
  /// The build tool.
  pub program: String,
  /// Targets passed to the build tool, in order.
  pub targets: Vec<String>,
}

impl Default for BuildStepConfig {
  fn default() -> Self {
    Self {
      wrapper: "emmake".to_string(),
      program: "make".to_string(),
      targets: vec!["all".to_string(), "install".to_string()],
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixupConfig {
  pub mode: FixupMode,
}

/// Complete driver configuration.
///
/// Relative paths are resolved against the project root by
/// [`BuildPaths::resolve`](crate::paths::BuildPaths::resolve); absolute paths are used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
  /// Working directory for the external build.
  pub build_dir: PathBuf,
  /// Source tree handed to the configure step.
  pub source_dir: PathBuf,
  /// Install prefix the build step installs into.
  pub install_prefix: PathBuf,
  /// File name of the produced artifact, inside the install prefix.
  pub artifact: String,
  pub configure: ConfigureConfig,
  pub build: BuildStepConfig,
  pub fixup: FixupConfig,
}

impl Default for DriverConfig {
  fn default() -> Self {
    Self {
      build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
      source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
      install_prefix: PathBuf::from(DEFAULT_INSTALL_PREFIX),
      artifact: DEFAULT_ARTIFACT.to_string(),
      configure: ConfigureConfig::default(),
      build: BuildStepConfig::default(),
      fixup: FixupConfig::default(),
    }
  }
}

impl DriverConfig {
  /// Load the configuration for a project root.
  ///
  /// With an explicit `path` the file must exist. Without one, `asmbuild.toml`
  /// in `root` is used when present and the defaults otherwise.
  pub fn load(root: &Path, path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = match path {
      Some(path) => path.to_path_buf(),
      None => {
        let candidate = root.join(CONFIG_FILENAME);
        if !candidate.exists() {
          debug!(root = %root.display(), "no config file, using defaults");
          return Ok(Self::default());
        }
        candidate
      }
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
      path: path.clone(),
      source,
    })?;
    let config = Self::parse(&content, &path)?;

    debug!(path = %path.display(), "loaded config file");
    Ok(config)
  }

  /// Parse and validate a TOML document.
  pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
    Self::parse(content, Path::new("<inline>"))
  }

  fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
    let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })?;
    config.validate()?;
    Ok(config)
  }

  /// Check the fields that would otherwise produce a nonsensical command line.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.artifact.trim().is_empty() {
      return Err(ConfigError::Invalid {
        field: "artifact",
        message: "must not be empty".to_string(),
      });
    }
    if Path::new(&self.artifact).file_name().map(|n| n.len()) != Some(self.artifact.len()) {
      return Err(ConfigError::Invalid {
        field: "artifact",
        message: format!("must be a plain file name, got '{}'", self.artifact),
      });
    }
    if self.configure.program.trim().is_empty() {
      return Err(ConfigError::Invalid {
        field: "configure.program",
        message: "must not be empty".to_string(),
      });
    }
    if self.configure.generator.trim().is_empty() {
      return Err(ConfigError::Invalid {
        field: "configure.generator",
        message: "must not be empty".to_string(),
      });
    }
    if self.build.program.trim().is_empty() {
      return Err(ConfigError::Invalid {
        field: "build.program",
        message: "must not be empty".to_string(),
      });
    }
    if let Some(key) = self.configure.defines.keys().find(|k| k.is_empty() || k.contains('=')) {
      return Err(ConfigError::Invalid {
        field: "configure.defines",
        message: format!("invalid cache entry name '{}'", key),
      });
    }
    Ok(())
  }
}
