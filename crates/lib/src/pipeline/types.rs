//! Types for the build pipeline.
//!
//! This module defines the pipeline stages, the error type, and the report
//! returned by a successful run.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::fixup::{FixupError, FixupOutcome};
use crate::paths::BuildPaths;

/// Position of a driver in the linear pipeline.
///
/// `Start → DirReady → Configured → Built → FixedUp → Done`. A failure in any
/// stage moves straight to `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
  Start,
  DirReady,
  Configured,
  Built,
  FixedUp,
  Done,
}

impl Stage {
  pub fn as_str(self) -> &'static str {
    match self {
      Stage::Start => "start",
      Stage::DirReady => "dir-ready",
      Stage::Configured => "configured",
      Stage::Built => "built",
      Stage::FixedUp => "fixed-up",
      Stage::Done => "done",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which external step an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
  Configure,
  Build,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::Configure => f.write_str("configure"),
      Step::Build => f.write_str("build"),
    }
  }
}

/// Errors that halt the pipeline.
#[derive(Debug, Error)]
pub enum DriverError {
  /// The build directory could not be created.
  #[error("failed to create build directory {}: {source}", path.display())]
  CreateDir { path: PathBuf, source: io::Error },

  /// The external tool could not be started.
  #[error("failed to start {step} command '{program}': {source}")]
  Spawn {
    step: Step,
    program: String,
    source: io::Error,
  },

  /// The external tool ran and exited unsuccessfully.
  #[error("{step} step failed with {}", describe_exit(.code))]
  StepFailed { step: Step, code: Option<i32> },

  /// The artifact could not be read or rewritten.
  #[error(transparent)]
  Fixup(#[from] FixupError),
}

fn describe_exit(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!("exit code {}", code),
    None => "no exit code (terminated by signal)".to_string(),
  }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub paths: BuildPaths,
  /// Stages in the order they were reached, ending with `Done`.
  pub stages: Vec<Stage>,
  pub fixup: FixupOutcome,
  #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
  pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
  serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}
