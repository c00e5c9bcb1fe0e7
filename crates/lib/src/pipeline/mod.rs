//! The build pipeline.
//!
//! A [`Driver`] walks a fixed sequence of stages:
//!
//! 1. ensure the build directory exists
//! 2. run the configure step (`emcmake cmake ...`)
//! 3. run the build-and-install step (`emmake make all install`)
//! 4. strip a stray shebang from the installed artifact
//!
//! Each stage runs only if the previous one succeeded. There are no retries
//! and no rollback: a failed run leaves the build directory as-is so it can be
//! inspected, and the whole driver can simply be run again.

mod types;

pub use types::*;

use std::time::Instant;

use tracing::{info, warn};

use crate::config::DriverConfig;
use crate::fixup::{FixupOutcome, fix_artifact};
use crate::invocation::{Invocation, build_invocation, configure_invocation};
use crate::paths::BuildPaths;
use crate::runner::{CommandRunner, StepStatus};
use crate::util::fs::ensure_directory;

/// Drives one build through the pipeline.
pub struct Driver<R> {
  paths: BuildPaths,
  config: DriverConfig,
  runner: R,
  stages: Vec<Stage>,
}

impl<R: CommandRunner> Driver<R> {
  pub fn new(paths: BuildPaths, config: DriverConfig, runner: R) -> Self {
    Self {
      paths,
      config,
      runner,
      stages: vec![Stage::Start],
    }
  }

  pub fn paths(&self) -> &BuildPaths {
    &self.paths
  }

  pub fn runner(&self) -> &R {
    &self.runner
  }

  pub fn into_runner(self) -> R {
    self.runner
  }

  /// The current stage.
  pub fn stage(&self) -> Stage {
    self.stages.last().copied().unwrap_or(Stage::Start)
  }

  /// Every stage reached so far, in order.
  pub fn stages(&self) -> &[Stage] {
    &self.stages
  }

  /// The commands a run would execute, in order, without running anything.
  pub fn plan(&self) -> Vec<Invocation> {
    vec![
      configure_invocation(&self.paths, &self.config.configure),
      build_invocation(&self.paths, &self.config.build),
    ]
  }

  /// Run every stage.
  ///
  /// On failure the driver is left in [`Stage::Done`] and the error names the
  /// stage that failed; later stages are never attempted. Running again starts
  /// over from [`Stage::Start`].
  pub fn run(&mut self) -> Result<RunReport, DriverError> {
    let start = Instant::now();
    self.stages = vec![Stage::Start];
    info!(root = %self.paths.root.display(), "starting build");

    let result = self.run_stages();
    self.advance(Stage::Done);

    match result {
      Ok(fixup) => {
        let elapsed = start.elapsed();
        info!(elapsed_ms = elapsed.as_millis() as u64, "build finished");
        Ok(RunReport {
          paths: self.paths.clone(),
          stages: self.stages.clone(),
          fixup,
          elapsed,
        })
      }
      Err(err) => {
        warn!(error = %err, "build pipeline halted");
        Err(err)
      }
    }
  }

  fn run_stages(&mut self) -> Result<FixupOutcome, DriverError> {
    ensure_directory(&self.paths.build_dir).map_err(|source| DriverError::CreateDir {
      path: self.paths.build_dir.clone(),
      source,
    })?;
    self.advance(Stage::DirReady);

    let status = self.run_configure()?;
    check(Step::Configure, status)?;
    self.advance(Stage::Configured);

    let status = self.run_build_and_install()?;
    check(Step::Build, status)?;
    self.advance(Stage::Built);

    let outcome = fix_artifact(&self.paths.artifact, self.config.fixup.mode)?;
    self.advance(Stage::FixedUp);

    Ok(outcome)
  }

  /// Run the configure step and return its exit status.
  ///
  /// The build directory must already exist.
  pub fn run_configure(&mut self) -> Result<StepStatus, DriverError> {
    let invocation = configure_invocation(&self.paths, &self.config.configure);
    self.execute(Step::Configure, &invocation)
  }

  /// Run the build-and-install step and return its exit status.
  pub fn run_build_and_install(&mut self) -> Result<StepStatus, DriverError> {
    let invocation = build_invocation(&self.paths, &self.config.build);
    self.execute(Step::Build, &invocation)
  }

  fn execute(&mut self, step: Step, invocation: &Invocation) -> Result<StepStatus, DriverError> {
    info!(step = %step, "running step");
    self.runner.run(invocation).map_err(|source| DriverError::Spawn {
      step,
      program: invocation.program.clone(),
      source,
    })
  }

  fn advance(&mut self, stage: Stage) {
    info!(stage = %stage, "stage reached");
    self.stages.push(stage);
  }
}

fn check(step: Step, status: StepStatus) -> Result<(), DriverError> {
  if status.success {
    Ok(())
  } else {
    Err(DriverError::StepFailed { step, code: status.code })
  }
}
