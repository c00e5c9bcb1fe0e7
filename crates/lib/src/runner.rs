//! Running external commands.
//!
//! The pipeline talks to the toolchain only through [`CommandRunner`], so tests
//! can substitute a double that records what would have been run.

use std::io;
use std::process::{Command, ExitStatus};

use serde::Serialize;
use tracing::{debug, info};

use crate::invocation::Invocation;

/// Exit status of an external command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepStatus {
  pub success: bool,
  /// `None` when the process was terminated by a signal.
  pub code: Option<i32>,
}

impl StepStatus {
  pub fn from_code(code: i32) -> Self {
    Self {
      success: code == 0,
      code: Some(code),
    }
  }

  pub fn succeeded() -> Self {
    Self::from_code(0)
  }
}

impl From<ExitStatus> for StepStatus {
  fn from(status: ExitStatus) -> Self {
    Self {
      success: status.success(),
      code: status.code(),
    }
  }
}

/// Executes invocations and reports their exit status.
///
/// An `Err` means the command could not be run at all (e.g. the program does
/// not exist). A command that ran and failed is an `Ok` with `success == false`.
pub trait CommandRunner {
  fn run(&mut self, invocation: &Invocation) -> io::Result<StepStatus>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
  fn run(&mut self, invocation: &Invocation) -> io::Result<StepStatus> {
    (**self).run(invocation)
  }
}

/// Runs commands as child processes, blocking until each exits.
///
/// Standard streams are inherited so toolchain output reaches the user
/// unmodified, except that stdout can be sent to our stderr when stdout is
/// reserved for machine-readable output. There is no timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner {
  stdout_to_stderr: bool,
}

impl SystemRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// A runner whose children write their stdout to this process's stderr.
  pub fn with_stdout_to_stderr() -> Self {
    Self { stdout_to_stderr: true }
  }
}

impl CommandRunner for SystemRunner {
  fn run(&mut self, invocation: &Invocation) -> io::Result<StepStatus> {
    info!(cmd = %invocation, "executing command");
    debug!(
      program = %invocation.program,
      cwd = ?invocation.cwd,
      stdout_to_stderr = self.stdout_to_stderr,
      "spawning process"
    );

    let mut command = Command::new(&invocation.program);
    command.args(&invocation.args).current_dir(&invocation.cwd);
    if self.stdout_to_stderr {
      command.stdout(io::stderr());
    }
    let status = command.status()?;

    let status = StepStatus::from(status);
    debug!(success = status.success, code = ?status.code, "process exited");
    Ok(status)
  }
}
