//! Test utilities for asmbuild-lib.
//!
//! Cross-platform invocations for tests that need to spawn real processes.

use std::path::Path;

use crate::invocation::Invocation;

/// Returns an invocation that runs `script` through the platform shell.
#[cfg(unix)]
pub fn shell_cmd(script: &str, cwd: &Path) -> Invocation {
  Invocation::new("/bin/sh", vec!["-c".to_string(), script.to_string()], cwd)
}

#[cfg(windows)]
pub fn shell_cmd(script: &str, cwd: &Path) -> Invocation {
  Invocation::new("cmd.exe", vec!["/C".to_string(), script.to_string()], cwd)
}

/// Returns an invocation that creates an empty file in `cwd`.
#[cfg(unix)]
pub fn touch_file(filename: &str, cwd: &Path) -> Invocation {
  Invocation::new("/usr/bin/touch", vec![filename.to_string()], cwd)
}

#[cfg(windows)]
pub fn touch_file(filename: &str, cwd: &Path) -> Invocation {
  Invocation::new(
    "powershell.exe",
    vec![
      "-NoProfile".to_string(),
      "-Command".to_string(),
      format!("New-Item -ItemType File -Path '{}' -Force | Out-Null", filename),
    ],
    cwd,
  )
}
