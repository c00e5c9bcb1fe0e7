//! Implementation of the `asmbuild` build command.
//!
//! Resolves the project root and configuration, then runs the pipeline (or
//! only prints it with `--dry-run`).

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use asmbuild_lib::config::DriverConfig;
use asmbuild_lib::fixup::FixupOutcome;
use asmbuild_lib::invocation::Invocation;
use asmbuild_lib::paths::{BuildPaths, resolve_root};
use asmbuild_lib::pipeline::Driver;
use asmbuild_lib::runner::SystemRunner;

use crate::output::{OutputFormat, format_duration, print_command, print_info, print_json, print_stat, print_success};

/// Arguments for the build command.
pub struct BuildArgs {
  pub root: Option<PathBuf>,
  pub config: Option<PathBuf>,
  pub dry_run: bool,
  pub output: OutputFormat,
}

#[derive(Serialize)]
struct DryRun<'a> {
  dry_run: bool,
  paths: &'a BuildPaths,
  commands: Vec<Invocation>,
}

/// Execute the build command.
///
/// Runs the full pipeline:
/// - Creates the build directory (reusing it if present)
/// - Configures the library with the cross-compilation wrapper
/// - Builds and installs it
/// - Strips a stray shebang from the installed artifact
///
/// # Errors
///
/// Returns an error if the root or config cannot be resolved, or if any stage fails.
pub fn cmd_build(args: &BuildArgs) -> Result<()> {
  let start = Instant::now();

  let root = resolve_root(args.root.as_deref()).context("Failed to resolve project root")?;
  let config = DriverConfig::load(&root, args.config.as_deref()).context("Failed to load configuration")?;
  let paths = BuildPaths::resolve(&root, &config);
  debug!(root = %root.display(), build_dir = %paths.build_dir.display(), "resolved build paths");

  // JSON summaries own stdout, so toolchain chatter is moved to stderr.
  let runner = if args.output.is_json() {
    SystemRunner::with_stdout_to_stderr()
  } else {
    SystemRunner::new()
  };
  let mut driver = Driver::new(paths, config, runner);

  if args.dry_run {
    return print_plan(driver.paths(), driver.plan(), args.output);
  }

  let report = driver.run().context("Build failed")?;

  if args.output.is_json() {
    print_json(&report)?;
  } else {
    println!();
    print_success("Build complete!");
    print_stat("Build directory", &display(&report.paths.build_dir));
    print_stat("Install prefix", &display(&report.paths.install_prefix));
    print_stat("Artifact", &display(&report.paths.artifact));
    match &report.fixup {
      FixupOutcome::Stripped { shebang } => print_stat("Fix-up", &format!("stripped '{}'", shebang)),
      FixupOutcome::Unchanged => print_stat("Fix-up", "no shebang found"),
    }
    print_stat("Duration", &format_duration(start.elapsed()));
  }

  Ok(())
}

fn print_plan(paths: &BuildPaths, commands: Vec<Invocation>, output: OutputFormat) -> Result<()> {
  if output.is_json() {
    return print_json(&DryRun {
      dry_run: true,
      paths,
      commands,
    });
  }

  print_info("Dry run - no commands executed");
  print_stat("Build directory", &display(&paths.build_dir));
  print_stat("Artifact", &display(&paths.artifact));
  for command in &commands {
    print_command(&command.to_string());
  }

  Ok(())
}

fn display(path: &Path) -> String {
  path.display().to_string()
}
