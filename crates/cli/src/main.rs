use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cmd;
mod output;

use cmd::{BuildArgs, cmd_build};
use output::{OutputFormat, print_error};

/// asmbuild - Cross-compile the compression library to asm.js
///
/// Creates the build directory, configures the library with the Emscripten
/// CMake wrapper, builds and installs it, then strips a stray shebang from
/// the installed artifact.
#[derive(Parser)]
#[command(name = "asmbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Project root containing the library sources (default: $ASMBUILD_ROOT or the current directory)
  #[arg(long)]
  root: Option<PathBuf>,

  /// Path to a config file (default: asmbuild.toml in the project root, if present)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Print the commands that would run without running them
  #[arg(long)]
  dry_run: bool,

  /// Output format for the summary
  #[arg(short, long, value_enum, default_value = "text")]
  output: OutputFormat,

  /// Enable debug logging (overridden by RUST_LOG)
  #[arg(short, long)]
  verbose: bool,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let args = BuildArgs {
    root: cli.root,
    config: cli.config,
    dry_run: cli.dry_run,
    output: cli.output,
  };

  match cmd_build(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
