//! External command lines for the configure and build steps.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::{BuildStepConfig, ConfigureConfig};
use crate::paths::BuildPaths;

/// A fully resolved external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
  pub program: String,
  pub args: Vec<String>,
  /// Working directory the command runs in.
  pub cwd: PathBuf,
}

impl Invocation {
  pub fn new(program: impl Into<String>, args: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args,
      cwd: cwd.into(),
    }
  }

  /// Run `program` through `wrapper`, or directly when the wrapper is empty.
  fn wrapped(wrapper: &str, program: &str, args: Vec<String>, cwd: PathBuf) -> Self {
    if wrapper.is_empty() {
      return Self::new(program, args, cwd);
    }
    let mut wrapped_args = Vec::with_capacity(args.len() + 1);
    wrapped_args.push(program.to_string());
    wrapped_args.extend(args);
    Self::new(wrapper, wrapped_args, cwd)
  }
}

impl fmt::Display for Invocation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", quote(&self.program))?;
    for arg in &self.args {
      write!(f, " {}", quote(arg))?;
    }
    Ok(())
  }
}

fn quote(word: &str) -> String {
  let plain = !word.is_empty()
    && word
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || "-_=./:,+@%".contains(c));
  if plain {
    word.to_string()
  } else {
    format!("'{}'", word.replace('\'', r"'\''"))
  }
}

/// `emcmake cmake -DCMAKE_INSTALL_PREFIX=<prefix> -DCMAKE_BUILD_TYPE=<type> -D<defines>... -G <generator> <source>`
pub fn configure_invocation(paths: &BuildPaths, config: &ConfigureConfig) -> Invocation {
  let mut args = vec![
    format!("-DCMAKE_INSTALL_PREFIX={}", paths.install_prefix.display()),
    format!("-DCMAKE_BUILD_TYPE={}", config.build_type),
  ];
  args.extend(config.defines.iter().map(|(key, value)| format!("-D{}={}", key, value)));
  args.push("-G".to_string());
  args.push(config.generator.clone());
  args.push(paths.source_dir.to_string_lossy().into_owned());

  Invocation::wrapped(&config.wrapper, &config.program, args, paths.build_dir.clone())
}

/// `emmake make <targets>...`
pub fn build_invocation(paths: &BuildPaths, config: &BuildStepConfig) -> Invocation {
  Invocation::wrapped(
    &config.wrapper,
    &config.program,
    config.targets.clone(),
    paths.build_dir.clone(),
  )
}
