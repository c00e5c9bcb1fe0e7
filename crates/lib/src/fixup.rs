//! Post-processing of the installed artifact.
//!
//! The Emscripten toolchain sometimes emits a `#!` interpreter line at the top
//! of the generated asm.js file. The fix-up step removes it in place and leaves
//! every other byte untouched.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::util::fs::replace_file;

/// What to remove when the artifact starts with a shebang.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixupMode {
  /// Remove only the shebang line.
  #[default]
  StripShebang,
  /// Remove the shebang line and the final line of the file.
  ///
  /// Matches the output of older build scripts, which dropped both.
  StripShebangAndLastLine,
}

/// Result of a fix-up pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum FixupOutcome {
  /// The shebang line (without its line terminator) was removed.
  Stripped { shebang: String },
  /// The artifact did not start with a shebang and was left as-is.
  Unchanged,
}

#[derive(Debug, Error)]
pub enum FixupError {
  #[error("failed to read artifact {}: {source}", path.display())]
  Read { path: PathBuf, source: io::Error },

  #[error("failed to rewrite artifact {}: {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
}

/// Strip a leading shebang line from `content`.
///
/// Returns `None` when the first line does not start with `#!`.
pub fn strip_shebang(content: &[u8], mode: FixupMode) -> Option<Vec<u8>> {
  if !content.starts_with(b"#!") {
    return None;
  }

  let rest = match content.iter().position(|&b| b == b'\n') {
    Some(newline) => &content[newline + 1..],
    None => &[],
  };

  let kept = match mode {
    FixupMode::StripShebang => rest,
    FixupMode::StripShebangAndLastLine => without_last_line(rest),
  };

  Some(kept.to_vec())
}

/// Drop the final line, whether or not it is newline-terminated.
fn without_last_line(bytes: &[u8]) -> &[u8] {
  let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
  match body.iter().rposition(|&b| b == b'\n') {
    Some(newline) => &bytes[..=newline],
    None => &[],
  }
}

fn first_line(content: &[u8]) -> String {
  let end = content.iter().position(|&b| b == b'\n').unwrap_or(content.len());
  let line = &content[..end];
  let line = line.strip_suffix(b"\r").unwrap_or(line);
  String::from_utf8_lossy(line).into_owned()
}

/// Remove a leading shebang from the artifact at `path`, in place.
///
/// A missing or unreadable artifact is an error; the caller only gets here
/// after the build reported success, so the file is expected to exist.
pub fn fix_artifact(path: &Path, mode: FixupMode) -> Result<FixupOutcome, FixupError> {
  let content = fs::read(path).map_err(|source| FixupError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let Some(fixed) = strip_shebang(&content, mode) else {
    debug!(path = %path.display(), "no shebang in output");
    return Ok(FixupOutcome::Unchanged);
  };

  let shebang = first_line(&content);
  info!(path = %path.display(), shebang = %shebang, "stripping shebang from output");

  replace_file(path, &fixed).map_err(|source| FixupError::Write {
    path: path.to_path_buf(),
    source,
  })?;

  Ok(FixupOutcome::Stripped { shebang })
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;
  use tracing_test::traced_test;

  const ARTIFACT: &[u8] = b"#!/usr/bin/env node\nvar Module = {};\nfunction f() {}\n// end\n";

  #[test]
  fn strips_only_the_first_line() {
    let fixed = strip_shebang(ARTIFACT, FixupMode::StripShebang).unwrap();
    assert_eq!(fixed, b"var Module = {};\nfunction f() {}\n// end\n");
  }

  #[test]
  fn legacy_mode_also_drops_last_line() {
    let fixed = strip_shebang(ARTIFACT, FixupMode::StripShebangAndLastLine).unwrap();
    assert_eq!(fixed, b"var Module = {};\nfunction f() {}\n");
  }

  #[test]
  fn legacy_mode_without_trailing_newline() {
    let fixed = strip_shebang(b"#!/bin/sh\na\nb", FixupMode::StripShebangAndLastLine).unwrap();
    assert_eq!(fixed, b"a\n");
  }

  #[test]
  fn two_line_artifact() {
    let input = b"#!/bin/sh\nrest";
    assert_eq!(strip_shebang(input, FixupMode::StripShebang).unwrap(), b"rest");
    assert_eq!(strip_shebang(input, FixupMode::StripShebangAndLastLine).unwrap(), b"");
  }

  #[test]
  fn shebang_only_file_becomes_empty() {
    assert_eq!(strip_shebang(b"#!/bin/sh", FixupMode::StripShebang).unwrap(), b"");
    assert_eq!(strip_shebang(b"#!/bin/sh\n", FixupMode::StripShebang).unwrap(), b"");
  }

  #[test]
  fn remaining_bytes_are_preserved_exactly() {
    let input = b"#!node\r\n\tindented\r\n\n\xff\xfe binary tail";
    let fixed = strip_shebang(input, FixupMode::StripShebang).unwrap();
    assert_eq!(fixed, b"\tindented\r\n\n\xff\xfe binary tail");
  }

  #[test]
  fn no_shebang_means_no_change() {
    assert_eq!(strip_shebang(b"var a = 1;\n#!not first\n", FixupMode::StripShebang), None);
    assert_eq!(strip_shebang(b" #!/bin/sh\n", FixupMode::StripShebang), None);
    assert_eq!(strip_shebang(b"#\n!", FixupMode::StripShebang), None);
    assert_eq!(strip_shebang(b"", FixupMode::StripShebangAndLastLine), None);
  }

  #[test]
  fn first_line_trims_terminators() {
    assert_eq!(first_line(b"#!/bin/sh\r\nrest"), "#!/bin/sh");
    assert_eq!(first_line(b"#!/bin/sh"), "#!/bin/sh");
  }

  #[test]
  #[traced_test]
  fn fix_artifact_rewrites_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("compression.asm.js");
    fs::write(&path, ARTIFACT).unwrap();

    let outcome = fix_artifact(&path, FixupMode::StripShebang).unwrap();

    assert_eq!(
      outcome,
      FixupOutcome::Stripped {
        shebang: "#!/usr/bin/env node".to_string()
      }
    );
    assert_eq!(fs::read(&path).unwrap(), b"var Module = {};\nfunction f() {}\n// end\n");
    assert!(logs_contain("stripping shebang from output"));
  }

  #[test]
  fn fix_artifact_leaves_clean_file_alone() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("compression.asm.js");
    fs::write(&path, "var Module = {};\n").unwrap();
    let before = fs::metadata(&path).unwrap().modified().unwrap();

    let outcome = fix_artifact(&path, FixupMode::StripShebang).unwrap();

    assert_eq!(outcome, FixupOutcome::Unchanged);
    assert_eq!(fs::read_to_string(&path).unwrap(), "var Module = {};\n");
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
  }

  #[test]
  fn fix_artifact_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("compression.asm.js");
    fs::write(&path, ARTIFACT).unwrap();

    fix_artifact(&path, FixupMode::StripShebang).unwrap();
    let second = fix_artifact(&path, FixupMode::StripShebang).unwrap();

    assert_eq!(second, FixupOutcome::Unchanged);
  }

  #[test]
  fn fix_artifact_missing_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("compression.asm.js");

    let err = fix_artifact(&path, FixupMode::StripShebang).unwrap_err();

    match err {
      FixupError::Read { path: reported, source } => {
        assert_eq!(reported, path);
        assert_eq!(source.kind(), io::ErrorKind::NotFound);
      }
      other => panic!("expected read error, got {other:?}"),
    }
  }

  #[test]
  fn mode_names_in_config_form() {
    let json = serde_json::to_string(&FixupMode::StripShebangAndLastLine).unwrap();
    assert_eq!(json, "\"strip-shebang-and-last-line\"");
  }
}
