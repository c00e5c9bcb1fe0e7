//! Shared utilities.
//!
//! Filesystem helpers used by the pipeline, plus test helpers.

pub mod fs;

#[cfg(test)]
pub mod testutil;
