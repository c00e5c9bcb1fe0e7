//! asmbuild-lib: Core types and logic for asmbuild
//!
//! This crate drives an Emscripten-style cross-compilation of a C library
//! into an asm.js artifact:
//! - `BuildPaths`: the directory layout derived from the project root
//! - `DriverConfig`: named options for the configure and build steps
//! - `Invocation`: a fully resolved external command
//! - `Driver`: the linear pipeline (directory setup, configure, build, fix-up)

pub mod config;
pub mod consts;
pub mod fixup;
pub mod invocation;
pub mod paths;
pub mod pipeline;
pub mod runner;
pub mod util;
