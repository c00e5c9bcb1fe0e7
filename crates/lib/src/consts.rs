/// Config file looked up in the project root when no explicit path is given.
pub const CONFIG_FILENAME: &str = "asmbuild.toml";

/// Environment variable overriding the project root.
pub const ROOT_ENV: &str = "ASMBUILD_ROOT";

pub const DEFAULT_BUILD_DIR: &str = "asm-build";
pub const DEFAULT_SOURCE_DIR: &str = "lib/compression";
pub const DEFAULT_INSTALL_PREFIX: &str = "lib/compression/asm";
pub const DEFAULT_ARTIFACT: &str = "compression.asm.js";
