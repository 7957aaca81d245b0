/// Environment variable prefix for settings (`ROSTER__SECTION__KEY`).
pub const ENV_PREFIX: &str = "ROSTER";
pub const ENV_SEPARATOR: &str = "__";

/// Optional settings file read from the working directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Target used for audit records of denied access.
pub const AUDIT_TARGET: &str = "roster::audit";
