//! Application constants
//!
//! Centralized location for file names, defaults and hashing parameters.

/// Application name, also used as the config/data directory name
pub const APP_NAME: &str = "userstore";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "userdb.db";

/// Config file name inside the config directory
pub const CONFIG_FILE: &str = "config.yaml";

/// Log file name inside the log directory
pub const LOG_FILE: &str = "userstore.log";

/// Avatar identifier assigned at signup
pub const DEFAULT_AVATAR: &str = "man";

/// SHA-256 iterations applied to each password
pub const DEFAULT_HASH_ROUNDS: u32 = 100_000;

/// Random salt length in bytes
pub const SALT_LEN: usize = 16;

/// Schema version written by the newest migration
pub const SCHEMA_VERSION: i64 = 3;
