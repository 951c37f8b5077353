/// Application name
pub const APP_NAME: &str = "Civic Portal";

/// Default HTTP API port (server)
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Maximum JSON request body size in bytes (1 MiB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Number of digits a phone number must have once punctuation is stripped
pub const PHONE_DIGITS: usize = 10;

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// How long the profile form stays in its "saved" state before editing resumes
pub const SAVED_DISPLAY_SECS: u64 = 3;

/// Database file name inside the platform data directory
pub const DB_FILE_NAME: &str = "civic.db";
