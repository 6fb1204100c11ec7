//! Centralized default constants for Courtify.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Environment variable names live next to the value they override.

// =============================================================================
// REMOTE SERVICE
// =============================================================================

/// Default base URL of the remote analysis/chat service.
pub const API_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding [`API_BASE_URL`].
pub const ENV_API_BASE_URL: &str = "COURTIFY_API_BASE_URL";

/// Per-request timeout in seconds. Expiry counts as a transport failure.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding [`REQUEST_TIMEOUT_SECS`].
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "COURTIFY_REQUEST_TIMEOUT_SECS";

/// Timeout for the health probe in seconds.
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Multipart field name carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

// =============================================================================
// INTAKE
// =============================================================================

/// Hard size ceiling per uploaded file (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of DocumentTasks allowed to run at once.
///
/// One keeps intake strictly sequential.
pub const MAX_CONCURRENT_TASKS: usize = 1;

/// Environment variable overriding [`MAX_CONCURRENT_TASKS`].
pub const ENV_MAX_CONCURRENT_TASKS: &str = "COURTIFY_MAX_CONCURRENT_TASKS";

/// Upload progress increment per tick, in percentage points.
pub const PROGRESS_STEP: u8 = 10;

/// Environment variable overriding [`PROGRESS_STEP`].
pub const ENV_PROGRESS_STEP: &str = "COURTIFY_PROGRESS_STEP";

/// Interval between upload progress ticks in milliseconds.
pub const PROGRESS_INTERVAL_MS: u64 = 200;

/// Environment variable overriding [`PROGRESS_INTERVAL_MS`].
pub const ENV_PROGRESS_INTERVAL_MS: &str = "COURTIFY_PROGRESS_INTERVAL_MS";

// =============================================================================
// QUERY SESSION
// =============================================================================

/// Whether new sessions start with the assistant greeting.
pub const SEED_GREETING: bool = true;

/// Environment variable overriding [`SEED_GREETING`].
pub const ENV_GREETING: &str = "COURTIFY_GREETING";

// =============================================================================
// EVENTS
// =============================================================================

/// Default event bus broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Environment variable overriding [`EVENT_BUS_CAPACITY`].
pub const ENV_EVENT_CAPACITY: &str = "COURTIFY_EVENT_CAPACITY";

/// Read a parsed value from the environment, falling back on absence or parse failure.
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Read a boolean flag from the environment (`false`/`0`/`no`/`off` disable it).
pub fn env_flag(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => !matches!(
            v.trim().to_lowercase().as_str(),
            "false" | "0" | "no" | "off"
        ),
        Err(_) => default,
    }
}
