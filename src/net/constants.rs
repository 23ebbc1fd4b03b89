//! Constants for the net module (retry defaults, timeouts).

use std::time::Duration;

/// Default number of additional attempts after the first failure.
pub const DEFAULT_RETRIES: u32 = 2;

/// Default delay between retry attempts (300 milliseconds).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(300);

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default end-to-end request timeout (30 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Cap applied to exponential backoff delays (30 seconds).
pub(crate) const MAX_BACKOFF_DELAY: Duration = Duration::from_secs(30);

/// Maximum jitter added to exponential backoff delays (100ms).
pub(crate) const MAX_JITTER: Duration = Duration::from_millis(100);
