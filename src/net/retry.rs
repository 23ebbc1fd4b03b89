//! Bounded retry with configurable backoff for transient transport failures.
//!
//! This module provides the [`RetryPolicy`] and [`FailureKind`] types for
//! classifying request errors and driving the attempt loop.
//!
//! # Overview
//!
//! When an attempt fails, the error is classified into a [`FailureKind`]:
//! - [`FailureKind::Transient`] - Transport failures that may succeed on retry
//! - [`FailureKind::Terminal`] - Definitive outcomes that retrying cannot change
//!
//! Transport failures (connection reset, timeout, DNS) are retried up to the
//! attempt budget; a served HTTP error status is a definitive answer and is
//! never retried. That split is the central contract of this module: retrying
//! a well-formed 4xx/5xx wastes time and can mask real problems, while
//! retrying a dropped connection is usually correct.
//!
//! # Example
//!
//! ```
//! use uplink_core::net::{RequestError, FailureKind, classify_error};
//!
//! let error = RequestError::status("https://example.com", 503, None);
//! assert_eq!(classify_error(&error), FailureKind::Terminal);
//!
//! let error = RequestError::timeout("https://example.com");
//! assert_eq!(classify_error(&error), FailureKind::Transient);
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, instrument};

use super::constants::{DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, MAX_BACKOFF_DELAY, MAX_JITTER};
use super::error::RequestError;

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Transport-level failure where no HTTP response was obtained.
    ///
    /// Examples: connection refused, connection reset, timeout, DNS failure.
    Transient,

    /// Definitive outcome; further attempts cannot change it.
    ///
    /// Examples: a served error status, a malformed JSON body, a bad URL.
    Terminal,
}

/// Classifies a request error for retry decisions.
#[must_use]
pub fn classify_error(error: &RequestError) -> FailureKind {
    match error {
        RequestError::Network { .. } | RequestError::Timeout { .. } => FailureKind::Transient,

        RequestError::Status { .. }
        | RequestError::Decode { .. }
        | RequestError::Exhausted { .. }
        | RequestError::InvalidUrl { .. } => FailureKind::Terminal,
    }
}

/// Delay strategy applied between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same delay before every retry. The default.
    Fixed,

    /// Delay grows by `multiplier` each attempt, capped at `max_delay`, with
    /// random jitter added to avoid synchronized retries.
    Exponential {
        /// Multiplier applied each attempt (typically 2.0 for doubling).
        multiplier: f32,
        /// Upper bound on the computed delay, before jitter.
        max_delay: Duration,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed
    }
}

impl Backoff {
    /// Exponential doubling capped at the module default.
    #[must_use]
    pub fn exponential() -> Self {
        Self::Exponential {
            multiplier: 2.0,
            max_delay: MAX_BACKOFF_DELAY,
        }
    }
}

/// Retry configuration for one logical request.
///
/// `retries` counts the *additional* tries after the first attempt, so the
/// total attempt budget is `retries + 1`. A policy with `retries = 0` makes
/// exactly one attempt.
///
/// # Default Values
///
/// - `retries`: 2
/// - `delay`: 300 milliseconds
/// - `backoff`: [`Backoff::Fixed`]
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    retries: u32,

    /// Base delay between attempts.
    delay: Duration,

    /// Delay strategy.
    backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            delay: DEFAULT_RETRY_DELAY,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Creates a fixed-delay policy.
    #[must_use]
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self {
            retries,
            delay,
            backoff: Backoff::Fixed,
        }
    }

    /// Replaces the delay strategy, keeping the retry count and base delay.
    ///
    /// The observable retry contract (attempt counts, no retry on HTTP-level
    /// errors) is identical for every strategy; only the waits change.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the configured number of additional attempts.
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Returns the base delay between attempts.
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the configured delay strategy.
    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    /// Returns the total attempt budget (`retries + 1`).
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Calculates the delay to wait after the given failed attempt (1-indexed).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential {
                multiplier,
                max_delay,
            } => {
                let base_ms = self.delay.as_millis() as f64;
                // attempt is 0-indexed for the exponent (attempt 1 = mult^0 = 1x base)
                let exponent = f64::from(attempt.saturating_sub(1));
                let delay_ms = base_ms * f64::from(multiplier).powf(exponent);
                let capped_ms = delay_ms.min(max_delay.as_millis() as f64);
                Duration::from_millis(capped_ms as u64) + jitter()
            }
        }
    }

    /// Drives `operation` until it succeeds, fails terminally, or the attempt
    /// budget runs out.
    ///
    /// The closure receives the 1-indexed attempt number. Transient failures
    /// are retried after [`delay_for`](Self::delay_for); terminal failures
    /// are re-raised immediately and untouched.
    ///
    /// # Errors
    ///
    /// Returns the terminal [`RequestError`] unchanged, or
    /// [`RequestError::Exhausted`] carrying the final transport error once
    /// the budget is spent.
    #[instrument(skip(self, operation), fields(url = %url, max_attempts = self.max_attempts()))]
    pub async fn run<T, F, Fut>(&self, url: &str, mut operation: F) -> Result<T, RequestError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, RequestError>>,
    {
        let max_attempts = self.max_attempts();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "issuing attempt");

            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if classify_error(&error) == FailureKind::Terminal {
                debug!(attempt, error = %error, "terminal failure, not retrying");
                return Err(error);
            }

            if attempt >= max_attempts {
                debug!(attempt, max_attempts, "attempt budget exhausted");
                return Err(RequestError::exhausted(url, attempt, error));
            }

            let delay = self.delay_for(attempt);
            info!(
                attempt,
                next_attempt = attempt + 1,
                max_attempts,
                delay_ms = delay.as_millis(),
                error = %error,
                "retrying after transport failure"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Generates random jitter between 0 and [`MAX_JITTER`].
///
/// Jitter spreads out retries when several requests fail at the same moment
/// and would otherwise hammer the gateway in lockstep.
fn jitter() -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_ms = rng.gen_range(0..=MAX_JITTER.as_millis() as u64);
    Duration::from_millis(jitter_ms)
}
