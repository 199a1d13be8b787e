// src/exec/retry.rs

//! Bounded retry with a fixed delay between attempts.
//!
//! Used for operations known to be flaky, e.g. waiting for a cluster control
//! plane to come up or adding a Helm repository over a slow network. Retrying
//! is always opt-in at the call site; nothing else in the crate retries on its
//! own.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// How often to try and how long to wait between tries.
///
/// `attempts == 0` means the operation is never invoked and the retry fails
/// straight away with "0 attempts".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_delay", rename = "delay_ms", with = "millis")]
    pub delay: Duration,
}

fn default_attempts() -> u32 {
    5
}

fn default_delay() -> Duration {
    Duration::from_secs(2)
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay: default_delay(),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// All attempts failed (or none were allowed).
///
/// `last` is the error from the final attempt; it is `None` only when the
/// policy allowed zero attempts.
#[derive(Debug)]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: Option<E>,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "retry failed after {} attempts", self.attempts)?;
        if let Some(last) = &self.last {
            write!(f, ": {last}")?;
        }
        Ok(())
    }
}

impl<E> std::error::Error for RetryError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Run `operation` until it succeeds or `policy.attempts` runs out.
///
/// The delay is only slept between a failed attempt and the next one; never
/// before the first attempt and never after the last.
pub async fn retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let mut last = None;

    for attempt in 1..=policy.attempts {
        match operation().await {
            Ok(value) => {
                debug!(attempt, "operation succeeded");
                return Ok(value);
            }
            Err(err) => {
                debug!(
                    attempt,
                    attempts = policy.attempts,
                    error = %err,
                    "attempt failed"
                );
                last = Some(err);
                if attempt < policy.attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(RetryError {
        attempts: policy.attempts,
        last,
    })
}
