//! Store calls off the async runtime, bounded by a timeout and retried with
//! exponential backoff on transient failures.

use std::sync::Arc;
use std::time::Duration;

use petwatch_db::{DbError, DocumentStore};
use serde::Deserialize;
use tracing::{error, warn};

use crate::error::PetError;

#[derive(Debug, Clone, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    50
}

fn default_timeout_ms() -> u64 {
    5_000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(10);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

/// Whether a timed-out call may simply be repeated.
///
/// A write that timed out may still land, so repeating it could apply the
/// same change twice. Writes only retry errors the store reported itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Read,
    Write,
}

/// Run `f` against the store on the blocking pool.
pub async fn run<S, T, F>(
    store: &Arc<S>,
    policy: &RetryPolicy,
    op: &'static str,
    kind: CallKind,
    f: F,
) -> Result<T, PetError>
where
    S: DocumentStore,
    T: Send + 'static,
    F: Fn(&S) -> petwatch_db::Result<T> + Clone + Send + 'static,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let store = Arc::clone(store);
        let call = f.clone();
        let task = tokio::task::spawn_blocking(move || call(&store));

        let result = match tokio::time::timeout(policy.timeout(), task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!("spawn_blocking join error: {}", e);
                Err(DbError::Unavailable(e.to_string()))
            }
            Err(_) if kind == CallKind::Read && attempt < max_attempts => {
                warn!(op, attempt, "store read timed out, retrying");
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
                continue;
            }
            Err(_) => {
                warn!(op, attempt, "store call timed out");
                return Err(PetError::Timeout(policy.timeout()));
            }
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                warn!(op, attempt, error = %e, "transient store failure, retrying");
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff_ms: 20,
            timeout_ms: 100,
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(20));
        assert_eq!(policy.backoff(2), Duration::from_millis(40));
        assert_eq!(policy.backoff(3), Duration::from_millis(80));
    }

    #[test]
    fn defaults_apply_to_partial_config() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{ "max_attempts": 7 }"#).expect("parse policy");
        assert_eq!(policy.max_attempts, 7);
        assert_eq!(policy.initial_backoff_ms, 50);
        assert_eq!(policy.timeout(), Duration::from_secs(5));
    }
}
