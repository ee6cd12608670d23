//! Limits applied to provider calls during a turn.

use crate::ports::story_gateway::GatewayError;
use std::future::Future;
use std::time::Duration;

/// How long each provider call of a round-trip may take.
///
/// There is no retry policy: a failed turn always waits for the next user
/// action.
#[derive(Debug, Clone, Default)]
pub struct BehaviorConfig {
    /// Per-call limit; `None` waits for the provider indefinitely.
    pub timeout: Option<Duration>,
}

impl BehaviorConfig {
    pub fn with_timeout_seconds(seconds: u64) -> Self {
        Self {
            timeout: Some(Duration::from_secs(seconds)),
        }
    }

    /// `None` disables the limit.
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        Self {
            timeout: seconds.map(Duration::from_secs),
        }
    }

    /// Run one provider call under the configured limit.
    ///
    /// An expired limit drops the call and reports `GatewayError::Timeout`.
    pub async fn bound<T, F>(&self, call: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => call.await,
        }
    }
}
