use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::context::Context;
use crate::rpc::{RpcError, RpcStatus};

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Bounded, strictly sequential retries for unary calls.
///
/// Every attempt runs under its own timeout derived from the caller's context.
/// Only statuses in `retry_codes` are retried; anything else is returned as is.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    retry_codes: Vec<RpcStatus>,
    max_attempts: u32,
    per_attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retry_codes: vec![
                RpcStatus::Aborted,
                RpcStatus::NotFound,
                RpcStatus::DeadlineExceeded,
            ],
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            per_attempt_timeout: DEFAULT_PER_ATTEMPT_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    pub fn new(
        retry_codes: Vec<RpcStatus>,
        max_attempts: u32,
        per_attempt_timeout: Duration,
    ) -> RetryPolicy {
        RetryPolicy {
            retry_codes,
            max_attempts: max_attempts.max(1),
            per_attempt_timeout,
        }
    }

    pub fn is_retryable(&self, status: RpcStatus) -> bool {
        self.retry_codes.contains(&status)
    }

    /// Runs `op` until it succeeds, fails with a non retryable status, or the
    /// attempts run out. `op` receives the context bounding the current attempt.
    pub async fn call<T, F, Fut>(&self, ctx: &Context, method: &str, mut op: F) -> Result<T, RpcError>
    where
        F: FnMut(Context) -> Fut,
        Fut: Future<Output = Result<T, RpcError>>,
    {
        let mut attempt = 1;

        loop {
            let attempt_ctx = ctx.child_with_timeout(self.per_attempt_timeout);
            let started = Instant::now();

            tracing::info!(method, attempt, "Sending RPC request");

            let result = match attempt_ctx.run(op(attempt_ctx.clone())).await {
                Ok(result) => result,
                Err(ctx_err) => Err(RpcError::from(ctx_err)),
            };
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let err = match result {
                Ok(value) => {
                    tracing::info!(method, attempt, elapsed_ms, "Received RPC response");
                    return Ok(value);
                }
                Err(err) => err,
            };

            tracing::warn!(
                method,
                attempt,
                elapsed_ms,
                status = %err.status,
                error = %err.message,
                "RPC request failed"
            );

            // The caller gave up, further attempts would fail straight away.
            if let Some(ctx_err) = ctx.err() {
                return Err(RpcError::from(ctx_err));
            }

            if !self.is_retryable(err.status) || attempt >= self.max_attempts {
                return Err(err);
            }

            attempt += 1;
        }
    }
}
