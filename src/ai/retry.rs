//! Bounded retry with exponential backoff around a [`ModelAdapter`].

use super::{FunctionCall, FunctionDeclaration, ModelAdapter};
use crate::media::MediaAttachment;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_retry::{strategy::ExponentialBackoff, RetryIf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts in total, including the first.
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }

    pub fn with_delays(mut self, initial_delay: Duration, max_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self.max_delay = max_delay;
        self
    }

    /// Sleeps between attempts: initial, doubling, capped at `max_delay`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        // ExponentialBackoff yields base^n * factor, so base 2 with half the
        // initial delay as factor starts at exactly `initial_delay`.
        let factor = (self.initial_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .take(self.max_attempts.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Wraps an adapter so every call gets the same retry policy.
pub struct Retrying<A> {
    inner: A,
    policy: RetryPolicy,
}

impl<A: ModelAdapter> Retrying<A> {
    pub fn new(inner: A, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &A {
        &self.inner
    }
}

#[async_trait]
impl<A: ModelAdapter> ModelAdapter for Retrying<A> {
    async fn generate(
        &self,
        instruction: &str,
        declaration: &FunctionDeclaration,
        media: Option<&MediaAttachment>,
    ) -> Result<FunctionCall> {
        let inner = &self.inner;
        let max_attempts = self.policy.max_attempts;
        let attempt = &AtomicUsize::new(0);

        RetryIf::spawn(
            self.policy.delays(),
            move || async move {
                let n = attempt.fetch_add(1, Ordering::SeqCst) + 1;
                inner
                    .generate(instruction, declaration, media)
                    .await
                    .inspect_err(|e| {
                        warn!(
                            "[{}] Model call attempt {}/{} failed: {}",
                            declaration.name, n, max_attempts, e
                        );
                    })
            },
            |e: &Error| e.is_retryable(),
        )
        .await
    }
}
