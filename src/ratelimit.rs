//! Per-client request throttling
//!
//! Clients are keyed by an opaque string (the server uses the User-Agent).
//! Each key gets its own bucket of `per_minute` requests replenished evenly
//! across the minute. Keys whose bucket is full again carry no state and are
//! dropped by [`RateLimiter::prune`].

use crate::{Error, Result};
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DashMapStateStore;
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

type KeyedLimiter = Governor<String, DashMapStateStore<String>, DefaultClock>;

#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<KeyedLimiter>,
    clock: DefaultClock,
}

impl RateLimiter {
    pub fn new(per_minute: u32) -> Result<Self> {
        let burst = NonZeroU32::new(per_minute)
            .ok_or_else(|| Error::Config("RATE_LIMIT_PER_MINUTE must be > 0".to_string()))?;

        Ok(Self {
            limiter: Arc::new(Governor::dashmap(Quota::per_minute(burst))),
            clock: DefaultClock::default(),
        })
    }

    /// Take one request from `key`'s bucket.
    pub fn check(&self, key: &str) -> Result<()> {
        self.limiter.check_key(&key.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            tracing::warn!("Rate limit exceeded for client {}", key);
            Error::RateLimited {
                retry_after: wait.as_secs().max(1),
            }
        })
    }

    /// Forget clients that are back to a full bucket.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        tracing::debug!("Rate limiter tracking {} clients", self.limiter.len());
    }

    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Run [`prune`](Self::prune) every `period` until the task is aborted.
    pub fn spawn_pruning(&self, period: Duration) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                limiter.prune();
            }
        })
    }
}
