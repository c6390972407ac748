// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound RPC rate limiter.
//!
//! Sliding one-second window capped at a fixed number of calls (45/s by
//! default, under the public Base RPC ceiling). Callers over the cap wait and
//! re-check; there is no rejection and no retry. A failed call's error is
//! handed back to the caller untouched.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::Instant;

/// Default ceiling of outbound RPC calls per window.
pub const DEFAULT_MAX_REQUESTS_PER_SECOND: u32 = 45;

/// Default number of calls issued together by [`RpcRateLimiter::execute_batch`].
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default pause between batches.
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

const WINDOW: Duration = Duration::from_secs(1);

struct LimiterState {
    max_requests: usize,
    window: Duration,
    batch_size: usize,
    batch_delay: Duration,
    recent: Mutex<VecDeque<Instant>>,
}

/// Shared sliding-window limiter. Clones share the same window.
#[derive(Clone)]
pub struct RpcRateLimiter {
    state: Arc<LimiterState>,
}

impl RpcRateLimiter {
    pub fn new(max_requests_per_second: u32) -> Self {
        Self::with_window(max_requests_per_second, WINDOW)
    }

    /// Limit to `max_requests` per arbitrary `window`.
    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            state: Arc::new(LimiterState {
                max_requests: usize::try_from(max_requests.max(1)).unwrap_or(usize::MAX),
                window,
                batch_size: DEFAULT_BATCH_SIZE,
                batch_delay: DEFAULT_BATCH_DELAY,
                recent: Mutex::new(VecDeque::new()),
            }),
        }
    }

    /// Override batch size and inter-batch delay.
    pub fn with_batching(self, batch_size: usize, batch_delay: Duration) -> Self {
        let state = &self.state;
        Self {
            state: Arc::new(LimiterState {
                max_requests: state.max_requests,
                window: state.window,
                batch_size: batch_size.max(1),
                batch_delay,
                recent: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub fn max_requests(&self) -> usize {
        self.state.max_requests
    }

    pub fn batch_size(&self) -> usize {
        self.state.batch_size
    }

    /// Wait until a slot in the current window is free, then claim it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut recent = self
                    .state
                    .recent
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();

                while let Some(&oldest) = recent.front() {
                    if now.duration_since(oldest) >= self.state.window {
                        recent.pop_front();
                    } else {
                        break;
                    }
                }

                if recent.len() < self.state.max_requests {
                    recent.push_back(now);
                    return;
                }

                recent
                    .front()
                    .map(|&oldest| self.state.window.saturating_sub(now.duration_since(oldest)))
                    .unwrap_or(self.state.window)
            };

            tracing::debug!(wait_ms = wait.as_millis() as u64, "RPC rate limit reached, waiting");
            tokio::time::sleep(wait).await;
        }
    }

    /// Run one call under the limit. The call's output is returned as-is.
    pub async fn execute<F: Future>(&self, call: F) -> F::Output {
        self.acquire().await;
        call.await
    }

    /// Run calls in batches of `batch_size`, concurrently within a batch and
    /// with `batch_delay` between batches.
    ///
    /// One slot per item, in input order. A slot is `None` only when its task
    /// was cancelled (runtime shutdown).
    pub async fn execute_batch<I, T, F, Fut>(&self, items: I, make_call: F) -> Vec<Option<Fut::Output>>
    where
        I: IntoIterator<Item = T>,
        F: Fn(T) -> Fut,
        Fut: Future + Send + 'static,
        Fut::Output: Send + 'static,
    {
        let mut pending = items.into_iter().peekable();
        let mut results = Vec::new();
        let mut first_batch = true;

        while pending.peek().is_some() {
            if !first_batch {
                tokio::time::sleep(self.state.batch_delay).await;
            }
            first_batch = false;

            let mut set = JoinSet::new();
            for (index, item) in pending.by_ref().take(self.state.batch_size).enumerate() {
                let limiter = self.clone();
                let call = make_call(item);
                set.spawn(async move { (index, limiter.execute(call).await) });
            }

            results.extend(collect_batch(set).await);
        }

        results
    }
}

/// Drain a batch into index order, leaving `None` where a task was cancelled.
async fn collect_batch<R: Send + 'static>(mut set: JoinSet<(usize, R)>) -> Vec<Option<R>> {
    let mut batch: Vec<Option<R>> = (0..set.len()).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, output)) => {
                if let Some(slot) = batch.get_mut(index) {
                    *slot = Some(output);
                }
            }
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => tracing::warn!(error = %e, "Batched RPC call was cancelled"),
        }
    }
    batch
}

impl Default for RpcRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS_PER_SECOND)
    }
}
