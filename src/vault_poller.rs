// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Vault Snapshot Poller
//!
//! Background task that keeps on-chain snapshots warm for every address the
//! metrics endpoint has seen recently.
//!
//! ## Strategy
//!
//! Every `poll_interval` (default 30 s) the poller:
//! 1. Lists addresses with an unexpired snapshot.
//! 2. Refreshes them through [`RpcRateLimiter::execute_batch`], so large
//!    address sets are spread over several batches.
//! 3. Logs failures; the previous snapshot stays in place until it expires.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::RpcRateLimiter;
use crate::metrics::MetricsService;

/// Default interval between polling sweeps.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Outcome counts of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub refreshed: usize,
    pub failed: usize,
}

pub struct VaultPoller {
    metrics: Arc<MetricsService>,
    limiter: RpcRateLimiter,
    poll_interval: Duration,
}

impl VaultPoller {
    pub fn new(metrics: Arc<MetricsService>, limiter: RpcRateLimiter) -> Self {
        Self {
            metrics,
            limiter,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Vault snapshot poller starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Vault snapshot poller shutting down");
                    return;
                }
            }

            self.poll_step().await;
        }
    }

    /// Refresh every tracked address once.
    pub async fn poll_step(&self) -> SweepSummary {
        let addresses = self.metrics.tracked_addresses();
        if addresses.is_empty() {
            return SweepSummary::default();
        }

        debug!(count = addresses.len(), "Vault poller: refreshing snapshots");

        let metrics = self.metrics.clone();
        let results = self
            .limiter
            .execute_batch(addresses.clone(), move |address| {
                let metrics = metrics.clone();
                async move { metrics.refresh(&address).await }
            })
            .await;

        let mut summary = SweepSummary::default();
        for (address, result) in addresses.iter().zip(results) {
            match result {
                Some(Ok(_)) => summary.refreshed += 1,
                Some(Err(e)) => {
                    summary.failed += 1;
                    warn!(address = %address, error = %e, "Vault poller: refresh failed");
                }
                None => {
                    summary.failed += 1;
                    warn!(address = %address, "Vault poller: refresh cancelled");
                }
            }
        }

        if summary.failed > 0 {
            info!(
                refreshed = summary.refreshed,
                failed = summary.failed,
                "Vault poller: sweep finished with failures"
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::OnChainDeposit;
    use crate::clock::ManualClock;
    use crate::metrics::tests::{FakeVault, ADDRESS};
    use crate::storage::database::tests::temp_db;
    use std::sync::atomic::Ordering;

    fn setup(vault: Arc<FakeVault>) -> (VaultPoller, tempfile::TempDir) {
        let (db, dir) = temp_db();
        let metrics = MetricsService::new(
            vault,
            Arc::new(db),
            Arc::new(ManualClock::at_epoch_seconds(1_700_000_000)),
            chrono::Duration::seconds(30),
            chrono::Duration::hours(24),
        );
        (
            VaultPoller::new(Arc::new(metrics), RpcRateLimiter::default()),
            dir,
        )
    }

    #[tokio::test]
    async fn sweep_with_nothing_tracked_is_a_no_op() {
        let vault = FakeVault::down();
        let (poller, _dir) = setup(vault.clone());
        assert_eq!(poller.poll_step().await, SweepSummary::default());
        assert_eq!(vault.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sweep_refreshes_tracked_addresses() {
        let vault = FakeVault::with(OnChainDeposit {
            amount: 1,
            lock_until: 0,
            yield_earned: 0,
        });
        let (poller, _dir) = setup(vault.clone());
        poller.metrics.refresh(ADDRESS).await.unwrap();

        let summary = poller.poll_step().await;
        assert_eq!(summary.refreshed, 1);
        assert_eq!(vault.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_snapshot() {
        let vault = FakeVault::with(OnChainDeposit {
            amount: 7,
            lock_until: 0,
            yield_earned: 0,
        });
        let (poller, _dir) = setup(vault.clone());
        poller.metrics.refresh(ADDRESS).await.unwrap();
        vault.fail();

        let summary = poller.poll_step().await;
        assert_eq!(summary, SweepSummary { refreshed: 0, failed: 1 });
        assert_eq!(poller.metrics.tracked_addresses(), vec![ADDRESS.to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_cancel() {
        let (poller, _dir) = setup(FakeVault::down());
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(poller.run(shutdown.clone()));
        tokio::time::sleep(Duration::from_secs(65)).await;
        shutdown.cancel();
        handle.await.unwrap();
    }
}
