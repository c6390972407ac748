// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-address vault metrics.
//!
//! The vault contract is the source of truth. Reads are cached per address;
//! a snapshot younger than the poll interval is served without RPC. Between
//! reads the yield is extended locally, one whole hour at a time, at the APY
//! snapshotted on the address's latest deposit. When the chain cannot be read
//! the last snapshot is used, then the persisted deposit records.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::blockchain::{format_amount, OnChainDeposit, VaultClientError, VaultReader, USDC_DECIMALS};
use crate::clock::Clock;
use crate::storage::{Cached, DbError, DepositRepository, SnapshotCache, StablePayDb};
use crate::yield_model::{estimate_accrual, whole_hours_between, Apy, Deposit, LockStatus};

/// Default snapshot freshness in seconds, matching the chain poll interval.
pub const DEFAULT_FRESHNESS_SECS: i64 = 30;

/// Max tracked addresses in the snapshot cache.
pub const SNAPSHOT_CAPACITY: usize = 10_000;

/// Both vault reads for one address, taken together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultSnapshot {
    pub deposit: OnChainDeposit,
    pub yield_available: u128,
}

/// Where the figures in a metrics response come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetricsSource {
    /// Snapshot read within the poll interval
    Onchain,
    /// Older snapshot, the latest read failed
    Cached,
    /// No snapshot; derived from the persisted deposit
    Estimated,
}

/// Metrics for one address. Amounts are USDC smallest units as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub user_balance: String,
    /// `userBalance` with 6 decimals applied
    pub user_balance_formatted: String,
    /// `onchainYield + estimatedYield`
    pub yield_earned: String,
    /// Contract-reported yield, null when the chain was not read
    pub onchain_yield: Option<String>,
    /// Local accrual since the snapshot (or since the deposit when estimated)
    pub estimated_yield: String,
    /// `getYieldAvailable`, null when the chain was not read
    pub yield_available: Option<String>,
    pub lock_status: LockStatus,
    /// Percent, from the latest deposit's snapshot. Null when the address has
    /// no deposit recorded through this service (the vault does not report a
    /// rate); dashboards typing this as a plain number must handle null, and
    /// `estimatedYield` is then `0`.
    #[schema(example = 13.0)]
    pub apy: Option<f64>,
    #[schema(value_type = String, format = DateTime)]
    pub last_updated: DateTime<Utc>,
    pub hours_elapsed: u64,
    pub source: MetricsSource,
}

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Vault data unavailable for {address}: {reason}")]
    Unavailable { address: String, reason: String },

    #[error(transparent)]
    Storage(#[from] DbError),
}

pub struct MetricsService {
    vault: Arc<dyn VaultReader>,
    db: Arc<StablePayDb>,
    cache: SnapshotCache<VaultSnapshot>,
    clock: Arc<dyn Clock>,
    freshness: Duration,
}

impl MetricsService {
    /// - `freshness`: snapshots younger than this skip RPC.
    /// - `retention`: how long a snapshot stays usable as a fallback.
    pub fn new(
        vault: Arc<dyn VaultReader>,
        db: Arc<StablePayDb>,
        clock: Arc<dyn Clock>,
        freshness: Duration,
        retention: Duration,
    ) -> Self {
        Self {
            vault,
            db,
            cache: SnapshotCache::new(SNAPSHOT_CAPACITY, retention, clock.clone()),
            clock,
            freshness,
        }
    }

    /// Addresses with a live snapshot, for the poller.
    pub fn tracked_addresses(&self) -> Vec<String> {
        self.cache.addresses()
    }

    /// Read both vault values and replace the cached snapshot.
    pub async fn refresh(&self, address: &str) -> Result<Cached<VaultSnapshot>, VaultClientError> {
        let (deposit, yield_available) = tokio::try_join!(
            self.vault.get_user_deposit(address),
            self.vault.get_yield_available(address),
        )?;

        let value = VaultSnapshot {
            deposit,
            yield_available,
        };
        let stored_at = self.cache.put(address, value);
        debug!(address = %address, amount = %deposit.amount, "Vault snapshot refreshed");

        Ok(Cached {
            value,
            stored_at,
            age: Duration::zero(),
        })
    }

    pub async fn metrics_for(&self, address: &str) -> Result<MetricsResponse, MetricsError> {
        let deposits = DepositRepository::new(&self.db).all_for_address(address)?;

        let (snapshot, source) = match self.cache.get(address) {
            Some(cached) if cached.age < self.freshness => (Some(cached), MetricsSource::Onchain),
            stale => match self.refresh(address).await {
                Ok(fresh) => (Some(fresh), MetricsSource::Onchain),
                Err(e) => {
                    warn!(address = %address, error = %e, "Vault read failed, falling back");
                    match stale {
                        Some(cached) => (Some(cached), MetricsSource::Cached),
                        None => (None, MetricsSource::Estimated),
                    }
                }
            },
        };

        let now = self.clock.now();
        match snapshot {
            Some(snapshot) => Ok(from_snapshot(&snapshot, deposits.first(), source, now)),
            None => from_deposits(&deposits, now).ok_or_else(|| MetricsError::Unavailable {
                address: address.to_string(),
                reason: "vault read failed and no deposit is on record".to_string(),
            }),
        }
    }
}

fn from_snapshot(
    snapshot: &Cached<VaultSnapshot>,
    latest: Option<&Deposit>,
    source: MetricsSource,
    now: DateTime<Utc>,
) -> MetricsResponse {
    let onchain = snapshot.value.deposit;
    let hours = whole_hours_between(snapshot.stored_at, now);
    let apy = latest.map(|d| d.apy_snapshot);
    let principal = u64::try_from(onchain.amount).unwrap_or(u64::MAX);
    let estimated = accrue(principal, apy, hours);

    MetricsResponse {
        user_balance: onchain.amount.to_string(),
        user_balance_formatted: format_amount(onchain.amount, USDC_DECIMALS),
        yield_earned: onchain
            .yield_earned
            .saturating_add(u128::from(estimated))
            .to_string(),
        onchain_yield: Some(onchain.yield_earned.to_string()),
        estimated_yield: estimated.to_string(),
        yield_available: Some(snapshot.value.yield_available.to_string()),
        lock_status: LockStatus::evaluate(onchain.lock_until, now.timestamp_millis()),
        apy: apy.map(Apy::as_percent),
        last_updated: snapshot.stored_at,
        hours_elapsed: hours,
        source,
    }
}

/// Whole position from the deposit records (newest first): principal and
/// accrual summed per deposit at each one's own snapshot, lock status from
/// the furthest deadline, `apy` from the newest deposit.
fn from_deposits(deposits: &[Deposit], now: DateTime<Utc>) -> Option<MetricsResponse> {
    let latest = deposits.first()?;
    let earliest = deposits.iter().map(|d| d.deposited_at).min()?;
    let furthest_lock = deposits.iter().max_by_key(|d| d.lock_until)?;

    let principal: u128 = deposits.iter().map(|d| u128::from(d.principal)).sum();
    let estimated: u128 = deposits
        .iter()
        .map(|d| {
            let hours = whole_hours_between(d.deposited_at, now);
            u128::from(accrue(d.principal, Some(d.apy_snapshot), hours))
        })
        .sum();

    Some(MetricsResponse {
        user_balance: principal.to_string(),
        user_balance_formatted: format_amount(principal, USDC_DECIMALS),
        yield_earned: estimated.to_string(),
        onchain_yield: None,
        estimated_yield: estimated.to_string(),
        yield_available: None,
        lock_status: furthest_lock.lock_status(now),
        apy: Some(latest.apy_snapshot.as_percent()),
        last_updated: now,
        hours_elapsed: whole_hours_between(earliest, now),
        source: MetricsSource::Estimated,
    })
}

/// Whole-hour accrual; no rate means nothing to extend.
fn accrue(principal: u64, apy: Option<Apy>, hours: u64) -> u64 {
    apy.map_or(0, |apy| estimate_accrual(principal, apy, hours as f64))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::database::tests::temp_db;
    use crate::yield_model::LockPeriod;
    use crate::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    pub(crate) const ADDRESS: &str = "0x00000000000000000000000000000000000000aa";

    /// Vault double: a settable position, or `None` to simulate an RPC outage.
    #[derive(Default)]
    pub(crate) struct FakeVault {
        pub(crate) position: Mutex<Option<OnChainDeposit>>,
        pub(crate) yield_available: u128,
        pub(crate) reads: AtomicUsize,
    }

    impl FakeVault {
        pub(crate) fn with(position: OnChainDeposit) -> Arc<Self> {
            Arc::new(Self {
                position: Mutex::new(Some(position)),
                yield_available: 1_000,
                reads: AtomicUsize::new(0),
            })
        }

        pub(crate) fn down() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub(crate) fn fail(&self) {
            *self.position.lock().unwrap() = None;
        }
    }

    impl VaultReader for FakeVault {
        fn get_user_deposit<'a>(
            &'a self,
            _address: &'a str,
        ) -> BoxFuture<'a, Result<OnChainDeposit, VaultClientError>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let position = *self.position.lock().unwrap();
            Box::pin(async move {
                position.ok_or_else(|| VaultClientError::RpcError("connection refused".into()))
            })
        }

        fn get_yield_available<'a>(
            &'a self,
            _address: &'a str,
        ) -> BoxFuture<'a, Result<u128, VaultClientError>> {
            let available = self.position.lock().unwrap().map(|_| self.yield_available);
            Box::pin(async move {
                available.ok_or_else(|| VaultClientError::RpcError("connection refused".into()))
            })
        }
    }

    struct Harness {
        service: MetricsService,
        vault: Arc<FakeVault>,
        clock: ManualClock,
        db: Arc<StablePayDb>,
        _dir: tempfile::TempDir,
    }

    fn harness(vault: Arc<FakeVault>) -> Harness {
        let (db, dir) = temp_db();
        let db = Arc::new(db);
        let clock = ManualClock::at_epoch_seconds(1_700_000_000);
        let service = MetricsService::new(
            vault.clone(),
            db.clone(),
            Arc::new(clock.clone()),
            Duration::seconds(DEFAULT_FRESHNESS_SECS),
            Duration::days(7),
        );
        Harness {
            service,
            vault,
            clock,
            db,
            _dir: dir,
        }
    }

    fn position(amount: u128, lock_until: u64) -> OnChainDeposit {
        OnChainDeposit {
            amount,
            lock_until,
            yield_earned: 500,
        }
    }

    fn record_deposit(h: &Harness, principal: u64, months: f64) -> Deposit {
        let deposit = Deposit::new(
            ADDRESS,
            principal,
            LockPeriod::from_months(months).unwrap(),
            h.clock.now() - Duration::days(1),
            None,
        );
        DepositRepository::new(&h.db).create(&deposit).unwrap();
        deposit
    }

    #[tokio::test]
    async fn fresh_read_is_onchain() {
        let h = harness(FakeVault::with(position(50_000_000_000, 1_700_086_400)));
        record_deposit(&h, 50_000_000_000, 11.0);

        let m = h.service.metrics_for(ADDRESS).await.unwrap();
        assert_eq!(m.source, MetricsSource::Onchain);
        assert_eq!(m.user_balance, "50000000000");
        assert_eq!(m.user_balance_formatted, "50000");
        assert_eq!(m.onchain_yield.as_deref(), Some("500"));
        assert_eq!(m.estimated_yield, "0");
        assert_eq!(m.yield_earned, "500");
        assert_eq!(m.yield_available.as_deref(), Some("1000"));
        assert_eq!(m.apy, Some(13.0));
        assert_eq!(m.hours_elapsed, 0);
        assert!(m.lock_status.is_locked);
        assert_eq!(m.lock_status.days_remaining, 1);
    }

    #[tokio::test]
    async fn snapshot_within_freshness_skips_rpc() {
        let h = harness(FakeVault::with(position(10, 0)));

        h.service.metrics_for(ADDRESS).await.unwrap();
        h.clock.advance(Duration::seconds(29));
        h.service.metrics_for(ADDRESS).await.unwrap();
        assert_eq!(h.vault.reads.load(Ordering::SeqCst), 1);

        h.clock.advance(Duration::seconds(1));
        h.service.metrics_for(ADDRESS).await.unwrap();
        assert_eq!(h.vault.reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_serves_stale_snapshot_with_estimate() {
        let h = harness(FakeVault::with(position(50_000_000_000, 0)));
        record_deposit(&h, 50_000_000_000, 11.0);

        h.service.metrics_for(ADDRESS).await.unwrap();
        h.vault.fail();
        h.clock.advance(Duration::hours(24) + Duration::minutes(59));

        let m = h.service.metrics_for(ADDRESS).await.unwrap();
        assert_eq!(m.source, MetricsSource::Cached);
        assert_eq!(m.hours_elapsed, 24);
        assert_eq!(m.estimated_yield, "17808219");
        assert_eq!(m.yield_earned, (500 + 17_808_219u64).to_string());
        assert!(!m.lock_status.is_locked);
        assert_eq!(m.lock_status.unlock_date, None);
    }

    #[tokio::test]
    async fn chain_down_without_snapshot_estimates_from_deposit() {
        let h = harness(FakeVault::down());
        let deposit = record_deposit(&h, 50_000_000_000, 11.0);

        let m = h.service.metrics_for(ADDRESS).await.unwrap();
        assert_eq!(m.source, MetricsSource::Estimated);
        assert_eq!(m.user_balance, "50000000000");
        assert_eq!(m.hours_elapsed, 24);
        assert_eq!(m.estimated_yield, "17808219");
        assert_eq!(m.yield_earned, "17808219");
        assert_eq!(m.onchain_yield, None);
        assert_eq!(m.yield_available, None);
        assert_eq!(m.lock_status, deposit.lock_status(h.clock.now()));
        assert!(m.lock_status.is_locked);
    }

    #[tokio::test]
    async fn estimate_covers_every_recorded_deposit() {
        let h = harness(FakeVault::down());
        let long_lock = record_deposit(&h, 50_000_000_000, 11.0);
        let short_lock = Deposit::new(
            ADDRESS,
            50_000_000_000,
            LockPeriod::from_months(0.5).unwrap(),
            h.clock.now() - Duration::days(2),
            None,
        );
        DepositRepository::new(&h.db).create(&short_lock).unwrap();

        let m = h.service.metrics_for(ADDRESS).await.unwrap();
        assert_eq!(m.source, MetricsSource::Estimated);
        assert_eq!(m.user_balance, "100000000000");
        assert_eq!(m.user_balance_formatted, "100000");
        // 13% over 24h plus 7% over 48h, each floored
        assert_eq!(m.estimated_yield, (17_808_219u64 + 19_178_082).to_string());
        assert_eq!(m.hours_elapsed, 48);
        assert_eq!(m.apy, Some(13.0));
        assert_eq!(m.lock_status, long_lock.lock_status(h.clock.now()));
        assert_eq!(m.lock_status.days_remaining, 329);
    }

    #[tokio::test]
    async fn nothing_available_is_an_error() {
        let h = harness(FakeVault::down());
        let err = h.service.metrics_for(ADDRESS).await.unwrap_err();
        assert!(matches!(err, MetricsError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn no_deposit_record_means_no_estimate() {
        let h = harness(FakeVault::with(position(1_000_000, 0)));
        h.service.metrics_for(ADDRESS).await.unwrap();
        h.vault.fail();
        h.clock.advance(Duration::hours(5));

        let m = h.service.metrics_for(ADDRESS).await.unwrap();
        assert_eq!(m.apy, None);
        assert_eq!(m.estimated_yield, "0");
        assert_eq!(m.hours_elapsed, 5);
    }

    #[tokio::test]
    async fn tracked_addresses_follow_reads() {
        let h = harness(FakeVault::with(position(1, 0)));
        assert!(h.service.tracked_addresses().is_empty());
        h.service.refresh(&ADDRESS.to_uppercase().replace("0X", "0x")).await.unwrap();
        assert_eq!(h.service.tracked_addresses(), vec![ADDRESS.to_string()]);
    }
}
