// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::UnsignedTransaction,
    kyc::{KycAssessment, KycStatus, StepInput, StepOutcome, VerificationLevel, VerificationStep},
    metrics::{MetricsResponse, MetricsSource},
    models::{
        CreateDepositRequest, CreateWithdrawalRequest, DepositView, KycVerifyRequest,
        ListDepositsResponse, ListWithdrawalsResponse, LockPeriodOption, LockPeriodsResponse,
        PrepareClaimRequest, PrepareDepositRequest, PrepareDepositResponse, WalletAddress,
        WithdrawalResponse, YieldEstimateRequest, YieldEstimateResponse,
    },
    state::AppState,
    storage::{StoredKycRecord, StoredWithdrawalRequest, WithdrawalStatus},
    yield_model::{Deposit, LockStatus},
};

pub mod deposits;
pub mod health;
pub mod kyc;
pub mod lock_periods;
pub mod metrics;
pub mod vault;
pub mod withdrawals;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/lock-periods", get(lock_periods::list_lock_periods))
        .route("/apy", get(lock_periods::get_apy))
        .route("/yield/estimate", post(lock_periods::estimate_yield))
        .route("/metrics/{address}", get(metrics::get_metrics))
        .route("/deposits", post(deposits::create_deposit))
        .route("/deposits/{address}", get(deposits::list_deposits))
        .route("/vault/prepare-deposit", post(vault::prepare_deposit))
        .route("/vault/prepare-claim", post(vault::prepare_claim))
        .route("/withdrawals", post(withdrawals::create_withdrawal))
        .route("/withdrawals/{address}", get(withdrawals::list_withdrawals))
        .route("/kyc/verify", post(kyc::verify_kyc))
        .route("/kyc/{user_id}", get(kyc::get_kyc));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/api/stablepay", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        lock_periods::list_lock_periods,
        lock_periods::get_apy,
        lock_periods::estimate_yield,
        metrics::get_metrics,
        deposits::create_deposit,
        deposits::list_deposits,
        vault::prepare_deposit,
        vault::prepare_claim,
        withdrawals::create_withdrawal,
        withdrawals::list_withdrawals,
        kyc::verify_kyc,
        kyc::get_kyc
    ),
    components(
        schemas(
            WalletAddress,
            LockPeriodOption,
            LockPeriodsResponse,
            YieldEstimateRequest,
            YieldEstimateResponse,
            LockStatus,
            MetricsResponse,
            MetricsSource,
            Deposit,
            CreateDepositRequest,
            DepositView,
            ListDepositsResponse,
            UnsignedTransaction,
            PrepareDepositRequest,
            PrepareDepositResponse,
            PrepareClaimRequest,
            CreateWithdrawalRequest,
            StoredWithdrawalRequest,
            WithdrawalStatus,
            WithdrawalResponse,
            ListWithdrawalsResponse,
            KycVerifyRequest,
            StepInput,
            VerificationStep,
            VerificationLevel,
            KycStatus,
            StepOutcome,
            KycAssessment,
            StoredKycRecord,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Yield", description = "Lock-period APY table and yield estimates"),
        (name = "Metrics", description = "Vault position and yield per address"),
        (name = "Deposits", description = "Deposit records with snapshotted APY"),
        (name = "Vault", description = "Unsigned vault calls"),
        (name = "Withdrawals", description = "Withdrawal requests"),
        (name = "KYC", description = "Multi-provider identity verification")
    )
)]
struct ApiDoc;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::blockchain::{OnChainDeposit, BASE_SEPOLIA};
    use crate::clock::ManualClock;
    use crate::kyc::service::tests::{service, Behavior, FakeProvider};
    use crate::metrics::{tests::FakeVault, MetricsService, DEFAULT_FRESHNESS_SECS};
    use crate::state::{AppState, VaultSettings};
    use crate::storage::database::tests::temp_db;

    pub(crate) const USER: &str = "0x742d35cc6634c0532925a3b844bc9e7595f4ab12";

    const NOW: i64 = 1_700_000_000;

    /// Application state over a temp database, a fake vault and fake KYC vendors.
    pub(crate) struct TestApp {
        pub(crate) state: AppState,
        pub(crate) vault: Arc<FakeVault>,
        pub(crate) clock: ManualClock,
        _dir: tempfile::TempDir,
    }

    impl TestApp {
        /// Vault holds 50,000 USDC for [`USER`], unlocked.
        pub(crate) fn new() -> Self {
            Self::with_lock_until(0)
        }

        /// Same position, locked for one more day.
        pub(crate) fn locked() -> Self {
            Self::with_lock_until(NOW as u64 + 86_400)
        }

        fn with_lock_until(lock_until: u64) -> Self {
            let (db, dir) = temp_db();
            let db = Arc::new(db);
            let clock = ManualClock::at_epoch_seconds(NOW);
            let vault = FakeVault::with(OnChainDeposit {
                amount: 50_000_000_000,
                lock_until,
                yield_earned: 500,
            });
            let metrics = MetricsService::new(
                vault.clone(),
                db.clone(),
                Arc::new(clock.clone()),
                chrono::Duration::seconds(DEFAULT_FRESHNESS_SECS),
                chrono::Duration::hours(24),
            );
            let kyc = service(&[
                FakeProvider::new("cashfree", Behavior::Verify),
                FakeProvider::new("surepass", Behavior::Verify),
            ]);
            let state = AppState::new(
                db,
                Arc::new(metrics),
                kyc,
                VaultSettings {
                    network: BASE_SEPOLIA,
                    vault_address: "0x2222222222222222222222222222222222222222".into(),
                    usdc_address: BASE_SEPOLIA.usdc_address.into(),
                },
                Arc::new(clock.clone()),
            );
            Self {
                state,
                vault,
                clock,
                _dir: dir,
            }
        }
    }
}
