// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stablepay_server::{
    api::router,
    blockchain::{RpcRateLimiter, VaultClient},
    clock::{Clock, SystemClock},
    config::{AppConfig, LogFormat},
    kyc::{providers_from_env, KycService},
    metrics::MetricsService,
    state::{AppState, VaultSettings},
    storage::{StablePayDb, DATABASE_FILE},
    vault_poller::VaultPoller,
};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "StablePay server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = config.data_dir.join(DATABASE_FILE);
    let db = Arc::new(StablePayDb::open(&db_path)?);
    info!(path = %db_path.display(), "Database opened");

    let limiter = RpcRateLimiter::new(config.rpc_max_requests_per_second)
        .with_batching(config.rpc_batch_size, config.rpc_batch_delay);
    let vault = VaultClient::new(
        config.network.clone(),
        &config.rpc_url,
        &config.vault_address,
        limiter.clone(),
    )?;
    info!(
        network = config.network.name,
        chain_id = config.network.chain_id,
        vault = %config.vault_address,
        "Vault client ready"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = Arc::new(MetricsService::new(
        Arc::new(vault),
        db.clone(),
        clock.clone(),
        to_chrono(config.chain_poll_interval),
        to_chrono(config.snapshot_retention),
    ));

    let kyc = KycService::new(providers_from_env(&config.kyc_primary_provider));

    let state = AppState::new(
        db,
        metrics.clone(),
        kyc,
        VaultSettings {
            network: config.network.clone(),
            vault_address: config.vault_address.clone(),
            usdc_address: config.usdc_address.clone(),
        },
        clock,
    );

    let shutdown = CancellationToken::new();
    let poller = VaultPoller::new(metrics, limiter).with_interval(config.chain_poll_interval);
    let poller_handle = tokio::spawn(poller.run(shutdown.clone()));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "StablePay server listening (docs at /docs)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Err(e) = poller_handle.await {
        error!(error = %e, "Vault poller task failed");
    }
    info!("StablePay server stopped");
    Ok(())
}
