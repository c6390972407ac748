// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! StablePay - USDC Yield Vault Service
//!
//! Backend for the StablePay dashboard. Users lock USDC in a vault contract
//! on Base for a chosen period; the APY grows with the lock length.
//!
//! ## Modules
//!
//! - `yield_model` - Lock-period table, APY lookup, accrual and lock status
//! - `blockchain` - Base vault reads, RPC rate limiting, unsigned calldata
//! - `metrics` - Per-address vault metrics with cached and estimated fallbacks
//! - `vault_poller` - Background snapshot refresh
//! - `kyc` - Cashfree / SurePass verification with confidence scoring
//! - `storage` - Embedded redb database and the snapshot cache
//! - `api` - HTTP API handlers (Axum)

use std::future::Future;
use std::pin::Pin;

pub mod api;
pub mod blockchain;
pub mod clock;
pub mod config;
pub mod error;
pub mod kyc;
pub mod metrics;
pub mod models;
pub mod state;
pub mod storage;
pub mod vault_poller;
pub mod yield_model;

/// Boxed future used at the object-safe trait seams (vault reader, KYC vendors).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
