// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Nonce Sweeper
//!
//! Background task that deletes expired challenges. Lookups already ignore
//! expired records; the sweep only reclaims their storage.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::storage::{MarketDb, NonceRepository};

pub struct NonceSweeper {
    db: Arc<MarketDb>,
    ttl: Duration,
    interval: Duration,
}

impl NonceSweeper {
    pub fn new(db: Arc<MarketDb>, ttl: Duration, interval: Duration) -> Self {
        Self { db, ttl, interval }
    }

    /// Run the sweep loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            ttl_secs = self.ttl.as_secs(),
            "Nonce sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Nonce sweeper shutting down");
                return;
            }

            self.sweep_step();

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Nonce sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Delete every expired nonce once. Returns how many were removed.
    fn sweep_step(&self) -> usize {
        match NonceRepository::new(&self.db, self.ttl).purge_expired(Utc::now()) {
            Ok(0) => 0,
            Ok(removed) => {
                debug!(removed, "Nonce sweeper: purged expired nonces");
                removed
            }
            Err(e) => {
                warn!(error = %e, "Nonce sweeper: purge failed");
                0
            }
        }
    }
}
