// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session marker returned after a successful wallet verification.
//!
//! The marker is `<address>_<unix millis>`. It is NOT a credential: nothing
//! signs it and no endpoint accepts it. Clients treat it as an opaque
//! "connected at" stamp.

use chrono::{DateTime, Utc};

use crate::wallets::WalletAddress;

pub fn session_marker(address: &WalletAddress, at: DateTime<Utc>) -> String {
    format!("{}_{}", address, at.timestamp_millis())
}
