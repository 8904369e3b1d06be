// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Challenge text that wallets sign to prove address ownership.

use uuid::Uuid;

const CHALLENGE_PREFIX: &str = "Sign this message to authenticate with Dimension Market.\n\nNonce: ";

/// Fresh challenge embedding a random v4 UUID.
pub fn challenge_message() -> String {
    format!("{CHALLENGE_PREFIX}{}", Uuid::new_v4())
}
