// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Authentication Module
//!
//! Proves wallet ownership with signed one-time challenges and links proven
//! wallets to a user profile.
//!
//! ## Auth Flow
//!
//! 1. Client registers a display name and receives a `userId`
//! 2. Client reports wallet extensions it detected (optional)
//! 3. Client requests a nonce for an address and signs it with the wallet
//! 4. Server:
//!    - Loads the user and the pending nonce
//!    - Recovers the signer (EIP-191) and compares it to the claimed address
//!    - Consumes the nonce
//!    - Looks up the address net worth (failures are absorbed)
//!    - Reconciles the wallet into the user's list and saves it
//!
//! ## Security
//!
//! - Nonces are single-use and expire after the configured TTL
//! - A failed signature check does not consume the nonce
//! - The returned token is a plain marker, not a credential

pub mod challenge;
pub mod error;
pub mod flow;
pub mod signature;
pub mod token;

pub use challenge::challenge_message;
pub use error::AuthFlowError;
pub use flow::{
    issue_nonce, register_detected_wallets, save_fullname, verify_and_connect, VerifiedWallet,
};
pub use signature::{recover_signer, verify_signature, SignatureError};
pub use token::session_marker;
