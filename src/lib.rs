// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Dimension Market - 3D Asset Marketplace Backend
//!
//! This crate provides the marketplace API: users register a display name,
//! link wallets by signing one-time challenges, list 3D objects and record
//! purchases.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Wallet authentication flow (nonces, EIP-191 signatures)
//! - `wallets` - Wallet addresses and wallet-list reconciliation
//! - `oracle` - Net-worth lookups (Moralis)
//! - `storage` - Embedded document store (redb)
//! - `nonce_sweeper` - Background removal of expired challenges

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod nonce_sweeper;
pub mod oracle;
pub mod state;
pub mod storage;
pub mod wallets;
