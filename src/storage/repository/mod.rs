// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository borrows the [`MarketDb`](super::MarketDb) and provides
//! operations for a single entity type.

pub mod nonces;
pub mod objects;
pub mod purchases;
pub mod users;

pub use nonces::{Nonce, NonceRepository, DEFAULT_NONCE_TTL};
pub use objects::{NewObject, Object3D, ObjectCategory, ObjectFilter, ObjectRepository, ObjectSort};
pub use purchases::{NewPurchase, Purchase, PurchaseRepository};
pub use users::{User, UserRepository};
