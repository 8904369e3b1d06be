// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a single embedded redb file under `DATA_DIR`.
//! Documents are JSON; the layout is described in [`database`].
//!
//! ## Consistency
//!
//! - Each repository operation runs in its own ACID transaction
//! - A user document and its address index are written together
//! - Nonce consumption is compare-and-delete
//! - Concurrent updates to the same user are last-writer-wins

pub mod database;
pub mod repository;

pub use database::{MarketDb, StorageError, StorageResult};
pub use repository::{
    NewObject, NewPurchase, Nonce, NonceRepository, Object3D, ObjectCategory, ObjectFilter,
    ObjectRepository, ObjectSort, Purchase, PurchaseRepository, User, UserRepository,
    DEFAULT_NONCE_TTL,
};
