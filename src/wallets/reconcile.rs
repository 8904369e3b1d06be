// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet list reconciliation.
//!
//! Two independent operations mutate a user's wallet list:
//!
//! - [`reconcile`] merges a wallet whose ownership was just proven by
//!   signature. Decision order:
//!   1. an entry with the same address is refreshed (balance, name);
//!   2. otherwise a detected entry with the same name is upgraded in place;
//!   3. otherwise a new entry is appended, unless some entry already bears
//!      the name, in which case only a connected holder's balance is
//!      refreshed;
//!   4. finally later entries repeating an earlier address are dropped.
//!
//!   Steps 2 and 3 match on the claimed name only; a wallet connected
//!   without a name is appended as `unknown`.
//! - [`register_detected`] adds address-less placeholders for provider
//!   names observed client-side, after collapsing duplicate placeholders.
//!
//! Both are pure; callers persist the returned list as a whole.

use std::collections::HashSet;

use super::{Wallet, WalletAddress, DEFAULT_BALANCE, UNKNOWN_WALLET_NAME};

/// A wallet whose ownership has been proven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedWallet {
    pub address: WalletAddress,
    /// Provider name claimed by the client, if any.
    pub name: Option<String>,
    /// Balance to record; `None` leaves existing balances untouched.
    pub balance: Option<String>,
}

/// Which branch of the decision procedure applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// An entry with the same address was refreshed.
    Refreshed { renamed: bool },
    /// A detected entry with the same name received the address.
    UpgradedDetected,
    /// A new connected entry was appended.
    Appended,
    /// The name already belongs to another entry; nothing was added.
    NameCollision { balance_refreshed: bool },
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub wallets: Vec<Wallet>,
    pub outcome: ReconcileOutcome,
    /// Entries removed by the address dedup sweep.
    pub duplicates_removed: usize,
}

impl Reconciliation {
    /// The entry now representing the connected wallet.
    ///
    /// After a name collision the proven address is not in the list, so the
    /// colliding entry is returned instead.
    pub fn connected_entry(&self, incoming: &ConnectedWallet) -> Option<&Wallet> {
        self.wallets
            .iter()
            .find(|w| w.address.as_ref() == Some(&incoming.address))
            .or_else(|| {
                let name = incoming.name.as_deref()?;
                self.wallets.iter().find(|w| w.name == name)
            })
    }
}

/// Merge a proven wallet into `wallets`.
pub fn reconcile(mut wallets: Vec<Wallet>, incoming: &ConnectedWallet) -> Reconciliation {
    let outcome = apply(&mut wallets, incoming);
    let before = wallets.len();
    let wallets = dedup_addresses(wallets);
    let duplicates_removed = before - wallets.len();

    Reconciliation {
        wallets,
        outcome,
        duplicates_removed,
    }
}

fn apply(wallets: &mut Vec<Wallet>, incoming: &ConnectedWallet) -> ReconcileOutcome {
    if let Some(existing) = wallets
        .iter_mut()
        .find(|w| w.address.as_ref() == Some(&incoming.address))
    {
        if let Some(balance) = &incoming.balance {
            existing.balance = balance.clone();
        }
        let mut renamed = false;
        if let Some(claimed) = &incoming.name {
            if existing.name != *claimed {
                existing.name = claimed.clone();
                renamed = true;
            }
        }
        return ReconcileOutcome::Refreshed { renamed };
    }

    let Some(name) = incoming.name.as_deref() else {
        wallets.push(Wallet::connected(
            UNKNOWN_WALLET_NAME,
            incoming.address.clone(),
            incoming.balance.clone(),
        ));
        return ReconcileOutcome::Appended;
    };

    if let Some(detected) = wallets
        .iter_mut()
        .find(|w| w.is_detected() && w.name == name)
    {
        detected.address = Some(incoming.address.clone());
        detected.balance = incoming
            .balance
            .clone()
            .unwrap_or_else(|| DEFAULT_BALANCE.to_string());
        return ReconcileOutcome::UpgradedDetected;
    }

    match wallets.iter_mut().find(|w| w.name == name) {
        None => {
            wallets.push(Wallet::connected(
                name,
                incoming.address.clone(),
                incoming.balance.clone(),
            ));
            ReconcileOutcome::Appended
        }
        Some(holder) => {
            tracing::warn!(
                wallet_name = %name,
                address = %incoming.address,
                holder_address = ?holder.address,
                "Wallet name already held by another entry; not adding"
            );
            let balance_refreshed = match (&holder.address, &incoming.balance) {
                (Some(_), Some(balance)) => {
                    holder.balance = balance.clone();
                    true
                }
                _ => false,
            };
            ReconcileOutcome::NameCollision { balance_refreshed }
        }
    }
}

/// Keep the first entry for each address; detected entries are always kept.
fn dedup_addresses(wallets: Vec<Wallet>) -> Vec<Wallet> {
    let mut seen = HashSet::new();
    wallets
        .into_iter()
        .filter(|w| match &w.address {
            Some(address) => seen.insert(address.clone()),
            None => true,
        })
        .collect()
}

/// Keep the first detected entry for each name; connected entries are always kept.
fn dedup_detected(wallets: Vec<Wallet>) -> Vec<Wallet> {
    let mut seen = HashSet::new();
    wallets
        .into_iter()
        .filter(|w| w.is_connected() || seen.insert(w.name.clone()))
        .collect()
}

/// Add a detected placeholder for each observed provider name not already
/// present under any form. Blank names are ignored.
pub fn register_detected<S: AsRef<str>>(wallets: Vec<Wallet>, names: &[S]) -> Vec<Wallet> {
    let mut wallets = dedup_detected(wallets);

    for name in names {
        let name = name.as_ref().trim();
        if name.is_empty() {
            continue;
        }
        if !wallets.iter().any(|w| w.name == name) {
            wallets.push(Wallet::detected(name));
        }
    }

    wallets
}
