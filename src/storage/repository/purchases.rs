// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Purchase records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{MarketDb, StorageResult, PURCHASES};
use crate::wallets::WalletAddress;

/// A completed purchase of a listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub object_id: String,
    #[schema(value_type = String)]
    pub buyer_address: WalletAddress,
    #[schema(value_type = String)]
    pub seller_address: WalletAddress,
    /// Price paid, copied from the listing at purchase time.
    pub price: String,
    /// On-chain transaction hash supplied by the client.
    pub tx_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when recording a purchase.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub object_id: String,
    pub buyer_address: WalletAddress,
    pub seller_address: WalletAddress,
    pub price: String,
    pub tx_hash: String,
}

pub struct PurchaseRepository<'a> {
    db: &'a MarketDb,
}

impl<'a> PurchaseRepository<'a> {
    pub fn new(db: &'a MarketDb) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewPurchase) -> StorageResult<Purchase> {
        let purchase = Purchase {
            id: uuid::Uuid::new_v4().to_string(),
            object_id: new.object_id,
            buyer_address: new.buyer_address,
            seller_address: new.seller_address,
            price: new.price,
            tx_hash: new.tx_hash,
            created_at: Utc::now(),
        };
        self.db.put(PURCHASES, &purchase.id, &purchase)?;
        Ok(purchase)
    }

    /// Purchases made by `buyer`, newest first.
    pub fn list_by_buyer(&self, buyer: &WalletAddress) -> StorageResult<Vec<Purchase>> {
        let mut purchases: Vec<Purchase> = self
            .list_all()?
            .into_iter()
            .filter(|p| &p.buyer_address == buyer)
            .collect();
        purchases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(purchases)
    }

    pub fn list_all(&self) -> StorageResult<Vec<Purchase>> {
        self.db.scan(PURCHASES)
    }

    pub fn count(&self) -> StorageResult<u64> {
        self.db.count(PURCHASES)
    }

    /// Sum of every purchase price. Unparseable prices count as zero.
    pub fn total_volume(&self) -> StorageResult<f64> {
        Ok(self
            .list_all()?
            .iter()
            .filter_map(|p| p.price.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
            .sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::tests::temp_db;

    fn addr(byte: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{}", format!("{byte:02x}").repeat(20))).unwrap()
    }

    fn purchase(object_id: &str, buyer: u8, price: &str) -> NewPurchase {
        NewPurchase {
            object_id: object_id.to_string(),
            buyer_address: addr(buyer),
            seller_address: addr(0xee),
            price: price.to_string(),
            tx_hash: "0xfeed".to_string(),
        }
    }

    #[test]
    fn list_by_buyer_filters_records() {
        let (db, _dir) = temp_db();
        let repo = PurchaseRepository::new(&db);
        repo.create(purchase("o1", 1, "2")).unwrap();
        repo.create(purchase("o2", 1, "3")).unwrap();
        repo.create(purchase("o3", 2, "4")).unwrap();

        assert_eq!(repo.list_by_buyer(&addr(1)).unwrap().len(), 2);
        assert_eq!(repo.list_by_buyer(&addr(2)).unwrap().len(), 1);
        assert!(repo.list_by_buyer(&addr(3)).unwrap().is_empty());
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn total_volume_skips_bad_prices() {
        let (db, _dir) = temp_db();
        let repo = PurchaseRepository::new(&db);
        repo.create(purchase("o1", 1, "1.5")).unwrap();
        repo.create(purchase("o2", 1, "2.5")).unwrap();
        repo.create(purchase("o3", 1, "n/a")).unwrap();

        assert!((repo.total_volume().unwrap() - 4.0).abs() < f64::EPSILON);
    }
}
