// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catalog repository for 3D object listings.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{MarketDb, StorageResult, OBJECTS};
use crate::wallets::WalletAddress;

/// Listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ObjectCategory {
    Characters,
    Vehicles,
    Architecture,
    Nature,
    Props,
    Abstract,
}

impl ObjectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Vehicles => "vehicles",
            Self::Architecture => "architecture",
            Self::Nature => "nature",
            Self::Props => "props",
            Self::Abstract => "abstract",
        }
    }
}

/// A 3D object listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Object3D {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price as a decimal string.
    pub price: String,
    pub category: ObjectCategory,
    #[schema(value_type = String)]
    pub creator_address: WalletAddress,
    pub model_url: String,
    pub thumbnail_url: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub purchases: u64,
    pub created_at: DateTime<Utc>,
}

impl Object3D {
    /// Numeric price, if the stored string parses.
    pub fn price_value(&self) -> Option<f64> {
        self.price.trim().parse::<f64>().ok().filter(|p| p.is_finite())
    }
}

/// Fields supplied when listing a new object.
#[derive(Debug, Clone)]
pub struct NewObject {
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub category: ObjectCategory,
    pub creator_address: WalletAddress,
    pub model_url: String,
    pub thumbnail_url: String,
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectSort {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Popular,
}

impl ObjectSort {
    /// Parse a query value; unknown values fall back to newest.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("price-low") => Self::PriceLow,
            Some("price-high") => Self::PriceHigh,
            Some("popular") => Self::Popular,
            _ => Self::Newest,
        }
    }
}

/// Catalog filter.
#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    /// Category name; `None` or `"all"` matches everything.
    pub category: Option<String>,
    /// Case-insensitive substring of name or description.
    pub search: Option<String>,
    pub sort: ObjectSort,
}

impl ObjectFilter {
    fn matches(&self, object: &Object3D) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some("all") | Some("") => true,
            Some(category) => object.category.as_str() == category,
        };
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                object.name.to_lowercase().contains(&needle)
                    || object
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            }
        };
        category_ok && search_ok
    }
}

/// Unparseable prices sort after every numeric price.
/// Unparseable prices sort last in both directions.
fn compare_prices(a: &Object3D, b: &Object3D, descending: bool) -> Ordering {
    match (a.price_value(), b.price_value()) {
        (Some(a), Some(b)) if descending => b.total_cmp(&a),
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Repository for catalog listings.
pub struct ObjectRepository<'a> {
    db: &'a MarketDb,
}

impl<'a> ObjectRepository<'a> {
    pub fn new(db: &'a MarketDb) -> Self {
        Self { db }
    }

    pub fn create(&self, new: NewObject) -> StorageResult<Object3D> {
        let object = Object3D {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            price: new.price,
            category: new.category,
            creator_address: new.creator_address,
            model_url: new.model_url,
            thumbnail_url: new.thumbnail_url,
            views: 0,
            purchases: 0,
            created_at: Utc::now(),
        };
        self.db.put(OBJECTS, &object.id, &object)?;
        Ok(object)
    }

    pub fn get(&self, object_id: &str) -> StorageResult<Option<Object3D>> {
        self.db.get(OBJECTS, object_id)
    }

    /// Increment the view counter and return the updated listing.
    pub fn record_view(&self, object_id: &str) -> StorageResult<Option<Object3D>> {
        Ok(self
            .db
            .update(OBJECTS, object_id, |object: &mut Object3D| object.views += 1)?
            .map(|(object, ())| object))
    }

    /// Increment the purchase counter and return the updated listing.
    pub fn record_purchase(&self, object_id: &str) -> StorageResult<Option<Object3D>> {
        Ok(self
            .db
            .update(OBJECTS, object_id, |object: &mut Object3D| object.purchases += 1)?
            .map(|(object, ())| object))
    }

    /// List listings matching `filter`, in the requested order.
    pub fn list(&self, filter: &ObjectFilter) -> StorageResult<Vec<Object3D>> {
        let mut objects: Vec<Object3D> = self
            .db
            .scan::<Object3D>(OBJECTS)?
            .into_iter()
            .filter(|o| filter.matches(o))
            .collect();

        match filter.sort {
            ObjectSort::Newest => objects.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            ObjectSort::PriceLow => objects.sort_by(|a, b| compare_prices(a, b, false)),
            ObjectSort::PriceHigh => objects.sort_by(|a, b| compare_prices(a, b, true)),
            ObjectSort::Popular => objects.sort_by(|a, b| b.views.cmp(&a.views)),
        }
        Ok(objects)
    }

    /// Listings created by `address`, newest first.
    pub fn list_by_creator(&self, address: &WalletAddress) -> StorageResult<Vec<Object3D>> {
        let mut objects: Vec<Object3D> = self
            .db
            .scan::<Object3D>(OBJECTS)?
            .into_iter()
            .filter(|o| &o.creator_address == address)
            .collect();
        objects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(objects)
    }

    pub fn count(&self) -> StorageResult<u64> {
        self.db.count(OBJECTS)
    }
}
