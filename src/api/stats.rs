// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{error::ApiError, models::StatsResponse, state::AppState};

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Stats",
    responses((status = 200, body = StatsResponse))
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let purchases = state.purchases();
    Ok(Json(StatsResponse {
        total_objects: state.objects().count()?,
        total_users: state.users().count()?,
        total_sales: purchases.count()?,
        total_volume: purchases.total_volume()?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use crate::storage::NewPurchase;
    use crate::wallets::WalletAddress;

    #[tokio::test]
    async fn stats_count_every_collection() {
        let (state, _dir) = test_state(None);
        state.users().create("Ada").unwrap();
        let address = WalletAddress::parse("0x7777777777777777777777777777777777777777").unwrap();
        for price in ["1.5", "2"] {
            state
                .purchases()
                .create(NewPurchase {
                    object_id: "o1".into(),
                    buyer_address: address.clone(),
                    seller_address: address.clone(),
                    price: price.into(),
                    tx_hash: String::new(),
                })
                .unwrap();
        }

        let Json(stats) = get_stats(State(state)).await.unwrap();
        assert_eq!(
            stats,
            StatsResponse {
                total_objects: 0,
                total_users: 1,
                total_sales: 2,
                total_volume: 3.5,
            }
        );

        let body = serde_json::to_value(&stats).unwrap();
        assert_eq!(body["totalSales"], 2);
    }
}
