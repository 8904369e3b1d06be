// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{ApiError, ApiJson},
    models::{CreatePurchaseRequest, PurchaseWithObject},
    state::AppState,
    storage::{NewPurchase, Purchase},
    wallets::WalletAddress,
};

fn parse_address(raw: &str) -> Result<WalletAddress, ApiError> {
    WalletAddress::parse(raw).map_err(|e| ApiError::bad_request(format!("Invalid address: {}", e.0)))
}

#[utoipa::path(
    post,
    path = "/api/purchases",
    request_body = CreatePurchaseRequest,
    tag = "Purchases",
    responses(
        (status = 201, body = Purchase),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Object not found")
    )
)]
pub async fn create_purchase(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePurchaseRequest>,
) -> Result<(StatusCode, Json<Purchase>), ApiError> {
    let object_id = request
        .object_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Object ID is required"))?;
    let buyer_address = parse_address(
        request
            .buyer_address
            .as_deref()
            .ok_or_else(|| ApiError::bad_request("Buyer address is required"))?,
    )?;

    let objects = state.objects();
    let object = objects
        .get(object_id.trim())?
        .ok_or_else(|| ApiError::not_found("Object not found"))?;

    let purchase = state.purchases().create(NewPurchase {
        object_id: object.id.clone(),
        buyer_address,
        seller_address: object.creator_address.clone(),
        price: object.price.clone(),
        tx_hash: request.tx_hash.unwrap_or_default(),
    })?;

    if objects.record_purchase(&object.id)?.is_none() {
        tracing::warn!(object_id = %object.id, "Object removed before its purchase count was updated");
    }

    tracing::info!(
        purchase_id = %purchase.id,
        object_id = %purchase.object_id,
        buyer = %purchase.buyer_address,
        "Recorded purchase"
    );
    Ok((StatusCode::CREATED, Json(purchase)))
}

#[utoipa::path(
    get,
    path = "/api/purchases/{address}",
    params(
        ("address" = String, Path, description = "Buyer wallet address")
    ),
    tag = "Purchases",
    responses((status = 200, body = [PurchaseWithObject]))
)]
pub async fn list_user_purchases(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<PurchaseWithObject>>, ApiError> {
    let buyer = parse_address(&address)?;
    let objects = state.objects();

    let purchases = state
        .purchases()
        .list_by_buyer(&buyer)?
        .into_iter()
        .map(|purchase| -> Result<PurchaseWithObject, ApiError> {
            let object = objects.get(&purchase.object_id)?;
            Ok(PurchaseWithObject { purchase, object })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(purchases))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use crate::storage::{NewObject, Object3D, ObjectCategory};

    const SELLER: &str = "0x5555555555555555555555555555555555555555";
    const BUYER: &str = "0x6666666666666666666666666666666666666666";

    fn seed_object(state: &AppState) -> Object3D {
        state
            .objects()
            .create(NewObject {
                name: "Lamp".into(),
                description: None,
                price: "2.25".into(),
                category: ObjectCategory::Props,
                creator_address: WalletAddress::parse(SELLER).unwrap(),
                model_url: "/m.glb".into(),
                thumbnail_url: "/t.png".into(),
            })
            .unwrap()
    }

    fn purchase_request(object_id: &str) -> CreatePurchaseRequest {
        CreatePurchaseRequest {
            object_id: Some(object_id.into()),
            buyer_address: Some(BUYER.into()),
            tx_hash: Some("0xabc".into()),
        }
    }

    #[tokio::test]
    async fn purchase_copies_listing_terms_and_counts() {
        let (state, _dir) = test_state(None);
        let object = seed_object(&state);

        let (status, Json(purchase)) =
            create_purchase(State(state.clone()), ApiJson(purchase_request(&object.id)))
                .await
                .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(purchase.price, "2.25");
        assert_eq!(purchase.seller_address.as_str(), SELLER);

        let stored = state.objects().get(&object.id).unwrap().unwrap();
        assert_eq!(stored.purchases, 1);
    }

    #[tokio::test]
    async fn purchase_of_unknown_object_is_404() {
        let (state, _dir) = test_state(None);
        let err = create_purchase(State(state), ApiJson(purchase_request("missing")))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_embeds_objects() {
        let (state, _dir) = test_state(None);
        let object = seed_object(&state);
        create_purchase(State(state.clone()), ApiJson(purchase_request(&object.id)))
            .await
            .unwrap();

        let Json(purchases) = list_user_purchases(State(state), Path(BUYER.into()))
            .await
            .unwrap();
        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases[0].object.as_ref().unwrap().id, object.id);

        let body = serde_json::to_value(&purchases[0]).unwrap();
        assert_eq!(body["objectId"], object.id.as_str());
        assert_eq!(body["object"]["name"], "Lamp");
    }
}
