// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{ApiError, ApiJson},
    models::{scalar_text, CreateObjectRequest, CreatorSummary, ObjectDetail, ObjectListQuery},
    state::AppState,
    storage::{NewObject, Object3D, ObjectCategory, ObjectFilter, ObjectSort},
    wallets::WalletAddress,
};

fn required_text(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

fn parse_category(raw: &str) -> Result<ObjectCategory, ApiError> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase()))
        .map_err(|_| ApiError::bad_request(format!("Unknown category: {raw}")))
}

#[utoipa::path(
    get,
    path = "/api/objects",
    params(ObjectListQuery),
    tag = "Objects",
    responses((status = 200, body = [Object3D]))
)]
pub async fn list_objects(
    State(state): State<AppState>,
    Query(query): Query<ObjectListQuery>,
) -> Result<Json<Vec<Object3D>>, ApiError> {
    let filter = ObjectFilter {
        sort: ObjectSort::from_query(query.sort.as_deref()),
        category: query.category,
        search: query.search,
    };
    Ok(Json(state.objects().list(&filter)?))
}

#[utoipa::path(
    get,
    path = "/api/objects/{id}",
    params(
        ("id" = String, Path, description = "Listing identifier")
    ),
    tag = "Objects",
    responses(
        (status = 200, body = ObjectDetail),
        (status = 404, description = "Object not found")
    )
)]
pub async fn get_object(
    State(state): State<AppState>,
    Path(object_id): Path<String>,
) -> Result<Json<ObjectDetail>, ApiError> {
    let object = state
        .objects()
        .record_view(&object_id)?
        .ok_or_else(|| ApiError::not_found("Object not found"))?;

    let creator = state
        .users()
        .find_by_wallet_address(&object.creator_address)?
        .map(|user| CreatorSummary {
            fullname: user.fullname,
            wallets: user.wallets,
        });

    Ok(Json(ObjectDetail { object, creator }))
}

#[utoipa::path(
    post,
    path = "/api/objects",
    request_body = CreateObjectRequest,
    tag = "Objects",
    responses(
        (status = 201, body = Object3D),
        (status = 400, description = "Missing or invalid fields")
    )
)]
pub async fn create_object(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateObjectRequest>,
) -> Result<(StatusCode, Json<Object3D>), ApiError> {
    let (model_url, thumbnail_url) = match (
        request.model_url.filter(|u| !u.trim().is_empty()),
        request.thumbnail_url.filter(|u| !u.trim().is_empty()),
    ) {
        (Some(model), Some(thumbnail)) => (model, thumbnail),
        _ => return Err(ApiError::bad_request("Model and thumbnail are required")),
    };

    let name = required_text(request.name, "Name is required")?;
    let price = scalar_text(request.price.as_ref())
        .ok_or_else(|| ApiError::bad_request("Price is required"))?;
    let category = parse_category(&required_text(request.category, "Category is required")?)?;
    let creator_address = WalletAddress::parse(&required_text(
        request.creator_address,
        "Creator address is required",
    )?)
    .map_err(|e| ApiError::bad_request(format!("Invalid address: {}", e.0)))?;

    let object = state.objects().create(NewObject {
        name,
        description: request.description.filter(|d| !d.trim().is_empty()),
        price,
        category,
        creator_address,
        model_url: model_url.trim().to_string(),
        thumbnail_url: thumbnail_url.trim().to_string(),
    })?;

    tracing::info!(object_id = %object.id, creator = %object.creator_address, "Listed object");
    Ok((StatusCode::CREATED, Json(object)))
}
