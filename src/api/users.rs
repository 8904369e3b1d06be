// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{ApiError, ApiJson},
    models::{UpdateUserRequest, UserProfile, UserSummary},
    state::AppState,
    storage::User,
    wallets::WalletAddress,
};

fn owner_of(state: &AppState, raw_address: &str) -> Result<(WalletAddress, User), ApiError> {
    let address = WalletAddress::parse(raw_address)
        .map_err(|e| ApiError::bad_request(format!("Invalid address: {}", e.0)))?;
    let user = state
        .users()
        .find_by_wallet_address(&address)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok((address, user))
}

#[utoipa::path(
    get,
    path = "/api/users/{address}",
    params(
        ("address" = String, Path, description = "Connected wallet address of the user")
    ),
    tag = "Users",
    responses(
        (status = 200, body = UserProfile),
        (status = 404, description = "No user holds this address")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let (address, user) = owner_of(&state, &address)?;
    let objects = state.objects().list_by_creator(&address)?;

    Ok(Json(UserProfile {
        id: user.id,
        fullname: user.fullname,
        wallets: user.wallets,
        objects,
    }))
}

#[utoipa::path(
    put,
    path = "/api/users/{address}",
    params(
        ("address" = String, Path, description = "Connected wallet address of the user")
    ),
    request_body = UpdateUserRequest,
    tag = "Users",
    responses(
        (status = 200, body = UserSummary),
        (status = 404, description = "No user holds this address")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserSummary>, ApiError> {
    let (_, user) = owner_of(&state, &address)?;

    let fullname = request
        .fullname
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let (user, ()) = state
        .users()
        .update(&user.id, |user| {
            if let Some(fullname) = fullname {
                user.fullname = fullname;
            }
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use crate::storage::{NewObject, ObjectCategory};
    use crate::wallets::Wallet;
    use axum::http::StatusCode;

    const ADDRESS: &str = "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

    fn seed_user(state: &AppState) -> User {
        let user = state.users().create("Ada").unwrap();
        let address = WalletAddress::parse(ADDRESS).unwrap();
        let (user, ()) = state
            .users()
            .update(&user.id, |u| u.wallets.push(Wallet::connected("metamask", address, None)))
            .unwrap()
            .unwrap();
        user
    }

    #[tokio::test]
    async fn get_user_includes_created_objects() {
        let (state, _dir) = test_state(None);
        let user = seed_user(&state);
        state
            .objects()
            .create(NewObject {
                name: "Castle".into(),
                description: None,
                price: "3".into(),
                category: ObjectCategory::Architecture,
                creator_address: WalletAddress::parse(ADDRESS).unwrap(),
                model_url: "/m.glb".into(),
                thumbnail_url: "/t.png".into(),
            })
            .unwrap();

        let Json(profile) = get_user(State(state), Path(ADDRESS.to_lowercase()))
            .await
            .unwrap();
        assert_eq!(profile.id, user.id);
        assert_eq!(profile.objects.len(), 1);
        assert_eq!(profile.objects[0].name, "Castle");
    }

    #[tokio::test]
    async fn get_unknown_user_is_404() {
        let (state, _dir) = test_state(None);
        let err = get_user(State(state), Path(ADDRESS.into())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_user_changes_name_and_ignores_blank() {
        let (state, _dir) = test_state(None);
        seed_user(&state);

        let Json(updated) = update_user(
            State(state.clone()),
            Path(ADDRESS.into()),
            ApiJson(UpdateUserRequest {
                fullname: Some(" Ada King ".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.fullname, "Ada King");

        let Json(unchanged) = update_user(
            State(state),
            Path(ADDRESS.into()),
            ApiJson(UpdateUserRequest {
                fullname: Some("".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(unchanged.fullname, "Ada King");
        assert_eq!(unchanged.wallets.len(), 1);
    }
}
