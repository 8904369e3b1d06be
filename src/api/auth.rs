// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth,
    error::{ApiError, ApiJson},
    models::{
        DetectedWalletsRequest, DetectedWalletsResponse, FullnameResponse, NonceResponse,
        SaveFullnameRequest, VerifyResponse, VerifySignatureRequest,
    },
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/fullname",
    request_body = SaveFullnameRequest,
    tag = "Auth",
    responses(
        (status = 200, body = FullnameResponse),
        (status = 400, description = "Full name missing or blank")
    )
)]
pub async fn save_fullname(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SaveFullnameRequest>,
) -> Result<Json<FullnameResponse>, ApiError> {
    let user = auth::save_fullname(&state, request.fullname.as_deref())?;
    Ok(Json(FullnameResponse {
        user_id: user.id,
        fullname: user.fullname,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/detected-wallets",
    request_body = DetectedWalletsRequest,
    tag = "Auth",
    responses(
        (status = 200, body = DetectedWalletsResponse),
        (status = 400, description = "userId missing or detectedWallets not an array"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn save_detected_wallets(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<DetectedWalletsRequest>,
) -> Result<Json<DetectedWalletsResponse>, ApiError> {
    let user = auth::register_detected_wallets(
        &state,
        request.user_id.as_deref(),
        request.detected_wallets.as_ref(),
    )?;
    Ok(Json(DetectedWalletsResponse {
        success: true,
        wallets: user.wallets,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/nonce/{address}",
    params(
        ("address" = String, Path, description = "Wallet address that will sign the challenge")
    ),
    tag = "Auth",
    responses(
        (status = 200, body = NonceResponse),
        (status = 400, description = "Malformed address")
    )
)]
pub async fn get_nonce(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<NonceResponse>, ApiError> {
    let nonce = auth::issue_nonce(&state, &address)?;
    Ok(Json(NonceResponse { nonce: nonce.nonce }))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify",
    request_body = VerifySignatureRequest,
    tag = "Auth",
    responses(
        (status = 200, body = VerifyResponse),
        (status = 400, description = "Invalid input, malformed signature, or no pending nonce"),
        (status = 401, description = "Signature does not match the address"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn verify_signature(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<VerifySignatureRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let verified = auth::verify_and_connect(&state, &request).await?;
    Ok(Json(VerifyResponse {
        user: verified.user.into(),
        connected_wallet: verified.connected,
        token: verified.token,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::tests::sign;
    use crate::state::tests::test_state;
    use crate::wallets::Wallet;
    use alloy::signers::local::PrivateKeySigner;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn full_flow_through_handlers() {
        let (state, _dir) = test_state(None);

        let Json(registered) = save_fullname(
            State(state.clone()),
            ApiJson(SaveFullnameRequest {
                fullname: Some("Grace Hopper".into()),
            }),
        )
        .await
        .unwrap();

        let Json(detected) = save_detected_wallets(
            State(state.clone()),
            ApiJson(DetectedWalletsRequest {
                user_id: Some(registered.user_id.clone()),
                detected_wallets: Some(json!(["metamask"])),
            }),
        )
        .await
        .unwrap();
        assert!(detected.success);
        assert_eq!(detected.wallets, vec![Wallet::detected("metamask")]);

        let signer = PrivateKeySigner::random();
        let address = signer.address().to_string();
        let Json(nonce) = get_nonce(State(state.clone()), Path(address.clone()))
            .await
            .unwrap();

        let Json(verified) = verify_signature(
            State(state.clone()),
            ApiJson(VerifySignatureRequest {
                address: Some(address),
                signature: Some(sign(&signer, &nonce.nonce)),
                wallet_type: Some("metamask".into()),
                balance: Some(json!("10")),
                user_id: Some(registered.user_id.clone()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(verified.user.id, registered.user_id);
        assert_eq!(verified.user.wallets.len(), 1);
        assert_eq!(verified.connected_wallet.name, "metamask");
        assert_eq!(verified.connected_wallet.balance, "10");

        let body = serde_json::to_value(&verified).unwrap();
        assert!(body["connectedWallet"]["address"].is_string());
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn blank_fullname_is_rejected() {
        let (state, _dir) = test_state(None);
        let err = save_fullname(
            State(state),
            ApiJson(SaveFullnameRequest {
                fullname: Some("  ".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Full name is required");
    }

    #[tokio::test]
    async fn malformed_address_nonce_is_rejected() {
        let (state, _dir) = test_state(None);
        let err = get_nonce(State(state), Path("nope".into())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_for_unknown_user_is_404() {
        let (state, _dir) = test_state(None);
        let err = verify_signature(
            State(state),
            ApiJson(VerifySignatureRequest {
                address: Some("0x1111111111111111111111111111111111111111".into()),
                signature: Some("0x00".into()),
                wallet_type: None,
                balance: None,
                user_id: Some("missing".into()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "User not found. Please enter your full name first.");
    }

    #[tokio::test]
    async fn malformed_signature_is_400() {
        let (state, _dir) = test_state(None);
        let user = crate::auth::save_fullname(&state, Some("Ada")).unwrap();
        let address = "0x1111111111111111111111111111111111111111";
        crate::auth::issue_nonce(&state, address).unwrap();

        let err = verify_signature(
            State(state),
            ApiJson(VerifySignatureRequest {
                address: Some(address.into()),
                signature: Some("0xdeadbeef".into()),
                wallet_type: None,
                balance: None,
                user_id: Some(user.id),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid signature format");
    }
}
