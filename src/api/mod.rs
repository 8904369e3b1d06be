// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    models::{
        CreateObjectRequest, CreatePurchaseRequest, CreatorSummary, DetectedWalletsRequest,
        DetectedWalletsResponse, FullnameResponse, NonceResponse, ObjectDetail,
        PurchaseWithObject, SaveFullnameRequest, StatsResponse, UpdateUserRequest, UserProfile,
        UserSummary, VerifyResponse, VerifySignatureRequest,
    },
    state::AppState,
    storage::{Object3D, ObjectCategory, Purchase},
    wallets::{Wallet, WalletAddress},
};

pub mod auth;
pub mod health;
pub mod objects;
pub mod purchases;
pub mod stats;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/auth/fullname", post(auth::save_fullname))
        .route("/auth/detected-wallets", post(auth::save_detected_wallets))
        .route("/auth/nonce/{address}", get(auth::get_nonce))
        .route("/auth/verify", post(auth::verify_signature))
        .route(
            "/users/{address}",
            get(users::get_user).put(users::update_user),
        )
        .route(
            "/objects",
            get(objects::list_objects).post(objects::create_object),
        )
        .route("/objects/{id}", get(objects::get_object))
        .route("/purchases", post(purchases::create_purchase))
        .route("/purchases/{address}", get(purchases::list_user_purchases))
        .route("/stats", get(stats::get_stats))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        auth::save_fullname,
        auth::save_detected_wallets,
        auth::get_nonce,
        auth::verify_signature,
        users::get_user,
        users::update_user,
        objects::list_objects,
        objects::get_object,
        objects::create_object,
        purchases::create_purchase,
        purchases::list_user_purchases,
        stats::get_stats
    ),
    components(
        schemas(
            Wallet,
            WalletAddress,
            UserSummary,
            UserProfile,
            Object3D,
            ObjectCategory,
            ObjectDetail,
            CreatorSummary,
            Purchase,
            PurchaseWithObject,
            StatsResponse,
            SaveFullnameRequest,
            FullnameResponse,
            DetectedWalletsRequest,
            DetectedWalletsResponse,
            NonceResponse,
            VerifySignatureRequest,
            VerifyResponse,
            UpdateUserRequest,
            CreateObjectRequest,
            CreatePurchaseRequest,
            health::HealthResponse,
            health::ReadyResponse,
            health::HealthChecks
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Wallet authentication and linking"),
        (name = "Users", description = "Wallet-addressed user profiles"),
        (name = "Objects", description = "3D object catalog"),
        (name = "Purchases", description = "Purchase records"),
        (name = "Stats", description = "Platform totals")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = test_state(None);
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_is_served_under_api_with_request_id() {
        let (state, _dir) = test_state(None);
        let response = router(state)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let body = json_body(response).await;
        assert_eq!(body["message"], "Server is running");
    }

    #[tokio::test]
    async fn unknown_api_path_is_json_404() {
        let (state, _dir) = test_state(None);
        let response = router(state)
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"], "Not found");
    }

    #[tokio::test]
    async fn invalid_json_body_uses_error_shape() {
        let (state, _dir) = test_state(None);
        let request = Request::post("/api/auth/fullname")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = router(state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn nonce_then_fullname_over_http() {
        let (state, _dir) = test_state(None);
        let app = router(state);

        let response = app
            .clone()
            .oneshot(
                Request::get("/api/auth/nonce/0x8888888888888888888888888888888888888888")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let nonce = json_body(response).await["nonce"].as_str().unwrap().to_string();
        assert!(nonce.contains("Nonce: "));

        let request = Request::post("/api/auth/fullname")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"fullname":"Ada"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["fullname"], "Ada");
        assert!(body["userId"].is_string());
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/auth/verify",
            "/api/auth/nonce/{address}",
            "/api/objects/{id}",
            "/api/purchases/{address}",
            "/api/stats",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
