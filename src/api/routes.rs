/*
 * Responsibility
 * - URL 構造を定義 (/health, /drinks, /drinks-detail, /drinks/{drink_id})
 * - path は permission table の定数をそのまま使う
 * - access middleware を route_layer で全 route に適用
 */
use axum::{
    Router,
    routing::{get, patch},
};

use crate::api::handlers::{
    drinks::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink},
    health::health,
};
use crate::api::permissions::{DRINK, DRINKS, DRINKS_DETAIL, HEALTH};
use crate::middleware::auth::access;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .route(HEALTH, get(health))
        .route(DRINKS, get(list_drinks).post(create_drink))
        .route(DRINKS_DETAIL, get(list_drinks_detail))
        .route(DRINK, patch(update_drink).delete(delete_drink));

    access::apply(router, state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use async_trait::async_trait;
    use jsonwebtoken::{Algorithm, jwk::JwkSet};
    use tower_http::limit::RequestBodyLimitLayer;

    use super::*;
    use crate::repos::drink_repo::{DrinkRepo, Ingredient, memory::MemoryDrinkRepo};
    use crate::services::auth::jwks::{KeyFetchError, KeyProvider};
    use crate::test_support;

    // Issuer key endpoint that never answers successfully.
    struct UnreachableKeys;

    #[async_trait]
    impl KeyProvider for UnreachableKeys {
        fn source(&self) -> &str {
            "unreachable"
        }

        async fn fetch(&self) -> Result<JwkSet, KeyFetchError> {
            Err(KeyFetchError::Status(503))
        }
    }

    fn ingredient(name: &str, color: &str, parts: u32) -> Ingredient {
        Ingredient {
            name: name.into(),
            color: color.into(),
            parts,
        }
    }

    async fn app_with_water() -> (Router, Arc<MemoryDrinkRepo>) {
        let repo = Arc::new(MemoryDrinkRepo::default());
        repo.insert("water", vec![ingredient("water", "blue", 1)])
            .await;
        (app(repo.clone()), repo)
    }

    fn app(repo: Arc<MemoryDrinkRepo>) -> Router {
        let state = AppState::new(repo, Arc::new(test_support::auth_service()));
        routes(state.clone()).with_state(state)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(auth) = authorization {
            req = req.header(header::AUTHORIZATION, auth);
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn public_list_needs_no_header() {
        let (app, _) = app_with_water().await;

        let (status, body) = send(&app, Method::GET, "/drinks", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["drinks"],
            json!([{"id": 1, "title": "water", "recipe": [{"name": "water", "color": "blue"}]}])
        );
    }

    #[tokio::test]
    async fn public_list_ignores_a_bad_header() {
        let (app, _) = app_with_water().await;

        let (status, _) = send(&app, Method::GET, "/drinks", Some("Basic abc"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_table_is_404() {
        let app = app(Arc::new(MemoryDrinkRepo::default()));

        let (status, body) = send(&app, Method::GET, "/drinks", None, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"success": false, "error": 404, "message": "resource not found"})
        );
    }

    #[tokio::test]
    async fn detail_without_header_is_missing_header() {
        let (app, _) = app_with_water().await;

        let (status, body) = send(&app, Method::GET, "/drinks-detail", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["code"], "missing_header");
    }

    #[tokio::test]
    async fn detail_with_bad_header_shapes() {
        let (app, _) = app_with_water().await;
        let token = test_support::token(&["get:drinks-detail"]);

        for auth in [
            format!("bearer {token}"),
            format!("Token {token}"),
            "Bearer".to_string(),
            format!("Bearer {token} extra"),
        ] {
            let (status, body) =
                send(&app, Method::GET, "/drinks-detail", Some(&auth), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{auth}");
            assert_eq!(body["code"], "invalid_header_format", "{auth}");
        }
    }

    #[tokio::test]
    async fn detail_with_garbage_token_is_malformed() {
        let (app, _) = app_with_water().await;

        let (status, body) = send(
            &app,
            Method::GET,
            "/drinks-detail",
            Some("Bearer not-a-jwt"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "malformed_token");
    }

    #[tokio::test]
    async fn detail_with_permission_returns_long_view() {
        let (app, _) = app_with_water().await;
        let auth = test_support::bearer(&["get:drinks-detail"]);

        let (status, body) = send(&app, Method::GET, "/drinks-detail", Some(&auth), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["drinks"][0]["recipe"][0]["parts"], 1);
    }

    #[tokio::test]
    async fn post_with_only_detail_permission_is_forbidden_as_401() {
        let (app, repo) = app_with_water().await;
        let auth = test_support::bearer(&["get:drinks-detail"]);
        let body = json!({"title": "latte", "recipe": [{"name": "milk", "color": "white", "parts": 2}]});

        let (status, body) = send(&app, Method::POST, "/drinks", Some(&auth), Some(body)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], 403);
        assert_eq!(body["code"], "forbidden");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn token_without_permissions_claim_is_invalid_claims() {
        let (app, _) = app_with_water().await;
        let mut claims = test_support::claims(&[]);
        claims.as_object_mut().unwrap().remove("permissions");
        let auth = format!(
            "Bearer {}",
            test_support::sign(&claims, Some(test_support::KID), test_support::SECRET)
        );

        let (status, body) = send(&app, Method::GET, "/drinks-detail", Some(&auth), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], 400);
        assert_eq!(body["code"], "invalid_claims");
    }

    #[tokio::test]
    async fn create_drink_returns_long_view() {
        let (app, _) = app_with_water().await;
        let auth = test_support::bearer(&["post:drinks"]);
        let body = json!({"title": "latte", "recipe": {"name": "milk", "color": "white", "parts": 2}});

        let (status, body) = send(&app, Method::POST, "/drinks", Some(&auth), Some(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(
            body["drinks"],
            json!({"id": 2, "title": "latte", "recipe": [{"name": "milk", "color": "white", "parts": 2}]})
        );
    }

    #[tokio::test]
    async fn create_drink_rejects_bad_bodies() {
        let (app, _) = app_with_water().await;
        let auth = test_support::bearer(&["post:drinks"]);

        let (status, body) = send(
            &app,
            Method::POST,
            "/drinks",
            Some(&auth),
            Some(json!({"title": "no recipe"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], "unprocessable");

        let duplicate = json!({"title": "water", "recipe": [{"name": "water", "color": "blue", "parts": 1}]});
        let (status, _) = send(&app, Method::POST, "/drinks", Some(&auth), Some(duplicate)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/drinks")
            .header(header::AUTHORIZATION, &auth)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn patch_updates_and_wraps_in_list() {
        let (app, _) = app_with_water().await;
        let auth = test_support::bearer(&["patch:drinks"]);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/drinks/1",
            Some(&auth),
            Some(json!({"title": "sparkling water"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["drinks"][0]["title"], "sparkling water");
        assert_eq!(body["drinks"][0]["recipe"][0]["name"], "water");
    }

    #[tokio::test]
    async fn patch_edge_cases() {
        let (app, _) = app_with_water().await;
        let auth = test_support::bearer(&["patch:drinks"]);

        let (status, _) =
            send(&app, Method::PATCH, "/drinks/1", Some(&auth), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/drinks/99",
            Some(&auth),
            Some(json!({"title": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/drinks/abc",
            Some(&auth),
            Some(json!({"title": "ghost"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "bad request");
    }

    #[tokio::test]
    async fn delete_flow() {
        let (app, repo) = app_with_water().await;
        let auth = test_support::bearer(&["delete:drinks"]);

        let (status, body) = send(&app, Method::DELETE, "/drinks/1", Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "delete": 1}));
        assert!(repo.list().await.unwrap().is_empty());

        let (status, _) = send(&app, Method::DELETE, "/drinks/1", Some(&auth), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/drinks/0", Some(&auth), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_needs_its_own_permission() {
        let (app, _) = app_with_water().await;
        let auth = test_support::bearer(&["patch:drinks", "post:drinks"]);

        let (status, body) = send(&app, Method::DELETE, "/drinks/1", Some(&auth), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "forbidden");
    }

    #[tokio::test]
    async fn auth_is_checked_before_path_parsing() {
        let (app, _) = app_with_water().await;

        let (status, body) = send(&app, Method::DELETE, "/drinks/abc", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "missing_header");
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = app_with_water().await;

        let (status, body) = send(&app, Method::GET, "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn undecodable_payload_is_malformed_token() {
        let (app, _) = app_with_water().await;
        let auth = format!(
            "Bearer {}",
            test_support::undecodable_payload_token(test_support::KID)
        );

        let (status, body) = send(&app, Method::GET, "/drinks-detail", Some(&auth), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "malformed_token");
    }

    #[tokio::test]
    async fn key_fetch_failure_is_401_with_500_in_body() {
        let repo = Arc::new(MemoryDrinkRepo::default());
        let auth =
            test_support::auth_service_with(Arc::new(UnreachableKeys), vec![Algorithm::HS256]);
        let state = AppState::new(repo, Arc::new(auth));
        let app = routes(state.clone()).with_state(state);
        let bearer = test_support::bearer(&["get:drinks-detail"]);

        let (status, body) =
            send(&app, Method::GET, "/drinks-detail", Some(&bearer), None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 500);
        assert_eq!(body["code"], "key_fetch_error");
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let (app, repo) = app_with_water().await;
        let app = app.layer(RequestBodyLimitLayer::new(64));
        let auth = test_support::bearer(&["post:drinks"]);
        let body = json!({
            "title": "x".repeat(70),
            "recipe": [{"name": "milk", "color": "white", "parts": 2}]
        });

        let (status, body) = send(&app, Method::POST, "/drinks", Some(&auth), Some(body)).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"], 413);
        assert_eq!(body["message"], "payload too large");
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
