//! Auth endpoint integration tests
//!
//! Tests:
//! - GET /api/health
//! - GET /api/auth/whoami: both credential families, failure modes
//! - GET /api/auth/session: JWT only
//! - POST /api/auth/session: token in body
//! - POST /api/auth/refresh: provider exchange
//! - POST /api/auth/verify: API key issued from a session

use axum::http::StatusCode;
use habitrack_auth::mock::provider_user;
use habitrack_auth::ProviderSession;
use serde_json::json;

use crate::common::{detail_fields, TestApp};

#[tokio::test]
async fn test_health_needs_no_auth() {
    let app = TestApp::with_mocks();

    let (status, body) = app.get("/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

mod test_whoami {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_missing_header_rejected() {
        let app = TestApp::with_mocks();

        let (status, body) = app.get("/api/auth/whoami", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .to_lowercase()
            .contains("authorization"));
        assert_eq!(app.memory_store().lookup_count(), 0);
        assert_eq!(app.provider.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_non_bearer_header_touches_nothing() {
        let app = TestApp::with_mocks();
        let request = axum::http::Request::builder()
            .uri("/api/auth/whoami")
            .header("authorization", "Basic dXNlcjpwYXNz")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = tower::ServiceExt::oneshot(app.router.clone(), request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.memory_store().lookup_count(), 0);
        assert_eq!(app.provider.verify_calls(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_api_key_caller() {
        let app = TestApp::with_mocks();
        let caller = app.api_key_user().await.unwrap();

        let (status, body) = app.get("/api/auth/whoami", Some(&caller.raw_key)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["auth_method"], "api_key");
        assert_eq!(body["user"]["id"], caller.user_id.to_string());
        assert_eq!(body["user"]["email"], caller.email);
        assert_eq!(body["api_key"]["id"], caller.key_id.to_string());
        assert_eq!(body["api_key"]["label"], "Test Key");
        assert!(body.get("session").is_none());
        assert!(!body.to_string().contains(&caller.raw_key));
    }

    #[tokio::test]
    async fn test_api_key_use_records_last_used() {
        let app = TestApp::with_mocks();
        let caller = app.api_key_user().await.unwrap();

        let (status, _) = app.get("/api/auth/whoami", Some(&caller.raw_key)).await;
        assert_eq!(status, StatusCode::OK);

        app.memory_store().wait_for_touches(1).await;
        let key = app.memory_store().api_key(caller.key_id).unwrap();
        assert!(key.last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_api_key() {
        let app = TestApp::with_mocks();

        let (status, body) = app.get("/api/auth/whoami", Some("0123456789abcdef")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid API key");
        assert_eq!(app.provider.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_revoked_api_key() {
        let app = TestApp::with_mocks();
        let caller = app.api_key_user().await.unwrap();
        app.memory_store().revoke(caller.key_id);

        let (status, body) = app.get("/api/auth/whoami", Some(&caller.raw_key)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let error = body["error"].as_str().unwrap();
        assert!(
            error == "API key has been revoked" || error == "Invalid API key",
            "{error}"
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_jwt_caller_is_provisioned() {
        let app = TestApp::with_mocks();
        let caller = app.jwt_user().unwrap();

        let (status, body) = app.get("/api/auth/whoami", Some(&caller.token)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["auth_method"], "jwt");
        assert_eq!(body["user"]["id"], caller.user.id.to_string());
        assert_eq!(body["user"]["email_verified"], true);
        assert!(body.get("api_key").is_none());

        let preview = body["session"]["token_preview"].as_str().unwrap();
        assert_eq!(preview, format!("{}...", &caller.token[..20]));
        assert!(body["session"]["expires_at"].is_string());

        assert_eq!(app.memory_store().user_count(), 1);
        assert_eq!(
            app.memory_store().user_email(caller.user.id).as_deref(),
            caller.user.email.as_deref()
        );
    }

    #[tokio::test]
    async fn test_two_segment_token_skips_provider() {
        let app = TestApp::with_mocks();

        let (status, body) = app.get("/api/auth/whoami", Some("eyJhbGciOi.eyJzdWIi")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid JWT token format");
        assert_eq!(app.provider.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_garbage_jwt_is_checked_once() {
        let app = TestApp::with_mocks();

        let (status, body) = app.get("/api/auth/whoami", Some("eyJ.garbage.token")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired JWT token");
        assert_eq!(app.provider.verify_calls(), 1);
    }

    #[tokio::test]
    async fn test_provider_outage_is_server_error() {
        let app = TestApp::with_mocks();
        let caller = app.jwt_user().unwrap();
        app.provider.set_unavailable(true);

        let (status, body) = app.get("/api/auth/whoami", Some(&caller.token)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}

mod test_session {
    use super::*;

    #[tokio::test]
    async fn test_get_session_with_jwt() {
        let app = TestApp::with_mocks();
        let caller = app.jwt_user().unwrap();

        let (status, body) = app.get("/api/auth/session", Some(&caller.token)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session valid");
        assert_eq!(body["user"]["id"], caller.user.id.to_string());
        assert!(!body.to_string().contains(&caller.token));
    }

    #[tokio::test]
    async fn test_get_session_rejects_api_key() {
        let app = TestApp::with_mocks();
        let caller = app.api_key_user().await.unwrap();

        let (status, body) = app.get("/api/auth/session", Some(&caller.raw_key)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid JWT token format");
        assert_eq!(app.memory_store().lookup_count(), 0);
        assert_eq!(app.provider.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_post_session_validates_body_token() {
        let app = TestApp::with_mocks();
        let caller = app.jwt_user().unwrap();

        let (status, body) = app
            .post(
                "/api/auth/session",
                None,
                json!({ "access_token": caller.token }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], caller.user.email.clone().unwrap());
        assert_eq!(app.provider.verify_calls(), 1);
    }

    #[tokio::test]
    async fn test_post_session_requires_token() {
        let app = TestApp::with_mocks();

        let (status, body) = app.post("/api/auth/session", None, json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail_fields(&body), vec!["access_token"]);
        assert_eq!(app.provider.verify_calls(), 0);
    }

    #[tokio::test]
    async fn test_post_session_unknown_token() {
        let app = TestApp::with_mocks();

        let (status, body) = app
            .post(
                "/api/auth/session",
                None,
                json!({ "access_token": "eyJhbGciOiJIUzI1NiJ9.e30.c2ln" }),
            )
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired JWT token");
    }
}

mod test_refresh {
    use super::*;

    fn session(refresh_token: &str) -> ProviderSession {
        ProviderSession {
            access_token: "eyJnew.access.token".to_string(),
            refresh_token: refresh_token.to_string(),
            expires_at: Some(1_900_000_000),
            expires_in: 3600,
            user: provider_user("ana@example.com"),
        }
    }

    #[tokio::test]
    async fn test_refresh_returns_new_session() {
        let app = TestApp::with_mocks();
        let expected = session("rotated-refresh");
        app.provider.add_session("old-refresh", expected.clone());

        let (status, body) = app
            .post(
                "/api/auth/refresh",
                None,
                json!({ "refresh_token": "old-refresh" }),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["access_token"], expected.access_token);
        assert_eq!(body["refresh_token"], "rotated-refresh");
        assert_eq!(body["expires_in"], 3600);
        assert_eq!(body["user"]["email"], "ana@example.com");
        assert_eq!(app.provider.refresh_calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_unknown_token() {
        let app = TestApp::with_mocks();

        let (status, body) = app
            .post("/api/auth/refresh", None, json!({ "refresh_token": "nope" }))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired refresh token");
    }

    #[tokio::test]
    async fn test_refresh_requires_token() {
        let app = TestApp::with_mocks();

        let (status, body) = app.post("/api/auth/refresh", None, json!({})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail_fields(&body), vec!["refresh_token"]);
        assert_eq!(app.provider.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_refresh_provider_outage() {
        let app = TestApp::with_mocks();
        app.provider.set_unavailable(true);

        let (status, _) = app
            .post("/api/auth/refresh", None, json!({ "refresh_token": "any" }))
            .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

mod test_verify {
    use super::*;

    #[tokio::test]
    async fn test_verify_requires_jwt() {
        let app = TestApp::with_mocks();
        let caller = app.api_key_user().await.unwrap();

        let (status, body) = app
            .post("/api/auth/verify", Some(&caller.raw_key), json!({}))
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid JWT token format");
    }

    #[tokio::test]
    async fn test_verify_rejects_long_key_name() {
        let app = TestApp::with_mocks();
        let caller = app.jwt_user().unwrap();

        let (status, body) = app
            .post(
                "/api/auth/verify",
                Some(&caller.token),
                json!({ "key_name": "k".repeat(51) }),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail_fields(&body), vec!["key_name"]);
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_verify_issues_working_api_key() {
        let app = TestApp::with_database().await.unwrap();
        let caller = app.jwt_user().unwrap();

        let (status, body) = app
            .post("/api/auth/verify", Some(&caller.token), json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], caller.user.id.to_string());
        let api_key = body["api_key"].as_str().unwrap().to_string();

        let (status, whoami) = app.get("/api/auth/whoami", Some(&api_key)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(whoami["auth_method"], "api_key");
        assert_eq!(whoami["user"]["id"], caller.user.id.to_string());
        assert_eq!(whoami["api_key"]["label"], "Magic Link Authentication");

        app.cleanup().await.unwrap();
    }
}
