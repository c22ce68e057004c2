//! Board endpoint integration tests
//!
//! Tests:
//! - GET /api/boards: List boards, archived hidden by default
//! - POST /api/boards: Create board
//! - PATCH /api/boards/{id}: Update, archive, ownership isolation

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::common::{detail_fields, TestApp};

#[tokio::test]
async fn test_list_boards_requires_auth() {
    let app = TestApp::with_mocks();

    let (status, _) = app.get("/api/boards", None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_board_validation() {
    let app = TestApp::with_mocks();
    let caller = app.api_key_user().await.unwrap();

    let (status, body) = app
        .post(
            "/api/boards",
            Some(&caller.raw_key),
            json!({ "name": "   ", "color": "green" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(detail_fields(&body), vec!["color", "name"]);
}

#[tokio::test]
async fn test_create_board_malformed_json() {
    let app = TestApp::with_mocks();
    let caller = app.api_key_user().await.unwrap();

    let (status, _) = app
        .post("/api/boards", Some(&caller.raw_key), json!({ "color": "#fff" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

mod with_database {
    use super::*;

    async fn create_board(app: &TestApp, key: &str, body: Value) -> Value {
        let (status, board) = app.post("/api/boards", Some(key), body).await;
        assert_eq!(status, StatusCode::CREATED, "{board}");
        board
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_create_and_list_board() {
        let app = TestApp::with_database().await.unwrap();
        let caller = app.api_key_user().await.unwrap();

        let board = create_board(&app, &caller.raw_key, json!({ "name": "  Read  " })).await;
        assert_eq!(board["name"], "Read");
        assert_eq!(board["color"], "#22c55e");
        assert!(board["archived_at"].is_null());
        assert_eq!(board["user_id"], caller.user_id.to_string());

        let (status, boards) = app.get("/api/boards", Some(&caller.raw_key)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(boards.as_array().unwrap().len(), 1);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_archived_boards_hidden_by_default() {
        let app = TestApp::with_database().await.unwrap();
        let caller = app.api_key_user().await.unwrap();
        let key = caller.raw_key.as_str();

        let board = create_board(&app, key, json!({ "name": "Stretch" })).await;
        create_board(&app, key, json!({ "name": "Walk" })).await;

        let uri = format!("/api/boards/{}", board["id"].as_str().unwrap());
        let (status, archived) = app.patch(&uri, Some(key), json!({ "archived": true })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(archived["archived_at"].is_string());

        let (_, active) = app.get("/api/boards", Some(key)).await;
        assert_eq!(active.as_array().unwrap().len(), 1);
        assert_eq!(active[0]["name"], "Walk");

        let (_, all) = app
            .get("/api/boards?include_archived=true", Some(key))
            .await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_patch_clears_description() {
        let app = TestApp::with_database().await.unwrap();
        let caller = app.api_key_user().await.unwrap();
        let key = caller.raw_key.as_str();

        let board = create_board(
            &app,
            key,
            json!({ "name": "Journal", "description": "Every evening", "icon": "book" }),
        )
        .await;

        let uri = format!("/api/boards/{}", board["id"].as_str().unwrap());
        let (status, updated) = app
            .patch(&uri, Some(key), json!({ "description": null }))
            .await;

        assert_eq!(status, StatusCode::OK);
        assert!(updated["description"].is_null());
        assert_eq!(updated["icon"], "book");
        assert_eq!(updated["name"], "Journal");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_boards_isolated_between_users() {
        let app = TestApp::with_database().await.unwrap();
        let owner = app.api_key_user().await.unwrap();
        let other = app.api_key_user().await.unwrap();

        let board = create_board(&app, &owner.raw_key, json!({ "name": "Private" })).await;
        let uri = format!("/api/boards/{}", board["id"].as_str().unwrap());

        let (status, _) = app
            .patch(&uri, Some(&other.raw_key), json!({ "name": "Taken" }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, boards) = app.get("/api/boards", Some(&other.raw_key)).await;
        assert!(boards.as_array().unwrap().is_empty());

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_jwt_caller_sees_own_boards_only() {
        let app = TestApp::with_database().await.unwrap();
        let api_user = app.api_key_user().await.unwrap();
        let jwt_user = app.jwt_user().unwrap();

        create_board(&app, &api_user.raw_key, json!({ "name": "Theirs" })).await;
        let mine = create_board(&app, &jwt_user.token, json!({ "name": "Mine" })).await;
        assert_eq!(mine["user_id"], jwt_user.user.id.to_string());

        let (status, boards) = app.get("/api/boards", Some(&jwt_user.token)).await;
        assert_eq!(status, StatusCode::OK);
        let boards = boards.as_array().unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0]["name"], "Mine");

        app.cleanup().await.unwrap();
    }
}
