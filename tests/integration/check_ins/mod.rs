//! Check-in endpoint integration tests
//!
//! Tests:
//! - GET /api/check-ins: Filters and date range validation
//! - POST /api/check-ins: Create, duplicate date, foreign board
//! - PATCH /api/check-ins/{id}: Update completion and notes

use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::common::{detail_fields, TestApp};

fn days_from_today(days: u64) -> String {
    (Utc::now().date_naive() + Days::new(days))
        .format("%Y-%m-%d")
        .to_string()
}

#[tokio::test]
async fn test_future_date_rejected() {
    let app = TestApp::with_mocks();
    let caller = app.api_key_user().await.unwrap();

    let (status, body) = app
        .post(
            "/api/check-ins",
            Some(&caller.raw_key),
            json!({
                "board_id": Uuid::new_v4(),
                "date": days_from_today(3),
                "completed": true,
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail_fields(&body), vec!["date"]);
}

#[tokio::test]
async fn test_list_rejects_inverted_range() {
    let app = TestApp::with_mocks();
    let caller = app.api_key_user().await.unwrap();

    let (status, body) = app
        .get(
            "/api/check-ins?date_from=2025-09-18&date_to=2025-09-01",
            Some(&caller.raw_key),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Validation failed");
}

#[tokio::test]
async fn test_list_rejects_malformed_date() {
    let app = TestApp::with_mocks();
    let caller = app.api_key_user().await.unwrap();

    let (status, body) = app
        .get("/api/check-ins?date_from=18-09-2025", Some(&caller.raw_key))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(detail_fields(&body), vec!["date_from"]);
}

mod with_database {
    use super::*;

    async fn create_board(app: &TestApp, key: &str) -> String {
        let (status, board) = app
            .post("/api/boards", Some(key), json!({ "name": "Run" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{board}");
        board["id"].as_str().unwrap().to_string()
    }

    async fn check_in(app: &TestApp, key: &str, board_id: &str, date: &str) -> (StatusCode, Value) {
        app.post(
            "/api/check-ins",
            Some(key),
            json!({ "board_id": board_id, "date": date, "completed": true }),
        )
        .await
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_create_and_filter_check_ins() {
        let app = TestApp::with_database().await.unwrap();
        let caller = app.api_key_user().await.unwrap();
        let key = caller.raw_key.as_str();
        let board_id = create_board(&app, key).await;

        for date in ["2025-09-01", "2025-09-02", "2025-09-03"] {
            let (status, created) = check_in(&app, key, &board_id, date).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(created["date"], date);
            assert_eq!(created["user_id"], caller.user_id.to_string());
        }

        let uri = format!(
            "/api/check-ins?board_id={}&date_from=2025-09-02&date_to=2025-09-03",
            board_id
        );
        let (status, list) = app.get(&uri, Some(key)).await;
        assert_eq!(status, StatusCode::OK);
        let dates: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2025-09-03", "2025-09-02"]);

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_duplicate_date_conflicts() {
        let app = TestApp::with_database().await.unwrap();
        let caller = app.api_key_user().await.unwrap();
        let key = caller.raw_key.as_str();
        let board_id = create_board(&app, key).await;

        let (status, _) = check_in(&app, key, &board_id, "2025-09-01").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = check_in(&app, key, &board_id, "2025-09-01").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "A check-in already exists for this board and date"
        );

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_foreign_board_not_found() {
        let app = TestApp::with_database().await.unwrap();
        let owner = app.api_key_user().await.unwrap();
        let other = app.api_key_user().await.unwrap();
        let board_id = create_board(&app, &owner.raw_key).await;

        let (status, body) = check_in(&app, &other.raw_key, &board_id, "2025-09-01").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Board not found");

        app.cleanup().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Postgres"]
    async fn test_update_check_in() {
        let app = TestApp::with_database().await.unwrap();
        let caller = app.api_key_user().await.unwrap();
        let other = app.api_key_user().await.unwrap();
        let key = caller.raw_key.as_str();
        let board_id = create_board(&app, key).await;

        let (_, created) = app
            .post(
                "/api/check-ins",
                Some(key),
                json!({
                    "board_id": board_id,
                    "date": "2025-09-01",
                    "completed": false,
                    "notes": "Rained",
                }),
            )
            .await;
        let uri = format!("/api/check-ins/{}", created["id"].as_str().unwrap());

        let (status, updated) = app
            .patch(&uri, Some(key), json!({ "completed": true, "notes": null }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], true);
        assert!(updated["notes"].is_null());

        let (status, _) = app
            .patch(&uri, Some(&other.raw_key), json!({ "completed": false }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        app.cleanup().await.unwrap();
    }
}
