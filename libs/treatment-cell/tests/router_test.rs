use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use shared_database::{InMemoryStore, BOOKINGS, SERVICES};
use shared_utils::test_utils::{json_request, read_json, TestConfig, TestDocuments};
use treatment_cell::treatment_routes;

fn seeded_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .seed(
            SERVICES,
            vec![
                TestDocuments::service("Cleaning", 50.0, &["9am", "10am", "11am"]),
                TestDocuments::service("Whitening", 120.0, &["1pm", "2pm"]),
            ],
        )
        .unwrap();
    store
        .seed(
            BOOKINGS,
            vec![
                TestDocuments::booking("Cleaning", "2024-01-01", "a@x.com", "10am"),
                TestDocuments::booking("Cleaning", "2024-01-02", "b@x.com", "9am"),
            ],
        )
        .unwrap();
    store
}

#[tokio::test]
async fn test_available_excludes_slots_booked_that_day() {
    let app = treatment_routes(TestConfig::default().to_state(seeded_store()));

    let (status, body) = read_json(
        app.oneshot(json_request("GET", "/available?date=2024-01-01", None, None))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Cleaning");
    assert_eq!(body[0]["slots"], json!(["9am", "11am"]));
    assert_eq!(body[1]["name"], "Whitening");
    assert_eq!(body[1]["slots"], json!(["1pm", "2pm"]));
}

#[tokio::test]
async fn test_available_on_free_date_returns_full_catalog() {
    let app = treatment_routes(TestConfig::default().to_state(seeded_store()));

    let (status, body) = read_json(
        app.oneshot(json_request("GET", "/available?date=2030-06-01", None, None))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["slots"], json!(["9am", "10am", "11am"]));
}

#[tokio::test]
async fn test_available_requires_date() {
    let app = treatment_routes(TestConfig::default().to_state(seeded_store()));

    let response = app
        .oneshot(json_request("GET", "/available", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_service_lists_names_only() {
    let app = treatment_routes(TestConfig::default().to_state(seeded_store()));

    let (status, body) = read_json(
        app.oneshot(json_request("GET", "/service", None, None))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let services = body.as_array().unwrap();
    assert_eq!(services.len(), 2);
    assert_eq!(services[0]["name"], "Cleaning");
    assert!(services[0]["_id"].is_string());
    assert!(services[0].get("slots").is_none());
}
