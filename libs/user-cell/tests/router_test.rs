use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use shared_database::{bson::doc, DocumentStore, InMemoryStore, USERS};
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::{json_request, read_json, JwtTestUtils, TestConfig, TestUser};
use user_cell::user_routes;

fn store_with_users() -> InMemoryStore {
    let store = InMemoryStore::new();
    store
        .seed(
            USERS,
            vec![
                TestUser::admin("root@x.com").to_document(),
                TestUser::patient("alice@x.com").to_document(),
            ],
        )
        .unwrap();
    store
}

#[tokio::test]
async fn test_upsert_user_returns_token_for_path_email() {
    let config = TestConfig::default();
    let store = InMemoryStore::new();
    let app = user_routes(config.to_state(store.clone()));

    let (status, body) = read_json(
        app.oneshot(json_request(
            "PUT",
            "/user/new@x.com",
            None,
            Some(json!({ "name": "New Patient", "email": "spoofed@x.com", "role": "admin" })),
        ))
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["upsertedCount"], 1);

    let token = body["token"].as_str().unwrap();
    let identity = validate_token(token, &config.jwt_secret).unwrap();
    assert_eq!(identity.email, "new@x.com");

    let stored = store
        .collection(USERS)
        .find_one(doc! { "email": "new@x.com" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.get_str("name").unwrap(), "New Patient");
    assert!(stored.get("role").is_none());
    assert_eq!(store.count(USERS).unwrap(), 1);
}

#[tokio::test]
async fn test_upsert_existing_user_keeps_role() {
    let config = TestConfig::default();
    let store = store_with_users();
    let app = user_routes(config.to_state(store.clone()));

    let (status, body) = read_json(
        app.oneshot(json_request(
            "PUT",
            "/user/root@x.com",
            None,
            Some(json!({ "name": "Renamed", "role": "patient" })),
        ))
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["matchedCount"], 1);

    let stored = store
        .collection(USERS)
        .find_one(doc! { "email": "root@x.com" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.get_str("role").unwrap(), "admin");
    assert_eq!(stored.get_str("name").unwrap(), "Renamed");
}

#[tokio::test]
async fn test_check_admin_is_public() {
    let app = user_routes(TestConfig::default().to_state(store_with_users()));

    let (_, root) = read_json(
        app.clone()
            .oneshot(json_request("GET", "/admin/root@x.com", None, None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(root, json!({ "admin": true }));

    let (_, alice) = read_json(
        app.oneshot(json_request("GET", "/admin/alice@x.com", None, None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(alice, json!({ "admin": false }));
}

#[tokio::test]
async fn test_list_users_requires_admin() {
    let config = TestConfig::default();
    let app = user_routes(config.to_state(store_with_users()));

    let response = app
        .clone()
        .oneshot(json_request("GET", "/users", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let patient = JwtTestUtils::create_test_token(&TestUser::patient("alice@x.com"), &config.jwt_secret, None);
    let response = app
        .clone()
        .oneshot(json_request("GET", "/users", Some(&patient), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin = JwtTestUtils::create_test_token(&TestUser::admin("root@x.com"), &config.jwt_secret, None);
    let (status, body) = read_json(
        app.oneshot(json_request("GET", "/users", Some(&admin), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], "root@x.com");
    assert_eq!(users[0]["role"], "admin");
    assert_eq!(users[1]["name"], "Test User");
}

#[tokio::test]
async fn test_make_admin_uses_token_identity_not_path() {
    let config = TestConfig::default();
    let store = store_with_users();
    let app = user_routes(config.to_state(store.clone()));

    // A non-admin cannot promote themselves by naming their own email
    let alice = JwtTestUtils::create_test_token(&TestUser::patient("alice@x.com"), &config.jwt_secret, None);
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/user/admin/alice@x.com", Some(&alice), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let root = JwtTestUtils::create_test_token(&TestUser::admin("root@x.com"), &config.jwt_secret, None);
    let (status, body) = read_json(
        app.clone()
            .oneshot(json_request("PUT", "/user/admin/alice@x.com", Some(&root), None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modifiedCount"], 1);

    let stored = store
        .collection(USERS)
        .find_one(doc! { "email": "alice@x.com" })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.get_str("role").unwrap(), "admin");

    let response = app
        .oneshot(json_request("PUT", "/user/admin/ghost@x.com", Some(&root), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_users_tolerates_non_object_ids() {
    let config = TestConfig::default();
    let store = store_with_users();
    store
        .seed(USERS, vec![doc! { "_id": "legacy-42", "email": "old@x.com" }])
        .unwrap();
    let app = user_routes(config.to_state(store));

    let admin = JwtTestUtils::create_test_token(&TestUser::admin("root@x.com"), &config.jwt_secret, None);
    let (status, body) = read_json(
        app.oneshot(json_request("GET", "/users", Some(&admin), None))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[2]["_id"], "legacy-42");
}
