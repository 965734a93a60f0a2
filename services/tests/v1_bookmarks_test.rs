mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::{MockSqlStorage, OTHER_USER_ID, TEST_USER_ID, bearer_for, create_test_app};
use serde_json::Value;

#[tokio::test]
async fn list_requires_a_bearer_token() {
    let server = TestServer::new(create_test_app(MockSqlStorage::new())).unwrap();

    let response = server.get("/v1/bookmarks").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_returns_bookmarks_across_all_users() {
    let storage = MockSqlStorage::new();
    let server = TestServer::new(create_test_app(storage.clone())).unwrap();

    storage.seed_bookmark(TEST_USER_ID, "mine");
    storage.seed_bookmark(OTHER_USER_ID, "theirs");

    let body: Value = server
        .get("/v1/bookmarks")
        .authorization_bearer(&bearer_for(TEST_USER_ID))
        .await
        .json();

    assert_eq!(body["total"], 2);
    let mut titles: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    titles.sort_unstable();
    assert_eq!(titles, vec!["mine", "theirs"]);

    let owners: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["user_id"].as_str().unwrap())
        .collect();
    assert!(owners.contains(&TEST_USER_ID.to_string().as_str()));
    assert!(owners.contains(&OTHER_USER_ID.to_string().as_str()));
}

#[tokio::test]
async fn list_is_empty_when_nothing_is_stored() {
    let server = TestServer::new(create_test_app(MockSqlStorage::new())).unwrap();

    let response = server
        .get("/v1/bookmarks")
        .authorization_bearer(&bearer_for(TEST_USER_ID))
        .await;
    response.assert_status(StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}
