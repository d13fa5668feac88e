use sqlx::Row;
use wiremock::MockServer;

use rate_notifier::rpc::proto::SubscribeRequest;
use rate_notifier::rpc::{RpcErrorBody, RpcStatus};

use crate::helpers::TestApp;

fn subscribe_request(email: &str) -> SubscribeRequest {
    SubscribeRequest {
        email: email.to_string(),
    }
}

#[tokio::test]
async fn subscribe_persists_a_valid_email() {
    let peer = MockServer::start().await;
    let (test_app, db_pool) = TestApp::spawn_subscription(&peer, &peer).await;

    let response = test_app
        .post_rpc("Subscribe", &subscribe_request("frank@test.com"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let saved = sqlx::query("SELECT email FROM subscribers")
        .fetch_one(&db_pool)
        .await
        .expect("Failed to fetch saved subscriber.");
    assert_eq!(saved.get::<String, _>("email"), "frank@test.com");
}

#[tokio::test]
async fn subscribe_twice_with_the_same_email_fails_with_already_exists() {
    let peer = MockServer::start().await;
    let (test_app, _) = TestApp::spawn_subscription(&peer, &peer).await;

    let first = test_app
        .post_rpc("Subscribe", &subscribe_request("frank@test.com"))
        .await;
    let second = test_app
        .post_rpc("Subscribe", &subscribe_request("frank@test.com"))
        .await;

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 409);
    let body: RpcErrorBody = second.json().await.unwrap();
    assert_eq!(body.code, RpcStatus::AlreadyExists);
}

#[tokio::test]
async fn subscribe_rejects_an_invalid_email_without_storing_it() {
    let peer = MockServer::start().await;
    let (test_app, db_pool) = TestApp::spawn_subscription(&peer, &peer).await;

    let response = test_app
        .post_rpc("Subscribe", &subscribe_request("frank@localhost"))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: RpcErrorBody = response.json().await.unwrap();
    assert_eq!(body.code, RpcStatus::InvalidArgument);
    let stored = sqlx::query("SELECT count(*) AS total FROM subscribers")
        .fetch_one(&db_pool)
        .await
        .expect("Failed to count subscribers.");
    assert_eq!(stored.get::<i64, _>("total"), 0);
}

#[tokio::test]
async fn gateway_reports_a_duplicate_subscription_as_409() {
    let peer = MockServer::start().await;
    let (subscription, _) = TestApp::spawn_subscription(&peer, &peer).await;
    let gateway = TestApp::spawn_gateway_at(peer.uri(), subscription.address.clone()).await;

    let first = gateway.post_subscribe("email=frank%40test.com").await;
    let second = gateway.post_subscribe("email=frank%40test.com").await;

    assert_eq!(first.status().as_u16(), 200);
    assert_eq!(second.status().as_u16(), 409);
    let body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "success": false, "error": "subscriber already exists" })
    );
}
