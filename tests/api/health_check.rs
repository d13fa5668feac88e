use wiremock::MockServer;

use crate::helpers::TestApp;

async fn assert_healthy(test_app: &TestApp) {
    let response = test_app.get("/health_check").await;

    assert!(response.status().is_success());
    assert_eq!(Some(0), response.content_length())
}

#[tokio::test]
async fn health_check_works_on_the_gateway() {
    let peer = MockServer::start().await;

    assert_healthy(&TestApp::spawn_gateway(&peer, &peer).await).await;
}

#[tokio::test]
async fn health_check_works_on_the_rate_watcher() {
    let provider = MockServer::start().await;

    assert_healthy(&TestApp::spawn_rate_watcher(&provider, &["privat"]).await).await;
}

#[tokio::test]
async fn health_check_works_on_the_mailer() {
    let sendgrid = MockServer::start().await;

    assert_healthy(&TestApp::spawn_mailer(&sendgrid, None).await).await;
}
