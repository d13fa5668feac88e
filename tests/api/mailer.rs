use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rate_notifier::rpc::proto::Mail;
use rate_notifier::rpc::{RpcErrorBody, RpcStatus};

use crate::helpers::TestApp;

fn mail(to: Vec<&str>) -> Mail {
    Mail {
        from: "rates@test.com".into(),
        to: to.into_iter().map(String::from).collect(),
        subject: "USD to UAH rate exchange".into(),
        html: "Latest exchange rate as for 2024-05-01 09:00:00: 1 USD worth 41.50 UAH".into(),
    }
}

async fn mount(server: &MockServer, endpoint: &str, status: u16, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn send_mail_is_delivered_by_the_primary_transport() {
    let sendgrid = MockServer::start().await;
    let resend = MockServer::start().await;
    let test_app = TestApp::spawn_mailer(&sendgrid, Some(&resend)).await;

    mount(&sendgrid, "/mail/send", 202, 1).await;
    mount(&resend, "/emails", 200, 0).await;

    let response = test_app.post_rpc("SendMail", &mail(vec!["frank@test.com"])).await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn send_mail_falls_back_when_the_primary_transport_fails() {
    let sendgrid = MockServer::start().await;
    let resend = MockServer::start().await;
    let test_app = TestApp::spawn_mailer(&sendgrid, Some(&resend)).await;

    mount(&sendgrid, "/mail/send", 500, 1).await;
    mount(&resend, "/emails", 200, 1).await;

    let response = test_app.post_rpc("SendMail", &mail(vec!["frank@test.com"])).await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn send_mail_fails_when_both_transports_fail() {
    let sendgrid = MockServer::start().await;
    let resend = MockServer::start().await;
    let test_app = TestApp::spawn_mailer(&sendgrid, Some(&resend)).await;

    mount(&sendgrid, "/mail/send", 500, 1).await;
    mount(&resend, "/emails", 503, 1).await;

    let response = test_app.post_rpc("SendMail", &mail(vec!["frank@test.com"])).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: RpcErrorBody = response.json().await.unwrap();
    assert_eq!(body.code, RpcStatus::Internal);
    assert!(body.message.contains("primary transport failed"));
    assert!(body.message.contains("fallback transport failed"));
}

#[tokio::test]
async fn send_mail_without_recipients_is_rejected() {
    let sendgrid = MockServer::start().await;
    let test_app = TestApp::spawn_mailer(&sendgrid, None).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&sendgrid)
        .await;

    let response = test_app.post_rpc("SendMail", &mail(vec![])).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: RpcErrorBody = response.json().await.unwrap();
    assert_eq!(body.code, RpcStatus::InvalidArgument);
}
