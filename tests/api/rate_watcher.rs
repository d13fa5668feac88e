use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rate_notifier::rpc::proto::{Empty, RateResponse};
use rate_notifier::rpc::{RpcErrorBody, RpcStatus};

use crate::helpers::TestApp;

fn privat_body() -> serde_json::Value {
    serde_json::json!([
        { "ccy": "USD", "base_ccy": "UAH", "buy": "41.25000", "sale": "41.90000" }
    ])
}

#[tokio::test]
async fn get_rate_answers_from_the_first_provider() {
    let provider_server = MockServer::start().await;
    let test_app = TestApp::spawn_rate_watcher(&provider_server, &["exchange_api", "privat"]).await;

    Mock::given(method("GET"))
        .and(path("/usd.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "date": "2024-05-01", "usd": { "uah": 41.5 } })),
        )
        .expect(1)
        .mount(&provider_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p24api/pubinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(privat_body()))
        .expect(0)
        .mount(&provider_server)
        .await;

    let response = test_app.post_rpc("GetRate", &Empty {}).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: RateResponse = response.json().await.unwrap();
    assert_eq!(body.rate, 41.5);
}

#[tokio::test]
async fn get_rate_falls_back_to_the_next_provider() {
    let provider_server = MockServer::start().await;
    let test_app = TestApp::spawn_rate_watcher(&provider_server, &["exchange_api", "privat"]).await;

    Mock::given(method("GET"))
        .and(path("/usd.json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&provider_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/p24api/pubinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(privat_body()))
        .expect(1)
        .mount(&provider_server)
        .await;

    let response = test_app.post_rpc("GetRate", &Empty {}).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: RateResponse = response.json().await.unwrap();
    assert_eq!(body.rate, 41.25);
}

#[tokio::test]
async fn get_rate_fails_as_unavailable_when_every_provider_fails() {
    let provider_server = MockServer::start().await;
    let test_app = TestApp::spawn_rate_watcher(&provider_server, &["exchange_api", "privat"]).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&provider_server)
        .await;

    let response = test_app.post_rpc("GetRate", &Empty {}).await;

    assert_eq!(response.status().as_u16(), 503);
    let body: RpcErrorBody = response.json().await.unwrap();
    assert_eq!(body.code, RpcStatus::Unavailable);
}
