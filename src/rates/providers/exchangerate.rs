use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::context::Context;
use crate::domain::CurrencyPair;
use crate::rates::providers::{fetch_json, positive};
use crate::rates::{RateError, RateSource};

const PROVIDER: &str = "exchangerate";

/// exchangerate-api.com, the API key is part of the path.
pub struct ExchangeRateClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    pair: CurrencyPair,
    timeout: Option<time::Duration>,
}

#[derive(serde::Deserialize)]
struct PairResponse {
    conversion_rate: Option<f32>,
}

impl ExchangeRateClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        pair: CurrencyPair,
        timeout: Option<time::Duration>,
    ) -> ExchangeRateClient {
        ExchangeRateClient {
            http_client: Client::new(),
            base_url,
            api_key,
            pair,
            timeout,
        }
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError> {
        let url = format!(
            "{}/{}/pair/{}/{}",
            self.base_url,
            self.api_key.expose_secret(),
            self.pair.base,
            self.pair.target
        );

        let response: PairResponse = ctx
            .run(fetch_json(PROVIDER, self.http_client.get(&url), self.timeout))
            .await??;

        positive(response.conversion_rate).ok_or_else(|| RateError::PairNotFound {
            provider: PROVIDER,
            pair: self.pair.clone(),
        })
    }
}
