use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use std::time;

use crate::context::Context;
use crate::domain::CurrencyPair;
use crate::rates::providers::{fetch_json, positive};
use crate::rates::{RateError, RateSource};

const PROVIDER: &str = "exchange_api";

/// fawazahmed0 currency API, served as static JSON files per base currency.
pub struct ExchangeApiClient {
    http_client: Client,
    base_url: String,
    pair: CurrencyPair,
    timeout: Option<time::Duration>,
}

impl ExchangeApiClient {
    pub fn new(
        base_url: String,
        pair: CurrencyPair,
        timeout: Option<time::Duration>,
    ) -> ExchangeApiClient {
        ExchangeApiClient {
            http_client: Client::new(),
            base_url,
            pair,
            timeout,
        }
    }
}

#[async_trait]
impl RateSource for ExchangeApiClient {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError> {
        let base = self.pair.base.to_lowercase();
        let target = self.pair.target.to_lowercase();
        let request = self
            .http_client
            .get(format!("{}/{}.json", self.base_url, base));

        // {"date": "2024-06-01", "usd": {"uah": 40.5, ...}}
        let body: HashMap<String, serde_json::Value> = ctx
            .run(fetch_json(PROVIDER, request, self.timeout))
            .await??;

        let rate = body
            .get(&base)
            .and_then(|rates| rates.get(&target))
            .and_then(serde_json::Value::as_f64)
            .map(|rate| rate as f32);

        positive(rate).ok_or_else(|| RateError::PairNotFound {
            provider: PROVIDER,
            pair: self.pair.clone(),
        })
    }
}
