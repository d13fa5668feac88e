use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time;

use crate::context::Context;
use crate::domain::CurrencyPair;
use crate::rates::providers::{fetch_json, positive};
use crate::rates::{RateError, RateSource};

const PROVIDER: &str = "cryptocompare";

/// min-api.cryptocompare.com, the API key travels as a query parameter.
pub struct CryptoCompareClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    pair: CurrencyPair,
    timeout: Option<time::Duration>,
}

impl CryptoCompareClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        pair: CurrencyPair,
        timeout: Option<time::Duration>,
    ) -> CryptoCompareClient {
        CryptoCompareClient {
            http_client: Client::new(),
            base_url,
            api_key,
            pair,
            timeout,
        }
    }
}

#[async_trait]
impl RateSource for CryptoCompareClient {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError> {
        let request = self
            .http_client
            .get(format!("{}/data/price", self.base_url))
            .query(&[
                ("fsym", self.pair.base.as_str()),
                ("tsyms", self.pair.target.as_str()),
                ("api_key", self.api_key.expose_secret().as_str()),
            ]);

        // Errors come back as 200 with {"Response": "Error", ...}, so only
        // numeric fields are kept.
        let prices: HashMap<String, serde_json::Value> = ctx
            .run(fetch_json(PROVIDER, request, self.timeout))
            .await??;

        let rate = prices
            .get(&self.pair.target)
            .and_then(serde_json::Value::as_f64)
            .map(|rate| rate as f32);

        positive(rate).ok_or_else(|| RateError::PairNotFound {
            provider: PROVIDER,
            pair: self.pair.clone(),
        })
    }
}
