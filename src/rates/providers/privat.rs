use async_trait::async_trait;
use reqwest::Client;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time;

use crate::context::Context;
use crate::domain::CurrencyPair;
use crate::rates::providers::{fetch_json, positive};
use crate::rates::{RateError, RateSource};

const PROVIDER: &str = "privat";

/// PrivatBank public exchange API, no authentication. Quotes are always against UAH.
pub struct PrivatClient {
    http_client: Client,
    base_url: String,
    pair: CurrencyPair,
    timeout: Option<time::Duration>,
}

#[derive(serde::Deserialize)]
struct ExchangeRate {
    ccy: String,
    base_ccy: String,
    // Privat sends numbers as strings, e.g. "41.05000".
    #[serde(deserialize_with = "deserialize_number_from_string")]
    buy: f32,
}

impl PrivatClient {
    pub fn new(
        base_url: String,
        pair: CurrencyPair,
        timeout: Option<time::Duration>,
    ) -> PrivatClient {
        PrivatClient {
            http_client: Client::new(),
            base_url,
            pair,
            timeout,
        }
    }
}

#[async_trait]
impl RateSource for PrivatClient {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError> {
        let request = self
            .http_client
            .get(format!("{}/p24api/pubinfo?json&exchange", self.base_url));

        let rates: Vec<ExchangeRate> = ctx
            .run(fetch_json(PROVIDER, request, self.timeout))
            .await??;

        let rate = rates
            .iter()
            .find(|rate| rate.ccy == self.pair.base && rate.base_ccy == self.pair.target)
            .map(|rate| rate.buy);

        positive(rate).ok_or_else(|| RateError::PairNotFound {
            provider: PROVIDER,
            pair: self.pair.clone(),
        })
    }
}
