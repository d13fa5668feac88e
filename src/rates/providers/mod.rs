//! Third party exchange rate APIs. Each one answers for the configured pair or fails.

pub mod cryptocompare;
pub mod exchange_api;
pub mod exchangerate;
pub mod privat;

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::rates::RateError;

pub use cryptocompare::CryptoCompareClient;
pub use exchange_api::ExchangeApiClient;
pub use exchangerate::ExchangeRateClient;
pub use privat::PrivatClient;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

async fn fetch_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
    timeout: Option<Duration>,
) -> Result<T, RateError> {
    let to_rate_error = |source| RateError::Request { provider, source };

    request
        .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
        .send()
        .await
        .map_err(to_rate_error)?
        .error_for_status() // return an error when server response status code is 4xx or 5xx
        .map_err(to_rate_error)?
        .json::<T>()
        .await
        .map_err(to_rate_error)
}

fn positive(rate: Option<f32>) -> Option<f32> {
    rate.filter(|rate| rate.is_finite() && *rate > 0.0)
}
