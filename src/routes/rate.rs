use actix_web::{web, HttpResponse, ResponseError};
use reqwest::StatusCode;

use crate::context::Context;
use crate::rpc::clients::RateWatcherClient;
use crate::rpc::RpcError;
use crate::startup::gateway::RequestTimeouts;

#[tracing::instrument(name = "Get current rate handler", skip(rate_watcher, timeouts))]
pub async fn get_rate(
    rate_watcher: web::Data<RateWatcherClient>,
    timeouts: web::Data<RequestTimeouts>,
) -> Result<HttpResponse, GetRateError> {
    let ctx = Context::with_timeout(timeouts.rate);
    let rate = rate_watcher
        .get_rate(&ctx)
        .await
        .map_err(GetRateError::RateWatcher)?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(rate.to_string()))
}

#[derive(thiserror::Error)]
pub enum GetRateError {
    #[error("Failed to get the current rate: {0}")]
    RateWatcher(#[source] RpcError),
}

impl std::fmt::Debug for GetRateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Caused by:\n\t({})", self)
    }
}

impl ResponseError for GetRateError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}
