use async_trait::async_trait;

use crate::context::Context;
use crate::rates::{RateError, RateSource};
use crate::rpc::proto::{Empty, RateResponse, GET_RATE};
use crate::rpc::{RetryPolicy, RpcClient, RpcError};

/// Remote rate source backed by the rate watcher service.
#[derive(Debug, Clone)]
pub struct RateWatcherClient {
    rpc: RpcClient,
}

impl RateWatcherClient {
    pub fn new(base_url: String, retry: RetryPolicy) -> RateWatcherClient {
        RateWatcherClient {
            rpc: RpcClient::new(base_url, retry),
        }
    }

    #[tracing::instrument(name = "Requesting the current rate from the rate watcher", skip(self, ctx))]
    pub async fn get_rate(&self, ctx: &Context) -> Result<f32, RpcError> {
        let response: RateResponse = self.rpc.unary(ctx, GET_RATE, &Empty {}).await?;

        Ok(response.rate)
    }
}

#[async_trait]
impl RateSource for RateWatcherClient {
    async fn convert(&self, ctx: &Context) -> Result<f32, RateError> {
        Ok(self.get_rate(ctx).await?)
    }
}
