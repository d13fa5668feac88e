use crate::context::Context;
use crate::rpc::proto::{Empty, SubscribeRequest, SUBSCRIBE};
use crate::rpc::{RetryPolicy, RpcClient, RpcError};

#[derive(Debug, Clone)]
pub struct SubscriptionClient {
    rpc: RpcClient,
}

impl SubscriptionClient {
    pub fn new(base_url: String, retry: RetryPolicy) -> SubscriptionClient {
        SubscriptionClient {
            rpc: RpcClient::new(base_url, retry),
        }
    }

    #[tracing::instrument(name = "Subscribing through the subscription service", skip(self, ctx))]
    pub async fn subscribe(&self, ctx: &Context, email: &str) -> Result<(), RpcError> {
        let request = SubscribeRequest {
            email: email.to_string(),
        };
        let _: Empty = self.rpc.unary(ctx, SUBSCRIBE, &request).await?;

        Ok(())
    }
}
