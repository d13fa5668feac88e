use async_trait::async_trait;

use crate::context::Context;
use crate::domain::OutboundMessage;
use crate::mail::{MailError, MailTransport};
use crate::rpc::proto::{Empty, SEND_MAIL};
use crate::rpc::{RetryPolicy, RpcClient};

/// Remote mail transport backed by the mailer service.
#[derive(Debug, Clone)]
pub struct MailerClient {
    rpc: RpcClient,
}

impl MailerClient {
    pub fn new(base_url: String, retry: RetryPolicy) -> MailerClient {
        MailerClient {
            rpc: RpcClient::new(base_url, retry),
        }
    }
}

#[async_trait]
impl MailTransport for MailerClient {
    fn name(&self) -> &'static str {
        "mailer service"
    }

    #[tracing::instrument(
        name = "Sending a mail through the mailer service",
        skip(self, ctx, message),
        fields(recipients = message.to.len(), subject = %message.subject)
    )]
    async fn send(&self, ctx: &Context, message: &OutboundMessage) -> Result<(), MailError> {
        let _: Empty = self.rpc.unary(ctx, SEND_MAIL, message).await?;

        Ok(())
    }
}
