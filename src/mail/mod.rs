//! Outbound mail transports and the primary/fallback delivery chain.

pub mod chain;
pub mod resend;
pub mod sendgrid;

use async_trait::async_trait;

use crate::context::{Context, ContextError};
use crate::domain::OutboundMessage;
use crate::rpc::RpcError;

pub use chain::MailDeliveryChain;
pub use resend::ResendClient;
pub use sendgrid::SendGridClient;

#[async_trait]
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, ctx: &Context, message: &OutboundMessage) -> Result<(), MailError>;
}

#[derive(thiserror::Error, Debug)]
pub enum MailError {
    #[error("{transport}: failed to send message")]
    Request {
        transport: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{transport}: recipients cannot be empty")]
    EmptyRecipients { transport: &'static str },
    #[error("failed to send message through the mailer service")]
    Rpc(#[from] RpcError),
    #[error("primary transport failed: {primary}; fallback transport failed: {fallback}")]
    DeliveryExhausted {
        #[source]
        primary: Box<MailError>,
        fallback: Box<MailError>,
    },
    #[error("mail delivery was interrupted")]
    Cancelled(#[from] ContextError),
}

impl MailError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, MailError::Cancelled(_))
    }

    /// Both causes of an exhausted delivery, primary first.
    pub fn causes(&self) -> Option<(&MailError, &MailError)> {
        match self {
            MailError::DeliveryExhausted { primary, fallback } => Some((primary, fallback)),
            _ => None,
        }
    }
}
