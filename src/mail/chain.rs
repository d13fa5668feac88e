use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::domain::OutboundMessage;
use crate::mail::{MailError, MailTransport};

/// A primary transport with at most one fallback behind it.
///
/// The primary attempt is raced against the caller's context and dropped when
/// the context ends, which aborts the underlying request. Only failures of the
/// transport itself reach the fallback; an expired context does not.
pub struct MailDeliveryChain {
    primary: Arc<dyn MailTransport>,
    fallback: Option<Arc<dyn MailTransport>>,
}

impl MailDeliveryChain {
    pub fn new(primary: Arc<dyn MailTransport>) -> MailDeliveryChain {
        MailDeliveryChain {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn MailTransport>) -> MailDeliveryChain {
        self.fallback = Some(fallback);
        self
    }
}

#[async_trait]
impl MailTransport for MailDeliveryChain {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn send(&self, ctx: &Context, message: &OutboundMessage) -> Result<(), MailError> {
        let primary_err = match ctx.run(self.primary.send(ctx, message)).await? {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        if primary_err.is_cancelled() {
            return Err(primary_err);
        }

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };

        tracing::warn!(
            primary = self.primary.name(),
            fallback = fallback.name(),
            error = %primary_err,
            "Primary mail transport failed, trying the fallback"
        );

        let fallback_err = match ctx.run(fallback.send(ctx, message)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(err)) => err,
            Err(ctx_err) => MailError::Cancelled(ctx_err),
        };

        Err(MailError::DeliveryExhausted {
            primary: Box::new(primary_err),
            fallback: Box::new(fallback_err),
        })
    }
}
