//! The rate newsletter: who gets it, what it says and how often it goes out.

pub mod cooldown;
pub mod formatter;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::context::{Context, ContextError};
use crate::domain::OutboundMessage;
use crate::mail::{MailError, MailTransport};
use crate::rates::{RateError, RateSource};
use crate::storage::{StorageError, SubscriberLister};

pub use cooldown::CooldownGate;
pub use formatter::RateFormatter;

/// One complete broadcast cycle.
#[async_trait]
pub trait Broadcast: Send + Sync {
    async fn send(&self, ctx: &Context) -> Result<(), BroadcastError>;
}

#[derive(thiserror::Error, Debug)]
pub enum BroadcastError {
    #[error("there are no subscribers to send the rate to")]
    NoRecipients,
    #[error("failed to list subscribers")]
    Subscribers(#[source] StorageError),
    #[error("failed to get the current rate")]
    Rate(#[from] RateError),
    #[error("failed to deliver the broadcast")]
    Delivery(#[from] MailError),
    #[error("failed to access the last broadcast record")]
    LastBroadcast(#[source] StorageError),
    #[error("broadcast was interrupted")]
    Cancelled(#[from] ContextError),
}

/// Lists subscribers, quotes the rate and mails it to all of them.
/// Any failing stage ends the cycle.
pub struct BroadcastSender {
    subscribers: Arc<dyn SubscriberLister>,
    rates: Arc<dyn RateSource>,
    mailer: Arc<dyn MailTransport>,
    formatter: RateFormatter,
    sender_email: String,
}

impl BroadcastSender {
    pub fn new(
        subscribers: Arc<dyn SubscriberLister>,
        rates: Arc<dyn RateSource>,
        mailer: Arc<dyn MailTransport>,
        formatter: RateFormatter,
        sender_email: String,
    ) -> BroadcastSender {
        BroadcastSender {
            subscribers,
            rates,
            mailer,
            formatter,
            sender_email,
        }
    }
}

#[async_trait]
impl Broadcast for BroadcastSender {
    #[tracing::instrument(
        name = "Broadcasting the rate to subscribers",
        skip(self, ctx),
        fields(run_id = %uuid::Uuid::new_v4())
    )]
    async fn send(&self, ctx: &Context) -> Result<(), BroadcastError> {
        let subscribers = ctx
            .run(self.subscribers.list())
            .await?
            .map_err(BroadcastError::Subscribers)?;

        if subscribers.is_empty() {
            return Err(BroadcastError::NoRecipients);
        }

        let rate = self.rates.convert(ctx).await?;

        let message = OutboundMessage {
            from: self.sender_email.clone(),
            to: subscribers
                .into_iter()
                .map(|subscriber| subscriber.email.to_string())
                .collect(),
            subject: self.formatter.subject(),
            html: self.formatter.format(rate, Utc::now()),
        };

        self.mailer.send(ctx, &message).await?;

        tracing::info!(recipients = message.to.len(), rate, "Broadcast delivered");

        Ok(())
    }
}
