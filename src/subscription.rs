use std::sync::Arc;

use crate::context::Context;
use crate::domain::SubscriberEmail;
use crate::rpc::{RpcError, RpcStatus};
use crate::storage::{StorageError, SubscriberSaver};

#[derive(thiserror::Error, Debug)]
pub enum SubscribeError {
    #[error("{0}")]
    Validation(String),
    #[error("subscriber already exists")]
    AlreadyExists,
    #[error("failed to store the subscriber")]
    Storage(#[source] StorageError),
    #[error("subscription was interrupted")]
    Cancelled(#[from] crate::context::ContextError),
}

impl From<StorageError> for SubscribeError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExists => SubscribeError::AlreadyExists,
            err => SubscribeError::Storage(err),
        }
    }
}

impl From<SubscribeError> for RpcError {
    fn from(err: SubscribeError) -> Self {
        match err {
            SubscribeError::Validation(message) => {
                RpcError::new(RpcStatus::InvalidArgument, message)
            }
            SubscribeError::AlreadyExists => {
                RpcError::new(RpcStatus::AlreadyExists, err.to_string())
            }
            SubscribeError::Cancelled(ctx_err) => RpcError::from(ctx_err),
            SubscribeError::Storage(_) => RpcError::new(RpcStatus::Internal, err.to_string()),
        }
    }
}

/// Validates and persists new subscribers.
pub struct SubscriptionService {
    saver: Arc<dyn SubscriberSaver>,
}

impl SubscriptionService {
    pub fn new(saver: Arc<dyn SubscriberSaver>) -> SubscriptionService {
        SubscriptionService { saver }
    }

    #[tracing::instrument(
        name = "Creating a new subscriber",
        skip(self, ctx, email),
        fields(subscriber_email = %email)
    )]
    pub async fn subscribe(&self, ctx: &Context, email: &str) -> Result<i64, SubscribeError> {
        let email = SubscriberEmail::parse(email.trim().to_string()).map_err(|err| {
            tracing::error!("Validation error: {:?}", err);
            SubscribeError::Validation(err)
        })?;

        let id = ctx.run(self.saver.save(&email)).await??;

        tracing::info!(subscriber_id = id, "Subscriber saved");

        Ok(id)
    }
}
