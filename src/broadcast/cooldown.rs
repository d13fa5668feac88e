use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::broadcast::{Broadcast, BroadcastError};
use crate::context::Context;
use crate::storage::LastBroadcastStore;

/// Lets at most one broadcast succeed per `interval`, across restarts and
/// across concurrent triggers.
///
/// The inner broadcast only runs after the slot was claimed in the store.
/// A success records `now` as the last send, a failure only drops the claim
/// so the next trigger tries again even inside the window.
pub struct CooldownGate<B> {
    interval: Duration,
    lease: Duration,
    store: Arc<dyn LastBroadcastStore>,
    inner: B,
}

impl<B: Broadcast> CooldownGate<B> {
    pub fn new(
        interval: Duration,
        lease: Duration,
        store: Arc<dyn LastBroadcastStore>,
        inner: B,
    ) -> CooldownGate<B> {
        CooldownGate {
            interval,
            lease,
            store,
            inner,
        }
    }
}

#[async_trait]
impl<B: Broadcast> Broadcast for CooldownGate<B> {
    async fn send(&self, ctx: &Context) -> Result<(), BroadcastError> {
        let now = Utc::now();

        let claimed = ctx
            .run(self.store.try_claim(now, self.interval, self.lease))
            .await?
            .map_err(BroadcastError::LastBroadcast)?;

        if !claimed {
            tracing::info!(
                cooldown_seconds = self.interval.num_seconds(),
                "Broadcast skipped, the last one is too recent or still running"
            );
            return Ok(());
        }

        match self.inner.send(ctx).await {
            Ok(()) => self
                .store
                .complete(now)
                .await
                .map_err(BroadcastError::LastBroadcast),
            Err(err) => {
                if let Err(release_err) = self.store.release().await {
                    tracing::error!(
                        error = ?release_err,
                        "Failed to release the broadcast claim"
                    );
                }
                Err(err)
            }
        }
    }
}
