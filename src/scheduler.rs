//! Recurring execution of a unit of work, every `d` or daily at a UTC time.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::broadcast::{Broadcast, BroadcastError};
use crate::context::Context;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Every(Duration),
    DailyAt { hour: u32, minute: u32 },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("interval must be greater than zero")]
    ZeroInterval,
    #[error("{hour:02}:{minute:02} is not a valid time of day")]
    InvalidTime { hour: u32, minute: u32 },
}

#[derive(thiserror::Error, Debug)]
pub enum SchedulerTaskError {
    #[error("scheduled broadcast failed")]
    Broadcast(#[from] BroadcastError),
}

/// A zero argument unit of work driven by the scheduler.
#[async_trait]
pub trait Doer: Send + Sync {
    async fn run(&self) -> Result<(), SchedulerTaskError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    AwaitingFirstFire { delay: Duration, then: Duration },
    SteadyInterval { period: Duration },
}

impl ScheduleState {
    /// How long to wait for the next fire while in this state.
    pub fn delay(&self) -> Duration {
        match self {
            ScheduleState::AwaitingFirstFire { delay, .. } => *delay,
            ScheduleState::SteadyInterval { period } => *period,
        }
    }

    pub fn on_fire(self) -> ScheduleState {
        match self {
            ScheduleState::AwaitingFirstFire { then, .. } => {
                ScheduleState::SteadyInterval { period: then }
            }
            steady @ ScheduleState::SteadyInterval { .. } => steady,
        }
    }
}

/// Delay from `now` until the next `hour:minute` UTC. A target equal to `now`
/// counts as already passed, so the delay is always positive.
pub fn delay_until_daily(
    now: DateTime<Utc>,
    hour: u32,
    minute: u32,
) -> Result<Duration, ScheduleError> {
    let today = now
        .date_naive()
        .and_hms_opt(hour, minute, 0)
        .ok_or(ScheduleError::InvalidTime { hour, minute })?;
    let mut target = Utc.from_utc_datetime(&today);

    if target <= now {
        target = target + chrono::Duration::days(1);
    }

    Ok((target - now).to_std().unwrap_or(DAY))
}

#[derive(Debug)]
pub struct Scheduler {
    state: ScheduleState,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn every(period: Duration) -> Result<Scheduler, ScheduleError> {
        if period.is_zero() {
            return Err(ScheduleError::ZeroInterval);
        }

        Ok(Scheduler::with_state(ScheduleState::SteadyInterval { period }))
    }

    pub fn daily_at(hour: u32, minute: u32) -> Result<Scheduler, ScheduleError> {
        Scheduler::daily_at_from(Utc::now(), hour, minute)
    }

    pub fn daily_at_from(
        now: DateTime<Utc>,
        hour: u32,
        minute: u32,
    ) -> Result<Scheduler, ScheduleError> {
        let delay = delay_until_daily(now, hour, minute)?;

        Ok(Scheduler::with_state(ScheduleState::AwaitingFirstFire {
            delay,
            then: DAY,
        }))
    }

    pub fn from_trigger(trigger: Trigger) -> Result<Scheduler, ScheduleError> {
        match trigger {
            Trigger::Every(period) => Scheduler::every(period),
            Trigger::DailyAt { hour, minute } => Scheduler::daily_at(hour, minute),
        }
    }

    fn with_state(state: ScheduleState) -> Scheduler {
        Scheduler {
            state,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    /// Cancelling the token stops the loop between runs. A run in progress finishes first.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawns the tick loop. Runs never overlap; ticks that pass while a run
    /// is still going are skipped, not queued. A failed run is logged and the
    /// loop keeps going.
    pub fn schedule<D>(self, doer: D) -> JoinHandle<()>
    where
        D: Doer + 'static,
    {
        let Scheduler {
            mut state,
            shutdown,
        } = self;

        tokio::spawn(async move {
            let mut next = Instant::now() + state.delay();

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        tracing::info!("Scheduler stopped");
                        return;
                    }
                    _ = sleep_until(next) => {}
                }

                if let Err(err) = doer.run().await {
                    tracing::error!(error = ?err, "Scheduled task failed");
                }

                state = state.on_fire();
                let period = state.delay();
                next += period;

                let now = Instant::now();
                let mut skipped = 0;
                while next <= now {
                    next += period;
                    skipped += 1;
                }
                if skipped > 0 {
                    tracing::warn!(skipped, "Scheduled task overran, skipping missed ticks");
                }
            }
        })
    }
}

/// Runs a broadcast from the scheduler, each run under a fresh bounded context.
pub struct SendAdapter<B> {
    inner: B,
    timeout: Duration,
}

impl<B: Broadcast> SendAdapter<B> {
    pub fn new(inner: B, timeout: Duration) -> SendAdapter<B> {
        SendAdapter { inner, timeout }
    }
}

#[async_trait]
impl<B: Broadcast> Doer for SendAdapter<B> {
    async fn run(&self) -> Result<(), SchedulerTaskError> {
        let ctx = Context::with_timeout(self.timeout);

        Ok(self.inner.send(&ctx).await?)
    }
}
