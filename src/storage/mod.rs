//! Postgres backed persistence for subscribers and the broadcast cooldown record.

pub mod last_broadcast;
pub mod subscriber;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseSettings;
use crate::domain::{Subscriber, SubscriberEmail};

pub use last_broadcast::PostgresLastBroadcast;
pub use subscriber::PostgresSubscribers;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("subscriber already exists")]
    AlreadyExists,
    #[error("stored row is corrupted: {0}")]
    Corrupted(String),
    #[error("failed to execute query")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        let is_unique_violation = err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code == UNIQUE_VIOLATION)
            .unwrap_or(false);

        if is_unique_violation {
            StorageError::AlreadyExists
        } else {
            StorageError::Database(err)
        }
    }
}

#[async_trait]
pub trait SubscriberSaver: Send + Sync {
    /// Persists a new subscriber and returns the id storage assigned to it.
    async fn save(&self, email: &SubscriberEmail) -> Result<i64, StorageError>;
}

#[async_trait]
pub trait SubscriberLister: Send + Sync {
    async fn list(&self) -> Result<Vec<Subscriber>, StorageError>;
}

/// The singleton record guarding broadcasts.
///
/// A broadcast runs only while it holds the claim. `try_claim` takes it in a
/// single atomic step when the last successful broadcast is at least `cooldown`
/// old and nobody holds an unexpired claim. `complete` moves `last_sent`
/// forward (never backwards) and drops the claim; `release` only drops it.
#[async_trait]
pub trait LastBroadcastStore: Send + Sync {
    async fn try_claim(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
        lease: Duration,
    ) -> Result<bool, StorageError>;

    async fn complete(&self, at: DateTime<Utc>) -> Result<(), StorageError>;

    async fn release(&self) -> Result<(), StorageError>;
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
