use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::storage::{LastBroadcastStore, StorageError};

const SINGLETON_ID: i32 = 1;

#[derive(Debug, Clone)]
pub struct PostgresLastBroadcast {
    db_pool: PgPool,
}

impl PostgresLastBroadcast {
    pub fn new(db_pool: PgPool) -> PostgresLastBroadcast {
        PostgresLastBroadcast { db_pool }
    }
}

#[async_trait]
impl LastBroadcastStore for PostgresLastBroadcast {
    #[tracing::instrument(name = "Claiming the broadcast slot", skip(self))]
    async fn try_claim(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
        lease: Duration,
    ) -> Result<bool, StorageError> {
        // The conditional upsert is a single statement, so two concurrent
        // claimers can never both get a row back.
        let claimed = sqlx::query(
            r#"
            INSERT INTO last_broadcast (id, last_sent, claimed_at)
            VALUES ($1, NULL, $2)
            ON CONFLICT (id) DO UPDATE SET claimed_at = EXCLUDED.claimed_at
            WHERE (last_broadcast.last_sent IS NULL OR last_broadcast.last_sent <= $3)
              AND (last_broadcast.claimed_at IS NULL OR last_broadcast.claimed_at <= $4)
            RETURNING id
            "#,
        )
        .bind(SINGLETON_ID)
        .bind(now)
        .bind(now - cooldown)
        .bind(now - lease)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(claimed.is_some())
    }

    #[tracing::instrument(name = "Recording a successful broadcast", skip(self))]
    async fn complete(&self, at: DateTime<Utc>) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO last_broadcast (id, last_sent, claimed_at)
            VALUES ($1, $2, NULL)
            ON CONFLICT (id) DO UPDATE
            SET last_sent = GREATEST(last_broadcast.last_sent, EXCLUDED.last_sent),
                claimed_at = NULL
            "#,
        )
        .bind(SINGLETON_ID)
        .bind(at)
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    async fn release(&self) -> Result<(), StorageError> {
        sqlx::query("UPDATE last_broadcast SET claimed_at = NULL WHERE id = $1")
            .bind(SINGLETON_ID)
            .execute(&self.db_pool)
            .await?;

        Ok(())
    }
}
