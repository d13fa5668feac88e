use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use crate::domain::{Subscriber, SubscriberEmail};
use crate::storage::{StorageError, SubscriberLister, SubscriberSaver};

#[derive(Debug, Clone)]
pub struct PostgresSubscribers {
    db_pool: PgPool,
}

impl PostgresSubscribers {
    pub fn new(db_pool: PgPool) -> PostgresSubscribers {
        PostgresSubscribers { db_pool }
    }
}

#[async_trait]
impl SubscriberSaver for PostgresSubscribers {
    #[tracing::instrument(
        name = "Insert a new subscriber into the database",
        skip(self, email),
        fields(subscriber_email = %email)
    )]
    async fn save(&self, email: &SubscriberEmail) -> Result<i64, StorageError> {
        let id = sqlx::query(
            r#"
            INSERT INTO subscribers (email, created_at)
            VALUES ($1, now())
            RETURNING id
            "#,
        )
        .bind(email.as_ref())
        .map(|row: PgRow| row.get::<i64, _>("id"))
        .fetch_one(&self.db_pool)
        .await
        .map_err(|err| {
            let err = StorageError::from(err);
            if !matches!(err, StorageError::AlreadyExists) {
                tracing::error!("Failed to execute query: {:?}", err);
            }
            err
        })?;

        Ok(id)
    }
}

#[async_trait]
impl SubscriberLister for PostgresSubscribers {
    #[tracing::instrument(name = "Listing subscribers", skip(self))]
    async fn list(&self) -> Result<Vec<Subscriber>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, email, created_at
            FROM subscribers
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db_pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<Subscriber, StorageError> {
                Ok(Subscriber {
                    id: row.try_get("id")?,
                    email: SubscriberEmail::parse(row.try_get("email")?)
                        .map_err(StorageError::Corrupted)?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}
