use chrono::{DateTime, Duration, TimeZone, Utc};
use claim::{assert_err, assert_ok};
use sqlx::{PgPool, Row};

use rate_notifier::domain::SubscriberEmail;
use rate_notifier::storage::{
    LastBroadcastStore, PostgresLastBroadcast, PostgresSubscribers, StorageError,
    SubscriberLister, SubscriberSaver,
};

use crate::helpers::test_db_pool;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0).unwrap()
}

async fn stored_record(db_pool: &PgPool) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    let row = sqlx::query("SELECT last_sent, claimed_at FROM last_broadcast WHERE id = 1")
        .fetch_one(db_pool)
        .await
        .expect("Failed to fetch the last broadcast record.");

    (row.get("last_sent"), row.get("claimed_at"))
}

fn email(address: &str) -> SubscriberEmail {
    SubscriberEmail::parse(address.to_string()).unwrap()
}

#[tokio::test]
async fn only_one_of_two_concurrent_claims_wins() {
    let db_pool = test_db_pool().await;
    let first = PostgresLastBroadcast::new(db_pool.clone());
    let second = PostgresLastBroadcast::new(db_pool.clone());
    let now = at(9, 0);

    let (first_claim, second_claim) = tokio::join!(
        first.try_claim(now, Duration::hours(1), Duration::minutes(5)),
        second.try_claim(now, Duration::hours(1), Duration::minutes(5)),
    );

    let wins = [assert_ok!(first_claim), assert_ok!(second_claim)]
        .iter()
        .filter(|claimed| **claimed)
        .count();
    assert_eq!(wins, 1);
}

#[tokio::test]
async fn claim_inside_the_cooldown_is_refused() {
    let db_pool = test_db_pool().await;
    let store = PostgresLastBroadcast::new(db_pool.clone());

    assert_ok!(store.complete(at(9, 0)).await);

    let claimed = store
        .try_claim(at(9, 30), Duration::hours(1), Duration::minutes(5))
        .await;
    assert!(!assert_ok!(claimed));

    let claimed = store
        .try_claim(at(10, 0), Duration::hours(1), Duration::minutes(5))
        .await;
    assert!(assert_ok!(claimed));
}

#[tokio::test]
async fn expired_claim_can_be_taken_over() {
    let db_pool = test_db_pool().await;
    let store = PostgresLastBroadcast::new(db_pool.clone());
    let cooldown = Duration::hours(1);
    let lease = Duration::minutes(5);

    assert!(assert_ok!(store.try_claim(at(9, 0), cooldown, lease).await));
    assert!(!assert_ok!(store.try_claim(at(9, 4), cooldown, lease).await));
    assert!(assert_ok!(store.try_claim(at(9, 10), cooldown, lease).await));

    assert_eq!(stored_record(&db_pool).await, (None, Some(at(9, 10))));
}

#[tokio::test]
async fn complete_never_moves_last_sent_backwards() {
    let db_pool = test_db_pool().await;
    let store = PostgresLastBroadcast::new(db_pool.clone());

    assert_ok!(store.complete(at(12, 0)).await);
    assert_ok!(store.complete(at(11, 0)).await);

    assert_eq!(stored_record(&db_pool).await, (Some(at(12, 0)), None));
}

#[tokio::test]
async fn release_drops_the_claim_and_keeps_last_sent() {
    let db_pool = test_db_pool().await;
    let store = PostgresLastBroadcast::new(db_pool.clone());
    let cooldown = Duration::hours(1);
    let lease = Duration::minutes(5);

    assert_ok!(store.complete(at(9, 0)).await);
    assert!(assert_ok!(store.try_claim(at(11, 0), cooldown, lease).await));

    assert_ok!(store.release().await);

    assert_eq!(stored_record(&db_pool).await, (Some(at(9, 0)), None));
    assert!(assert_ok!(store.try_claim(at(11, 1), cooldown, lease).await));
}

#[tokio::test]
async fn saving_the_same_email_twice_is_a_conflict() {
    let db_pool = test_db_pool().await;
    let subscribers = PostgresSubscribers::new(db_pool);

    assert_ok!(subscribers.save(&email("frank@test.com")).await);
    let err = assert_err!(subscribers.save(&email("frank@test.com")).await);

    assert!(matches!(err, StorageError::AlreadyExists));
}

#[tokio::test]
async fn list_returns_subscribers_in_insertion_order() {
    let db_pool = test_db_pool().await;
    let subscribers = PostgresSubscribers::new(db_pool);

    let first = assert_ok!(subscribers.save(&email("frank@test.com")).await);
    let second = assert_ok!(subscribers.save(&email("ana@test.com")).await);

    let listed = assert_ok!(subscribers.list().await);

    let listed: Vec<_> = listed
        .iter()
        .map(|subscriber| (subscriber.id, subscriber.email.to_string()))
        .collect();
    assert_eq!(
        listed,
        vec![
            (first, "frank@test.com".to_string()),
            (second, "ana@test.com".to_string())
        ]
    );
}
