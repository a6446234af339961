//! Postgres store tests.
//!
//! Run against a disposable database:
//! `TEST_DATABASE_URL=postgres://... cargo test -p persistence -- --ignored`

use domain::models::PENDING_PRIZE;
use domain::services::SubmissionStore;
use persistence::db::{create_pool, DatabaseConfig};
use persistence::PgSubmissionStore;
use shared::pagination::Cursor;

async fn setup() -> PgSubmissionStore {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = create_pool(&DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        connect_timeout_secs: 10,
        idle_timeout_secs: 60,
    })
    .await
    .expect("failed to connect");

    sqlx::migrate!("src/migrations")
        .run(&pool)
        .await
        .expect("failed to migrate");
    sqlx::query("TRUNCATE email_submissions, allowed_emails RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("failed to truncate");

    PgSubmissionStore::new(pool)
}

#[tokio::test]
#[ignore]
async fn test_upsert_keeps_claimed_prize() {
    let store = setup().await;

    let pending = store
        .upsert_submission("a@example.com", Some("Ann"), PENDING_PRIZE)
        .await
        .unwrap();
    assert_eq!(pending.prize_won, PENDING_PRIZE);

    let claimed = store
        .upsert_submission("a@example.com", None, "FREE RENT")
        .await
        .unwrap();
    assert_eq!(claimed.id, pending.id);
    assert_eq!(claimed.name.as_deref(), Some("Ann"));
    assert_eq!(claimed.prize_won, "FREE RENT");

    let again = store
        .upsert_submission("a@example.com", Some("Bob"), PENDING_PRIZE)
        .await
        .unwrap();
    assert_eq!(again.prize_won, "FREE RENT");
    assert_eq!(again.name.as_deref(), Some("Ann"));
}

#[tokio::test]
#[ignore]
async fn test_allow_list_batch_and_listing() {
    let store = setup().await;

    assert!(store.add_allowed("x@a.com").await.unwrap());
    assert!(!store.add_allowed("x@a.com").await.unwrap());

    let added = store
        .add_allowed_batch(&["x@a.com".to_string(), "y@b.com".to_string()])
        .await
        .unwrap();
    assert_eq!(added, 1);
    assert!(store.is_allowed("y@b.com").await.unwrap());
    assert!(!store.is_allowed("z@c.com").await.unwrap());

    let (entries, total) = store.list_allowed(1, 0).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_submission_keyset_pagination() {
    let store = setup().await;
    for email in ["a@x.io", "b@x.io", "c@x.io"] {
        store
            .upsert_submission(email, None, PENDING_PRIZE)
            .await
            .unwrap();
    }

    let first = store.list_submissions(None, 2).await.unwrap();
    assert_eq!(first.len(), 2);

    let last = &first[1];
    let rest = store
        .list_submissions(Some(Cursor::new(last.created_at, last.id)), 2)
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
    assert!(first.iter().all(|s| s.id != rest[0].id));
    assert!(store.health_check().await);
}
