//! PgRepository against a real database

use serial_test::serial;
use sqlx::PgPool;

use supportdesk::backend::server::config::run_migrations;
use supportdesk::backend::store::{ChatRepository, NewMessage, PgRepository};
use supportdesk::shared::messaging::Sender;

/// Connect, migrate and truncate; `None` when no test database is configured
async fn test_repository() -> Option<PgRepository> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping Postgres test");
        return None;
    };
    let pool = PgPool::connect(&url).await.expect("Failed to connect to test database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    sqlx::query("TRUNCATE TABLE chat_messages, chat_users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .unwrap();
    Some(PgRepository::new(pool))
}

fn customer(user_id: u64, text: &str) -> NewMessage {
    NewMessage {
        user_id,
        text: text.to_string(),
        image: None,
        sender: Sender::Customer,
    }
}

#[tokio::test]
#[serial]
async fn test_register_is_idempotent() {
    let Some(repo) = test_repository().await else { return };
    let first = repo.register("buyer@example.com").await.unwrap();
    let again = repo.register("buyer@example.com").await.unwrap();
    assert_eq!(first, again);
    assert!(repo.user_exists(first.id).await.unwrap());
}

#[tokio::test]
#[serial]
async fn test_append_list_and_clear() {
    let Some(repo) = test_repository().await else { return };
    let user = repo.register("buyer@example.com").await.unwrap();

    let a = repo.append(customer(user.id, "hello")).await.unwrap();
    let b = repo
        .append(NewMessage {
            user_id: user.id,
            text: "hi there".to_string(),
            image: None,
            sender: Sender::Operator,
        })
        .await
        .unwrap();
    assert!(a.id < b.id);

    let log = repo.messages(user.id).await.unwrap();
    assert_eq!(log.iter().map(|m| m.sender).collect::<Vec<_>>(), [Sender::Customer, Sender::Operator]);

    let list = repo.conversations().await.unwrap();
    assert_eq!(list[0].message_count, 1);
    assert_eq!(list[0].last_message_preview.as_deref(), Some("hello"));

    assert_eq!(repo.clear(user.id).await.unwrap(), 2);
    assert!(repo.messages(user.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_conversations_order_nulls_last() {
    let Some(repo) = test_repository().await else { return };
    let silent = repo.register("silent@example.com").await.unwrap();
    let early = repo.register("early@example.com").await.unwrap();
    let late = repo.register("late@example.com").await.unwrap();
    repo.append(customer(early.id, "one")).await.unwrap();
    repo.append(customer(late.id, "two")).await.unwrap();

    let ids: Vec<u64> = repo.conversations().await.unwrap().iter().map(|c| c.id).collect();
    assert_eq!(ids, [late.id, early.id, silent.id]);
}
