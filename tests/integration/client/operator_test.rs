//! Operator console against a live store

use std::sync::Arc;

use assert_matches::assert_matches;

use supportdesk::client::store::ConversationStore;
use supportdesk::client::ClientError;
use supportdesk::shared::messaging::{Sender, SendMessageRequest};

use crate::common::{spawn_store, Harness, OPERATOR_PASSWORD};
use crate::wait_until;

/// Customer messages sent straight through a store handle
async fn customer_says(store: &Arc<supportdesk::client::HttpStore>, user_id: u64, text: &str) {
    store
        .send(SendMessageRequest::text(user_id, text, Sender::Customer))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_open_requires_login() {
    let store = spawn_store().await;
    let harness = Harness::new(&store.url);
    let mut console = harness.operator();

    assert!(!console.is_authenticated());
    assert_matches!(console.open(), Err(ClientError::Unauthorized));

    let err = console.login("wrong").await.unwrap_err();
    assert_matches!(err, ClientError::Unauthorized);
    assert!(!console.is_authenticated());

    console.login(OPERATOR_PASSWORD).await.unwrap();
    assert!(console.open().is_ok());
    console.close();
}

#[tokio::test]
async fn test_login_survives_restart() {
    let store = spawn_store().await;
    let harness = Harness::new(&store.url);
    harness.operator().login(OPERATOR_PASSWORD).await.unwrap();

    // A fresh client restored from the saved session file
    let restarted_side = Harness::with_session_dir(&store.url, tempfile::tempdir().unwrap());
    restarted_side
        .sessions
        .save_operator(&harness.sessions.load_operator().unwrap().unwrap())
        .unwrap();
    let restarted = restarted_side.operator();
    assert!(restarted.is_authenticated());
    restarted.open().unwrap();
    wait_until!(2000, restarted.list_status().last_applied > 0);
    assert!(restarted.is_authenticated());
}

#[tokio::test]
async fn test_new_customer_messages_raise_unread() {
    let store = spawn_store().await;
    let customer_side = Harness::new(&store.url);
    let mut operator_side = Harness::new(&store.url);

    let mut widget = customer_side.customer();
    let user_id = widget.register("buyer@example.com").await.unwrap().user_id;
    customer_says(&customer_side.store, user_id, "first").await;

    let mut console = operator_side.operator();
    console.login(OPERATOR_PASSWORD).await.unwrap();
    console.open().unwrap();
    wait_until!(2000, console.conversations().iter().any(|c| c.id == user_id && c.message_count == 1));
    // The initial load is not news
    assert!(operator_side.arrival_toasts().is_empty());

    customer_says(&customer_side.store, user_id, "second").await;
    customer_says(&customer_side.store, user_id, "third").await;
    wait_until!(2000, console.unread_for(user_id) == 2);
    assert_eq!(operator_side.notifier.unread(), 2);

    let toasts = operator_side.arrival_toasts();
    assert!(!toasts.is_empty());
    assert!(toasts.iter().all(|t| t.ends_with("buyer@example.com")));

    console.select(user_id).unwrap();
    assert_eq!(console.unread_for(user_id), 0);
    assert_eq!(operator_side.notifier.title(), "Shop");
    wait_until!(2000, console.messages().len() == 3);
    console.close();
}

#[tokio::test]
async fn test_clear_conversation_after_confirmation() {
    let store = spawn_store().await;
    let customer_side = Harness::new(&store.url);
    let mut operator_side = Harness::new(&store.url);

    let mut widget = customer_side.customer();
    let user_id = widget.register("buyer@example.com").await.unwrap().user_id;
    customer_says(&customer_side.store, user_id, "one").await;
    customer_says(&customer_side.store, user_id, "two").await;

    let mut console = operator_side.operator();
    console.login(OPERATOR_PASSWORD).await.unwrap();
    console.open().unwrap();
    console.select(user_id).unwrap();
    wait_until!(2000, console.messages().len() == 2);

    let declined = console
        .clear_conversation(user_id, &|_: &str| false)
        .await
        .unwrap();
    assert!(!declined);
    assert_eq!(store.state.repository.messages(user_id).await.unwrap().len(), 2);

    let cleared = console
        .clear_conversation(user_id, &|_: &str| true)
        .await
        .unwrap();
    assert!(cleared);
    assert!(console.messages().is_empty());
    wait_until!(2000, console.conversations().iter().any(|c| c.id == user_id && c.message_count == 0));
    operator_side.drain();

    // Counting restarts from zero; the first message after a clear is quiet
    customer_says(&customer_side.store, user_id, "back again").await;
    wait_until!(2000, console.conversations().iter().any(|c| c.id == user_id && c.message_count == 1));
    assert!(operator_side.arrival_toasts().is_empty());

    console.deselect();
    customer_says(&customer_side.store, user_id, "hello?").await;
    wait_until!(2000, console.unread_for(user_id) == 1);
    assert_eq!(
        operator_side.arrival_toasts(),
        vec!["New message from buyer@example.com".to_string()]
    );
    console.close();
}
