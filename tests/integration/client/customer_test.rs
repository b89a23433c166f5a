//! Customer widget against a live store

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use supportdesk::client::composer::image_mime;
use supportdesk::client::ErrorKind;
use supportdesk::shared::messaging::Sender;

use crate::common::{spawn_store, Harness, OPERATOR_PASSWORD};
use crate::{assert_ok, wait_until};

#[tokio::test]
async fn test_register_persists_and_restores_session() {
    let store = spawn_store().await;
    let harness = Harness::new(&store.url);

    let mut widget = harness.customer();
    let session = assert_ok!(widget.register("  Buyer@Example.com ").await).clone();
    assert_eq!(session.email, "buyer@example.com");

    // A fresh widget over the same session directory picks the customer up
    let restored = harness.customer();
    assert_eq!(restored.session(), Some(&session));
}

#[tokio::test]
async fn test_send_before_registering_is_rejected() {
    let store = spawn_store().await;
    let harness = Harness::new(&store.url);
    let widget = harness.customer();

    let err = widget.send_text("hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(widget.open().is_err());
}

#[tokio::test]
async fn test_sent_message_shows_in_thread() {
    let store = spawn_store().await;
    let harness = Harness::new(&store.url);
    let mut widget = harness.customer();
    widget.register("buyer@example.com").await.unwrap();
    widget.open().unwrap();

    widget.send_text("My download link expired").await.unwrap();

    // The send refreshes the thread once, no need to wait for a tick
    let messages = widget.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text, "My download link expired");
    assert_eq!(messages[0].sender, Sender::Customer);
    assert!(widget.composer().draft().is_empty());
    widget.close();
}

#[tokio::test]
async fn test_operator_replies_notify_after_first() {
    let store = spawn_store().await;
    let mut customer_side = Harness::new(&store.url);
    let operator_side = Harness::new(&store.url);

    let mut widget = customer_side.customer();
    let user_id = widget.register("buyer@example.com").await.unwrap().user_id;
    widget.open().unwrap();
    widget.send_text("Hi").await.unwrap();

    let mut console = operator_side.operator();
    console.login(OPERATOR_PASSWORD).await.unwrap();
    console.select(user_id).unwrap();

    console.send_text("Hello, how can I help?").await.unwrap();
    wait_until!(2000, widget.messages().len() == 2);
    // The first reply moves the count from zero and is not announced
    assert!(customer_side.arrival_toasts().is_empty());

    console.send_text("Could you share the order number?").await.unwrap();
    wait_until!(2000, widget.messages().len() == 3);
    wait_until!(500, customer_side.notifier.unread() == 1);

    assert_eq!(customer_side.arrival_toasts(), vec!["New message from Support".to_string()]);
    assert_eq!(customer_side.notifier.title(), "(1) Shop");

    // Reopening the widget marks the thread read
    widget.close();
    widget.open().unwrap();
    assert_eq!(customer_side.notifier.unread(), 0);
    assert_eq!(customer_side.notifier.title(), "Shop");
    widget.close();
    console.close();
}

#[tokio::test]
async fn test_image_send_uploads_data_uri() {
    let store = spawn_store().await;
    let harness = Harness::new(&store.url);
    let mut widget = harness.customer();
    widget.register("buyer@example.com").await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receipt.png");
    tokio::fs::write(&path, [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a])
        .await
        .unwrap();
    assert_eq!(image_mime(&path), Some("image/png"));

    let batch = widget.send_images(&[path]).await.unwrap();
    assert_eq!((batch.attempted, batch.succeeded), (1, 1));

    let user_id = widget.session().unwrap().user_id;
    let log = store.state.repository.messages(user_id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert!(log[0]
        .image
        .as_deref()
        .is_some_and(|uri| uri.starts_with("data:image/png;base64,")));
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test]
async fn test_reopen_renders_without_waiting_for_closed_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(query_param("action", "register"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"userId": 7, "email": "buyer@example.com"})),
        )
        .mount(&server)
        .await;
    // The first thread fetch hangs past the reopen
    Mock::given(method("GET"))
        .and(query_param("action", "messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"messages": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("action", "messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [
                {"id": 1, "text": "Where is my order?", "sender": "user", "timestamp": "2026-03-01T12:00:00Z"}
            ]
        })))
        .mount(&server)
        .await;

    let harness = Harness::new(&format!("{}/api/chat", server.uri()));
    let mut widget = harness.customer();
    widget.register("buyer@example.com").await.unwrap();
    widget.open().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(widget.messages().is_empty());

    widget.close();
    widget.open().unwrap();
    wait_until!(1000, widget.messages().len() == 1);
    assert_eq!(widget.messages()[0].text, "Where is my order?");

    // The abandoned fetch completing later does not roll the thread back
    tokio::time::sleep(Duration::from_millis(3100)).await;
    assert_eq!(widget.messages().len(), 1);
    widget.close();
}

#[tokio::test]
async fn test_reopen_shows_replies_sent_while_closed() {
    let store = spawn_store().await;
    let customer_side = Harness::new(&store.url);
    let operator_side = Harness::new(&store.url);

    let mut widget = customer_side.customer();
    let user_id = widget.register("buyer@example.com").await.unwrap().user_id;
    widget.open().unwrap();
    widget.send_text("Hi").await.unwrap();
    widget.close();

    let mut console = operator_side.operator();
    console.login(OPERATOR_PASSWORD).await.unwrap();
    console.select(user_id).unwrap();
    console.send_text("Still there?").await.unwrap();
    console.close();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(widget.messages().len(), 1);

    widget.open().unwrap();
    wait_until!(1000, widget.messages().len() == 2);
    assert_eq!(widget.messages()[1].sender, Sender::Operator);
    widget.close();
}
