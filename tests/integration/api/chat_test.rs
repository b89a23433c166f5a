//! Chat endpoint integration tests
//!
//! Register, send, list and clear through the `?action=` contract.

use axum::http::{header, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use supportdesk::backend::routes::CHAT_PATH;
use supportdesk::shared::messaging::{
    ClearConversationResponse, ListConversationsResponse, ListMessagesResponse, Sender,
    SendMessageResponse, IMAGE_ONLY_TEXT,
};

use crate::common::{operator_token, register_customer, test_server};

#[tokio::test]
async fn test_register_normalizes_and_reuses_email() {
    let server = test_server();

    let first = register_customer(&server, "  Buyer@Example.com ").await;
    let again = register_customer(&server, "buyer@example.com").await;
    assert_eq!(first, again);

    let response = server
        .post(CHAT_PATH)
        .add_query_param("action", "register")
        .json(&json!({ "email": "buyer@example.com" }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["email"], "buyer@example.com");
    assert_eq!(body["userId"], first);
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let server = test_server();
    let response = server
        .post(CHAT_PATH)
        .add_query_param("action", "register")
        .json(&json!({ "email": "not-an-email" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid email");
}

#[tokio::test]
async fn test_send_then_list_messages_in_order() {
    let server = test_server();
    let token = operator_token(&server).await;
    let user_id = register_customer(&server, "buyer@example.com").await;

    let sent = server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": user_id, "message": "Where is my order?", "isAdmin": false }))
        .await;
    sent.assert_status_ok();
    let first: SendMessageResponse = sent.json();

    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .authorization_bearer(&token)
        .json(&json!({ "userId": user_id, "message": "Checking now", "isAdmin": true }))
        .await
        .assert_status_ok();

    let response = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .add_query_param("userId", user_id)
        .await;
    response.assert_status_ok();
    let log: ListMessagesResponse = response.json();

    assert_eq!(log.messages.len(), 2);
    assert_eq!(log.messages[0].id, first.message_id);
    assert_eq!(log.messages[0].text, "Where is my order?");
    assert_eq!(log.messages[0].sender, Sender::Customer);
    assert_eq!(log.messages[1].sender, Sender::Operator);
    assert!(log.messages[0].id < log.messages[1].id);
}

#[tokio::test]
async fn test_messages_wire_format() {
    let server = test_server();
    let user_id = register_customer(&server, "buyer@example.com").await;
    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": user_id, "message": "hi" }))
        .await
        .assert_status_ok();

    let body: Value = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .add_query_param("userId", user_id)
        .await
        .json();
    let message = &body["messages"][0];
    assert_eq!(message["text"], "hi");
    assert_eq!(message["sender"], "user");
    assert!(message["id"].is_u64());
    assert!(message["timestamp"].is_string());
}

#[tokio::test]
async fn test_image_only_send_stores_placeholder_text() {
    let server = test_server();
    let user_id = register_customer(&server, "buyer@example.com").await;

    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({
            "userId": user_id,
            "message": "",
            "imageUrl": "data:image/png;base64,iVBORw0KGgo=",
        }))
        .await
        .assert_status_ok();

    let log: ListMessagesResponse = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .add_query_param("userId", user_id)
        .await
        .json();
    assert_eq!(log.messages[0].text, IMAGE_ONLY_TEXT);
    assert_eq!(
        log.messages[0].image.as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
}

#[tokio::test]
async fn test_send_stores_trimmed_text() {
    let server = test_server();
    let user_id = register_customer(&server, "buyer@example.com").await;

    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": user_id, "message": "  \n Refund please \t " }))
        .await
        .assert_status_ok();

    let log: ListMessagesResponse = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .add_query_param("userId", user_id)
        .await
        .json();
    assert_eq!(log.messages[0].text, "Refund please");
}

#[tokio::test]
async fn test_send_rejects_empty_body_and_unknown_user() {
    let server = test_server();
    let user_id = register_customer(&server, "buyer@example.com").await;

    let empty = server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": user_id, "message": "   " }))
        .await;
    empty.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(empty.json::<Value>()["error"], "Invalid request");

    let malformed = server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .text("{not json")
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);

    let unknown = server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": user_id + 100, "message": "hello" }))
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_messages_requires_user_id() {
    let server = test_server();
    let response = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "User ID required");

    let unknown: ListMessagesResponse = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .add_query_param("userId", 42)
        .await
        .json();
    assert!(unknown.messages.is_empty());
}

#[tokio::test]
async fn test_unknown_action_is_rejected() {
    let server = test_server();

    let response = server.get(CHAT_PATH).add_query_param("action", "delete").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "Invalid action");

    // register is POST-only
    server
        .get(CHAT_PATH)
        .add_query_param("action", "register")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server.get(CHAT_PATH).await.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_users_lists_recent_first_with_customer_counts() {
    let server = test_server();
    let token = operator_token(&server).await;
    let quiet = register_customer(&server, "quiet@example.com").await;
    let early = register_customer(&server, "early@example.com").await;
    let late = register_customer(&server, "late@example.com").await;

    for (user_id, text) in [(early, "first"), (early, "second")] {
        server
            .post(CHAT_PATH)
            .add_query_param("action", "send")
            .json(&json!({ "userId": user_id, "message": text }))
            .await
            .assert_status_ok();
    }
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": late, "message": "latest" }))
        .await
        .assert_status_ok();
    // Operator replies are not counted
    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .authorization_bearer(&token)
        .json(&json!({ "userId": early, "message": "reply", "isAdmin": true }))
        .await
        .assert_status_ok();

    let list: ListConversationsResponse = server
        .get(CHAT_PATH)
        .add_query_param("action", "users")
        .authorization_bearer(&token)
        .await
        .json();

    let rows: Vec<(u64, u64)> = list.users.iter().map(|c| (c.id, c.message_count)).collect();
    assert_eq!(rows, vec![(late, 1), (early, 2), (quiet, 0)]);
    assert_eq!(list.users[1].last_message_preview.as_deref(), Some("second"));
    assert!(list.users[2].last_message.is_none());
}

#[tokio::test]
async fn test_clear_discards_messages() {
    let server = test_server();
    let token = operator_token(&server).await;
    let user_id = register_customer(&server, "buyer@example.com").await;
    for text in ["a", "b", "c"] {
        server
            .post(CHAT_PATH)
            .add_query_param("action", "send")
            .json(&json!({ "userId": user_id, "message": text }))
            .await
            .assert_status_ok();
    }

    let response = server
        .post(CHAT_PATH)
        .add_query_param("action", "clear")
        .authorization_bearer(&token)
        .json(&json!({ "userId": user_id }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<ClearConversationResponse>().cleared, 3);

    let log: ListMessagesResponse = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .add_query_param("userId", user_id)
        .await
        .json();
    assert!(log.messages.is_empty());

    server
        .post(CHAT_PATH)
        .add_query_param("action", "clear")
        .authorization_bearer(&token)
        .json(&json!({ "userId": user_id + 1 }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_plain_options_returns_empty_ok() {
    let server = test_server();
    let response = server.method(axum::http::Method::OPTIONS, CHAT_PATH).await;
    response.assert_status_ok();
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_cors_headers_on_responses() {
    let server = test_server();
    let response = server
        .get(CHAT_PATH)
        .add_query_param("action", "messages")
        .add_query_param("userId", 1)
        .add_header(header::ORIGIN, HeaderValue::from_static("https://shop.example.com"))
        .await;
    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
