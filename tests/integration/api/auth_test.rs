//! Operator authentication integration tests

use axum::http::StatusCode;
use serde_json::{json, Value};

use supportdesk::backend::auth::{create_token, verify_token};
use supportdesk::backend::routes::CHAT_PATH;

use crate::common::{operator_token, register_customer, test_server, JWT_SECRET};

#[tokio::test]
async fn test_login_issues_verifiable_token() {
    let server = test_server();
    let token = operator_token(&server).await;
    assert!(verify_token(&token, JWT_SECRET).is_ok());
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let server = test_server();
    let response = server
        .post(CHAT_PATH)
        .add_query_param("action", "login")
        .json(&json!({ "password": "guess" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["error"], "Invalid password");
}

#[tokio::test]
async fn test_operator_actions_require_token() {
    let server = test_server();
    let user_id = register_customer(&server, "buyer@example.com").await;

    server
        .get(CHAT_PATH)
        .add_query_param("action", "users")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post(CHAT_PATH)
        .add_query_param("action", "clear")
        .json(&json!({ "userId": user_id }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": user_id, "message": "I am support", "isAdmin": true }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let server = test_server();
    let forged = create_token("some-other-secret").unwrap();

    server
        .get(CHAT_PATH)
        .add_query_param("action", "users")
        .authorization_bearer(&forged)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_send_needs_no_token() {
    let server = test_server();
    let user_id = register_customer(&server, "buyer@example.com").await;
    server
        .post(CHAT_PATH)
        .add_query_param("action", "send")
        .json(&json!({ "userId": user_id, "message": "hello", "isAdmin": false }))
        .await
        .assert_status_ok();
}
