//! Operator token rejected mid-session

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use supportdesk::client::session::OperatorSession;

use crate::common::Harness;
use crate::wait_until;

#[tokio::test]
async fn test_rejected_token_signs_operator_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat"))
        .and(query_param("action", "users"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(serde_json::json!({ "error": "Unauthorized" })),
        )
        .mount(&server)
        .await;

    let harness = Harness::new(&format!("{}/api/chat", server.uri()));
    harness
        .sessions
        .save_operator(&OperatorSession {
            token: "expired-token".to_string(),
        })
        .unwrap();

    let console = harness.operator();
    assert!(console.is_authenticated());
    assert!(harness.store.has_token());

    console.open().unwrap();
    wait_until!(2000, !console.is_authenticated());

    assert!(!harness.store.has_token());
    assert!(harness.sessions.load_operator().unwrap().is_none());
    assert!(console.conversations().is_empty());
}
