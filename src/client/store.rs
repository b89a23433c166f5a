//! Conversation Store client
//!
//! [`ConversationStore`] is the seam between the chat clients and the remote
//! system of record. [`HttpStore`] speaks the single-endpoint `?action=`
//! contract over reqwest; tests substitute in-process fakes.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::config::Config;
use crate::client::error::{ClientError, Result};
use crate::shared::messaging::{
    normalize_email, Action, ChatMessage, ClearConversationRequest, ClearConversationResponse,
    Conversation, ListConversationsResponse, ListMessagesResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, SendMessageRequest, SendMessageResponse,
};

/// Remote system of record for users and messages
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Register a customer by email, or look up the existing registration
    async fn register(&self, email: &str) -> Result<RegisterResponse>;

    /// Exchange the operator password for a bearer token
    async fn login(&self, password: &str) -> Result<LoginResponse>;

    /// All conversations, for the operator console
    async fn users(&self) -> Result<Vec<Conversation>>;

    /// Messages of one conversation in id order
    async fn messages(&self, user_id: u64) -> Result<Vec<ChatMessage>>;

    async fn send(&self, request: SendMessageRequest) -> Result<SendMessageResponse>;

    /// Discard every message of a conversation
    async fn clear(&self, user_id: u64) -> Result<ClearConversationResponse>;

    /// Replace or drop the operator credentials used for later calls
    fn set_token(&self, _token: Option<String>) {}
}

/// HTTP implementation of [`ConversationStore`]
pub struct HttpStore {
    http: Client,
    config: Config,
    token: RwLock<Option<String>>,
}

impl HttpStore {
    /// Every request is abandoned after the configured request timeout
    pub fn new(config: Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.app().request_timeout)
            .build()?;
        let token = config.get_token().cloned();
        Ok(Self {
            http,
            config,
            token: RwLock::new(token),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match self.token.read().unwrap_or_else(|e| e.into_inner()).as_deref() {
            Some(token) => req.header("Authorization", format!("Bearer {}", token)),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, action: Action, query: &[(&str, String)]) -> Result<T> {
        let url = self.config.action_url(action);
        let response = self
            .with_auth(self.http.get(&url).query(query))
            .send()
            .await?;
        decode(action, response).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(&self, action: Action, body: &B) -> Result<T> {
        let url = self.config.action_url(action);
        let response = self.with_auth(self.http.post(&url).json(body)).send().await?;
        decode(action, response).await
    }
}

/// Map a store response onto the client error taxonomy
async fn decode<T: DeserializeOwned>(action: Action, response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await?;
    let body: Value = if text.trim().is_empty() {
        Value::Object(Default::default())
    } else {
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => Value::Null,
        }
    };
    let error = body
        .get("error")
        .and_then(|e| e.as_str())
        .map(str::to_string);

    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!("{} rejected: operator token missing or expired", action.as_str());
        return Err(ClientError::Unauthorized);
    }
    if !status.is_success() {
        return Err(ClientError::Status {
            status,
            message: error.unwrap_or_default(),
        });
    }
    if let Some(error) = error {
        return Err(ClientError::Application(error));
    }
    Ok(serde_json::from_value(body)?)
}

#[async_trait]
impl ConversationStore for HttpStore {
    async fn register(&self, email: &str) -> Result<RegisterResponse> {
        let email = normalize_email(email)?;
        self.post(Action::Register, &RegisterRequest { email }).await
    }

    async fn login(&self, password: &str) -> Result<LoginResponse> {
        if password.is_empty() {
            return Err(ClientError::validation("password", "Password is required"));
        }
        let response: LoginResponse = self
            .post(
                Action::Login,
                &LoginRequest {
                    password: password.to_string(),
                },
            )
            .await?;
        self.set_token(Some(response.token.clone()));
        Ok(response)
    }

    async fn users(&self) -> Result<Vec<Conversation>> {
        let response: ListConversationsResponse = self.get(Action::Users, &[]).await?;
        Ok(response.users)
    }

    async fn messages(&self, user_id: u64) -> Result<Vec<ChatMessage>> {
        let response: ListMessagesResponse = self
            .get(Action::Messages, &[("userId", user_id.to_string())])
            .await?;
        Ok(response.messages)
    }

    async fn send(&self, request: SendMessageRequest) -> Result<SendMessageResponse> {
        self.post(Action::Send, &request).await
    }

    async fn clear(&self, user_id: u64) -> Result<ClearConversationResponse> {
        self.post(Action::Clear, &ClearConversationRequest { user_id })
            .await
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }
}
