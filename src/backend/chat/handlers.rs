/**
 * Chat Endpoint Handlers
 *
 * GET and POST handlers of `/api/chat`, dispatching on the `action` query
 * parameter. Request bodies are parsed per action so a malformed body
 * answers with the JSON error envelope instead of axum's plain-text
 * rejection.
 */

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::NewMessage;
use crate::shared::messaging::{
    normalize_email, Action, ClearConversationRequest, ClearConversationResponse,
    ListConversationsResponse, ListMessagesResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, SendMessageRequest, SendMessageResponse, IMAGE_ONLY_TEXT,
};

/// Query parameters of the chat endpoint
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery {
    pub action: Option<String>,
    /// Kept as text so a bad value gets the endpoint's own error
    pub user_id: Option<String>,
}

impl ChatQuery {
    fn action(&self) -> Option<Action> {
        self.action.as_deref().and_then(Action::parse)
    }
}

fn invalid_action() -> BackendError {
    BackendError::bad_request("Invalid action")
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, BackendError> {
    Ok(serde_json::from_slice(body)?)
}

/// `GET /api/chat?action=...`
pub async fn handle_get(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ChatQuery>,
) -> Result<Response, BackendError> {
    match query.action() {
        Some(Action::Messages) => list_messages(&state, &query).await,
        Some(Action::Users) => {
            state.operator.authorize(&headers)?;
            list_conversations(&state).await
        }
        _ => Err(invalid_action()),
    }
}

/// `POST /api/chat?action=...`
pub async fn handle_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ChatQuery>,
    body: Bytes,
) -> Result<Response, BackendError> {
    match query.action() {
        Some(Action::Register) => register(&state, parse_body(&body)?).await,
        Some(Action::Login) => login(&state, parse_body(&body)?),
        Some(Action::Send) => {
            let request: SendMessageRequest = parse_body(&body)?;
            if request.is_admin {
                state.operator.authorize(&headers)?;
            }
            send(&state, request).await
        }
        Some(Action::Clear) => {
            state.operator.authorize(&headers)?;
            clear(&state, parse_body(&body)?).await
        }
        _ => Err(invalid_action()),
    }
}

/// `OPTIONS /api/chat` outside a CORS preflight
pub async fn handle_options() -> StatusCode {
    StatusCode::OK
}

async fn register(state: &AppState, request: RegisterRequest) -> Result<Response, BackendError> {
    let email = normalize_email(&request.email)
        .map_err(|_| BackendError::bad_request("Invalid email"))?;
    let user = state.repository.register(&email).await?;
    tracing::info!("Registered customer {} as user {}", user.email, user.id);
    Ok(Json(RegisterResponse {
        user_id: user.id,
        email: user.email,
    })
    .into_response())
}

fn login(state: &AppState, request: LoginRequest) -> Result<Response, BackendError> {
    let token = state.operator.login(&request.password)?;
    tracing::info!("Operator logged in");
    Ok(Json(LoginResponse { token }).into_response())
}

async fn list_messages(state: &AppState, query: &ChatQuery) -> Result<Response, BackendError> {
    let user_id = query
        .user_id
        .as_deref()
        .and_then(|id| id.trim().parse::<u64>().ok())
        .ok_or_else(|| BackendError::bad_request("User ID required"))?;
    let messages = state.repository.messages(user_id).await?;
    Ok(Json(ListMessagesResponse { messages }).into_response())
}

async fn list_conversations(state: &AppState) -> Result<Response, BackendError> {
    let users = state.repository.conversations().await?;
    Ok(Json(ListConversationsResponse { users }).into_response())
}

async fn send(state: &AppState, request: SendMessageRequest) -> Result<Response, BackendError> {
    let image = request.image_url.clone().filter(|url| !url.trim().is_empty());
    if request.user_id == 0 || (request.message.trim().is_empty() && image.is_none()) {
        return Err(BackendError::bad_request("Invalid request"));
    }
    if !state.repository.user_exists(request.user_id).await? {
        return Err(BackendError::not_found("User not found"));
    }

    let text = match request.message.trim() {
        "" => IMAGE_ONLY_TEXT.to_string(),
        trimmed => trimmed.to_string(),
    };
    let stored = state
        .repository
        .append(NewMessage {
            user_id: request.user_id,
            text,
            image,
            sender: request.sender(),
        })
        .await?;
    tracing::debug!(
        "Stored message {} in conversation {} from {:?}",
        stored.id,
        request.user_id,
        stored.sender
    );

    Ok(Json(SendMessageResponse {
        message_id: stored.id,
        timestamp: stored.timestamp,
    })
    .into_response())
}

async fn clear(
    state: &AppState,
    request: ClearConversationRequest,
) -> Result<Response, BackendError> {
    if !state.repository.user_exists(request.user_id).await? {
        return Err(BackendError::not_found("User not found"));
    }
    let cleared = state.repository.clear(request.user_id).await?;
    tracing::info!("Cleared {} messages from conversation {}", cleared, request.user_id);
    Ok(Json(ClearConversationResponse { cleared }).into_response())
}
