/**
 * Router Configuration
 *
 * Mounts the chat endpoint and applies the CORS policy browsers need to
 * call it from a storefront page.
 */

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::backend::chat::{handle_get, handle_options, handle_post};
use crate::backend::server::state::AppState;

/// Path of the single chat endpoint
pub const CHAT_PATH: &str = "/api/chat";

/// Request bodies carry base64 images of up to 5 MiB
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Allow any origin to call the endpoint with GET, POST and OPTIONS
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the Axum router
///
/// - `GET /api/chat?action=messages|users`
/// - `POST /api/chat?action=register|login|send|clear`
/// - `OPTIONS /api/chat` - 200 with an empty body
pub fn create_router(app_state: AppState) -> Router<()> {
    Router::new()
        .route(
            CHAT_PATH,
            get(handle_get).post(handle_post).options(handle_options),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer())
        .with_state(app_state)
}
