//! Route Configuration Module
//!
//! ```text
//! routes/
//! ├── mod.rs    - Module exports
//! └── router.rs - Router creation, CORS and body limit
//! ```
//!
//! The store exposes one path, `/api/chat`; operations are selected by
//! the `action` query parameter (see [`crate::backend::chat`]).

pub mod router;

pub use router::{create_router, CHAT_PATH};
