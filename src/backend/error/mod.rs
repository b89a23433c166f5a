//! Backend Error Module
//!
//! Error types of the Conversation Store server. Every handler returns
//! `Result<_, BackendError>`; errors become a JSON body with an `error`
//! field and the matching status code.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Error Types
//!
//! - `HandlerError` - Request rejected with a specific status
//! - `StateError` - Server state could not be built
//! - `StorageError` - Repository failures
//! - `SharedError` - Errors from the shared module
//! - `SerializationError` - Malformed JSON bodies

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::BackendError;
