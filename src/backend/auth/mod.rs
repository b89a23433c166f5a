//! Authentication Module
//!
//! Operator authentication for the Conversation Store. Customers never
//! authenticate; they identify by email through the `register` action.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs       - Module exports and documentation
//! ├── operator.rs  - Password check and bearer-token authorization
//! └── sessions.rs  - JWT token management
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Login**: operator posts the password → bcrypt check → JWT returned
//! 2. **Operator actions**: `users`, `clear` and operator `send` carry the
//!    JWT as a bearer token → verified per request
//!
//! # Security
//!
//! - The operator password is only ever held as a bcrypt hash
//! - Tokens are signed with `JWT_SECRET` and expire after 12 hours

pub mod operator;
pub mod sessions;

pub use operator::{bearer_token, OperatorAuth};
pub use sessions::{create_token, verify_token, Claims};
