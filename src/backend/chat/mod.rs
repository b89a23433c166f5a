//! Chat Backend Module
//!
//! The single chat endpoint of the Conversation Store. Every request names
//! its operation in the `action` query parameter:
//!
//! | Method | Action     | Auth     | Body / query              |
//! |--------|------------|----------|---------------------------|
//! | POST   | `register` | -        | `{ email }`               |
//! | POST   | `login`    | -        | `{ password }`            |
//! | GET    | `messages` | -        | `userId` query parameter  |
//! | POST   | `send`     | operator when `isAdmin` | `{ userId, message, imageUrl?, isAdmin }` |
//! | GET    | `users`    | operator | -                         |
//! | POST   | `clear`    | operator | `{ userId }`              |
//!
//! Anything else answers 400 `{ "error": "Invalid action" }`.

pub mod handlers;

pub use handlers::{handle_get, handle_options, handle_post, ChatQuery};
