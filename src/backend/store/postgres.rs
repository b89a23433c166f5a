//! Postgres repository
//!
//! Uses the `chat_users` and `chat_messages` tables created by the
//! migrations in `migrations/`. Ids are `BIGSERIAL`, so message ids grow
//! with insertion order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::{preview, ChatRepository, NewMessage, UserRecord};
use crate::backend::error::BackendError;
use crate::shared::messaging::{ChatMessage, Conversation, Sender};

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn sender_of(is_admin: bool) -> Sender {
    if is_admin {
        Sender::Operator
    } else {
        Sender::Customer
    }
}

#[async_trait]
impl ChatRepository for PgRepository {
    async fn register(&self, email: &str) -> Result<UserRecord, BackendError> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let row = sqlx::query(
            r#"
            INSERT INTO chat_users (email) VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, created_at
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserRecord {
            id: row.get::<i64, _>("id") as u64,
            email: row.get("email"),
            joined: row.get("created_at"),
        })
    }

    async fn user_exists(&self, user_id: u64) -> Result<bool, BackendError> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM chat_users WHERE id = $1) AS found")
            .bind(user_id as i64)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("found"))
    }

    async fn append(&self, message: NewMessage) -> Result<ChatMessage, BackendError> {
        let row = sqlx::query(
            r#"
            INSERT INTO chat_messages (user_id, message, image_url, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created_at
            "#,
        )
        .bind(message.user_id as i64)
        .bind(&message.text)
        .bind(&message.image)
        .bind(message.sender.is_operator())
        .fetch_one(&self.pool)
        .await?;

        Ok(ChatMessage {
            id: row.get::<i64, _>("id") as u64,
            text: message.text,
            image: message.image,
            sender: message.sender,
            timestamp: row.get("created_at"),
        })
    }

    async fn messages(&self, user_id: u64) -> Result<Vec<ChatMessage>, BackendError> {
        let rows = sqlx::query(
            r#"
            SELECT id, message, image_url, is_admin, created_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ChatMessage {
                id: row.get::<i64, _>("id") as u64,
                text: row.get("message"),
                image: row.get("image_url"),
                sender: sender_of(row.get("is_admin")),
                timestamp: row.get("created_at"),
            })
            .collect())
    }

    async fn conversations(&self) -> Result<Vec<Conversation>, BackendError> {
        let rows = sqlx::query(
            r#"
            SELECT u.id, u.email, u.created_at,
                   COUNT(m.id) AS message_count,
                   MAX(m.created_at) AS last_message,
                   (SELECT lm.message FROM chat_messages lm
                     WHERE lm.user_id = u.id AND lm.is_admin = false
                     ORDER BY lm.id DESC LIMIT 1) AS last_text
            FROM chat_users u
            LEFT JOIN chat_messages m ON m.user_id = u.id AND m.is_admin = false
            GROUP BY u.id, u.email, u.created_at
            ORDER BY last_message DESC NULLS LAST, u.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let last_text: Option<String> = row.get("last_text");
                Conversation {
                    id: row.get::<i64, _>("id") as u64,
                    email: row.get("email"),
                    joined: row.get("created_at"),
                    message_count: row.get::<i64, _>("message_count") as u64,
                    last_message: row.get::<Option<DateTime<Utc>>, _>("last_message"),
                    last_message_preview: last_text.as_deref().map(preview),
                }
            })
            .collect())
    }

    async fn clear(&self, user_id: u64) -> Result<u64, BackendError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(user_id as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
