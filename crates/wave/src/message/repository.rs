//! Message repository for database operations.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::instrument;

use super::models::{CreateMessage, Message, MessageResponse, MessageUser};

/// Repository for message database operations.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

/// Flat row for the history query, before the sender is nested.
#[derive(Debug, FromRow)]
struct HistoryRow {
    id: i64,
    room_id: String,
    user_id: i64,
    content: String,
    kind: String,
    created_at: DateTime<Utc>,
    username: String,
    email: String,
    full_name: String,
    avatar: Option<String>,
}

impl From<HistoryRow> for MessageResponse {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            user_id: row.user_id,
            content: row.content,
            kind: row.kind,
            created_at: row.created_at,
            user: MessageUser {
                id: row.user_id,
                username: row.username,
                email: row.email,
                full_name: row.full_name,
                avatar: row.avatar,
            },
        }
    }
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a message.
    #[instrument(skip(self, message), fields(room_id = %message.room_id))]
    pub async fn create(&self, message: CreateMessage) -> Result<Message> {
        let created_at = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (room_id, user_id, content, kind, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.room_id)
        .bind(message.user_id)
        .bind(&message.content)
        .bind(&message.kind)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to insert message")?;

        Ok(Message {
            id: result.last_insert_rowid(),
            room_id: message.room_id,
            user_id: message.user_id,
            content: message.content,
            kind: message.kind,
            created_at,
        })
    }

    /// Fetch a room's history, newest first, with senders resolved.
    #[instrument(skip(self))]
    pub async fn get_by_room(
        &self,
        room_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageResponse>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT m.id, m.room_id, m.user_id, m.content, m.kind, m.created_at,
                   u.username, u.email, u.full_name, u.avatar
            FROM messages m
            JOIN users u ON u.id = m.user_id
            WHERE m.room_id = ?
            ORDER BY m.created_at DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch room history")?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::user::{CreateUser, UserRepository};

    async fn test_repos() -> (MessageRepository, UserRepository) {
        let db = Database::in_memory().await.unwrap();
        (
            MessageRepository::new(db.pool().clone()),
            UserRepository::new(db.pool().clone()),
        )
    }

    async fn seed_user(users: &UserRepository, username: &str) -> i64 {
        users
            .create(CreateUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "hash".to_string(),
                full_name: username.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn text_message(room: &str, user_id: i64, content: &str) -> CreateMessage {
        CreateMessage {
            room_id: room.to_string(),
            user_id,
            content: content.to_string(),
            kind: "text".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_returns_row_with_id() {
        let (messages, users) = test_repos().await;
        let user_id = seed_user(&users, "ada").await;

        let message = messages
            .create(text_message("r1", user_id, "hello"))
            .await
            .unwrap();
        assert!(message.id > 0);
        assert_eq!(message.kind, "text");
    }

    #[tokio::test]
    async fn test_history_newest_first_with_sender() {
        let (messages, users) = test_repos().await;
        let user_id = seed_user(&users, "ada").await;

        for content in ["one", "two", "three"] {
            messages
                .create(text_message("r1", user_id, content))
                .await
                .unwrap();
            // Distinct timestamps so the ordering is deterministic.
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        messages
            .create(text_message("other", user_id, "elsewhere"))
            .await
            .unwrap();

        let history = messages.get_by_room("r1", 50, 0).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].content, "three");
        assert_eq!(history[2].content, "one");
        assert_eq!(history[0].user.username, "ada");
        assert_eq!(history[0].user.email, "ada@example.com");

        let page = messages.get_by_room("r1", 1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].content, "two");
    }

    #[tokio::test]
    async fn test_history_empty_room() {
        let (messages, _users) = test_repos().await;
        assert!(messages.get_by_room("ghost", 50, 0).await.unwrap().is_empty());
    }
}
