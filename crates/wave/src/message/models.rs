//! Message data models.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Message entity from database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub room_id: String,
    pub user_id: i64,
    pub content: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

/// Row to insert for a new message.
#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub room_id: String,
    pub user_id: i64,
    pub content: String,
    pub kind: String,
}

/// Sender info embedded in a history entry.
#[derive(Debug, Clone, Serialize)]
pub struct MessageUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

/// A history entry with its sender resolved.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub room_id: String,
    pub user_id: i64,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub user: MessageUser,
}
