//! Message service: the hub's handler plus room history reads.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use crate::user::UserRepository;
use crate::ws::{IncomingKind, IncomingMessage, MessageHandler, OutgoingKind, OutgoingMessage};

use super::models::{CreateMessage, MessageResponse};
use super::repository::MessageRepository;

/// Service producing outbound chat events from inbound ones.
#[derive(Debug, Clone)]
pub struct MessageService {
    messages: MessageRepository,
    users: UserRepository,
}

impl MessageService {
    /// Create a new message service.
    pub fn new(messages: MessageRepository, users: UserRepository) -> Self {
        Self { messages, users }
    }

    /// Fetch a room's history, newest first.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        room_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageResponse>> {
        self.messages.get_by_room(room_id, limit, offset).await
    }
}

#[async_trait]
impl MessageHandler for MessageService {
    /// Turn an inbound envelope into the one to broadcast.
    ///
    /// Typing indicators are echoed without touching storage. Text messages
    /// are persisted first, then decorated with the sender's profile.
    async fn handle(&self, msg: &IncomingMessage) -> Result<OutgoingMessage> {
        if msg.kind == IncomingKind::Typing {
            return Ok(OutgoingMessage {
                id: None,
                kind: OutgoingKind::Typing,
                content: msg.content.clone(),
                room_id: msg.room_id.clone(),
                user_id: msg.user_id,
                username: msg.username.clone(),
                avatar: None,
                created_at: Utc::now(),
            });
        }

        let message = self
            .messages
            .create(CreateMessage {
                room_id: msg.room_id.clone(),
                user_id: msg.user_id,
                content: msg.content.clone(),
                kind: "text".to_string(),
            })
            .await
            .context("failed to save message")?;

        let user = self
            .users
            .get(msg.user_id)
            .await?
            .context("user not found")?;

        Ok(OutgoingMessage {
            id: Some(message.id),
            kind: OutgoingKind::Message,
            content: message.content,
            room_id: message.room_id,
            user_id: message.user_id,
            username: user.username,
            avatar: user.avatar,
            created_at: message.created_at,
        })
    }
}
