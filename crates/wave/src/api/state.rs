//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::AuthState;
use crate::message::MessageService;
use crate::user::UserService;
use crate::ws::{ChatConfig, HubHandle};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// User accounts and profiles.
    pub users: UserService,
    /// Message history; also serves as the hub's message handler.
    pub messages: Arc<MessageService>,
    /// Token validation and issuing.
    pub auth: AuthState,
    /// Submission handle to the running chat hub.
    pub hub: HubHandle,
    /// Chat tuning knobs.
    pub chat: ChatConfig,
}
