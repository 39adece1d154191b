//! Room-based real-time chat over WebSocket.
//!
//! One hub task owns all room membership and fans broadcasts out to bounded
//! per-session queues. Each connection runs a reader pump (inbound frames to
//! the hub) and a writer pump (queued frames plus keepalive pings to the
//! socket).
//!
//! ```text
//! clients ──reader pump──▶ dispatch ─┐
//!                        register ───┼──▶ Hub::run ──▶ per-session queues ──▶ writer pumps
//!                        unregister ─┘
//! ```

mod handler;
mod hub;
mod session;
mod types;

use serde::{Deserialize, Serialize};

pub use handler::ws_handler;
pub use hub::{ClientSession, Hub, HubHandle, MessageHandler, SessionHandle, DEFAULT_SEND_BUFFER};
pub use session::run_session;
pub use types::{IncomingKind, IncomingMessage, OutgoingKind, OutgoingMessage};

/// Runtime tuning for the chat hub and its sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Outbound frames buffered per session before the member is evicted.
    pub send_buffer: usize,
    /// Seconds between keepalive pings to each client.
    pub ping_interval_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            send_buffer: DEFAULT_SEND_BUFFER,
            ping_interval_secs: 30,
        }
    }
}
