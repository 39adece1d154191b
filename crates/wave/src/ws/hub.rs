//! Chat hub: single control loop owning room membership and broadcast fan-out.
//!
//! All registry mutations happen on one task, so no lock is needed around the
//! room map. Sessions talk to the hub through three mpsc intakes (register,
//! unregister, dispatch) multiplexed by `Hub::run`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::Utf8Bytes;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use super::types::{IncomingMessage, OutgoingKind, OutgoingMessage};

/// Default size of the per-session outbound frame queue.
pub const DEFAULT_SEND_BUFFER: usize = 256;

/// Size of the hub intake channels.
const INTAKE_BUFFER_SIZE: usize = 64;

/// Produces the outbound envelope to broadcast for an inbound one.
///
/// Implementations may persist the message as a side effect. A failure drops
/// the dispatch; the hub never retries.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, msg: &IncomingMessage) -> anyhow::Result<OutgoingMessage>;
}

/// Identity of a registered session, used to signal unregistration.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub user_id: i64,
    pub username: String,
    pub room_id: String,
}

/// A live client connection as seen by the hub.
///
/// The hub holds the only sender half of the outbound queue; dropping the
/// session (during unregister or backpressure eviction) is the single close
/// of that queue, which in turn terminates the session's writer pump.
pub struct ClientSession {
    info: SessionHandle,
    tx: mpsc::Sender<Utf8Bytes>,
}

impl ClientSession {
    /// Create a session and the receiver half of its outbound queue.
    pub fn new(
        user_id: i64,
        username: impl Into<String>,
        room_id: impl Into<String>,
        send_buffer: usize,
    ) -> (Self, mpsc::Receiver<Utf8Bytes>) {
        let (tx, rx) = mpsc::channel(send_buffer.max(1));
        let session = Self {
            info: SessionHandle {
                id: Uuid::new_v4(),
                user_id,
                username: username.into(),
                room_id: room_id.into(),
            },
            tx,
        };
        (session, rx)
    }

    /// Identity handle for later unregistration.
    pub fn handle(&self) -> SessionHandle {
        self.info.clone()
    }
}

/// Cloneable handle for submitting work to the hub.
#[derive(Clone)]
pub struct HubHandle {
    register: mpsc::Sender<ClientSession>,
    unregister: mpsc::Sender<SessionHandle>,
    dispatch: mpsc::Sender<IncomingMessage>,
}

impl HubHandle {
    /// Register a session with the hub.
    pub async fn register(&self, session: ClientSession) {
        // A send error means the hub has shut down; nothing left to do.
        let _ = self.register.send(session).await;
    }

    /// Signal that a session's connection has ended.
    pub async fn unregister(&self, handle: SessionHandle) {
        let _ = self.unregister.send(handle).await;
    }

    /// Forward an inbound envelope for handling and broadcast.
    pub async fn dispatch(&self, msg: IncomingMessage) {
        let _ = self.dispatch.send(msg).await;
    }
}

/// The hub control loop state.
pub struct Hub {
    rooms: HashMap<String, HashMap<Uuid, ClientSession>>,
    handler: Arc<dyn MessageHandler>,
    register_rx: mpsc::Receiver<ClientSession>,
    unregister_rx: mpsc::Receiver<SessionHandle>,
    dispatch_rx: mpsc::Receiver<IncomingMessage>,
}

impl Hub {
    /// Create a hub and its submission handle.
    pub fn new(handler: Arc<dyn MessageHandler>) -> (Self, HubHandle) {
        let (register_tx, register_rx) = mpsc::channel(INTAKE_BUFFER_SIZE);
        let (unregister_tx, unregister_rx) = mpsc::channel(INTAKE_BUFFER_SIZE);
        let (dispatch_tx, dispatch_rx) = mpsc::channel(INTAKE_BUFFER_SIZE);

        let hub = Self {
            rooms: HashMap::new(),
            handler,
            register_rx,
            unregister_rx,
            dispatch_rx,
        };
        let handle = HubHandle {
            register: register_tx,
            unregister: unregister_tx,
            dispatch: dispatch_tx,
        };
        (hub, handle)
    }

    /// Run the control loop until every handle has been dropped.
    ///
    /// One intake event is processed fully before the next begins; this is
    /// what gives each room a total broadcast order.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(session) = self.register_rx.recv() => self.register(session),
                Some(handle) = self.unregister_rx.recv() => self.unregister(handle),
                Some(msg) = self.dispatch_rx.recv() => self.dispatch(msg).await,
                else => break,
            }
        }
        info!("hub stopped");
    }

    fn register(&mut self, session: ClientSession) {
        let info = session.handle();
        let members = self.rooms.entry(info.room_id.clone()).or_default();
        members.insert(info.id, session);
        info!(
            "client joined: {} (room: {}, members: {})",
            info.username,
            info.room_id,
            members.len()
        );

        let notice = room_notice(
            OutgoingKind::UserJoined,
            format!("{} joined the chat", info.username),
            &info,
        );
        self.broadcast_to_room(&info.room_id, &notice);
    }

    fn unregister(&mut self, handle: SessionHandle) {
        let Some(members) = self.rooms.get_mut(&handle.room_id) else {
            return;
        };
        // Duplicate unregister signals are a safe no-op.
        if members.remove(&handle.id).is_none() {
            return;
        }
        if members.is_empty() {
            self.rooms.remove(&handle.room_id);
        }
        info!(
            "client left: {} (room: {})",
            handle.username, handle.room_id
        );

        let notice = room_notice(
            OutgoingKind::UserLeft,
            format!("{} left the chat", handle.username),
            &handle,
        );
        self.broadcast_to_room(&handle.room_id, &notice);
    }

    async fn dispatch(&mut self, msg: IncomingMessage) {
        match self.handler.handle(&msg).await {
            Ok(outgoing) => self.broadcast_to_room(&msg.room_id, &outgoing),
            Err(err) => warn!(
                "dropping message from {} in room {}: {:#}",
                msg.username, msg.room_id, err
            ),
        }
    }

    /// Fan an outbound envelope out to every member of a room.
    ///
    /// The envelope is serialized once. A member whose queue cannot absorb the
    /// frame is treated as unrecoverably stalled and evicted on the spot: its
    /// queue is dropped (closing it) and it leaves the member set without a
    /// final notice.
    fn broadcast_to_room(&mut self, room_id: &str, message: &OutgoingMessage) {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return;
        };

        let frame: Utf8Bytes = match serde_json::to_string(message) {
            Ok(json) => json.into(),
            Err(err) => {
                warn!("failed to serialize outgoing message: {err}");
                return;
            }
        };

        let mut stalled = Vec::new();
        for (id, session) in members.iter() {
            match session.tx.try_send(frame.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                    stalled.push(*id);
                }
            }
        }

        for id in stalled {
            if let Some(session) = members.remove(&id) {
                debug!(
                    "evicting slow consumer {} from room {}",
                    session.info.username, room_id
                );
            }
        }
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
    }
}

fn room_notice(kind: OutgoingKind, content: String, who: &SessionHandle) -> OutgoingMessage {
    OutgoingMessage {
        id: None,
        kind,
        content,
        room_id: who.room_id.clone(),
        user_id: who.user_id,
        username: who.username.clone(),
        avatar: None,
        created_at: chrono::Utc::now(),
    }
}
