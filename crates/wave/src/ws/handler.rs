//! WebSocket upgrade endpoint.

use std::time::Duration;

use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use log::info;
use serde::Deserialize;

use crate::api::{ApiError, AppState};
use crate::auth::CurrentUser;

use super::hub::ClientSession;
use super::session::run_session;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    pub room_id: String,
    /// Optional display-name override; defaults to the authenticated name.
    pub username: Option<String>,
}

/// WebSocket upgrade handler.
///
/// GET /api/v1/ws?room_id=...
pub async fn ws_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    if query.room_id.is_empty() {
        return Err(ApiError::BadRequest("room_id is required".to_string()));
    }

    let username = query
        .username
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| user.display_name().to_string());

    let (session, queue) =
        ClientSession::new(user.id(), username, query.room_id, state.chat.send_buffer);
    let handle = session.handle();
    info!(
        "websocket upgrade: {} joining room {}",
        handle.username, handle.room_id
    );

    let hub = state.hub.clone();
    let ping_interval = Duration::from_secs(state.chat.ping_interval_secs);
    Ok(ws.on_upgrade(move |socket| async move {
        hub.register(session).await;
        run_session(socket, hub, handle, queue, ping_interval).await;
    }))
}
