//! Per-connection reader/writer pumps.

use std::time::Duration;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;

use super::hub::{HubHandle, SessionHandle};
use super::types::IncomingMessage;

/// Drive a connection until either pump stops.
///
/// The reader runs on this task; the writer runs on a spawned task and owns
/// the sink half of the socket. When the reader stops, the session is
/// unregistered, which closes the outbound queue and lets the writer drain
/// its remaining frames and exit.
pub async fn run_session(
    socket: WebSocket,
    hub: HubHandle,
    session: SessionHandle,
    queue: mpsc::Receiver<Utf8Bytes>,
    ping_interval: Duration,
) {
    let (sink, stream) = socket.split();
    let writer = tokio::spawn(write_pump(sink, queue, ping_interval));

    read_pump(stream, &hub, &session).await;

    hub.unregister(session.clone()).await;
    let _ = writer.await;
    info!(
        "session closed: {} (room: {})",
        session.username, session.room_id
    );
}

/// Forward inbound frames to the hub.
///
/// Identity fields on the wire are overwritten from the authenticated
/// session, so a client cannot speak for another user or into another room.
async fn read_pump(mut stream: SplitStream<WebSocket>, hub: &HubHandle, session: &SessionHandle) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                match serde_json::from_str::<IncomingMessage>(text.as_str()) {
                    Ok(mut msg) => {
                        msg.room_id = session.room_id.clone();
                        msg.user_id = session.user_id;
                        msg.username = session.username.clone();
                        hub.dispatch(msg).await;
                    }
                    Err(err) => {
                        debug!(
                            "dropping malformed frame from {}: {}",
                            session.username, err
                        );
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                debug!("ignoring binary frame from {}", session.username);
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => break,
            Err(err) => {
                warn!("websocket error for {}: {}", session.username, err);
                break;
            }
        }
    }
}

/// Write queued frames and keepalive pings to the socket.
async fn write_pump(
    mut sink: SplitSink<WebSocket, Message>,
    mut queue: mpsc::Receiver<Utf8Bytes>,
    ping_interval: Duration,
) {
    let mut ping = tokio::time::interval(ping_interval);
    ping.tick().await; // the first tick completes immediately

    loop {
        tokio::select! {
            frame = queue.recv() => match frame {
                Some(text) => {
                    if sink.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                None => {
                    // recv() only returns None once the buffered frames have
                    // drained; tell the client we are done.
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            _ = ping.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }
        }
    }
}
