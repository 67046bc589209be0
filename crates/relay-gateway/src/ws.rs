//! WebSocket handling for `ListenEvent` streams.
//!
//! The first client frame carries the service definition; every frame after
//! that flows server → client, one per delivered event. The stream ends
//! three ways: the client closes (cancellation), the hub closes the session
//! (clean end-of-stream), or the transport fails (terminal error frame
//! where possible, then teardown).

use crate::server::AppState;
use crate::wire::{ListenRequest, StreamFrame};
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::StreamExt;
use relay_bus::EventRelay;
use tracing::{debug, info, warn};

/// `GET /v1/events/listen`: upgrade and stream events for one subscription.
pub async fn listen_events(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let max_message_size = state.config.max_message_size;
    ws.max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_listen(state, socket))
}

enum FirstFrame {
    /// The client sent something unusable; tell it why, then close.
    Invalid(String),
    /// The client went away before subscribing.
    Gone,
}

/// Parse the first frame's text into a listen request.
fn parse_listen_request(text: &str, max_message_size: usize) -> Result<ListenRequest, String> {
    if text.len() > max_message_size {
        return Err(format!(
            "message too large: {} bytes (max: {})",
            text.len(),
            max_message_size
        ));
    }
    serde_json::from_str(text).map_err(|err| format!("invalid listen request: {err}"))
}

/// Read frames until the client produces its listen request.
async fn read_listen_request(
    socket: &mut WebSocket,
    max_message_size: usize,
) -> Result<ListenRequest, FirstFrame> {
    while let Some(incoming) = socket.next().await {
        match incoming {
            Ok(Message::Text(text)) => {
                return parse_listen_request(&text, max_message_size).map_err(FirstFrame::Invalid)
            }
            Ok(Message::Binary(data)) => {
                let Ok(text) = String::from_utf8(data) else {
                    return Err(FirstFrame::Invalid(
                        "listen request must be UTF-8 JSON".to_string(),
                    ));
                };
                return parse_listen_request(&text, max_message_size).map_err(FirstFrame::Invalid);
            }
            Ok(Message::Ping(data)) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    return Err(FirstFrame::Gone);
                }
            }
            Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => return Err(FirstFrame::Gone),
            Err(_) => return Err(FirstFrame::Gone),
        }
    }
    Err(FirstFrame::Gone)
}

/// Drive one listen stream over an upgraded socket.
async fn handle_listen(state: AppState, mut socket: WebSocket) {
    let request = match read_listen_request(&mut socket, state.config.max_message_size).await {
        Ok(request) => request,
        Err(FirstFrame::Invalid(message)) => {
            warn!(error = %message, "rejecting listen stream");
            let _ = socket
                .send(Message::Text(StreamFrame::failure(message).to_json()))
                .await;
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
        Err(FirstFrame::Gone) => return,
    };

    let mut session = state.hub.open_listen(request.service);
    info!(
        subscription = %session.id(),
        service = %session.service(),
        "listen stream opened"
    );

    loop {
        tokio::select! {
            item = session.recv() => match item {
                Some(Ok(envelope)) => {
                    let frame = StreamFrame::event(&envelope).to_json();
                    if let Err(err) = socket.send(Message::Text(frame)).await {
                        warn!(
                            subscription = %session.id(),
                            error = %err,
                            "send failed, aborting listen session"
                        );
                        session.abort();
                        break;
                    }
                }
                Some(Err(err)) => {
                    let _ = socket
                        .send(Message::Text(StreamFrame::failure(err.to_string()).to_json()))
                        .await;
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
                None => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = socket.next() => match incoming {
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        session.abort();
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!(subscription = %session.id(), "listen stream cancelled by client");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!(
                        subscription = %session.id(),
                        error = %err,
                        "transport error, aborting listen session"
                    );
                    session.abort();
                    break;
                }
            }
        }
    }

    info!(subscription = %session.id(), "listen stream closed");
}
