//! Signaling WebSocket handler.
//!
//! `GET /ws/rooms/{id}` upgrades to a WebSocket carrying signaling messages
//! for one meeting. Every text frame must hold a JSON value. The frame text
//! is relayed byte for byte to every other socket on the same meeting. Binary frames are
//! ignored and malformed text frames are dropped without closing the socket.
//!
//! The connection is subscribed before the upgrade completes and the
//! subscription guard lives inside the connection task, so the channel is
//! released on every exit path: client close, protocol error, failed send,
//! idle timeout, server shutdown, or the task being dropped.

use crate::errors::MeetError;
use crate::observability::metrics;
use crate::routes::AppState;
use crate::services::{Envelope, Subscription};
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Query parameters of the signaling endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalingQuery {
    /// Client identifier, used for log context only.
    pub client_id: Option<String>,
}

/// Timers of one signaling connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionTimers {
    ping_interval: Duration,
    idle_timeout: Duration,
}

/// Why a connection loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    ClientClosed,
    ProtocolError,
    SendFailed,
    IdleTimeout,
    Shutdown,
    Unsubscribed,
}

/// Handler for GET /ws/rooms/{id}
///
/// # Response
///
/// - 101 Switching Protocols: Signaling channel open
/// - 404 Not Found: Unknown meeting
#[instrument(skip(state, ws, query), fields(meeting_id = %id, client_id = ?query.client_id))]
pub async fn signaling_socket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<SignalingQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, MeetError> {
    let (subscription, outbound) = state
        .sessions
        .open_channel(&id)
        .ok_or_else(|| MeetError::NotFound("Meeting not found".to_string()))?;

    let timers = ConnectionTimers {
        ping_interval: Duration::from_secs(state.config.signaling_ping_interval_seconds),
        idle_timeout: Duration::from_secs(state.config.signaling_idle_timeout_seconds),
    };
    let shutdown = state.shutdown.child_token();
    let client_id = query.client_id.unwrap_or_default();

    Ok(ws.on_upgrade(move |socket| async move {
        metrics::signaling_connection_opened();
        info!(
            target: "meet.handlers.signaling",
            meeting_id = %subscription.meeting_id(),
            channel_id = %subscription.channel_id(),
            client_id = %client_id,
            "Signaling connection opened"
        );

        let reason = run_connection(socket, &subscription, outbound, timers, shutdown).await;

        info!(
            target: "meet.handlers.signaling",
            meeting_id = %subscription.meeting_id(),
            channel_id = %subscription.channel_id(),
            client_id = %client_id,
            ?reason,
            "Signaling connection closed"
        );
        drop(subscription);
        metrics::signaling_connection_closed();
    }))
}

async fn run_connection(
    socket: WebSocket,
    subscription: &Subscription,
    mut outbound: mpsc::Receiver<Envelope>,
    timers: ConnectionTimers,
    shutdown: CancellationToken,
) -> CloseReason {
    let (mut sink, mut stream) = socket.split();

    let mut ping = tokio::time::interval_at(
        Instant::now() + timers.ping_interval,
        timers.ping_interval,
    );
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let idle = tokio::time::sleep(timers.idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            () = shutdown.cancelled() => {
                let _ = sink.send(close_message(close_code::AWAY, "server shutting down")).await;
                return CloseReason::Shutdown;
            }

            () = &mut idle => {
                let _ = sink.send(close_message(close_code::NORMAL, "idle timeout")).await;
                return CloseReason::IdleTimeout;
            }

            _ = ping.tick() => {
                if sink.send(Message::Ping(Vec::new())).await.is_err() {
                    return CloseReason::SendFailed;
                }
            }

            envelope = outbound.recv() => {
                let Some(envelope) = envelope else {
                    return CloseReason::Unsubscribed;
                };
                if sink.send(Message::Text(envelope.to_string())).await.is_err() {
                    return CloseReason::SendFailed;
                }
            }

            frame = stream.next() => {
                idle.as_mut().reset(Instant::now() + timers.idle_timeout);

                match frame {
                    Some(Ok(Message::Text(text))) => relay_text(subscription, &text),
                    Some(Ok(Message::Binary(bytes))) => {
                        debug!(
                            target: "meet.handlers.signaling",
                            channel_id = %subscription.channel_id(),
                            len = bytes.len(),
                            "Ignoring binary frame"
                        );
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => return CloseReason::ClientClosed,
                    Some(Err(e)) => {
                        debug!(
                            target: "meet.handlers.signaling",
                            channel_id = %subscription.channel_id(),
                            error = %e,
                            "WebSocket receive failed"
                        );
                        return CloseReason::ProtocolError;
                    }
                }
            }
        }
    }
}

/// Check that a text frame is JSON and fan the original text out to the
/// rest of the meeting.
fn relay_text(subscription: &Subscription, text: &str) {
    match serde_json::from_str::<IgnoredAny>(text) {
        Ok(IgnoredAny) => {
            metrics::record_signaling_message();
            let delivered = subscription.publish(Arc::from(text));
            debug!(
                target: "meet.handlers.signaling",
                meeting_id = %subscription.meeting_id(),
                channel_id = %subscription.channel_id(),
                delivered,
                "Signaling message relayed"
            );
        }
        Err(e) => {
            warn!(
                target: "meet.handlers.signaling",
                meeting_id = %subscription.meeting_id(),
                channel_id = %subscription.channel_id(),
                error = %e,
                "Dropping signaling frame that is not JSON"
            );
        }
    }
}

fn close_message(code: u16, reason: &'static str) -> Message {
    Message::Close(Some(CloseFrame {
        code,
        reason: reason.into(),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_close_message_carries_code_and_reason() {
        match close_message(close_code::AWAY, "server shutting down") {
            Message::Close(Some(frame)) => {
                assert_eq!(frame.code, close_code::AWAY);
                assert_eq!(frame.reason, "server shutting down");
            }
            other => unreachable!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_relay_text_forwards_json_and_drops_garbage() {
        let relay = Arc::new(crate::services::SignalingRelay::new(4));
        let (sender, _sender_rx) = relay.open("m1");
        let (_peer, mut peer_rx) = relay.open("m1");

        relay_text(&sender, "not json");
        assert!(peer_rx.try_recv().is_err());

        relay_text(&sender, r#"{"type":"offer","sdp":"v=0"}"#);
        assert_eq!(&*peer_rx.try_recv().unwrap(), r#"{"type":"offer","sdp":"v=0"}"#);
    }

    #[test]
    fn test_relay_text_keeps_key_order_and_number_precision() {
        let relay = Arc::new(crate::services::SignalingRelay::new(4));
        let (sender, _sender_rx) = relay.open("m1");
        let (_peer, mut peer_rx) = relay.open("m1");

        let frame = r#"{"type":"offer","sdp":"v=0","id":12345678901234567890123, "z" : 1.10}"#;
        relay_text(&sender, frame);
        assert_eq!(&*peer_rx.try_recv().unwrap(), frame);
    }
}
