/// WebSocket connection handler
///
/// Per-connection lifecycle: register with the hub, forward hub
/// envelopes to the socket, answer client control messages
/// (hello/ping), and monitor health with heartbeats. On any exit path
/// the connection is unregistered so the fan-out stops addressing it.
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;

use crate::{
    arguments::is_debug_webserver_enabled,
    config,
    logger::{self, LogTag},
};

use super::{
    health::{ConnectionHealth, HealthConfig},
    hub::{ConnectionId, WsHub},
    message::{ClientMessage, ServerMessage, WsEnvelope},
    metrics::ConnectionMetrics,
};

/// Handle a WebSocket connection until it closes
pub async fn handle_connection(socket: WebSocket, hub: Arc<WsHub>) {
    let (conn_id, mut hub_rx) = hub.register_connection().await;

    let (mut ws_tx, mut ws_rx) = socket.split();

    let health_config = config::with_config(|cfg| HealthConfig::from_config(&cfg.webserver.websocket));
    let mut health = ConnectionHealth::new(health_config);
    let metrics = ConnectionMetrics::new();

    if is_debug_webserver_enabled() {
        logger::debug(
            LogTag::Webserver,
            &format!("Connection {} started", conn_id),
        );
    }

    loop {
        tokio::select! {
            biased;

            // Envelopes from the hub (broadcast to this client)
            Some(envelope) = hub_rx.recv() => {
                if let Err(e) = forward_to_client(&mut ws_tx, envelope, &metrics).await {
                    logger::warning(
                        LogTag::Webserver,
                        &format!("Connection {}: failed to send message: {}", conn_id, e),
                    );
                    break;
                }
            }

            // Messages from the client (control commands)
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        health.record_activity();

                        if let Err(e) = handle_client_message(&text, &mut ws_tx, conn_id).await {
                            logger::warning(
                                LogTag::Webserver,
                                &format!("Connection {}: error handling client message: {}", conn_id, e),
                            );
                        }
                    }
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {
                        health.record_activity();
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        if is_debug_webserver_enabled() {
                            logger::debug(
                                LogTag::Webserver,
                                &format!("Connection {}: client closed", conn_id),
                            );
                        }
                        break;
                    }
                    Some(Err(e)) => {
                        logger::warning(
                            LogTag::Webserver,
                            &format!("Connection {}: websocket error: {}", conn_id, e),
                        );
                        break;
                    }
                    _ => {}
                }
            }

            // Health checks
            _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {
                if health.is_idle() {
                    logger::warning(
                        LogTag::Webserver,
                        &format!(
                            "Connection {}: idle timeout ({}s)",
                            conn_id,
                            health.idle_seconds()
                        ),
                    );
                    break;
                }

                if health.is_pong_overdue() {
                    logger::warning(
                        LogTag::Webserver,
                        &format!("Connection {}: pong timeout", conn_id),
                    );
                    break;
                }

                if health.needs_ping() {
                    if ws_tx.send(Message::Ping(vec![])).await.is_err() {
                        break;
                    }
                    health.record_ping();
                }
            }
        }
    }

    hub.unregister_connection(conn_id).await;

    if is_debug_webserver_enabled() {
        let snapshot = metrics.snapshot();
        logger::debug(
            LogTag::Webserver,
            &format!(
                "Connection {} closed (sent={}, dropped={})",
                conn_id, snapshot.messages_sent, snapshot.messages_dropped
            ),
        );
    }
}

/// Forward an envelope to the client socket
async fn forward_to_client(
    ws_tx: &mut futures::stream::SplitSink<WebSocket, Message>,
    envelope: WsEnvelope,
    metrics: &Arc<ConnectionMetrics>,
) -> Result<(), axum::Error> {
    let msg = ServerMessage::Data(envelope);

    match msg.to_json() {
        Ok(json) => {
            ws_tx.send(Message::Text(json)).await?;
            metrics.inc_sent();
            Ok(())
        }
        Err(e) => {
            // Don't break the connection on a serialization error
            metrics.inc_dropped();
            logger::error(
                LogTag::Webserver,
                &format!("Failed to serialize message: {}", e),
            );
            Ok(())
        }
    }
}

/// Handle a client control message
async fn handle_client_message(
    text: &str,
    ws_tx: &mut futures::stream::SplitSink<WebSocket, Message>,
    conn_id: ConnectionId,
) -> Result<(), String> {
    let client_msg: ClientMessage =
        serde_json::from_str(text).map_err(|e| format!("Invalid client message: {}", e))?;

    match client_msg {
        ClientMessage::Hello { client_id } => {
            if is_debug_webserver_enabled() {
                logger::debug(
                    LogTag::Webserver,
                    &format!("Connection {}: hello (client_id={:?})", conn_id, client_id),
                );
            }

            let response = ServerMessage::Ack {
                message: "Hello acknowledged".to_string(),
                context: Some(serde_json::json!({
                    "connection_id": conn_id,
                    "protocol_version": super::message::PROTOCOL_VERSION,
                })),
            };
            send_control_message(ws_tx, response).await?;
        }

        ClientMessage::Ping { id } => {
            let response = ServerMessage::Pong { id };
            send_control_message(ws_tx, response).await?;
        }
    }

    Ok(())
}

/// Send a control message to the client
async fn send_control_message(
    ws_tx: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<(), String> {
    let json = msg
        .to_json()
        .map_err(|e| format!("Serialization error: {}", e))?;
    ws_tx
        .send(Message::Text(json))
        .await
        .map_err(|e| format!("Send error: {}", e))?;
    Ok(())
}
