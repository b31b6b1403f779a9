use crate::game_manager::AppState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use shared::{GameMessage, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Forward queued messages to the WebSocket
    let forwarder = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(%err, "Failed to encode outbound message");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let player_id = uuid::Uuid::new_v4().to_string();
    let _ = tx.send(ServerMessage::Connected {
        player_id: player_id.clone(),
    });
    state.add_player(player_id.clone(), tx);

    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let game_msg = match serde_json::from_str::<GameMessage>(&text) {
            Ok(game_msg) => game_msg,
            Err(err) => {
                tracing::warn!(player_id = %player_id, %err, "Ignoring malformed message");
                continue;
            }
        };

        if let Err(err) = state.handle_message(&player_id, game_msg).await {
            if err.is_not_found() {
                state.send_to(&player_id, ServerMessage::Error(err.to_string()));
            } else {
                tracing::debug!(player_id = %player_id, %err, "Request rejected");
            }
        }
    }

    // Client disconnected
    state.remove_player(&player_id).await;
    forwarder.abort();
}
