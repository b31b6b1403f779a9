use crate::config::ServerConfig;
use dashmap::DashMap;
use shared::{GameMessage, Pointer, ServerMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub mod countdown;
pub mod error;
pub mod lifecycle;
pub mod move_handler;
pub mod round;
pub mod session;

pub use error::SessionError;
pub use session::{PopOutcome, Room, Tx};

pub type RoomHandle = Arc<Mutex<Room>>;

/// Session registry shared by every connection.
///
/// `player_to_room` names the one room a player acts in, and that room always
/// lists the player. While a join moves a player, the room being left may
/// still list them until its lock is free. Entries are only added or removed
/// by the methods in [`lifecycle`].
pub struct AppState {
    pub config: ServerConfig,
    pub players: DashMap<String, session::Player>,
    pub rooms: DashMap<String, RoomHandle>,
    pub player_to_room: DashMap<String, String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self {
            config,
            players: DashMap::new(),
            rooms: DashMap::new(),
            player_to_room: DashMap::new(),
        }
    }

    /// Routes one inbound message to its operation.
    pub async fn handle_message(
        self: &Arc<Self>,
        player_id: &str,
        msg: GameMessage,
    ) -> Result<(), SessionError> {
        match msg {
            GameMessage::CreateRoom => self.create_room(player_id).await.map(|_| ()),
            GameMessage::JoinRoom { room_id } => self.join_room(player_id, &room_id).await,
            GameMessage::StartGame { duration_seconds } => {
                self.start_game(player_id, duration_seconds.map(Duration::from_secs))
                    .await
            }
            GameMessage::PointerMove { x, y } => {
                self.move_pointer(player_id, Pointer { x, y }).await
            }
            GameMessage::SelectionBegin { row, col } => {
                self.begin_selection(player_id, row, col).await
            }
            GameMessage::SelectionUpdate { row, col } => {
                self.update_selection(player_id, row, col).await
            }
            GameMessage::SelectionEnd => self.end_selection(player_id).await,
            GameMessage::TryPop => self.try_pop(player_id).await,
            GameMessage::LeaveRoom => self.leave_room(player_id).await,
        }
    }

    /// Resolves `player -> room id -> room`. The handle is cloned out so no
    /// map guard is held while the room lock is awaited.
    pub fn room_of(&self, player_id: &str) -> Result<(String, RoomHandle), SessionError> {
        let room_id = self
            .player_to_room
            .get(player_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SessionError::PlayerNotFound(player_id.to_string()))?;
        let room = self.room_handle(&room_id)?;
        Ok((room_id, room))
    }

    pub fn room_handle(&self, room_id: &str) -> Result<RoomHandle, SessionError> {
        self.rooms
            .get(room_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))
    }

    pub fn send_to(&self, player_id: &str, msg: ServerMessage) {
        if let Some(player) = self.players.get(player_id) {
            let _ = player.tx.send(msg);
        }
    }

    /// Sends to every member of the room. Called with the room lock held so
    /// clients see updates in the order they were applied.
    pub fn broadcast(&self, room: &Room, msg: &ServerMessage) {
        for player_id in room.player_ids() {
            self.send_to(player_id, msg.clone());
        }
    }

    pub fn broadcast_except(&self, room: &Room, skip: &str, msg: &ServerMessage) {
        for player_id in room.player_ids().filter(|id| id.as_str() != skip) {
            self.send_to(player_id, msg.clone());
        }
    }
}
