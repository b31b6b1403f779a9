use serde::{Deserialize, Serialize};
use sumten_core::{Grid, Rect};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GameMessage {
    CreateRoom,
    JoinRoom { room_id: String },
    StartGame { duration_seconds: Option<u64> },
    PointerMove { x: f64, y: f64 },
    SelectionBegin { row: usize, col: usize },
    SelectionUpdate { row: usize, col: usize },
    SelectionEnd,
    TryPop,
    LeaveRoom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerMessage {
    Connected {
        player_id: String,
    },
    RoomSnapshot(Box<RoomSnapshot>),
    GameStarted(Box<RoomSnapshot>),
    PlayerJoined {
        player_id: String,
    },
    PointerUpdated {
        player_id: String,
        pointer: Pointer,
    },
    SelectionUpdated {
        player_id: String,
        selection: Option<Rect>,
    },
    PopSucceeded {
        player_id: String,
        cleared: Rect,
        score: u32,
        grid: Grid,
    },
    GridRefreshed {
        grid: Grid,
    },
    PlayerLeft {
        player_id: String,
    },
    GameOver {
        score: u32,
    },
    RoomClosed {
        room_id: String,
    },
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomStatus {
    #[default]
    Lobby,
    Active,
    Ended,
}

/// Display coordinate of a player's cursor, unrelated to grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_id: String,
    pub pointer: Pointer,
    pub selection: Option<Rect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub status: RoomStatus,
    pub players: Vec<PlayerSnapshot>,
    pub grid: Grid,
    pub score: u32,
    pub duration_seconds: u64,
    pub remaining_seconds: Option<u64>,
}
