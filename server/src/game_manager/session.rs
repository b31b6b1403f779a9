use crate::game_manager::countdown::Countdown;
use crate::game_manager::error::SessionError;
use rand::Rng;
use shared::{PlayerSnapshot, Pointer, RoomSnapshot, RoomStatus, ServerMessage};
use std::collections::HashMap;
use std::time::Duration;
use sumten_core::{Grid, Rect, Selection};
use tokio::sync::mpsc;
use tokio::time::Instant;

pub type Tx = mpsc::UnboundedSender<ServerMessage>;

/// Longest round a start request may ask for.
pub const MAX_GAME_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// A connected client, in a room or not.
pub struct Player {
    pub tx: Tx,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub pointer: Pointer,
    pub selection: Selection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopOutcome {
    /// The selection did not sum to ten; nothing changed.
    Missed { sum: u32 },
    Popped {
        cleared: Rect,
        gained: u32,
        score: u32,
        /// Grid right after the clear.
        grid: Grid,
        /// Replacement grid when the clear left no possible move.
        refreshed: Option<Grid>,
    },
}

#[derive(Debug)]
pub struct Room {
    pub room_id: String,
    pub players: HashMap<String, PlayerState>,
    pub grid: Grid,
    pub score: u32,
    pub status: RoomStatus,
    pub duration: Duration,
    pub countdown: Countdown,
    /// Set once the room has been dropped from the registry. Anyone still
    /// holding its handle must treat it as gone.
    pub closed: bool,
    pub last_activity: Instant,
}

impl Room {
    pub fn new(room_id: String, creator: String) -> Self {
        let mut players = HashMap::new();
        players.insert(creator, PlayerState::default());
        Self {
            room_id,
            players,
            grid: Grid::empty(),
            score: 0,
            status: RoomStatus::Lobby,
            duration: Duration::ZERO,
            countdown: Countdown::default(),
            closed: false,
            last_activity: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Adds a player with a default pointer and no selection. Re-adding an
    /// existing member keeps their state.
    pub fn add_player(&mut self, player_id: String) {
        self.players.entry(player_id).or_default();
    }

    pub fn remove_player(&mut self, player_id: &str) -> bool {
        self.players.remove(player_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &String> {
        self.players.keys()
    }

    /// Deals a fresh grid and resets the round. Timer arming is left to the
    /// caller, which owns the task runtime.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        rows: usize,
        cols: usize,
        duration: Duration,
        rng: &mut R,
    ) -> Result<(), SessionError> {
        if duration.is_zero()
            || duration > MAX_GAME_DURATION
            || Instant::now().checked_add(duration).is_none()
        {
            return Err(SessionError::InvalidDuration);
        }
        self.grid = Grid::generate_playable(rows, cols, rng);
        self.score = 0;
        self.duration = duration;
        self.status = RoomStatus::Active;
        for state in self.players.values_mut() {
            state.selection.end();
        }
        Ok(())
    }

    /// Moves an active round to Ended. False if the room was not Active.
    pub fn end(&mut self) -> bool {
        if self.status != RoomStatus::Active {
            return false;
        }
        self.status = RoomStatus::Ended;
        true
    }

    pub fn move_pointer(&mut self, player_id: &str, pointer: Pointer) -> Result<(), SessionError> {
        self.player_mut(player_id)?.pointer = pointer;
        Ok(())
    }

    pub fn begin_selection(
        &mut self,
        player_id: &str,
        row: usize,
        col: usize,
    ) -> Result<Rect, SessionError> {
        self.check_cell(row, col)?;
        Ok(self.player_mut(player_id)?.selection.begin(row, col))
    }

    pub fn update_selection(
        &mut self,
        player_id: &str,
        row: usize,
        col: usize,
    ) -> Result<Rect, SessionError> {
        self.check_cell(row, col)?;
        Ok(self.player_mut(player_id)?.selection.update(row, col)?)
    }

    pub fn end_selection(&mut self, player_id: &str) -> Result<(), SessionError> {
        self.player_mut(player_id)?.selection.end();
        Ok(())
    }

    /// Pops the player's current selection if it sums to ten.
    ///
    /// The selection stays in place either way; only an explicit end of the
    /// drag clears it.
    pub fn try_pop<R: Rng + ?Sized>(
        &mut self,
        player_id: &str,
        rng: &mut R,
    ) -> Result<PopOutcome, SessionError> {
        if self.status != RoomStatus::Active {
            return Err(SessionError::RoomNotActive);
        }
        let rect = self
            .players
            .get(player_id)
            .ok_or_else(|| SessionError::PlayerNotFound(player_id.to_string()))?
            .selection
            .rect()
            .copied()
            .ok_or(SessionError::NotSelecting)?;

        let Some(area) = self.grid.try_pop(&rect) else {
            return Ok(PopOutcome::Missed {
                sum: self.grid.sum_over(&rect),
            });
        };

        // Bounded by rows * cols of a grid that has to fit in memory.
        #[allow(clippy::cast_possible_truncation)]
        let gained = area as u32;
        self.score += gained;
        let grid = self.grid.clone();
        let refreshed = if self.grid.has_poppable_area() {
            None
        } else {
            self.grid = Grid::generate_playable(self.grid.rows(), self.grid.cols(), rng);
            Some(self.grid.clone())
        };

        Ok(PopOutcome::Popped {
            cleared: rect.normalized(),
            gained,
            score: self.score,
            grid,
            refreshed,
        })
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let mut players: Vec<PlayerSnapshot> = self
            .players
            .iter()
            .map(|(id, state)| PlayerSnapshot {
                player_id: id.clone(),
                pointer: state.pointer,
                selection: state.selection.rect().copied(),
            })
            .collect();
        players.sort_by(|a, b| a.player_id.cmp(&b.player_id));

        RoomSnapshot {
            room_id: self.room_id.clone(),
            status: self.status,
            players,
            grid: self.grid.clone(),
            score: self.score,
            duration_seconds: self.duration.as_secs(),
            remaining_seconds: self.countdown.remaining().map(|d| d.as_secs()),
        }
    }

    fn player_mut(&mut self, player_id: &str) -> Result<&mut PlayerState, SessionError> {
        self.players
            .get_mut(player_id)
            .ok_or_else(|| SessionError::PlayerNotFound(player_id.to_string()))
    }

    /// Selections only make sense on a live grid, and every cell they touch
    /// must exist so later sums cannot leave the grid.
    fn check_cell(&self, row: usize, col: usize) -> Result<(), SessionError> {
        if self.status != RoomStatus::Active {
            return Err(SessionError::RoomNotActive);
        }
        if !self.grid.contains(row, col) {
            return Err(SessionError::CellOutOfGrid { row, col });
        }
        Ok(())
    }
}
