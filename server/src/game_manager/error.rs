use sumten_core::SelectionError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("room {0} not found")]
    RoomNotFound(String),
    #[error("player {0} is not in a room")]
    PlayerNotFound(String),
    #[error("room is not in an active game")]
    RoomNotActive,
    #[error("no selection in progress")]
    NotSelecting,
    #[error("cell ({row}, {col}) is outside the grid")]
    CellOutOfGrid { row: usize, col: usize },
    #[error("game duration must be positive")]
    InvalidDuration,
}

impl SessionError {
    /// Lookup misses are reported back to the caller; everything else is a
    /// stale or out-of-order request and is dropped quietly.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::RoomNotFound(_) | Self::PlayerNotFound(_))
    }
}

impl From<SelectionError> for SessionError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::NotSelecting => Self::NotSelecting,
        }
    }
}
