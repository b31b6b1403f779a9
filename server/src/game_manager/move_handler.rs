use crate::game_manager::{AppState, PopOutcome, Room, SessionError};
use shared::{Pointer, ServerMessage};
use sumten_core::Rect;

impl AppState {
    pub async fn move_pointer(&self, player_id: &str, pointer: Pointer) -> Result<(), SessionError> {
        let (room_id, room_lock) = self.room_of(player_id)?;
        let mut room = room_lock.lock().await;
        if room.closed {
            return Err(SessionError::RoomNotFound(room_id));
        }

        room.move_pointer(player_id, pointer)?;
        room.touch();
        self.broadcast(
            &room,
            &ServerMessage::PointerUpdated {
                player_id: player_id.to_string(),
                pointer,
            },
        );
        Ok(())
    }

    pub async fn begin_selection(
        &self,
        player_id: &str,
        row: usize,
        col: usize,
    ) -> Result<(), SessionError> {
        self.change_selection(player_id, |room| {
            room.begin_selection(player_id, row, col).map(Some)
        })
        .await
    }

    pub async fn update_selection(
        &self,
        player_id: &str,
        row: usize,
        col: usize,
    ) -> Result<(), SessionError> {
        self.change_selection(player_id, |room| {
            room.update_selection(player_id, row, col).map(Some)
        })
        .await
    }

    pub async fn end_selection(&self, player_id: &str) -> Result<(), SessionError> {
        self.change_selection(player_id, |room| {
            room.end_selection(player_id).map(|()| None)
        })
        .await
    }

    /// Applies a selection change and shares the resulting rectangle (or its
    /// absence) with the room.
    async fn change_selection<F>(&self, player_id: &str, apply: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut Room) -> Result<Option<Rect>, SessionError>,
    {
        let (room_id, room_lock) = self.room_of(player_id)?;
        let mut room = room_lock.lock().await;
        if room.closed {
            return Err(SessionError::RoomNotFound(room_id));
        }

        let selection = apply(&mut *room)?;
        room.touch();
        self.broadcast(
            &room,
            &ServerMessage::SelectionUpdated {
                player_id: player_id.to_string(),
                selection,
            },
        );
        Ok(())
    }

    /// Pops the caller's selection. Only a successful pop is broadcast; a
    /// grid left without moves is replaced and broadcast right after.
    pub async fn try_pop(&self, player_id: &str) -> Result<(), SessionError> {
        let (room_id, room_lock) = self.room_of(player_id)?;
        let mut room = room_lock.lock().await;
        if room.closed {
            return Err(SessionError::RoomNotFound(room_id));
        }

        let outcome = room.try_pop(player_id, &mut rand::thread_rng())?;
        room.touch();
        match outcome {
            PopOutcome::Missed { sum } => {
                tracing::debug!(player_id = %player_id, room_id = %room_id, sum, "Pop missed");
            }
            PopOutcome::Popped {
                cleared,
                gained,
                score,
                grid,
                refreshed,
            } => {
                tracing::debug!(player_id = %player_id, room_id = %room_id, gained, score, "Pop succeeded");
                self.broadcast(
                    &room,
                    &ServerMessage::PopSucceeded {
                        player_id: player_id.to_string(),
                        cleared,
                        score,
                        grid,
                    },
                );
                if let Some(grid) = refreshed {
                    tracing::info!(room_id = %room_id, "No moves left, grid regenerated");
                    self.broadcast(&room, &ServerMessage::GridRefreshed { grid });
                }
            }
        }
        Ok(())
    }
}
