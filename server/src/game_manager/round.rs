use crate::game_manager::{AppState, SessionError};
use shared::ServerMessage;
use std::sync::Arc;
use std::time::Duration;

impl AppState {
    /// Deals a new grid, resets the score and arms the room's countdown.
    /// Starting a running room restarts it; the old timer is superseded.
    /// A rejected duration leaves the room exactly as it was.
    pub async fn start_game(
        self: &Arc<Self>,
        player_id: &str,
        duration: Option<Duration>,
    ) -> Result<(), SessionError> {
        let (room_id, room_lock) = self.room_of(player_id)?;
        let mut room = room_lock.lock().await;
        if room.closed {
            return Err(SessionError::RoomNotFound(room_id));
        }

        let duration = duration.unwrap_or(self.config.game_duration);
        let restarting = room.countdown.is_armed();
        room.start(
            self.config.grid_rows,
            self.config.grid_cols,
            duration,
            &mut rand::thread_rng(),
        )?;
        room.touch();

        let state = Arc::clone(self);
        let expiring_room = room_id.clone();
        room.countdown
            .arm(duration, move |epoch| async move {
                state.expire_session(&expiring_room, epoch).await;
            })
            .ok_or(SessionError::InvalidDuration)?;

        tracing::info!(
            player_id = %player_id,
            room_id = %room_id,
            seconds = duration.as_secs(),
            restarting,
            "Game started"
        );
        self.broadcast(&room, &ServerMessage::GameStarted(Box::new(room.snapshot())));
        Ok(())
    }

    /// Countdown expiry. Ignored unless the room still exists and `epoch` is
    /// the timer currently armed on it.
    pub async fn expire_session(&self, room_id: &str, epoch: u64) {
        let Ok(room_lock) = self.room_handle(room_id) else {
            tracing::debug!(room_id = %room_id, "Countdown fired for a removed room");
            return;
        };
        let mut room = room_lock.lock().await;
        if room.closed || !room.countdown.fire(epoch) {
            tracing::debug!(room_id = %room_id, epoch, "Stale countdown ignored");
            return;
        }
        if !room.end() {
            return;
        }

        tracing::info!(room_id = %room_id, score = room.score, "Game over");
        self.broadcast(&room, &ServerMessage::GameOver { score: room.score });
    }
}
