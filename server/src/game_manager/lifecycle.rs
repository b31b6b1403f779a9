use crate::game_manager::{session::Player, AppState, Room, SessionError};
use dashmap::mapref::entry::Entry;
use shared::ServerMessage;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

impl AppState {
    pub fn add_player(&self, id: String, tx: crate::game_manager::Tx) {
        tracing::info!(player_id = %id, "Player connected");
        self.players.insert(id, Player { tx });
    }

    /// Transport-detected departure: drops the connection and leaves any room.
    pub async fn remove_player(&self, id: &str) {
        tracing::info!(player_id = %id, "Removing player from AppState");
        match self.leave_room(id).await {
            Ok(()) | Err(SessionError::PlayerNotFound(_)) => {}
            Err(err) => tracing::debug!(player_id = %id, %err, "Leave on disconnect failed"),
        }
        self.players.remove(id);
    }

    /// Opens a new room in Lobby with the caller as its first member and
    /// returns the room id.
    pub async fn create_room(&self, player_id: &str) -> Result<String, SessionError> {
        self.leave_current_room(player_id).await;

        let room_id = Uuid::new_v4().to_string();
        let room = Room::new(room_id.clone(), player_id.to_string());
        let snapshot = room.snapshot();

        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(_) => panic!("room id {room_id} allocated twice"),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(room)));
            }
        }
        self.player_to_room
            .insert(player_id.to_string(), room_id.clone());

        tracing::info!(player_id = %player_id, room_id = %room_id, "Room created");
        self.send_to(player_id, ServerMessage::RoomSnapshot(Box::new(snapshot)));
        Ok(room_id)
    }

    /// Adds the caller to an existing room, in any status. The joiner gets the
    /// full snapshot; the other members get a join notice.
    ///
    /// The caller is seated in the target before leaving their previous room,
    /// so a join that fails leaves them where they were.
    pub async fn join_room(&self, player_id: &str, room_id: &str) -> Result<(), SessionError> {
        let room_lock = self.room_handle(room_id)?;
        let previous = {
            let mut room = room_lock.lock().await;
            if room.closed {
                return Err(SessionError::RoomNotFound(room_id.to_string()));
            }

            room.add_player(player_id.to_string());
            room.touch();
            let previous = self
                .player_to_room
                .insert(player_id.to_string(), room_id.to_string());
            let already_here = previous.as_deref() == Some(room_id);

            tracing::info!(player_id = %player_id, room_id = %room_id, status = ?room.status, "Player joined room");
            self.send_to(
                player_id,
                ServerMessage::RoomSnapshot(Box::new(room.snapshot())),
            );
            if !already_here {
                self.broadcast_except(
                    &room,
                    player_id,
                    &ServerMessage::PlayerJoined {
                        player_id: player_id.to_string(),
                    },
                );
            }
            previous.filter(|_| !already_here)
        };

        if let Some(previous) = previous {
            tracing::debug!(player_id = %player_id, room_id = %previous, "Leaving previous room");
            self.depart(player_id, &previous).await;
        }
        Ok(())
    }

    /// Removes the caller from their room and tells the remaining members.
    /// The last one out closes the room.
    pub async fn leave_room(&self, player_id: &str) -> Result<(), SessionError> {
        let (_, room_id) = self
            .player_to_room
            .remove(player_id)
            .ok_or_else(|| SessionError::PlayerNotFound(player_id.to_string()))?;
        self.depart(player_id, &room_id).await;
        Ok(())
    }

    /// Drops the player from one room's member list. The caller has already
    /// moved or removed the player's room mapping.
    async fn depart(&self, player_id: &str, room_id: &str) {
        let Ok(room_lock) = self.room_handle(room_id) else {
            tracing::debug!(player_id = %player_id, room_id = %room_id, "Room already gone");
            return;
        };
        let mut room = room_lock.lock().await;
        if !room.remove_player(player_id) {
            return;
        }
        room.touch();

        tracing::info!(player_id = %player_id, room_id = %room_id, "Player left room");
        self.broadcast(
            &room,
            &ServerMessage::PlayerLeft {
                player_id: player_id.to_string(),
            },
        );

        if room.is_empty() {
            self.close_room(&mut room);
        }
    }

    async fn leave_current_room(&self, player_id: &str) {
        if self.player_to_room.contains_key(player_id) {
            tracing::debug!(player_id = %player_id, "Leaving previous room first");
            let _ = self.leave_room(player_id).await;
        }
    }

    /// Drops the room from the registry together with every member mapping
    /// and its timer. Must be called with the room lock held.
    fn close_room(&self, room: &mut Room) {
        room.closed = true;
        room.countdown.cancel();
        for player_id in room.player_ids() {
            self.player_to_room
                .remove_if(player_id, |_, mapped| *mapped == room.room_id);
        }
        self.rooms.remove(&room.room_id);
        tracing::info!(room_id = %room.room_id, "Room closed");
    }

    /// Closes rooms that have seen no activity for the configured idle time,
    /// notifying whoever is still inside. Returns the closed room ids.
    pub async fn reap_idle_rooms(&self) -> Vec<String> {
        let now = Instant::now();
        let handles: Vec<_> = self
            .rooms
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut reaped = Vec::new();
        for (room_id, room_lock) in handles {
            let mut room = room_lock.lock().await;
            let idle = now.saturating_duration_since(room.last_activity);
            if room.closed || idle < self.config.room_idle_ttl {
                continue;
            }
            tracing::info!(room_id = %room_id, players = room.players.len(), "Cleaning up inactive room");
            self.broadcast(
                &room,
                &ServerMessage::RoomClosed {
                    room_id: room_id.clone(),
                },
            );
            self.close_room(&mut room);
            reaped.push(room_id);
        }
        reaped
    }

    pub fn spawn_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.cleanup_interval);
            loop {
                interval.tick().await;
                let reaped = self.reap_idle_rooms().await;
                if !reaped.is_empty() {
                    tracing::info!(count = reaped.len(), "Idle room sweep finished");
                }
            }
        });
    }
}
