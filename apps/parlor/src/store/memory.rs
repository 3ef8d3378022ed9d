use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use super::{GameRecord, Store};
use crate::domain::rules::GameMode;
use crate::domain::seed_derivation::fresh_game_seed;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::protocol::{GameId, UserId};

/// Process-local store. Game ids start at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    games: RwLock<HashMap<GameId, GameRecord>>,
    states: RwLock<HashMap<GameId, Value>>,
    players: RwLock<HashMap<(GameId, UserId), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with a known seed, for reproducible games.
    pub fn insert_game(&self, record: GameRecord) {
        self.next_id.fetch_max(record.game_id, Ordering::SeqCst);
        self.games.write().insert(record.game_id, record);
    }

    fn ensure_game(&self, game_id: GameId) -> Result<(), AppError> {
        if self.games.read().contains_key(&game_id) {
            Ok(())
        } else {
            Err(AppError::not_found(
                ErrorCode::GameNotFound,
                format!("game {game_id} does not exist"),
            ))
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_game(
        &self,
        mode: GameMode,
        owner: UserId,
        config: Value,
    ) -> Result<GameRecord, AppError> {
        let game_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = GameRecord {
            game_id,
            mode,
            owner,
            config,
            seed: fresh_game_seed(),
        };
        self.games.write().insert(game_id, record.clone());
        debug!(game_id, owner, mode = mode.as_str(), "[STORE] game created");
        Ok(record)
    }

    async fn load_config(&self, game_id: GameId) -> Result<Option<GameRecord>, AppError> {
        Ok(self.games.read().get(&game_id).cloned())
    }

    async fn load_state(&self, game_id: GameId) -> Result<Option<Value>, AppError> {
        Ok(self.states.read().get(&game_id).cloned())
    }

    async fn save_state(&self, game_id: GameId, state: Value) -> Result<(), AppError> {
        self.ensure_game(game_id)?;
        self.states.write().insert(game_id, state);
        Ok(())
    }

    async fn load_player_state(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> Result<Option<Value>, AppError> {
        Ok(self.players.read().get(&(game_id, user_id)).cloned())
    }

    async fn save_player_state(
        &self,
        game_id: GameId,
        user_id: UserId,
        state: Value,
    ) -> Result<(), AppError> {
        self.ensure_game(game_id)?;
        self.players.write().insert((game_id, user_id), state);
        Ok(())
    }
}
