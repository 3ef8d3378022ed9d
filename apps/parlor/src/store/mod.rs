//! Persistence boundary for games and per-player session state.
//!
//! Sessions call into a [`Store`] when they are first created (lazy load)
//! and after every dispatch that changed something. The stored values are
//! opaque JSON; only the hub knows their shape.

mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use memory::MemoryStore;

use crate::domain::rules::GameMode;
use crate::error::AppError;
use crate::protocol::{GameId, UserId};

/// Everything needed to build a game from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: GameId,
    pub mode: GameMode,
    pub owner: UserId,
    pub config: Value,
    /// Base seed for every shuffle in the game.
    pub seed: [u8; 32],
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_game(
        &self,
        mode: GameMode,
        owner: UserId,
        config: Value,
    ) -> Result<GameRecord, AppError>;

    async fn load_config(&self, game_id: GameId) -> Result<Option<GameRecord>, AppError>;

    async fn load_state(&self, game_id: GameId) -> Result<Option<Value>, AppError>;

    async fn save_state(&self, game_id: GameId, state: Value) -> Result<(), AppError>;

    async fn load_player_state(
        &self,
        game_id: GameId,
        user_id: UserId,
    ) -> Result<Option<Value>, AppError>;

    async fn save_player_state(
        &self,
        game_id: GameId,
        user_id: UserId,
        state: Value,
    ) -> Result<(), AppError>;
}
