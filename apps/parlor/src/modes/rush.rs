use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{to_json, Handled, ModeRules};
use crate::domain::dictionary::Dictionary;
use crate::domain::letter_grid::{LetterTile, PlacedTile, Pos, TileId};
use crate::domain::rules::GameMode;
use crate::domain::rush::{RushConfig, RushState};
use crate::errors::GameError;
use crate::protocol::Notification;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum RushMessage {
    Play { tile_id: TileId, x: i32, y: i32 },
    Move { tile_id: TileId, x: i32, y: i32 },
    Swap { first_id: TileId, second_id: TileId },
    Recall { tile_id: TileId },
    Discard { tile_id: TileId },
    Draw { draw_id: u32 },
    Check,
}

#[derive(Serialize)]
struct RushView<'a> {
    seat: usize,
    hand: &'a [LetterTile],
    board: Vec<&'a PlacedTile>,
    words: Vec<String>,
    draw_id: u32,
    pool_size: usize,
    finished: bool,
    winner: Option<usize>,
}

#[derive(Serialize)]
struct RushSynopsis {
    hand_sizes: Vec<usize>,
    board_sizes: Vec<usize>,
    draw_id: u32,
    pool_size: usize,
    finished: bool,
    winner: Option<usize>,
}

impl ModeRules for RushState {
    const MODE: GameMode = GameMode::Rush;
    type Config = RushConfig;
    type Message = RushMessage;

    fn create(config: RushConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        RushState::new(config, seed)
    }

    fn apply(
        &mut self,
        seat: usize,
        message: RushMessage,
        dictionary: &Dictionary,
    ) -> Result<Handled, GameError> {
        let outcome = match message {
            RushMessage::Play { tile_id, x, y } => self.play_tile(seat, tile_id, Pos::new(x, y))?,
            RushMessage::Move { tile_id, x, y } => self.move_tile(seat, tile_id, Pos::new(x, y))?,
            RushMessage::Swap { first_id, second_id } => {
                self.swap_tiles(seat, first_id, second_id)?
            }
            RushMessage::Recall { tile_id } => self.recall_tile(seat, tile_id)?,
            RushMessage::Discard { tile_id } => self.discard_tile(seat, tile_id)?,
            RushMessage::Draw { draw_id } => self.draw(seat, draw_id, dictionary)?,
            RushMessage::Check => {
                let checked = self.check_board(seat, dictionary);
                return Ok(Handled::Reply(Notification::Check {
                    valid: checked.is_ok(),
                    error: checked.err().map(|e| e.to_string()),
                }));
            }
        };
        Ok(Handled::Changed(outcome))
    }

    fn player_view(&self, seat: usize) -> Result<Value, GameError> {
        let player = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::invariant(format!("no rush seat {seat}")))?;
        to_json(&RushView {
            seat,
            hand: &player.hand,
            board: player.board.tiles().collect(),
            words: player.board.words(),
            draw_id: self.draw_id,
            pool_size: self.pool.len(),
            finished: self.finished,
            winner: self.winner,
        })
    }

    fn synopsis(&self) -> Result<Value, GameError> {
        to_json(&RushSynopsis {
            hand_sizes: self.players.iter().map(|p| p.hand.len()).collect(),
            board_sizes: self.players.iter().map(|p| p.board.len()).collect(),
            draw_id: self.draw_id,
            pool_size: self.pool.len(),
            finished: self.finished,
            winner: self.winner,
        })
    }
}
