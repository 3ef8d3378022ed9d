//! Rush: everyone builds their own crossword from a shared tile pool; the
//! first player with a valid board when the pool runs dry wins.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dictionary::Dictionary;
use super::letter_grid::{LetterGrid, LetterTile, Pos, TileId};
use super::outcome::Outcome;
use super::rules::{check_range, ensure_in_play, GameRules};
use super::seed_derivation::ShuffleSeed;
use crate::errors::{ConfigError, GameError};

const MAX_DRAW_ROUNDS: usize = 200;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// English letter frequency.
    Standard,
    Bananagrams,
    Scrabble,
}

impl Frequency {
    /// Relative weight per letter, A to Z.
    fn weights(self) -> [f64; 26] {
        match self {
            Frequency::Standard => [
                8.04, 1.48, 3.34, 3.82, 12.49, 2.40, 1.87, 5.05, 7.57, 0.16, 0.54, 4.07, 2.51,
                7.23, 7.64, 2.14, 0.12, 6.28, 6.51, 9.28, 2.73, 1.05, 1.68, 0.23, 1.66, 0.09,
            ],
            Frequency::Bananagrams => [
                9.03, 2.08, 2.08, 4.17, 12.5, 2.08, 2.78, 2.08, 8.33, 1.39, 1.39, 3.47, 2.08,
                5.56, 7.64, 2.08, 1.39, 6.25, 4.17, 4.16, 2.08, 2.08, 2.08, 1.39, 2.08, 1.39,
            ],
            Frequency::Scrabble => [
                9.0, 2.0, 2.0, 4.0, 12.0, 3.0, 4.0, 3.0, 9.0, 1.0, 1.0, 4.0, 2.0, 6.0, 8.0, 2.0,
                1.0, 6.0, 4.0, 6.0, 4.0, 2.0, 2.0, 1.0, 2.0, 1.0,
            ],
        }
    }
}

/// `count` tiles split across the alphabet by `frequency` (largest
/// remainder), numbered from 1 and shuffled.
pub fn generate_tiles<R: Rng + ?Sized>(
    count: usize,
    frequency: Frequency,
    rng: &mut R,
) -> Vec<LetterTile> {
    let weights = frequency.weights();
    let total: f64 = weights.iter().sum();
    let exact: Vec<f64> = weights.iter().map(|w| w / total * count as f64).collect();
    let mut counts: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let mut by_remainder: Vec<usize> = (0..26).collect();
    by_remainder.sort_by(|&a, &b| {
        let (ra, rb) = (exact[a] - exact[a].floor(), exact[b] - exact[b].floor());
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    let short = count - counts.iter().sum::<usize>();
    for &letter in by_remainder.iter().cycle().take(short) {
        counts[letter] += 1;
    }

    let mut tiles = Vec::with_capacity(count);
    for (letter, &n) in (b'A'..=b'Z').zip(counts.iter()) {
        for _ in 0..n {
            tiles.push(LetterTile {
                id: tiles.len() as TileId + 1,
                value: char::from(letter),
            });
        }
    }
    tiles.shuffle(rng);
    tiles
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RushConfig {
    pub num_tiles: usize,
    /// `num_tiles` is per player rather than in total.
    pub tiles_per_player: bool,
    pub frequency: Frequency,
    pub start_size: usize,
    pub draw_size: usize,
    pub discard_penalty: usize,
}

impl Default for RushConfig {
    fn default() -> Self {
        Self {
            num_tiles: 75,
            tiles_per_player: false,
            frequency: Frequency::Standard,
            start_size: 12,
            draw_size: 1,
            discard_penalty: 3,
        }
    }
}

impl RushConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        check_range("num_tiles", self.num_tiles, 10..=300)?;
        check_range("start_size", self.start_size, 7..=25)?;
        check_range("draw_size", self.draw_size, 1..=10)?;
        check_range("discard_penalty", self.discard_penalty, 1..=5)?;
        Ok(())
    }

    pub fn total_tiles(&self, players: usize) -> usize {
        if self.tiles_per_player {
            self.num_tiles * players
        } else {
            self.num_tiles
        }
    }

    /// The pool must cover the opening hands plus 1 to 200 rounds of drawing.
    pub fn validate_for(&self, players: usize) -> Result<(), GameError> {
        let total = self.total_tiles(players);
        let opening = self.start_size * players;
        let one_draw = self.draw_size * players;
        let rounds = total.saturating_sub(opening) / one_draw.max(1);
        if total < opening + one_draw || rounds > MAX_DRAW_ROUNDS {
            let scope = if self.tiles_per_player { "per player" } else { "total" };
            return Err(ConfigError::new(
                "num_tiles",
                format!("{} {scope}", self.num_tiles),
                "enough for 1 to 200 rounds of drawing",
            )
            .into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RushPlayer {
    pub board: LetterGrid,
    pub hand: Vec<LetterTile>,
}

impl RushPlayer {
    fn take_from_hand(&mut self, id: TileId) -> Option<LetterTile> {
        let index = self.hand.iter().position(|t| t.id == id)?;
        Some(self.hand.remove(index))
    }

    fn holds(&self, id: TileId) -> bool {
        self.hand.iter().any(|t| t.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RushState {
    pub config: RushConfig,
    shuffle: ShuffleSeed,

    pub pool: Vec<LetterTile>,
    pub players: Vec<RushPlayer>,
    /// Bumped on every shared draw; a draw request must name the current one.
    pub draw_id: u32,
    constructed: usize,

    pub started: bool,
    pub finished: bool,
    pub winner: Option<usize>,
}

impl RushState {
    pub fn new(config: RushConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            shuffle: ShuffleSeed::new(seed),
            pool: Vec::new(),
            players: Vec::new(),
            draw_id: 0,
            constructed: 0,
            started: false,
            finished: false,
            winner: None,
        })
    }

    fn ensure_playing(&self, player: usize) -> Result<(), GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())
    }

    fn draw_into(&mut self, player: usize, count: usize) {
        let count = count.min(self.pool.len());
        let drawn: Vec<LetterTile> = self.pool.drain(..count).collect();
        self.players[player].hand.extend(drawn);
    }

    /// Place a hand tile on the board. An occupied target swaps the board
    /// tile back into the hand.
    pub fn play_tile(&mut self, player: usize, tile_id: TileId, pos: Pos) -> Result<Outcome, GameError> {
        self.ensure_playing(player)?;
        let seat = &self.players[player];
        if !seat.holds(tile_id) {
            return Err(GameError::validation("tile is not in hand"));
        }
        if let Some(occupant) = seat.board.tile_at(pos) {
            return self.swap_tiles(player, tile_id, occupant);
        }
        let seat = &mut self.players[player];
        if let Some(tile) = seat.take_from_hand(tile_id) {
            seat.board.add(tile, pos);
        }
        Ok(Outcome::Continue)
    }

    pub fn move_tile(&mut self, player: usize, tile_id: TileId, pos: Pos) -> Result<Outcome, GameError> {
        self.ensure_playing(player)?;
        if !self.players[player].board.move_to(tile_id, pos) {
            return Err(GameError::validation(format!(
                "not a valid tile identifier: {tile_id}"
            )));
        }
        Ok(Outcome::Continue)
    }

    pub fn swap_tiles(&mut self, player: usize, first: TileId, second: TileId) -> Result<Outcome, GameError> {
        self.ensure_playing(player)?;
        let seat = &mut self.players[player];
        let (first_held, second_held) = (seat.holds(first), seat.holds(second));
        let (from_hand, on_board) = match (first_held, second_held) {
            // Hand order is cosmetic.
            (true, true) => return Ok(Outcome::Continue),
            (true, false) => (first, second),
            (false, true) => (second, first),
            (false, false) => {
                return if seat.board.swap(first, second) {
                    Ok(Outcome::Continue)
                } else {
                    Err(GameError::validation("both tiles must be on the board or in hand"))
                };
            }
        };
        let pos = seat
            .board
            .position_of(on_board)
            .ok_or_else(|| GameError::validation(format!("not a valid tile identifier: {on_board}")))?;
        let lifted = seat
            .board
            .remove(on_board)
            .ok_or_else(|| GameError::invariant("board tile vanished during swap"))?;
        if let Some(tile) = seat.take_from_hand(from_hand) {
            seat.board.add(tile, pos);
        }
        seat.hand.push(lifted);
        Ok(Outcome::Continue)
    }

    pub fn recall_tile(&mut self, player: usize, tile_id: TileId) -> Result<Outcome, GameError> {
        self.ensure_playing(player)?;
        let seat = &mut self.players[player];
        let tile = seat
            .board
            .remove(tile_id)
            .ok_or_else(|| GameError::validation("not a valid tile identifier on the board"))?;
        seat.hand.push(tile);
        Ok(Outcome::Continue)
    }

    /// Trade one tile (from hand or board) for `discard_penalty` new ones; the
    /// returned tile is shuffled back into the pool.
    pub fn discard_tile(&mut self, player: usize, tile_id: TileId) -> Result<Outcome, GameError> {
        self.ensure_playing(player)?;
        if self.config.discard_penalty > self.pool.len() {
            return Err(GameError::validation("unable to draw; not enough tiles remaining"));
        }
        let seat = &mut self.players[player];
        let tile = match seat.board.remove(tile_id) {
            Some(tile) => tile,
            None => seat
                .take_from_hand(tile_id)
                .ok_or_else(|| GameError::validation("unable to find tile in hand"))?,
        };

        self.draw_into(player, self.config.discard_penalty);
        self.pool.push(tile);
        self.pool.shuffle(&mut self.shuffle.next_rng());
        Ok(Outcome::Continue)
    }

    /// Why the player's board is not yet acceptable, if it isn't.
    pub fn check_board(&self, player: usize, dictionary: &Dictionary) -> Result<(), GameError> {
        if !self.started {
            return Err(GameError::validation("game hasn't started yet"));
        }
        let board = &self
            .players
            .get(player)
            .ok_or_else(|| GameError::validation(format!("not a valid player identifier: {player}")))?
            .board;
        if board.len() <= 1 {
            return Err(GameError::validation("expected more than one tile on the board"));
        }
        if !board.is_connected() {
            return Err(GameError::validation(
                "expected board to be a single connected component",
            ));
        }
        if let Some(word) = board.words().into_iter().find(|w| !dictionary.contains(w)) {
            return Err(GameError::validation(format!("not a valid word: {word}")));
        }
        Ok(())
    }

    /// With an empty hand and a valid board, everyone draws `draw_size`
    /// tiles. When the pool cannot cover that, the drawer wins.
    pub fn draw(&mut self, player: usize, draw_id: u32, dictionary: &Dictionary) -> Result<Outcome, GameError> {
        self.ensure_playing(player)?;
        if !self.players[player].hand.is_empty() {
            return Err(GameError::validation("unable to draw while tiles remain in the hand"));
        }
        if draw_id < self.draw_id {
            return Err(GameError::validation("unable to draw with old draw id"));
        }
        self.check_board(player, dictionary).map_err(|err| {
            GameError::validation(format!("unable to draw because of invalid board: {err}"))
        })?;

        let needed = self.config.draw_size * self.players.len();
        if needed > self.pool.len() {
            self.finished = true;
            self.winner = Some(player);
            debug!(player, "[RUSH] pool exhausted");
            return Ok(Outcome::GameComplete { winner: player });
        }

        self.draw_id += 1;
        for seat in 0..self.players.len() {
            self.draw_into(seat, self.config.draw_size);
        }
        Ok(Outcome::Continue)
    }
}

impl GameRules for RushState {
    fn start(&mut self, players: usize) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("double start occurred"));
        }
        check_range("num_players", players, 2..=50)?;
        self.config.validate_for(players)?;

        let total = self.config.total_tiles(players);
        self.pool = generate_tiles(total, self.config.frequency, &mut self.shuffle.next_rng());
        self.constructed = total;
        self.players = vec![RushPlayer::default(); players];
        for seat in 0..players {
            self.draw_into(seat, self.config.start_size);
        }
        // Clients start at draw 0; bumping to 1 makes them load their hands.
        self.draw_id = 1;
        self.started = true;
        debug!(players, tiles = total, "[RUSH] started");
        Ok(())
    }

    fn is_started(&self) -> bool {
        self.started
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn winner(&self) -> Option<usize> {
        self.winner
    }

    fn num_players(&self) -> usize {
        self.players.len()
    }

    fn counted_cards(&self) -> usize {
        self.pool.len()
            + self
                .players
                .iter()
                .map(|p| p.hand.len() + p.board.len())
                .sum::<usize>()
    }

    fn constructed_cards(&self) -> usize {
        self.constructed
    }
}
