use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{to_json, Handled, ModeRules};
use crate::domain::cards::{Card, CardId};
use crate::domain::dictionary::Dictionary;
use crate::domain::eight_jacks::{Board, EightJacksConfig, EightJacksState};
use crate::domain::rules::GameMode;
use crate::errors::GameError;
use crate::protocol::Assignment;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum EightJacksMessage {
    /// Swap a dead card.
    Discard { card_id: CardId },
    Play { card_id: CardId, square_id: usize },
    Mark { squares: Vec<usize> },
    Sort { order: Vec<CardId> },
}

#[derive(Serialize)]
struct EightJacksView<'a> {
    seat: usize,
    team: usize,
    hand: &'a [Card],
    history: &'a [Card],
    board: &'a Board,
    runs: &'a [Vec<Vec<usize>>],
    deck_size: usize,
    turn: usize,
    dealer: usize,
    finished: bool,
    winner: Option<usize>,
}

#[derive(Serialize)]
struct EightJacksSynopsis<'a> {
    hand_sizes: Vec<usize>,
    teams: Vec<usize>,
    board: &'a Board,
    runs: Vec<usize>,
    deck_size: usize,
    turn: usize,
    dealer: usize,
    finished: bool,
    winner: Option<usize>,
}

impl ModeRules for EightJacksState {
    const MODE: GameMode = GameMode::EightJacks;
    type Config = EightJacksConfig;
    type Message = EightJacksMessage;

    fn create(config: EightJacksConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        EightJacksState::new(config, seed)
    }

    fn apply(
        &mut self,
        seat: usize,
        message: EightJacksMessage,
        _: &Dictionary,
    ) -> Result<Handled, GameError> {
        let outcome = match message {
            EightJacksMessage::Discard { card_id } => self.discard_dead(seat, card_id)?,
            EightJacksMessage::Play { card_id, square_id } => {
                self.play_card(seat, card_id, square_id)?
            }
            EightJacksMessage::Mark { squares } => self.mark_run(seat, &squares)?,
            EightJacksMessage::Sort { order } => self.order(seat, &order)?,
        };
        Ok(Handled::Changed(outcome))
    }

    fn player_view(&self, seat: usize) -> Result<Value, GameError> {
        let player = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::invariant(format!("no eight jacks seat {seat}")))?;
        to_json(&EightJacksView {
            seat,
            team: player.team,
            hand: &player.hand,
            history: &player.history,
            board: &self.board,
            runs: &self.runs,
            deck_size: self.deck.len(),
            turn: self.turn,
            dealer: self.dealer,
            finished: self.finished,
            winner: self.winner,
        })
    }

    fn synopsis(&self) -> Result<Value, GameError> {
        to_json(&EightJacksSynopsis {
            hand_sizes: self.players.iter().map(|p| p.hand.len()).collect(),
            teams: self.players.iter().map(|p| p.team).collect(),
            board: &self.board,
            runs: self.runs.iter().map(Vec::len).collect(),
            deck_size: self.deck.len(),
            turn: self.turn,
            dealer: self.dealer,
            finished: self.finished,
            winner: self.winner,
        })
    }

    /// No teams given means everyone plays alone.
    fn assign(&mut self, assignment: &Assignment, players: usize) -> Result<(), GameError> {
        if assignment.teams.is_empty() {
            let solo: Vec<Vec<usize>> = (0..players).map(|seat| vec![seat]).collect();
            self.assign_teams(assignment.dealer, players, &solo)
        } else {
            self.assign_teams(assignment.dealer, players, &assignment.teams)
        }
    }
}
