use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{to_json, Handled, ModeRules};
use crate::domain::cards::{Card, CardId};
use crate::domain::dictionary::Dictionary;
use crate::domain::hearts::{HeartsConfig, HeartsState, PassDirection};
use crate::domain::rules::GameMode;
use crate::domain::tricks::Trick;
use crate::errors::GameError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum HeartsMessage {
    Pass { to_pass: Vec<CardId> },
    Play { card_id: CardId },
    Sort { order: Vec<CardId> },
    Deal,
}

#[derive(Serialize)]
struct HeartsView<'a> {
    seat: usize,
    hand: &'a [Card],
    /// Cards received in the pass, highlighted until the first lead.
    received: &'a [CardId],
    passed: bool,
    pass_direction: PassDirection,
    trick: &'a Trick,
    last_trick: Option<&'a Trick>,
    turn: usize,
    dealer: usize,
    dealt: bool,
    hearts_broken: bool,
    tricks: usize,
    round_score: i32,
    scores: Vec<i32>,
    finished: bool,
    winner: Option<usize>,
}

#[derive(Serialize)]
struct HeartsSynopsis<'a> {
    hand_sizes: Vec<usize>,
    tricks: Vec<usize>,
    round_scores: Vec<i32>,
    scores: Vec<i32>,
    trick: &'a Trick,
    pass_direction: PassDirection,
    passing: bool,
    turn: usize,
    dealer: usize,
    hearts_broken: bool,
    finished: bool,
    winner: Option<usize>,
}

impl ModeRules for HeartsState {
    const MODE: GameMode = GameMode::Hearts;
    type Config = HeartsConfig;
    type Message = HeartsMessage;

    fn create(config: HeartsConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        HeartsState::new(config, seed)
    }

    fn apply(
        &mut self,
        seat: usize,
        message: HeartsMessage,
        _: &Dictionary,
    ) -> Result<Handled, GameError> {
        let outcome = match message {
            HeartsMessage::Pass { to_pass } => self.pass_cards(seat, &to_pass)?,
            HeartsMessage::Play { card_id } => self.play_card(seat, card_id)?,
            HeartsMessage::Sort { order } => self.order(seat, &order)?,
            HeartsMessage::Deal => self.deal(seat)?,
        };
        Ok(Handled::Changed(outcome))
    }

    fn player_view(&self, seat: usize) -> Result<Value, GameError> {
        let player = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::invariant(format!("no hearts seat {seat}")))?;
        to_json(&HeartsView {
            seat,
            hand: &player.hand,
            received: &player.received,
            passed: player.passed,
            pass_direction: self.pass_direction,
            trick: &self.trick,
            last_trick: self.tricks.last(),
            turn: self.turn,
            dealer: self.dealer,
            dealt: self.dealt,
            hearts_broken: self.hearts_broken,
            tricks: player.tricks,
            round_score: player.round_score,
            scores: self.players.iter().map(|p| p.score).collect(),
            finished: self.finished,
            winner: self.winner,
        })
    }

    fn synopsis(&self) -> Result<Value, GameError> {
        to_json(&HeartsSynopsis {
            hand_sizes: self.players.iter().map(|p| p.hand.len()).collect(),
            tricks: self.players.iter().map(|p| p.tricks).collect(),
            round_scores: self.players.iter().map(|p| p.round_score).collect(),
            scores: self.players.iter().map(|p| p.score).collect(),
            trick: &self.trick,
            pass_direction: self.pass_direction,
            passing: self.dealt && !self.passed,
            turn: self.turn,
            dealer: self.dealer,
            hearts_broken: self.hearts_broken,
            finished: self.finished,
            winner: self.winner,
        })
    }
}
