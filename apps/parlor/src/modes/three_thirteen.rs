use serde::Serialize;
use serde_json::Value;

use super::gin::MeldMessage;
use super::{to_json, Handled, ModeRules};
use crate::domain::cards::{Card, Rank};
use crate::domain::dictionary::Dictionary;
use crate::domain::rules::GameMode;
use crate::domain::solver::Grouping;
use crate::domain::three_thirteen::{ThreeThirteenConfig, ThreeThirteenState};
use crate::errors::GameError;

#[derive(Serialize)]
struct ThreeThirteenView<'a> {
    seat: usize,
    hand: &'a [Card],
    drawn: Option<Card>,
    discard: Option<&'a Card>,
    deck_size: usize,
    /// Cards dealt this round.
    round: usize,
    wild: Vec<Rank>,
    turn: usize,
    dealer: usize,
    dealt: bool,
    laid_down: Option<usize>,
    grouping: &'a Grouping,
    round_score: Option<i32>,
    best_score: Option<i32>,
    scores: Vec<i32>,
    finished: bool,
    winner: Option<usize>,
}

#[derive(Serialize)]
struct ThreeThirteenSynopsis<'a> {
    hand_sizes: Vec<usize>,
    scores: Vec<i32>,
    round_scores: Vec<Option<i32>>,
    discard: Option<&'a Card>,
    deck_size: usize,
    round: usize,
    max_round: usize,
    turn: usize,
    dealer: usize,
    laid_down: Option<usize>,
    finished: bool,
    winner: Option<usize>,
}

impl ModeRules for ThreeThirteenState {
    const MODE: GameMode = GameMode::ThreeThirteen;
    type Config = ThreeThirteenConfig;
    type Message = MeldMessage;

    fn create(config: ThreeThirteenConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        ThreeThirteenState::new(config, seed)
    }

    fn apply(
        &mut self,
        seat: usize,
        message: MeldMessage,
        _: &Dictionary,
    ) -> Result<Handled, GameError> {
        let outcome = match message {
            MeldMessage::Take { from_discard } => self.take_card(seat, from_discard)?,
            MeldMessage::Discard { card_id, laying_down } => {
                self.discard_card(seat, card_id, laying_down)?
            }
            MeldMessage::ScoreByGroups { groups, leftover } => {
                self.score_by_groups(seat, Grouping { groups, leftover })?
            }
            MeldMessage::Score { score } => self.report_score(seat, score)?,
            MeldMessage::Sort { order } => self.order(seat, &order)?,
            MeldMessage::Deal => self.deal(seat)?,
        };
        Ok(Handled::Changed(outcome))
    }

    fn player_view(&self, seat: usize) -> Result<Value, GameError> {
        let player = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::invariant(format!("no three-thirteen seat {seat}")))?;
        to_json(&ThreeThirteenView {
            seat,
            hand: &player.hand,
            drawn: player.drawn,
            discard: self.discard.last(),
            deck_size: self.deck.len(),
            round: self.round,
            wild: self.solver().wild_cards,
            turn: self.turn,
            dealer: self.dealer,
            dealt: self.dealt,
            laid_down: self.laid_down,
            grouping: &player.grouping,
            round_score: player.round_score,
            best_score: player.best_score,
            scores: self.players.iter().map(|p| p.score).collect(),
            finished: self.finished,
            winner: self.winner,
        })
    }

    fn synopsis(&self) -> Result<Value, GameError> {
        to_json(&ThreeThirteenSynopsis {
            hand_sizes: self.players.iter().map(|p| p.hand.len()).collect(),
            scores: self.players.iter().map(|p| p.score).collect(),
            round_scores: self.players.iter().map(|p| p.round_score).collect(),
            discard: self.discard.last(),
            deck_size: self.deck.len(),
            round: self.round,
            max_round: self.config.max_round(),
            turn: self.turn,
            dealer: self.dealer,
            laid_down: self.laid_down,
            finished: self.finished,
            winner: self.winner,
        })
    }
}
