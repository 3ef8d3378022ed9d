use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{to_json, Handled, ModeRules};
use crate::domain::cards::{Card, CardId};
use crate::domain::dictionary::Dictionary;
use crate::domain::gin::{GinConfig, GinState};
use crate::domain::rules::GameMode;
use crate::domain::solver::Grouping;
use crate::errors::GameError;

/// Turn messages shared by the melding games.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum MeldMessage {
    #[serde(alias = "draw")]
    Take {
        #[serde(default)]
        from_discard: bool,
    },
    Discard {
        card_id: CardId,
        #[serde(default)]
        laying_down: bool,
    },
    ScoreByGroups {
        groups: Vec<Vec<CardId>>,
        #[serde(default)]
        leftover: Vec<CardId>,
    },
    Score {
        score: i32,
    },
    Sort {
        order: Vec<CardId>,
    },
    Deal,
}

#[derive(Serialize)]
struct GinView<'a> {
    seat: usize,
    hand: &'a [Card],
    drawn: Option<Card>,
    discard: Option<&'a Card>,
    deck_size: usize,
    turn: usize,
    dealer: usize,
    round: u32,
    dealt: bool,
    laid_down: Option<usize>,
    /// The layer's hand and grouping, once reported, so the other player
    /// can meld onto it.
    layer: Option<RevealedHand<'a>>,
    round_score: Option<i32>,
    best_score: Option<i32>,
    scores: Vec<i32>,
    finished: bool,
    winner: Option<usize>,
}

#[derive(Serialize)]
struct RevealedHand<'a> {
    hand: &'a [Card],
    grouping: &'a Grouping,
}

#[derive(Serialize)]
struct GinSynopsis<'a> {
    hand_sizes: Vec<usize>,
    scores: Vec<i32>,
    round_scores: Vec<Option<i32>>,
    discard: Option<&'a Card>,
    deck_size: usize,
    turn: usize,
    dealer: usize,
    round: u32,
    laid_down: Option<usize>,
    finished: bool,
    winner: Option<usize>,
}

impl ModeRules for GinState {
    const MODE: GameMode = GameMode::Gin;
    type Config = GinConfig;
    type Message = MeldMessage;

    fn create(config: GinConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        GinState::new(config, seed)
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
            .ok_or_else(|| GameError::invariant(format!("no gin seat {seat}")))?;
        let layer = self
            .laid_down
            .filter(|&layer| layer != seat)
            .and_then(|layer| self.players.get(layer))
            .filter(|layer| layer.round_score.is_some())
            .map(|layer| RevealedHand {
                hand: &layer.hand,
                grouping: &layer.grouping,
            });
        to_json(&GinView {
            seat,
            hand: &player.hand,
            drawn: player.drawn,
            discard: self.discard.last(),
            deck_size: self.deck.len(),
            turn: self.turn,
            dealer: self.dealer,
            round: self.round,
            dealt: self.dealt,
            laid_down: self.laid_down,
            layer,
            round_score: player.round_score,
            best_score: player.best_score,
            scores: self.players.iter().map(|p| p.score).collect(),
            finished: self.finished,
            winner: self.winner,
        })
    }

    fn synopsis(&self) -> Result<Value, GameError> {
        to_json(&GinSynopsis {
            hand_sizes: self.players.iter().map(|p| p.hand.len()).collect(),
            scores: self.players.iter().map(|p| p.score).collect(),
            round_scores: self.players.iter().map(|p| p.round_score).collect(),
            discard: self.discard.last(),
            deck_size: self.deck.len(),
            turn: self.turn,
            dealer: self.dealer,
            round: self.round,
            laid_down: self.laid_down,
            finished: self.finished,
            winner: self.winner,
        })
    }
}
