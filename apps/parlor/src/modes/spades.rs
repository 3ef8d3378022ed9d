use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{to_json, Handled, ModeRules};
use crate::domain::cards::{Card, CardId};
use crate::domain::dictionary::Dictionary;
use crate::domain::rules::GameMode;
use crate::domain::spades::{SpadesBid, SpadesConfig, SpadesState};
use crate::domain::tricks::Trick;
use crate::errors::GameError;
use crate::protocol::Assignment;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", rename_all = "snake_case")]
pub enum SpadesMessage {
    /// Two players: turn up the next card of the draw.
    Deal,
    Decide { keep: bool },
    /// Reveal your own hand; bidding blind means not doing this first.
    Look,
    Bid { bid: SpadesBid },
    Play { card_id: CardId },
    Sort { order: Vec<CardId> },
}

#[derive(Serialize)]
struct SpadesView<'a> {
    seat: usize,
    hand: Option<&'a [Card]>,
    hand_size: usize,
    drawn: Option<Card>,
    partner: Option<usize>,
    bids: Vec<Option<SpadesBid>>,
    tricks: Vec<i32>,
    trick: &'a Trick,
    last_trick: Option<&'a Trick>,
    turn: usize,
    dealer: usize,
    dealt: bool,
    bidding: bool,
    spades_broken: bool,
    scores: Vec<i32>,
    overtakes: Vec<i32>,
    finished: bool,
    winner: Option<usize>,
}

#[derive(Serialize)]
struct SpadesSynopsis<'a> {
    hand_sizes: Vec<usize>,
    bids: Vec<Option<SpadesBid>>,
    tricks: Vec<i32>,
    scores: Vec<i32>,
    overtakes: Vec<i32>,
    trick: &'a Trick,
    deck_size: usize,
    turn: usize,
    dealer: usize,
    spades_broken: bool,
    finished: bool,
    winner: Option<usize>,
}

impl ModeRules for SpadesState {
    const MODE: GameMode = GameMode::Spades;
    type Config = SpadesConfig;
    type Message = SpadesMessage;

    fn create(config: SpadesConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        SpadesState::new(config, seed)
    }

    fn apply(
        &mut self,
        seat: usize,
        message: SpadesMessage,
        _: &Dictionary,
    ) -> Result<Handled, GameError> {
        let outcome = match message {
            SpadesMessage::Deal => self.peek_top(seat)?,
            SpadesMessage::Decide { keep } => self.decide_top(seat, keep)?,
            SpadesMessage::Look => self.peek_cards(seat)?,
            SpadesMessage::Bid { bid } => self.place_bid(seat, bid)?,
            SpadesMessage::Play { card_id } => self.play_card(seat, card_id)?,
            SpadesMessage::Sort { order } => self.order(seat, &order)?,
        };
        Ok(Handled::Changed(outcome))
    }

    fn player_view(&self, seat: usize) -> Result<Value, GameError> {
        let player = self
            .players
            .get(seat)
            .ok_or_else(|| GameError::invariant(format!("no spades seat {seat}")))?;
        to_json(&SpadesView {
            seat,
            hand: player.peeked.then_some(player.hand.as_slice()),
            hand_size: player.hand.len(),
            drawn: player.drawn,
            partner: self.partner(seat),
            bids: self.players.iter().map(|p| p.bid).collect(),
            tricks: self.players.iter().map(|p| p.tricks).collect(),
            trick: &self.trick,
            last_trick: self.tricks.last(),
            turn: self.turn,
            dealer: self.dealer,
            dealt: self.dealt,
            bidding: self.dealt && !self.bid,
            spades_broken: self.spades_broken,
            scores: self.players.iter().map(|p| p.score).collect(),
            overtakes: self.players.iter().map(|p| p.overtakes).collect(),
            finished: self.finished,
            winner: self.winner,
        })
    }

    fn synopsis(&self) -> Result<Value, GameError> {
        to_json(&SpadesSynopsis {
            hand_sizes: self.players.iter().map(|p| p.hand.len()).collect(),
            bids: self.players.iter().map(|p| p.bid).collect(),
            tricks: self.players.iter().map(|p| p.tricks).collect(),
            scores: self.players.iter().map(|p| p.score).collect(),
            overtakes: self.players.iter().map(|p| p.overtakes).collect(),
            trick: &self.trick,
            deck_size: self.deck.len(),
            turn: self.turn,
            dealer: self.dealer,
            spades_broken: self.spades_broken,
            finished: self.finished,
            winner: self.winner,
        })
    }

    fn assign(&mut self, assignment: &Assignment, players: usize) -> Result<(), GameError> {
        if !assignment.teams.is_empty() {
            return Err(GameError::validation(
                "spades partners sit opposite each other; assign the seat order instead",
            ));
        }
        self.assign_dealer(assignment.dealer, players)
    }
}
