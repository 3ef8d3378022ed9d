//! Two-player Gin rummy.
//!
//! Turn cycle: take (deck or discard) → discard, optionally laying down.
//! After a lay-down the layer scores first, then the opponent, who may meld
//! onto the layer's groups. Round scoring happens once both have reported.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cards::{find_card, order_cards, take_card, Card, CardId, Deck};
use super::outcome::Outcome;
use super::rules::{check_one_of, check_range, ensure_in_play, GameRules};
use super::seed_derivation::ShuffleSeed;
use super::solver::{Grouping, PointValues, SolverPolicy};
use crate::errors::GameError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GinConfig {
    pub hand_size: usize,
    /// Two marked jokers join the deck as permanent wild cards.
    pub add_jokers: bool,
    pub same_suit_runs: bool,
    pub ace_high: bool,
    /// Most points a hand may still hold when laying down.
    pub laying_down_limit: i32,
    pub win_amount: i32,
    pub gin_amount: i32,
    /// `-1` disables going out without a discard.
    pub big_gin_amount: i32,
    /// `-1` disables the undercut bonus.
    pub undercut_amount: i32,
    pub suggest_better: bool,
}

impl Default for GinConfig {
    fn default() -> Self {
        Self {
            hand_size: 10,
            add_jokers: false,
            same_suit_runs: true,
            ace_high: false,
            laying_down_limit: 10,
            win_amount: 100,
            gin_amount: 10,
            big_gin_amount: 20,
            undercut_amount: 10,
            suggest_better: true,
        }
    }
}

impl GinConfig {
    pub const NUM_PLAYERS: usize = 2;

    pub fn validate(&self) -> Result<(), GameError> {
        check_range("hand_size", self.hand_size, 8..=14)?;
        check_range("laying_down_limit", self.laying_down_limit, 0..=20)?;
        check_one_of("win_amount", self.win_amount, &[50, 75, 100, 125, 150, 200])?;
        check_one_of("gin_amount", self.gin_amount, &[5, 10, 20, 25])?;
        check_one_of("big_gin_amount", self.big_gin_amount, &[-1, 10, 20, 40, 50])?;
        check_one_of("undercut_amount", self.undercut_amount, &[-1, 5, 10, 20, 25])?;
        Ok(())
    }

    pub fn solver(&self) -> SolverPolicy {
        SolverPolicy {
            point_values: PointValues::gin(self.ace_high),
            same_suit_runs: self.same_suit_runs,
            ace_high: self.ace_high,
            ..SolverPolicy::default()
        }
    }

    fn deck_size(&self) -> usize {
        if self.add_jokers {
            54
        } else {
            52
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GinPlayer {
    pub hand: Vec<Card>,
    /// Card taken this turn, kept apart from the hand until the discard.
    pub drawn: Option<Card>,
    pub picked_up_discard: bool,
    /// Leftover reported for this round; `None` until reported.
    pub round_score: Option<i32>,
    pub grouping: Grouping,
    /// Set when a strictly better grouping existed than the one reported.
    pub best_score: Option<i32>,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GinState {
    pub config: GinConfig,
    shuffle: ShuffleSeed,

    pub deck: Deck,
    /// Top of the pile is the last element.
    pub discard: Vec<Card>,
    pub players: Vec<GinPlayer>,

    pub turn: usize,
    pub dealer: usize,
    pub round: u32,

    pub started: bool,
    pub dealt: bool,
    pub laid_down: Option<usize>,
    pub finished: bool,
    pub winner: Option<usize>,
}

impl GinState {
    pub fn new(config: GinConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            shuffle: ShuffleSeed::new(seed),
            deck: Deck::new(),
            discard: Vec::new(),
            players: Vec::new(),
            turn: 0,
            dealer: 0,
            round: 0,
            started: false,
            dealt: false,
            laid_down: None,
            finished: false,
            winner: None,
        })
    }

    /// Shuffle a fresh deck and deal `hand_size` cards each, starting left of
    /// the dealer, then turn one card onto the discard pile.
    pub fn start_round(&mut self) -> Result<(), GameError> {
        if self.dealt {
            return Err(GameError::validation(
                "unable to deal if cards have already been dealt",
            ));
        }

        let mut deck = Deck::new();
        deck.add_standard52();
        if self.config.add_jokers {
            deck.add_jokers(2, true);
        }
        deck.shuffle(&mut self.shuffle.next_rng());

        let n = self.players.len();
        for player in &mut self.players {
            player.hand.clear();
            player.drawn = None;
            player.picked_up_discard = false;
            player.round_score = None;
            player.grouping = Grouping::default();
            player.best_score = None;
        }

        let first = (self.dealer + 1) % n;
        for _ in 0..self.config.hand_size {
            for offset in 0..n {
                let card = deck
                    .draw()
                    .ok_or_else(|| GameError::invariant("deck exhausted while dealing"))?;
                self.players[(first + offset) % n].hand.push(card);
            }
        }
        let top = deck
            .draw()
            .ok_or_else(|| GameError::invariant("deck exhausted while dealing"))?;

        self.discard = vec![top];
        self.deck = deck;
        self.turn = first;
        self.laid_down = None;
        self.round += 1;
        self.dealt = true;
        debug!(round = self.round, dealer = self.dealer, "[GIN] dealt round");
        Ok(())
    }

    fn ensure_dealt(&self, player: usize) -> Result<(), GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if !self.dealt {
            return Err(GameError::validation("cards have not been dealt yet"));
        }
        Ok(())
    }

    pub fn take_card(&mut self, player: usize, from_discard: bool) -> Result<Outcome, GameError> {
        self.ensure_dealt(player)?;
        if self.laid_down.is_some() {
            return Err(GameError::validation("unable to take a card after going out"));
        }
        if self.turn != player {
            return Err(GameError::validation("unable to play out of turn"));
        }
        if self.players[player].drawn.is_some() {
            return Err(GameError::validation("you have already taken a card"));
        }
        let source_empty = if from_discard {
            self.discard.is_empty()
        } else {
            self.deck.is_empty()
        };
        if source_empty {
            return Err(GameError::validation(
                "unable to draw with no more cards remaining",
            ));
        }

        let card = if from_discard {
            self.discard.pop()
        } else {
            self.deck.draw()
        };
        let seat = &mut self.players[player];
        seat.drawn = card;
        seat.picked_up_discard = from_discard;
        Ok(Outcome::Continue)
    }

    /// Discard `card_id` (or the drawn card). With `laying_down`, the
    /// resulting hand must reach the laying-down limit. A non-positive
    /// `card_id` while laying down keeps every card: big gin.
    pub fn discard_card(
        &mut self,
        player: usize,
        card_id: CardId,
        laying_down: bool,
    ) -> Result<Outcome, GameError> {
        self.ensure_dealt(player)?;
        let seat = &self.players[player];
        let drawn = seat
            .drawn
            .ok_or_else(|| GameError::validation("you need to take a card before discarding"))?;
        if self.laid_down.is_none() && self.turn != player {
            return Err(GameError::validation("it is not your turn to discard"));
        }
        if self.laid_down.is_some() && laying_down {
            return Err(GameError::validation("somebody already laid down before you"));
        }
        let big_gin = card_id <= 0;
        if big_gin && !laying_down {
            return Err(GameError::validation("need to specify a card"));
        }
        if big_gin && self.config.big_gin_amount == -1 {
            return Err(GameError::validation(
                "going big gin is not allowed in this game",
            ));
        }
        if !big_gin && card_id != drawn.id && find_card(&seat.hand, card_id).is_none() {
            return Err(GameError::validation(
                "unable to find card with specified identifier",
            ));
        }

        if laying_down {
            let (hand, limit) = if big_gin {
                let mut hand = seat.hand.clone();
                hand.push(drawn);
                (hand, 0)
            } else {
                let hand = seat
                    .hand
                    .iter()
                    .map(|c| if c.id == card_id { drawn } else { *c })
                    .collect::<Vec<_>>();
                (hand, self.config.laying_down_limit)
            };
            if !self.config.solver().min_score_below(&hand, limit) {
                let plural = if limit == 1 { "" } else { "s" };
                return Err(GameError::validation(format!(
                    "you cannot go out yet! must reach {limit} point{plural} first!"
                )));
            }
        }

        // Pass-through: the card just taken from the discard goes straight back.
        if card_id == drawn.id && seat.picked_up_discard && !laying_down {
            self.discard.push(drawn);
            self.players[player].drawn = None;
            return Ok(Outcome::Continue);
        }

        let seat = &mut self.players[player];
        seat.drawn = None;
        if card_id == drawn.id {
            self.discard.push(drawn);
        } else {
            if !big_gin {
                let discarded = take_card(&mut seat.hand, card_id)
                    .ok_or_else(|| GameError::invariant("validated card vanished from hand"))?;
                self.discard.push(discarded);
            }
            seat.hand.push(drawn);
        }
        self.turn = (self.turn + 1) % self.players.len();

        if laying_down {
            self.handle_lay_down(player);
            return Ok(Outcome::Continue);
        }

        // Too few cards left for the round to continue: nobody scores.
        if self.deck.len() <= self.players.len() {
            self.dealt = false;
            debug!(round = self.round, "[GIN] supply exhausted; round void");
            return Ok(Outcome::RoundComplete);
        }

        Ok(Outcome::Continue)
    }

    fn handle_lay_down(&mut self, player: usize) {
        self.turn = player;
        self.laid_down = Some(player);
        for seat in &mut self.players {
            seat.round_score = None;
        }
    }

    fn ensure_scoring_turn(&self, player: usize) -> Result<usize, GameError> {
        self.ensure_dealt(player)?;
        let layer = self
            .laid_down
            .ok_or_else(|| GameError::validation("unable to score prior to laying down"))?;
        if self.turn != player {
            return Err(GameError::validation("it is not your turn to score"));
        }
        if self.players[player].drawn.is_some() {
            return Err(GameError::validation("unable to score before discarding"));
        }
        if self.players[player].round_score.is_some() {
            return Err(GameError::validation("you have already scored this round"));
        }
        Ok(layer)
    }

    /// Cards the opponent may meld with: the layer's grouped cards.
    fn layer_melds(&self, layer: usize) -> Vec<Card> {
        let seat = &self.players[layer];
        seat.hand
            .iter()
            .filter(|c| !seat.grouping.leftover.contains(&c.id))
            .copied()
            .collect()
    }

    pub fn score_by_groups(
        &mut self,
        player: usize,
        grouping: Grouping,
    ) -> Result<Outcome, GameError> {
        let layer = self.ensure_scoring_turn(player)?;
        let extra = if player == layer {
            Vec::new()
        } else {
            self.layer_melds(layer)
        };

        let solver = self.config.solver();
        let hand = &self.players[player].hand;
        let score = solver.score_grouping(hand, &extra, &grouping)?;
        let ideal = solver.min_score(hand);

        let seat = &mut self.players[player];
        seat.grouping = grouping;
        seat.best_score = (self.config.suggest_better && ideal < score).then_some(ideal);
        Ok(self.record_score(player, score))
    }

    /// Report a leftover total directly. Only totals some grouping of the
    /// hand can produce are accepted.
    pub fn report_score(&mut self, player: usize, score: i32) -> Result<Outcome, GameError> {
        self.ensure_scoring_turn(player)?;
        let solver = self.config.solver();
        if !solver.can_make_score(&self.players[player].hand, score) {
            return Err(GameError::validation(
                "that score cannot be made with your hand",
            ));
        }
        let grouping = solver.best_grouping(&self.players[player].hand);
        self.players[player].grouping = grouping;
        Ok(self.record_score(player, score))
    }

    fn record_score(&mut self, player: usize, score: i32) -> Outcome {
        self.players[player].round_score = Some(score);

        if let Some(next) = self.players.iter().position(|p| p.round_score.is_none()) {
            self.turn = next;
            return Outcome::Continue;
        }

        let Some(layer) = self.laid_down else {
            return Outcome::Continue;
        };
        let other = (layer + 1) % self.players.len();
        let ours = self.players[layer].round_score.unwrap_or(0);
        let theirs = self.players[other].round_score.unwrap_or(0);

        let leader_score = if ours < theirs {
            let mut bonus = 0;
            if ours == 0 {
                bonus = self.config.gin_amount;
                let big = self.players[layer].hand.len() == self.config.hand_size + 1;
                if self.config.big_gin_amount != -1 && big {
                    bonus = self.config.big_gin_amount;
                }
            }
            self.players[layer].score += theirs - ours + bonus;
            self.players[layer].score
        } else {
            let bonus = self.config.undercut_amount.max(0);
            self.players[other].score += ours - theirs + bonus;
            self.players[other].score
        };

        // Only one player gained points, so only they can have crossed.
        if leader_score >= self.config.win_amount {
            let winner = self.assign_winner(layer);
            return Outcome::GameComplete { winner };
        }

        self.dealer = (self.dealer + 1) % self.players.len();
        self.dealt = false;
        self.laid_down = None;
        Outcome::RoundComplete
    }

    fn assign_winner(&mut self, layer: usize) -> usize {
        let best = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        let winner = if self.players[layer].score == best {
            layer
        } else {
            self.players
                .iter()
                .position(|p| p.score == best)
                .unwrap_or(layer)
        };
        self.winner = Some(winner);
        self.finished = true;
        winner
    }

    pub fn order(&mut self, player: usize, order: &[CardId]) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        order_cards(&mut self.players[player].hand, order);
        Ok(Outcome::Continue)
    }

    /// Deal the next round; only the dealer may do so.
    pub fn deal(&mut self, player: usize) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if self.dealt {
            return Err(GameError::validation("cards have already been dealt"));
        }
        if player != self.dealer {
            return Err(GameError::validation("only the dealer may deal"));
        }
        self.start_round()?;
        Ok(Outcome::Continue)
    }
}

impl GameRules for GinState {
    fn start(&mut self, players: usize) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("double start occurred"));
        }
        check_range("num_players", players, GinConfig::NUM_PLAYERS..=GinConfig::NUM_PLAYERS)?;

        self.players = vec![GinPlayer::default(); players];
        self.dealer = 0;
        self.dealt = false;
        self.start_round()?;
        self.started = true;
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
        self.deck.len()
            + self.discard.len()
            + self
                .players
                .iter()
                .map(|p| p.hand.len() + usize::from(p.drawn.is_some()))
                .sum::<usize>()
    }

    fn constructed_cards(&self) -> usize {
        if self.started {
            self.config.deck_size()
        } else {
            0
        }
    }
}
