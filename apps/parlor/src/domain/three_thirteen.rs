//! Three-Thirteen: rummy over eleven rounds of growing hands where the
//! round's rank is wild.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cards::{find_card, order_cards, take_card, Card, CardId, Deck, Rank};
use super::outcome::Outcome;
use super::rules::{check_range, ensure_in_play, GameRules};
use super::seed_derivation::ShuffleSeed;
use super::solver::{Grouping, PointValues, SolverPolicy};
use crate::errors::GameError;

const FIRST_ROUND: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreeThirteenConfig {
    /// Spare cards per player used to size the shoe.
    pub min_draw_size: usize,
    pub add_jokers: bool,
    pub allow_mostly_wild: bool,
    pub allow_all_wild_cards: bool,
    pub same_suit_runs: bool,
    pub laying_down_limit: i32,
    pub allow_big_gin: bool,
    /// Adds a fourteen-card round where only jokers are wild.
    pub with_fourteenth_round: bool,
    /// `-1` plays every round.
    pub to_point_limit: i32,
    pub golf_scoring: bool,
}

impl Default for ThreeThirteenConfig {
    fn default() -> Self {
        Self {
            min_draw_size: 13,
            add_jokers: false,
            allow_mostly_wild: false,
            allow_all_wild_cards: true,
            same_suit_runs: true,
            laying_down_limit: 0,
            allow_big_gin: false,
            with_fourteenth_round: false,
            to_point_limit: -1,
            golf_scoring: false,
        }
    }
}

impl ThreeThirteenConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        check_range("min_draw_size", self.min_draw_size, 13..=40)?;
        check_range("laying_down_limit", self.laying_down_limit, 0..=20)?;
        if self.to_point_limit != -1 {
            check_range("to_point_limit", self.to_point_limit, 50..=250)?;
        }
        Ok(())
    }

    pub fn max_round(&self) -> usize {
        if self.with_fourteenth_round {
            14
        } else {
            13
        }
    }

    fn deck_size(&self) -> usize {
        if self.add_jokers {
            54
        } else {
            52
        }
    }

    /// Number of decks needed so every player can be dealt the largest hand
    /// and still draw `min_draw_size` cards.
    pub fn num_decks(&self, players: usize) -> usize {
        let needed = players * (self.min_draw_size + self.max_round());
        needed.div_ceil(self.deck_size()).max(1)
    }

    /// Solver rules for a round dealing `round` cards.
    pub fn solver(&self, round: usize) -> SolverPolicy {
        let mut wild_cards = vec![Rank::Joker];
        if let Some(rank) = u8::try_from(round).ok().and_then(Rank::from_value) {
            if rank != Rank::Joker {
                wild_cards.push(rank);
            }
        }
        SolverPolicy {
            point_values: PointValues::standard(),
            wild_cards,
            all_wild_groups: self.allow_all_wild_cards,
            wild_as_rank: true,
            mostly_wild_groups: self.allow_mostly_wild,
            same_suit_runs: self.same_suit_runs,
            ..SolverPolicy::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeThirteenPlayer {
    pub hand: Vec<Card>,
    pub drawn: Option<Card>,
    pub picked_up_discard: bool,
    pub round_score: Option<i32>,
    pub grouping: Grouping,
    pub best_score: Option<i32>,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeThirteenState {
    pub config: ThreeThirteenConfig,
    shuffle: ShuffleSeed,

    pub deck: Deck,
    pub discard: Vec<Card>,
    pub players: Vec<ThreeThirteenPlayer>,
    constructed: usize,

    pub turn: usize,
    pub dealer: usize,
    /// Cards dealt this round; also selects the wild rank.
    pub round: usize,

    pub started: bool,
    pub dealt: bool,
    pub laid_down: Option<usize>,
    pub finished: bool,
    pub winner: Option<usize>,
}

impl ThreeThirteenState {
    pub fn new(config: ThreeThirteenConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            shuffle: ShuffleSeed::new(seed),
            deck: Deck::new(),
            discard: Vec::new(),
            players: Vec::new(),
            constructed: 0,
            turn: 0,
            dealer: 0,
            round: FIRST_ROUND - 1,
            started: false,
            dealt: false,
            laid_down: None,
            finished: false,
            winner: None,
        })
    }

    pub fn solver(&self) -> SolverPolicy {
        self.config.solver(self.round)
    }

    pub fn start_round(&mut self) -> Result<(), GameError> {
        if self.dealt {
            return Err(GameError::validation(
                "unable to deal if cards have already been dealt",
            ));
        }
        let round = self.round + 1;
        if round > self.config.max_round() {
            return Err(GameError::invariant("no rounds remain to be dealt"));
        }

        let n = self.players.len();
        let mut deck = Deck::new();
        for _ in 0..self.config.num_decks(n) {
            deck.add_standard52();
            if self.config.add_jokers {
                deck.add_jokers(2, true);
            }
        }
        deck.shuffle(&mut self.shuffle.next_rng());
        let constructed = deck.len();

        for player in &mut self.players {
            player.hand.clear();
            player.drawn = None;
            player.picked_up_discard = false;
            player.round_score = None;
            player.grouping = Grouping::default();
            player.best_score = None;
        }

        let first = (self.dealer + 1) % n;
        for _ in 0..round {
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
        self.constructed = constructed;
        self.round = round;
        self.turn = first;
        self.laid_down = None;
        self.dealt = true;
        debug!(round, dealer = self.dealer, decks = self.config.num_decks(n), "[THREE THIRTEEN] dealt round");
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
        let card = if from_discard {
            self.discard.last().copied()
        } else {
            self.deck.top().copied()
        };
        if card.is_none() {
            return Err(GameError::validation(
                "unable to draw with no more cards remaining",
            ));
        }

        if from_discard {
            self.discard.pop();
        } else {
            self.deck.draw();
        }
        let seat = &mut self.players[player];
        seat.drawn = card;
        seat.picked_up_discard = from_discard;
        Ok(Outcome::Continue)
    }

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
        if big_gin && !(laying_down && self.config.allow_big_gin) {
            return Err(GameError::validation("need to specify a card"));
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
            if !self.solver().min_score_below(&hand, limit) {
                return Err(GameError::validation(format!(
                    "you cannot go out yet! must reach {limit} points first!"
                )));
            }
        }

        if card_id == drawn.id && seat.picked_up_discard && self.laid_down.is_none() && !laying_down {
            self.discard.push(drawn);
            self.players[player].drawn = None;
            return Ok(Outcome::Continue);
        }

        // Running out of cards forces whoever discards next to go out.
        let forced = self.laid_down.is_none() && !laying_down && self.deck.len() <= self.players.len();

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

        if laying_down || forced {
            self.handle_lay_down(player);
        }
        Ok(Outcome::Continue)
    }

    /// Everyone else gets one last card, provided the deck can cover them all.
    fn handle_lay_down(&mut self, player: usize) {
        self.laid_down = Some(player);
        self.turn = player;
        for seat in &mut self.players {
            seat.round_score = None;
        }

        let n = self.players.len();
        if self.deck.len() + 1 >= n {
            for offset in 1..n {
                let index = (player + offset) % n;
                self.players[index].drawn = self.deck.draw();
                self.players[index].picked_up_discard = false;
                self.turn = index;
            }
        }
    }

    fn ensure_can_score(&self, player: usize) -> Result<(), GameError> {
        self.ensure_dealt(player)?;
        if self.laid_down.is_none() {
            return Err(GameError::validation(
                "unable to report score until someone has gone out",
            ));
        }
        if self.players[player].drawn.is_some() {
            return Err(GameError::validation("unable to report score before discarding"));
        }
        if self.players[player].round_score.is_some() {
            return Err(GameError::validation("you have already scored this round"));
        }
        Ok(())
    }

    pub fn score_by_groups(
        &mut self,
        player: usize,
        grouping: Grouping,
    ) -> Result<Outcome, GameError> {
        self.ensure_can_score(player)?;
        let solver = self.solver();
        let hand = &self.players[player].hand;
        let score = solver.score_grouping(hand, &[], &grouping)?;
        let ideal = solver.min_score(hand);

        let seat = &mut self.players[player];
        seat.grouping = grouping;
        seat.best_score = (ideal < score).then_some(ideal);
        Ok(self.record_score(player, score))
    }

    pub fn report_score(&mut self, player: usize, score: i32) -> Result<Outcome, GameError> {
        self.ensure_can_score(player)?;
        if !self.solver().can_make_score(&self.players[player].hand, score) {
            return Err(GameError::validation(
                "that score cannot be made with your hand",
            ));
        }
        Ok(self.record_score(player, score))
    }

    fn record_score(&mut self, player: usize, score: i32) -> Outcome {
        self.players[player].round_score = Some(score);
        if self.players.iter().any(|p| p.round_score.is_none()) {
            return Outcome::Continue;
        }
        let Some(layer) = self.laid_down else {
            return Outcome::Continue;
        };

        let leader_score = if self.config.golf_scoring {
            for seat in &mut self.players {
                seat.score += seat.round_score.unwrap_or(0);
            }
            self.players.iter().map(|p| p.score).max().unwrap_or(0)
        } else {
            let total: i32 = self.players.iter().filter_map(|p| p.round_score).sum();
            self.players[layer].score += total;
            self.players[layer].score
        };

        let limit_hit = self.config.to_point_limit != -1 && leader_score >= self.config.to_point_limit;
        if limit_hit || self.round >= self.config.max_round() {
            let winner = self.assign_winner(layer);
            return Outcome::GameComplete { winner };
        }

        self.dealer = (self.dealer + 1) % self.players.len();
        self.dealt = false;
        self.laid_down = None;
        Outcome::RoundComplete
    }

    fn assign_winner(&mut self, layer: usize) -> usize {
        let scores = self.players.iter().map(|p| p.score);
        let best = if self.config.golf_scoring {
            scores.min()
        } else {
            scores.max()
        }
        .unwrap_or(0);

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

impl GameRules for ThreeThirteenState {
    fn start(&mut self, players: usize) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("double start occurred"));
        }
        check_range("num_players", players, 1..=15)?;

        self.players = vec![ThreeThirteenPlayer::default(); players];
        self.dealer = 0;
        self.round = FIRST_ROUND - 1;
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
        self.constructed
    }
}
