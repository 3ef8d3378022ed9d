//! Spades for two to six players, with partnerships, nil bids and
//! overtake penalties.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cards::{find_card, order_cards, Card, CardId, Deck, Rank, Suit};
use super::outcome::Outcome;
use super::rules::{check_one_of, check_range, ensure_in_play, GameRules};
use super::seed_derivation::ShuffleSeed;
use super::tricks::{holds_other, trick_rank, Trick};
use crate::errors::GameError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpadesConfig {
    pub overtakes: bool,
    pub overtake_limit: i32,
    pub must_break_spades: bool,
    /// Three players: two jokers (one marked). Six players: four jokers
    /// instead of removing both twos of clubs.
    pub add_jokers: bool,
    /// Six players: whether the first of two equal cards wins.
    pub first_wins: bool,
    pub with_partners: bool,
    pub full_history: bool,
    pub with_nil: bool,
    pub overtakes_nil: bool,
    pub blind_bidding: bool,
    pub with_double_nil: bool,
    pub with_triple_nil: bool,
    pub win_amount: i32,
    pub overtake_penalty: i32,
    pub trick_multiplier: i32,
    pub nil_score: i32,
}

impl Default for SpadesConfig {
    fn default() -> Self {
        Self {
            overtakes: true,
            overtake_limit: 10,
            must_break_spades: true,
            add_jokers: false,
            first_wins: false,
            with_partners: true,
            full_history: false,
            with_nil: true,
            overtakes_nil: false,
            blind_bidding: false,
            with_double_nil: false,
            with_triple_nil: false,
            win_amount: 500,
            overtake_penalty: 100,
            trick_multiplier: 10,
            nil_score: 100,
        }
    }
}

impl SpadesConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        check_range("overtake_limit", self.overtake_limit, 2..=15)?;
        check_range("win_amount", self.win_amount, 50..=1000)?;
        check_one_of("overtake_penalty", self.overtake_penalty, &[50, 100, 150, 200])?;
        check_one_of("trick_multiplier", self.trick_multiplier, &[5, 10])?;
        check_one_of("nil_score", self.nil_score, &[50, 75, 100, 125, 150, 200])?;
        Ok(())
    }

    fn partnered(&self, players: usize) -> bool {
        self.with_partners && (players == 4 || players == 6)
    }

    /// Largest trick bid that the deal can support.
    fn max_bid(&self, players: usize) -> u8 {
        match players {
            2 | 4 => 13,
            3 | 6 if self.add_jokers => 18,
            3 | 6 => 17,
            _ => 10,
        }
    }
}

/// A bid: a trick count or one of the nil variants. On the wire bids are the
/// integers 1–18, 19 (nil), 20 (blind nil) and 21 (triple nil).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SpadesBid {
    Tricks(u8),
    Nil,
    BlindNil,
    TripleNil,
}

impl SpadesBid {
    fn nil_multiplier(self) -> Option<i32> {
        match self {
            SpadesBid::Tricks(_) => None,
            SpadesBid::Nil => Some(1),
            SpadesBid::BlindNil => Some(2),
            SpadesBid::TripleNil => Some(3),
        }
    }

    fn tricks(self) -> i32 {
        match self {
            SpadesBid::Tricks(n) => i32::from(n),
            _ => 0,
        }
    }
}

impl TryFrom<u8> for SpadesBid {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=18 => Ok(SpadesBid::Tricks(value)),
            19 => Ok(SpadesBid::Nil),
            20 => Ok(SpadesBid::BlindNil),
            21 => Ok(SpadesBid::TripleNil),
            _ => Err(GameError::validation(format!("not a valid bid: {value}"))),
        }
    }
}

impl From<SpadesBid> for u8 {
    fn from(bid: SpadesBid) -> u8 {
        match bid {
            SpadesBid::Tricks(n) => n,
            SpadesBid::Nil => 19,
            SpadesBid::BlindNil => 20,
            SpadesBid::TripleNil => 21,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpadesPlayer {
    pub hand: Vec<Card>,
    /// Two players: the card being considered during the draw.
    pub drawn: Option<Card>,
    /// Whether the player has seen their hand this round.
    pub peeked: bool,
    pub bid: Option<SpadesBid>,
    pub tricks: i32,
    pub score: i32,
    pub overtakes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpadesState {
    pub config: SpadesConfig,
    shuffle: ShuffleSeed,

    pub deck: Deck,
    /// Cards turned away during the two-player draw.
    pub discard: Vec<Card>,
    pub players: Vec<SpadesPlayer>,
    pub trick: Trick,
    pub tricks: Vec<Trick>,
    constructed: usize,

    pub turn: usize,
    pub dealer: usize,
    pub spades_broken: bool,

    pub started: bool,
    pub dealt: bool,
    pub bid: bool,
    pub finished: bool,
    pub winner: Option<usize>,
}

fn effectively_spade(card: &Card) -> bool {
    card.suit == Suit::Spades || card.rank == Rank::Joker
}

/// Whether `challenger` takes the trick from `best`.
fn beats(challenger: &Card, best: &Card, first_wins: bool) -> bool {
    let regular = |c: &Card| c.rank != Rank::Joker;
    if regular(challenger) && regular(best) && challenger.suit == best.suit {
        let (c, b) = (trick_rank(challenger.rank), trick_rank(best.rank));
        return c > b || (c == b && !first_wins);
    }
    if regular(challenger) {
        return challenger.suit == Suit::Spades && !effectively_spade(best);
    }
    if regular(best) {
        return true;
    }
    // Two jokers: the marked one is higher.
    match (challenger.suit == Suit::Fancy, best.suit == Suit::Fancy) {
        (true, false) => true,
        (false, true) => false,
        _ => !first_wins,
    }
}

impl SpadesState {
    pub fn new(config: SpadesConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            shuffle: ShuffleSeed::new(seed),
            deck: Deck::new(),
            discard: Vec::new(),
            players: Vec::new(),
            trick: Trick::new(0),
            tricks: Vec::new(),
            constructed: 0,
            turn: 0,
            dealer: 0,
            spades_broken: false,
            started: false,
            dealt: false,
            bid: false,
            finished: false,
            winner: None,
        })
    }

    fn build_deck(&self) -> Result<Deck, GameError> {
        let mut deck = Deck::new();
        deck.add_standard52();
        match self.players.len() {
            3 if self.config.add_jokers => {
                deck.add_jokers(1, true);
                deck.add_jokers(1, false);
            }
            5 => {
                for suit in [Suit::Diamonds, Suit::Hearts] {
                    if !deck.remove_card(Rank::Two, suit) {
                        return Err(GameError::invariant("standard deck is missing a two"));
                    }
                }
            }
            6 => {
                deck.add_standard52();
                if self.config.add_jokers {
                    deck.add_jokers(4, false);
                } else {
                    for _ in 0..2 {
                        if !deck.remove_card(Rank::Two, Suit::Clubs) {
                            return Err(GameError::invariant("double deck is missing a two of clubs"));
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(deck)
    }

    pub fn start_round(&mut self) -> Result<(), GameError> {
        let n = self.players.len();
        let mut deck = self.build_deck()?;
        deck.shuffle(&mut self.shuffle.next_rng());
        let constructed = deck.len();

        let blind = self.config.blind_bidding && n != 2;
        for player in &mut self.players {
            player.hand.clear();
            player.drawn = None;
            player.bid = None;
            player.peeked = !blind;
            player.tricks = 0;
        }
        self.discard.clear();
        self.tricks.clear();
        self.spades_broken = false;
        self.bid = false;
        self.constructed = constructed;

        // Two players draw their hands one card at a time, dealer first.
        if n == 2 {
            self.deck = deck;
            self.dealt = false;
            self.turn = self.dealer;
            self.trick = Trick::new(self.dealer);
            return Ok(());
        }

        let first = (self.dealer + 1) % n;
        while deck.len() >= n {
            for offset in 0..n {
                if let Some(card) = deck.draw() {
                    self.players[(first + offset) % n].hand.push(card);
                }
            }
        }
        self.deck = deck;
        self.turn = first;
        self.trick = Trick::new(first);
        self.dealt = true;
        debug!(dealer = self.dealer, players = n, "[SPADES] dealt round");
        Ok(())
    }

    fn ensure_drawing(&self, player: usize) -> Result<(), GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if self.players.len() != 2 {
            return Err(GameError::validation("only two-player games draw their hands"));
        }
        if self.dealt {
            return Err(GameError::validation("cards have already been dealt"));
        }
        if self.turn != player {
            return Err(GameError::validation("not your turn"));
        }
        Ok(())
    }

    /// Two players: look at the top card of the deck.
    pub fn peek_top(&mut self, player: usize) -> Result<Outcome, GameError> {
        self.ensure_drawing(player)?;
        if self.players[player].drawn.is_some() {
            return Err(GameError::validation(
                "already have picked up a card; decide whether to keep or discard it",
            ));
        }
        let card = self
            .deck
            .draw()
            .ok_or_else(|| GameError::invariant("draw pile ran out before hands were full"))?;
        self.players[player].drawn = Some(card);
        Ok(Outcome::Continue)
    }

    /// Two players: keep the peeked card and discard the next, or discard it
    /// and keep the next.
    pub fn decide_top(&mut self, player: usize, keep: bool) -> Result<Outcome, GameError> {
        self.ensure_drawing(player)?;
        let drawn = self.players[player]
            .drawn
            .ok_or_else(|| GameError::validation("need to pick up a card first"))?;
        if self.deck.is_empty() {
            return Err(GameError::invariant("draw pile ran out before hands were full"));
        }

        let next = self
            .deck
            .draw()
            .ok_or_else(|| GameError::invariant("draw pile ran out before hands were full"))?;
        let (kept, dropped) = if keep { (drawn, next) } else { (next, drawn) };
        let seat = &mut self.players[player];
        seat.hand.push(kept);
        seat.drawn = None;
        self.discard.push(dropped);

        self.turn = (self.turn + 1) % 2;
        if self.deck.len() < 2 {
            self.dealt = true;
            self.turn = (self.dealer + 1) % 2;
            self.trick = Trick::new(self.turn);
        }
        Ok(Outcome::Continue)
    }

    /// Look at your hand, giving up the chance of a blind bid.
    pub fn peek_cards(&mut self, player: usize) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if !self.dealt {
            return Err(GameError::validation("unable to peek before dealing cards"));
        }
        if self.bid {
            return Err(GameError::validation("already bid; must've already peeked"));
        }
        self.players[player].peeked = true;
        Ok(Outcome::Continue)
    }

    pub fn place_bid(&mut self, player: usize, bid: SpadesBid) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if !self.dealt {
            return Err(GameError::validation("unable to bid before dealing cards"));
        }
        if self.bid {
            return Err(GameError::validation("already bid; can't bid again"));
        }
        if self.turn != player {
            return Err(GameError::validation("not your turn"));
        }
        let config = &self.config;
        match bid {
            SpadesBid::Tricks(0) => return Err(GameError::validation("can't skip bidding")),
            SpadesBid::Nil if !config.with_nil => {
                return Err(GameError::validation("can't bid nil when not enabled by config"));
            }
            SpadesBid::BlindNil if !(config.with_nil && config.blind_bidding) => {
                return Err(GameError::validation(
                    "can't bid blind nil when not enabled by config",
                ));
            }
            SpadesBid::TripleNil if !(config.with_triple_nil && config.blind_bidding) => {
                return Err(GameError::validation(
                    "can't bid triple nil when not enabled by config",
                ));
            }
            SpadesBid::BlindNil | SpadesBid::TripleNil if self.players[player].peeked => {
                return Err(GameError::validation(
                    "can't bid blind or triple nil when you've peeked at your cards",
                ));
            }
            SpadesBid::Tricks(n) if n > config.max_bid(self.players.len()) => {
                return Err(GameError::validation(format!(
                    "can't bid above {} with this number of players",
                    config.max_bid(self.players.len())
                )));
            }
            _ => {}
        }

        let seat = &mut self.players[player];
        seat.bid = Some(bid);
        seat.peeked = true;
        if player == self.dealer {
            self.bid = true;
        }
        self.turn = (self.turn + 1) % self.players.len();
        self.trick = Trick::new(self.turn);
        Ok(Outcome::Continue)
    }

    pub fn play_card(&mut self, player: usize, card_id: CardId) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if !self.dealt {
            return Err(GameError::validation("unable to play a card before dealing cards"));
        }
        if !self.bid {
            return Err(GameError::validation("unable to play before bidding"));
        }
        if self.turn != player {
            return Err(GameError::validation("not your turn"));
        }
        let hand = &self.players[player].hand;
        let index = find_card(hand, card_id)
            .ok_or_else(|| GameError::validation("unable to play card not in hand"))?;
        let played = hand[index];

        match self.trick.lead() {
            None => {
                if effectively_spade(&played)
                    && !self.spades_broken
                    && self.config.must_break_spades
                    && holds_other(hand, &played, |c| !effectively_spade(c))
                {
                    return Err(GameError::validation(
                        "must sluff spades before spades can be lead",
                    ));
                }
            }
            Some(lead) => {
                let follows = |c: &Card| {
                    if effectively_spade(&lead) {
                        effectively_spade(c)
                    } else {
                        c.suit == lead.suit && c.rank != Rank::Joker
                    }
                };
                if !follows(&played) && holds_other(hand, &played, follows) {
                    return Err(GameError::validation("must follow the lead suit"));
                }
            }
        }

        self.players[player].hand.remove(index);
        self.trick.plays.push((player, played));
        self.spades_broken |= effectively_spade(&played);

        let n = self.players.len();
        self.turn = (self.turn + 1) % n;
        if self.trick.plays.len() < n {
            return Ok(Outcome::Continue);
        }

        let first_wins = self.config.first_wins;
        let winner = self
            .trick
            .resolve(|c, best| beats(c, best, first_wins))
            .ok_or_else(|| GameError::invariant("completed trick has no plays"))?;
        let mut done = std::mem::replace(&mut self.trick, Trick::new(winner));
        done.winner = Some(winner);
        self.tricks.push(done);
        self.players[winner].tricks += 1;
        self.turn = winner;

        if self.players.iter().all(|p| p.hand.is_empty()) {
            return self.tabulate();
        }
        Ok(Outcome::Continue)
    }

    /// Score and overtake count for a player bidding alone.
    fn score_single(&self, player: usize) -> (i32, i32) {
        let config = &self.config;
        let seat = &self.players[player];
        let bid = seat.bid.unwrap_or(SpadesBid::Tricks(0));

        if let Some(mut multiplier) = bid.nil_multiplier() {
            let mut taken = 0;
            if seat.tricks > 0 {
                multiplier = -multiplier;
                if config.overtakes_nil {
                    taken = seat.tricks;
                }
            }
            let (penalty, overtakes) = self.overtake(seat.overtakes, taken);
            return (multiplier * config.nil_score - penalty, overtakes);
        }

        let contract = bid.tricks();
        if seat.tricks >= contract {
            let (penalty, overtakes) = self.overtake(seat.overtakes, seat.tricks - contract);
            (contract * config.trick_multiplier - penalty, overtakes)
        } else {
            (-contract * config.trick_multiplier, seat.overtakes)
        }
    }

    /// Penalty owed and the carried overtake count after adding `extra`.
    fn overtake(&self, carried: i32, extra: i32) -> (i32, i32) {
        let total = carried + extra;
        let penalty = if self.config.overtakes && total >= self.config.overtake_limit {
            self.config.overtake_penalty
        } else {
            0
        };
        (penalty, total % self.config.overtake_limit)
    }

    fn score_partnership(&self, player: usize, partner: usize) -> (i32, i32) {
        let config = &self.config;
        let (us, them) = (&self.players[player], &self.players[partner]);
        let our_bid = us.bid.unwrap_or(SpadesBid::Tricks(0));
        let their_bid = them.bid.unwrap_or(SpadesBid::Tricks(0));

        match (our_bid.nil_multiplier(), their_bid.nil_multiplier()) {
            (None, None) => {
                let contract = our_bid.tricks() + their_bid.tricks();
                let tricks = us.tricks + them.tricks;
                if tricks >= contract {
                    let (penalty, overtakes) = self.overtake(us.overtakes, tricks - contract);
                    (contract * config.trick_multiplier - penalty, overtakes)
                } else {
                    (-contract * config.trick_multiplier, us.overtakes)
                }
            }
            (None, Some(_)) => self.score_partnership(partner, player),
            (Some(multiplier), None) => {
                let made_nil = us.tricks == 0;
                let mut score = if made_nil { multiplier } else { -multiplier } * config.nil_score;
                let contract = their_bid.tricks();
                let tricks = us.tricks + them.tricks;
                let mut overtakes = us.overtakes;
                if tricks >= contract {
                    let mut penalty = 0;
                    if config.overtakes_nil {
                        (penalty, overtakes) = self.overtake(us.overtakes, tricks - contract);
                    }
                    score += contract * config.trick_multiplier - penalty;
                } else {
                    score -= contract * config.trick_multiplier;
                }
                (score, overtakes)
            }
            (Some(ours), Some(theirs)) => {
                let (our_made, their_made) = if config.with_double_nil {
                    let both = us.tricks == 0 && them.tricks == 0;
                    (both, both)
                } else {
                    (us.tricks == 0, them.tricks == 0)
                };
                let signed = |m: i32, made: bool| if made { m } else { -m };
                let score = (signed(ours, our_made) + signed(theirs, their_made)) * config.nil_score;
                (score, us.overtakes)
            }
        }
    }

    fn tabulate(&mut self) -> Result<Outcome, GameError> {
        let n = self.players.len();
        let teams = if self.config.partnered(n) { n / 2 } else { n };

        let mut updates = Vec::with_capacity(n);
        for player in 0..teams {
            if teams == n {
                updates.push((player, self.score_single(player)));
            } else {
                let partner = player + teams;
                let result = self.score_partnership(player, partner);
                updates.push((player, result));
                updates.push((partner, result));
            }
        }
        for (seat, (delta, overtakes)) in updates {
            self.players[seat].score += delta;
            self.players[seat].overtakes = overtakes;
        }

        let best = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        if best >= self.config.win_amount {
            let winner = self.players.iter().position(|p| p.score == best).unwrap_or(0);
            self.finished = true;
            self.winner = Some(winner);
            return Ok(Outcome::GameComplete { winner });
        }

        self.dealer = (self.dealer + 1) % n;
        self.start_round()?;
        Ok(Outcome::RoundComplete)
    }

    pub fn order(&mut self, player: usize, order: &[CardId]) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        order_cards(&mut self.players[player].hand, order);
        Ok(Outcome::Continue)
    }

    /// Choose the first dealer before the start.
    pub fn assign_dealer(&mut self, dealer: usize, players: usize) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("cannot assign dealer after already started"));
        }
        check_range("num_players", players, 2..=6)?;
        if dealer >= players {
            return Err(GameError::validation(
                "cannot assign dealer higher than number of players",
            ));
        }
        self.dealer = dealer;
        Ok(())
    }

    /// Partner seat for `player`, when playing in partnerships.
    pub fn partner(&self, player: usize) -> Option<usize> {
        let n = self.players.len();
        self.config.partnered(n).then(|| (player + n / 2) % n)
    }
}

impl GameRules for SpadesState {
    fn start(&mut self, players: usize) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("double start occurred"));
        }
        check_range("num_players", players, 2..=6)?;

        if self.dealer >= players {
            return Err(GameError::validation(
                "cannot assign dealer higher than number of players",
            ));
        }

        self.players = vec![SpadesPlayer::default(); players];
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
            + self.trick.plays.len()
            + self.tricks.iter().map(|t| t.plays.len()).sum::<usize>()
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
