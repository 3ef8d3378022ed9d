//! Hearts for three to seven players.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cards::{find_card, order_cards, Card, CardId, Deck, Rank, Suit};
use super::outcome::Outcome;
use super::rules::{check_range, ensure_in_play, GameRules};
use super::seed_derivation::ShuffleSeed;
use super::tricks::{holds_other, trick_rank, Trick};
use crate::errors::GameError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartsConfig {
    pub number_to_pass: usize,
    /// Players other than four alternate left, right, then hold.
    pub hold_round: bool,
    pub must_break_hearts: bool,
    pub black_widow_breaks: bool,
    pub first_trick_hearts: bool,
    /// Leftover cards go to whoever takes the first trick instead of being
    /// removed from the deck.
    pub with_crib: bool,
    pub win_amount: i32,
    pub shoot_moon_reduces: bool,
    pub shoot_the_sun: bool,
    pub jack_of_diamonds: bool,
    pub ten_of_clubs: bool,
    pub black_widow_for_five: bool,
    pub ace_of_hearts: bool,
    pub no_trick_bonus: bool,
    pub hundred_to_half: bool,
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            number_to_pass: 3,
            hold_round: true,
            must_break_hearts: true,
            black_widow_breaks: false,
            first_trick_hearts: false,
            with_crib: false,
            win_amount: 100,
            shoot_moon_reduces: false,
            shoot_the_sun: true,
            jack_of_diamonds: false,
            ten_of_clubs: false,
            black_widow_for_five: false,
            ace_of_hearts: false,
            no_trick_bonus: false,
            hundred_to_half: false,
        }
    }
}

impl HeartsConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        check_range("number_to_pass", self.number_to_pass, 1..=8)?;
        check_range("win_amount", self.win_amount, 50..=500)?;
        Ok(())
    }

    /// Cards dropped so that the deck divides evenly between `players`.
    pub fn removed_cards(&self, players: usize) -> &'static [(Rank, Suit)] {
        if self.with_crib {
            return &[];
        }
        match players {
            3 => &[(Rank::Two, Suit::Diamonds)],
            5 => &[(Rank::Two, Suit::Diamonds), (Rank::Two, Suit::Spades)],
            6 => &[
                (Rank::Two, Suit::Diamonds),
                (Rank::Two, Suit::Spades),
                (Rank::Two, Suit::Clubs),
                (Rank::Three, Suit::Diamonds),
            ],
            7 => &[
                (Rank::Two, Suit::Diamonds),
                (Rank::Two, Suit::Spades),
                (Rank::Three, Suit::Diamonds),
            ],
            _ => &[],
        }
    }

    /// The card that must open the first trick.
    pub fn lead_card(&self, players: usize) -> (Rank, Suit) {
        if players == 6 && !self.with_crib {
            (Rank::Three, Suit::Clubs)
        } else {
            (Rank::Two, Suit::Clubs)
        }
    }

    fn hand_size(&self, players: usize) -> usize {
        (52 - self.removed_cards(players).len()) / players
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassDirection {
    Left,
    Right,
    Across,
    Hold,
}

impl PassDirection {
    fn next(self, players: usize, hold_round: bool) -> Self {
        let next = match self {
            PassDirection::Left => PassDirection::Right,
            PassDirection::Right => PassDirection::Across,
            PassDirection::Across => PassDirection::Hold,
            PassDirection::Hold => PassDirection::Left,
        };
        match next {
            PassDirection::Across if players != 4 && hold_round => PassDirection::Hold,
            PassDirection::Across if players != 4 => PassDirection::Left,
            other => other,
        }
    }

    fn recipient(self, player: usize, players: usize) -> Option<usize> {
        match self {
            PassDirection::Left => Some((player + 1) % players),
            PassDirection::Right => Some((player + players - 1) % players),
            PassDirection::Across => Some((player + players / 2) % players),
            PassDirection::Hold => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartsPlayer {
    pub hand: Vec<Card>,
    pub passed: bool,
    /// Cards passed to this player, hidden until everyone has passed.
    pub incoming: Vec<Card>,
    /// Ids of the cards received this round, shown until the first lead.
    pub received: Vec<CardId>,
    pub tricks: usize,
    pub round_score: i32,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartsState {
    pub config: HeartsConfig,
    shuffle: ShuffleSeed,

    pub players: Vec<HeartsPlayer>,
    pub crib: Vec<Card>,
    pub trick: Trick,
    /// Completed tricks of the current round.
    pub tricks: Vec<Trick>,

    pub turn: usize,
    pub dealer: usize,
    pub pass_direction: PassDirection,
    pub hearts_broken: bool,

    pub started: bool,
    pub dealt: bool,
    pub passed: bool,
    pub finished: bool,
    pub winner: Option<usize>,
}

impl HeartsState {
    pub fn new(config: HeartsConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            shuffle: ShuffleSeed::new(seed),
            players: Vec::new(),
            crib: Vec::new(),
            trick: Trick::new(0),
            tricks: Vec::new(),
            turn: 0,
            dealer: 0,
            pass_direction: PassDirection::Hold,
            hearts_broken: false,
            started: false,
            dealt: false,
            passed: false,
            finished: false,
            winner: None,
        })
    }

    fn holder_of(&self, (rank, suit): (Rank, Suit)) -> Option<usize> {
        self.players
            .iter()
            .position(|p| p.hand.iter().any(|c| c.rank == rank && c.suit == suit))
    }

    pub fn start_round(&mut self) -> Result<(), GameError> {
        if self.dealt {
            return Err(GameError::validation(
                "unable to deal if cards have already been dealt",
            ));
        }
        let n = self.players.len();

        let mut deck = Deck::new();
        deck.add_standard52();
        for &(rank, suit) in self.config.removed_cards(n) {
            if !deck.remove_card(rank, suit) {
                return Err(GameError::invariant(format!(
                    "standard deck is missing {rank:?} of {suit:?}"
                )));
            }
        }
        deck.shuffle(&mut self.shuffle.next_rng());

        for player in &mut self.players {
            player.hand.clear();
            player.incoming.clear();
            player.received.clear();
            player.passed = false;
        }

        let first = (self.dealer + 1) % n;
        while deck.len() >= n {
            for offset in 0..n {
                if let Some(card) = deck.draw() {
                    self.players[(first + offset) % n].hand.push(card);
                }
            }
        }
        let mut crib = deck.into_cards();
        if !crib.is_empty() && !self.config.with_crib {
            return Err(GameError::invariant("cards left over without a crib"));
        }

        // A crib may swallow the opening club; trade it for the lowest club
        // dealt so the hand it replaces plays the same.
        let lead = self.config.lead_card(n);
        if let Some(crib_index) = crib.iter().position(|c| (c.rank, c.suit) == lead) {
            let lowest = self
                .players
                .iter()
                .enumerate()
                .flat_map(|(seat, p)| p.hand.iter().enumerate().map(move |(i, c)| (seat, i, *c)))
                .filter(|(_, _, c)| c.suit == Suit::Clubs && c.rank.value() > lead.0.value())
                .min_by_key(|(_, _, c)| c.rank.value());
            let Some((seat, index, _)) = lowest else {
                return Err(GameError::invariant("no club available to trade with the crib"));
            };
            std::mem::swap(&mut self.players[seat].hand[index], &mut crib[crib_index]);
        }
        self.crib = crib;

        self.pass_direction = self.pass_direction.next(n, self.config.hold_round);
        self.tricks.clear();
        self.hearts_broken = false;
        self.dealt = true;

        if self.pass_direction == PassDirection::Hold {
            let leader = self
                .holder_of(lead)
                .ok_or_else(|| GameError::invariant("nobody holds the opening card"))?;
            self.passed = true;
            self.turn = leader;
            self.trick = Trick::new(leader);
        } else {
            self.passed = false;
            self.turn = self.dealer;
            self.trick = Trick::new(self.dealer);
        }
        debug!(dealer = self.dealer, direction = ?self.pass_direction, "[HEARTS] dealt round");
        Ok(())
    }

    fn ensure_dealt(&self, player: usize) -> Result<(), GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if !self.dealt {
            return Err(GameError::validation("cards have not been dealt yet"));
        }
        Ok(())
    }

    pub fn pass_cards(&mut self, player: usize, cards: &[CardId]) -> Result<Outcome, GameError> {
        self.ensure_dealt(player)?;
        if self.passed {
            return Err(GameError::validation("passing is over for this round"));
        }
        if self.players[player].passed {
            return Err(GameError::validation("you have already passed"));
        }
        if cards.len() != self.config.number_to_pass {
            return Err(GameError::validation(format!(
                "need to pass {} cards",
                self.config.number_to_pass
            )));
        }
        for (index, &id) in cards.iter().enumerate() {
            if cards[..index].contains(&id) {
                return Err(GameError::validation("unable to pass the same card twice"));
            }
            if find_card(&self.players[player].hand, id).is_none() {
                return Err(GameError::validation("unable to pass card not in your hand"));
            }
        }
        let n = self.players.len();
        let target = self
            .pass_direction
            .recipient(player, n)
            .ok_or_else(|| GameError::validation("shouldn't be passing cards while holding"))?;

        let seat = &mut self.players[player];
        let (moving, kept): (Vec<Card>, Vec<Card>) =
            seat.hand.drain(..).partition(|c| cards.contains(&c.id));
        seat.hand = kept;
        seat.passed = true;
        self.players[target].incoming.extend(moving);

        if self.players.iter().all(|p| p.passed) {
            for seat in &mut self.players {
                seat.received = seat.incoming.iter().map(|c| c.id).collect();
                let incoming = std::mem::take(&mut seat.incoming);
                seat.hand.extend(incoming);
            }
            let leader = self
                .holder_of(self.config.lead_card(n))
                .ok_or_else(|| GameError::invariant("nobody holds the opening card"))?;
            self.passed = true;
            self.turn = leader;
            self.trick = Trick::new(leader);
        }
        Ok(Outcome::Continue)
    }

    pub fn play_card(&mut self, player: usize, card_id: CardId) -> Result<Outcome, GameError> {
        self.ensure_dealt(player)?;
        if !self.passed {
            return Err(GameError::validation("unable to play before passing"));
        }
        if self.turn != player {
            return Err(GameError::validation("not your turn"));
        }
        let hand = &self.players[player].hand;
        let index = find_card(hand, card_id)
            .ok_or_else(|| GameError::validation("unable to play card not in hand"))?;
        let played = hand[index];
        let first_trick = self.tricks.is_empty();
        let is_point = |c: &Card| c.suit == Suit::Hearts || (c.rank == Rank::Queen && c.suit == Suit::Spades);

        let breaks = played.suit == Suit::Hearts
            || (self.config.black_widow_breaks && played.rank == Rank::Queen && played.suit == Suit::Spades);

        match self.trick.lead() {
            None => {
                let lead = self.config.lead_card(self.players.len());
                if first_trick && (played.rank, played.suit) != lead {
                    return Err(GameError::validation(format!(
                        "must lead the {} of clubs on the first trick",
                        if lead.0 == Rank::Three { "three" } else { "two" }
                    )));
                }
                if played.suit == Suit::Hearts
                    && !self.hearts_broken
                    && self.config.must_break_hearts
                    && holds_other(hand, &played, |c| c.suit != Suit::Hearts)
                {
                    return Err(GameError::validation(
                        "must sluff hearts before hearts can be lead",
                    ));
                }
            }
            Some(lead) => {
                if played.suit != lead.suit && holds_other(hand, &played, |c| c.suit == lead.suit) {
                    return Err(GameError::validation("must follow the lead suit"));
                }
                if first_trick
                    && !self.config.first_trick_hearts
                    && is_point(&played)
                    && holds_other(hand, &played, |c| !is_point(c))
                {
                    return Err(GameError::validation(
                        "can't play points on the first trick",
                    ));
                }
            }
        }
        if self.trick.plays.is_empty() {
            for seat in &mut self.players {
                seat.received.clear();
            }
            if first_trick {
                for seat in &mut self.players {
                    seat.tricks = 0;
                }
            }
        }
        self.players[player].hand.remove(index);
        self.trick.plays.push((player, played));
        self.hearts_broken |= breaks;

        let n = self.players.len();
        self.turn = (self.turn + 1) % n;
        if self.trick.plays.len() < n {
            return Ok(Outcome::Continue);
        }

        let winner = self
            .trick
            .resolve(|c, best| c.suit == best.suit && trick_rank(c.rank) > trick_rank(best.rank))
            .ok_or_else(|| GameError::invariant("completed trick has no plays"))?;
        let mut done = std::mem::replace(&mut self.trick, Trick::new(winner));
        done.winner = Some(winner);
        self.tricks.push(done);
        self.players[winner].tricks += 1;
        self.turn = winner;

        if self.players.iter().all(|p| p.hand.is_empty()) {
            return Ok(self.tabulate());
        }
        Ok(Outcome::Continue)
    }

    /// Score change per player for the completed round.
    pub fn round_deltas(&self) -> Vec<i32> {
        let n = self.players.len();
        let mut deltas = vec![0; n];
        let crib_taker = self.tricks.first().and_then(|t| t.winner);

        let taken = |seat: usize| -> Vec<Card> {
            let mut cards: Vec<Card> = self
                .tricks
                .iter()
                .filter(|t| t.winner == Some(seat))
                .flat_map(|t| t.cards().copied())
                .collect();
            if crib_taker == Some(seat) {
                cards.extend(self.crib.iter().copied());
            }
            cards
        };
        let has = |cards: &[Card], rank: Rank, suit: Suit| {
            cards.iter().any(|c| c.rank == rank && c.suit == suit)
        };
        let points = |cards: &[Card]| {
            cards.iter().any(|c| c.suit == Suit::Hearts || (c.rank == Rank::Queen && c.suit == Suit::Spades))
        };

        for seat in 0..n {
            let mine = taken(seat);
            let others: Vec<Card> = (0..n).filter(|&s| s != seat).flat_map(|s| taken(s)).collect();
            let hearts = mine.iter().filter(|c| c.suit == Suit::Hearts).count() as i32;
            let queen = has(&mine, Rank::Queen, Suit::Spades);
            let ace = has(&mine, Rank::Ace, Suit::Hearts);
            let jack = has(&mine, Rank::Jack, Suit::Diamonds);
            let ten = has(&mine, Rank::Ten, Suit::Clubs);
            let took_trick = self.tricks.iter().any(|t| t.winner == Some(seat));
            let shot_sun = self.config.shoot_the_sun
                && !self.tricks.is_empty()
                && self.tricks.iter().all(|t| t.winner == Some(seat));
            let shot_moon = took_trick && !points(&others);

            if shot_moon || shot_sun {
                let mut value = hearts + 5;
                if queen && !self.config.black_widow_for_five {
                    value += 13 - 5;
                }
                if ace && self.config.ace_of_hearts {
                    value += 5 - 1;
                }
                if jack && self.config.jack_of_diamonds {
                    value += 11;
                }
                if shot_sun {
                    value *= 2;
                } else if ten && self.config.ten_of_clubs {
                    value /= 2;
                }
                if self.config.shoot_moon_reduces {
                    deltas[seat] -= value;
                } else {
                    for (other, delta) in deltas.iter_mut().enumerate() {
                        if other != seat {
                            *delta += value;
                        }
                    }
                }
                continue;
            }

            let mut value = hearts;
            if queen {
                value += if self.config.black_widow_for_five { 5 } else { 13 };
            }
            if ace && self.config.ace_of_hearts {
                value += 5 - 1;
            }
            if jack && self.config.jack_of_diamonds {
                value -= 11;
            }
            if ten && self.config.ten_of_clubs {
                value *= 2;
            }
            if !took_trick && self.config.no_trick_bonus {
                value = -5;
            }
            deltas[seat] += value;
        }
        deltas
    }

    fn tabulate(&mut self) -> Outcome {
        let deltas = self.round_deltas();
        for (seat, delta) in self.players.iter_mut().zip(deltas) {
            seat.round_score = delta;
            seat.score += delta;
            if self.config.hundred_to_half && seat.score == self.config.win_amount {
                seat.score = self.config.win_amount / 2;
            }
        }

        let highest = self.players.iter().map(|p| p.score).max().unwrap_or(0);
        if highest > self.config.win_amount {
            let lowest = self.players.iter().map(|p| p.score).min().unwrap_or(0);
            let winner = self.players.iter().position(|p| p.score == lowest).unwrap_or(0);
            self.finished = true;
            self.winner = Some(winner);
            return Outcome::GameComplete { winner };
        }

        self.dealer = (self.dealer + 1) % self.players.len();
        self.dealt = false;
        Outcome::RoundComplete
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

impl GameRules for HeartsState {
    fn start(&mut self, players: usize) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("double start occurred"));
        }
        check_range("num_players", players, 3..=7)?;
        check_range(
            "number_to_pass",
            self.config.number_to_pass,
            1..=self.config.hand_size(players) - 1,
        )?;

        self.players = vec![HeartsPlayer::default(); players];
        self.dealer = 0;
        self.pass_direction = PassDirection::Hold;
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
        self.crib.len()
            + self.trick.plays.len()
            + self.tricks.iter().map(|t| t.plays.len()).sum::<usize>()
            + self
                .players
                .iter()
                .map(|p| p.hand.len() + p.incoming.len())
                .sum::<usize>()
    }

    fn constructed_cards(&self) -> usize {
        if self.started {
            52 - self.config.removed_cards(self.players.len()).len()
        } else {
            0
        }
    }
}
