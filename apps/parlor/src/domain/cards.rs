//! Core card types (`Card`, `Rank`, `Suit`) and the `Deck` pile.

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Working id of a card, unique within one session's card population.
/// Zero means "not yet assigned".
pub type CardId = i32;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    None,
    Clubs,
    Hearts,
    Spades,
    Diamonds,
    /// Suit of a marked joker.
    Fancy,
}

impl Suit {
    pub const STANDARD: [Suit; 4] = [Suit::Clubs, Suit::Hearts, Suit::Spades, Suit::Diamonds];

    pub fn is_red(self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    None,
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Joker,
}

impl Rank {
    pub const STANDARD: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Ace-low ordinal: `Ace = 1 … King = 13, Joker = 14`.
    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn from_value(value: u8) -> Option<Rank> {
        match value {
            1..=13 => Some(Rank::STANDARD[usize::from(value) - 1]),
            14 => Some(Rank::Joker),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub suit: Suit,
    pub rank: Rank,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { id: 0, suit, rank }
    }

    pub const fn with_id(id: CardId, rank: Rank, suit: Suit) -> Self {
        Self { id, suit, rank }
    }

    pub fn is_joker(&self) -> bool {
        self.rank == Rank::Joker
    }

    /// Rank and suit match, ignoring the working id.
    pub fn same_face(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }
}

// Note: ordering is only for stable hand display: suit first, then rank, then id.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.suit
            .cmp(&other.suit)
            .then(self.rank.cmp(&other.rank))
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = match self.rank {
            Rank::None => "?",
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "T",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Joker => "*",
        };
        let suit = match self.suit {
            Suit::None => "",
            Suit::Clubs => "C",
            Suit::Hearts => "H",
            Suit::Spades => "S",
            Suit::Diamonds => "D",
            Suit::Fancy => "F",
        };
        write!(f, "{rank}{suit}")
    }
}

/// Parses `"AS"`, `"TH"`, `"10H"`, `"*"` (plain joker) and `"*F"` (marked joker).
impl FromStr for Card {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || GameError::validation(format!("parse card: {s}"));
        let (rank_part, suit_part) = match s {
            "*" => return Ok(Card::new(Rank::Joker, Suit::None)),
            _ if s.len() >= 2 => s.split_at(s.len() - 1),
            _ => return Err(bad()),
        };
        let rank = match rank_part {
            "A" => Rank::Ace,
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "T" | "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            "*" => Rank::Joker,
            _ => return Err(bad()),
        };
        let suit = match suit_part {
            "C" => Suit::Clubs,
            "H" => Suit::Hearts,
            "S" => Suit::Spades,
            "D" => Suit::Diamonds,
            "F" => Suit::Fancy,
            _ => return Err(bad()),
        };
        Ok(Card::new(rank, suit))
    }
}

/// Parse a whitespace-separated hand, assigning ids 1.. in order.
pub fn parse_hand(tokens: &str) -> Result<Vec<Card>, GameError> {
    tokens
        .split_whitespace()
        .enumerate()
        .map(|(i, token)| {
            let mut card: Card = token.parse()?;
            card.id = i as CardId + 1;
            Ok(card)
        })
        .collect()
}

/// An ordered pile of cards; the front is the top.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn add_standard52(&mut self) {
        for suit in Suit::STANDARD {
            for rank in Rank::STANDARD {
                self.cards.push(Card::new(rank, suit));
            }
        }
    }

    /// Marked jokers carry [`Suit::Fancy`] so two jokers stay distinguishable.
    pub fn add_jokers(&mut self, count: usize, marked: bool) {
        let suit = if marked { Suit::Fancy } else { Suit::None };
        for _ in 0..count {
            self.cards.push(Card::new(Rank::Joker, suit));
        }
    }

    /// Remove the first card with this face. Returns whether one was found.
    pub fn remove_card(&mut self, rank: Rank, suit: Suit) -> bool {
        match self
            .cards
            .iter()
            .position(|c| c.rank == rank && c.suit == suit)
        {
            Some(pos) => {
                self.cards.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Retain only cards matching `keep`.
    pub fn retain(&mut self, keep: impl FnMut(&Card) -> bool) {
        self.cards.retain(keep);
    }

    /// Assign ids `1..=n` when any card is still unnumbered, then permute.
    ///
    /// Id assignment happens once per deck build, so repeated shuffles never
    /// renumber a card that is already in play.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.cards.iter().any(|c| c.id == 0) {
            for (i, card) in self.cards.iter_mut().enumerate() {
                card.id = i as CardId + 1;
            }
        }
        self.cards.shuffle(rng);
    }

    pub fn draw(&mut self) -> Option<Card> {
        if self.cards.is_empty() {
            None
        } else {
            Some(self.cards.remove(0))
        }
    }

    /// Put a card back on top.
    pub fn push_top(&mut self, card: Card) {
        self.cards.insert(0, card);
    }

    /// Put a card at the bottom.
    pub fn push_bottom(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn top(&self) -> Option<&Card> {
        self.cards.first()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}

/// Position of the card with `id` in `cards`.
pub fn find_card(cards: &[Card], id: CardId) -> Option<usize> {
    cards.iter().position(|c| c.id == id)
}

/// Remove and return the card with `id`.
pub fn take_card(cards: &mut Vec<Card>, id: CardId) -> Option<Card> {
    find_card(cards, id).map(|pos| cards.remove(pos))
}

/// Stable-sort `cards` by their position in `order`; ids not listed keep
/// their relative order at the end.
pub fn order_cards(cards: &mut [Card], order: &[CardId]) {
    let rank_of = |id: CardId| order.iter().position(|&o| o == id).unwrap_or(order.len());
    cards.sort_by_key(|c| rank_of(c.id));
}
