//! Eight Jacks: play cards onto a shared board to claim squares, then mark
//! straight runs of claimed squares for your team.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::board_layouts::{is_corner, BoardLayout, BoardLayouts};
use super::cards::{find_card, order_cards, Card, CardId, Deck, Rank, Suit};
use super::outcome::Outcome;
use super::rules::{check_range, ensure_in_play, GameRules};
use super::seed_derivation::ShuffleSeed;
use crate::errors::{ConfigError, GameError};

pub fn is_one_eyed_jack(card: &Card) -> bool {
    card.rank == Rank::Jack && matches!(card.suit, Suit::Hearts | Suit::Spades)
}

pub fn is_two_eyed_jack(card: &Card) -> bool {
    card.rank == Rank::Jack && matches!(card.suit, Suit::Diamonds | Suit::Clubs)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EightJacksConfig {
    pub run_length: usize,
    pub win_limit: usize,
    pub board_width: usize,
    pub board_height: usize,
    /// Drop ranks that appear nowhere on the board (jacks stay).
    pub remove_unused: bool,
    pub wild_corners: bool,
    pub hand_size: usize,
    /// Jokers act as either kind of jack.
    pub joker_count: usize,
    pub layout: BoardLayout,
}

impl Default for EightJacksConfig {
    fn default() -> Self {
        Self {
            run_length: 5,
            win_limit: 2,
            board_width: 10,
            board_height: 10,
            remove_unused: false,
            wild_corners: true,
            hand_size: 7,
            joker_count: 0,
            layout: BoardLayout::Random,
        }
    }
}

impl EightJacksConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        check_range("run_length", self.run_length, 4..=6)?;
        check_range("win_limit", self.win_limit, 1..=5)?;
        check_range("board_width", self.board_width, 8..=10)?;
        check_range("board_height", self.board_height, 8..=10)?;
        check_range("hand_size", self.hand_size, 4..=10)?;
        check_range("joker_count", self.joker_count, 0..=8)?;
        let full = self.board_width == 10 && self.board_height == 10;
        if full && !self.wild_corners {
            return Err(ConfigError::new("wild_corners", false, "true on a 10x10 board").into());
        }
        if self.layout == BoardLayout::Pinwheel && !full {
            return Err(ConfigError::new("layout", "pinwheel", "only on a 10x10 board").into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Square {
    pub id: usize,
    pub x: usize,
    pub y: usize,
    /// Face shown on the square; a joker marks a shared wild corner.
    pub value: Card,
    /// Team holding the square.
    pub marker: Option<usize>,
}

impl Square {
    fn is_wild(&self) -> bool {
        self.value.rank == Rank::Joker
    }

    fn check_play(&self, card: &Card, team: usize) -> Result<(), GameError> {
        if self.is_wild() {
            return Err(GameError::validation("cannot play on shared wild square"));
        }
        let removes = is_one_eyed_jack(card) || (card.is_joker() && self.marker.is_some());
        if removes {
            return match self.marker {
                None => Err(GameError::validation(
                    "one-eyed jacks remove a marker from an occupied square",
                )),
                Some(owner) if owner == team => {
                    Err(GameError::validation("cannot remove your own team's marker"))
                }
                Some(_) => Ok(()),
            };
        }
        if self.marker.is_some() {
            return Err(GameError::validation("cannot play on an occupied square"));
        }
        if is_two_eyed_jack(card) || card.is_joker() || self.value.same_face(card) {
            Ok(())
        } else {
            Err(GameError::validation("card doesn't match square"))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    /// x-major: square `id` lives at index `id - 1 == x * height + y`.
    pub squares: Vec<Square>,
}

impl Board {
    pub fn square(&self, id: usize) -> Option<&Square> {
        id.checked_sub(1).and_then(|index| self.squares.get(index))
    }

    fn square_mut(&mut self, id: usize) -> Option<&mut Square> {
        id.checked_sub(1).and_then(|index| self.squares.get_mut(index))
    }

    fn build(config: &EightJacksConfig, shuffle: &mut ShuffleSeed) -> Result<Board, GameError> {
        let (width, height) = (config.board_width, config.board_height);
        let mut source = Deck::new();
        source.add_standard52();
        source.add_standard52();
        source.retain(|c| c.rank != Rank::Jack);
        if config.layout == BoardLayout::Random {
            source.shuffle(&mut shuffle.next_rng());
        }
        let cards = source.cards();
        let placement =
            BoardLayouts::global().placement(config.layout, config.wild_corners, width, height);
        let computed = matches!(config.layout, BoardLayout::Spiral | BoardLayout::Pinwheel);
        if computed && placement.is_none() {
            return Err(GameError::invariant("no precomputed layout for this board"));
        }

        let mut squares = Vec::with_capacity(width * height);
        let mut next = 0;
        for x in 0..width {
            for y in 0..height {
                let index = x * height + y;
                let wild = config.wild_corners && is_corner(x, y, width, height);
                let deck_index = match placement {
                    _ if wild => None,
                    Some(placement) => placement[index],
                    None => {
                        next += 1;
                        Some(next - 1)
                    }
                };
                let value = match deck_index {
                    None => Card::new(Rank::Joker, Suit::None),
                    Some(i) => {
                        let card = cards.get(i).ok_or_else(|| {
                            GameError::invariant("board needs more cards than the deck has")
                        })?;
                        Card::new(card.rank, card.suit)
                    }
                };
                squares.push(Square {
                    id: index + 1,
                    x,
                    y,
                    value,
                    marker: None,
                });
            }
        }
        Ok(Board {
            width,
            height,
            squares,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EightJacksPlayer {
    pub hand: Vec<Card>,
    /// Cards played onto the board.
    pub history: Vec<Card>,
    /// Dead cards swapped out.
    pub discards: Vec<Card>,
    pub team: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EightJacksState {
    pub config: EightJacksConfig,
    shuffle: ShuffleSeed,

    pub deck: Deck,
    pub board: Board,
    pub players: Vec<EightJacksPlayer>,
    /// Team per seat, when assigned before the start.
    pub assignment: Vec<usize>,
    /// Marked runs per team, as sorted square ids.
    pub runs: Vec<Vec<Vec<usize>>>,
    constructed: usize,

    pub turn: usize,
    pub dealer: usize,

    pub started: bool,
    pub dealt: bool,
    pub finished: bool,
    pub winner: Option<usize>,
}

impl EightJacksState {
    pub fn new(config: EightJacksConfig, seed: [u8; 32]) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            shuffle: ShuffleSeed::new(seed),
            deck: Deck::new(),
            board: Board::default(),
            players: Vec::new(),
            assignment: Vec::new(),
            runs: Vec::new(),
            constructed: 0,
            turn: 0,
            dealer: 0,
            started: false,
            dealt: false,
            finished: false,
            winner: None,
        })
    }

    /// Seat teams before the start: `teams[t]` lists the seats on team `t`.
    pub fn assign_teams(
        &mut self,
        dealer: usize,
        players: usize,
        teams: &[Vec<usize>],
    ) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("cannot assign teams after already started"));
        }
        check_range("num_players", players, 2..=8)?;
        if dealer >= players {
            return Err(GameError::validation(
                "cannot assign dealer higher than number of players",
            ));
        }

        let mut assignment = vec![None; players];
        for (team, seats) in teams.iter().enumerate() {
            for &seat in seats {
                let slot = assignment.get_mut(seat).ok_or_else(|| {
                    GameError::validation(format!("not a valid player identifier: {seat}"))
                })?;
                if slot.replace(team).is_some() {
                    return Err(GameError::validation(format!(
                        "player {seat} is on more than one team"
                    )));
                }
            }
        }
        let assignment: Option<Vec<usize>> = assignment.into_iter().collect();
        let assignment =
            assignment.ok_or_else(|| GameError::validation("every player needs a team"))?;
        if teams.iter().any(Vec::is_empty) {
            return Err(GameError::validation("every team needs a player"));
        }

        self.assignment = assignment;
        self.dealer = dealer;
        Ok(())
    }

    pub fn num_teams(&self) -> usize {
        self.players.iter().map(|p| p.team + 1).max().unwrap_or(0)
    }

    fn build_deck(&self, board: &Board) -> Deck {
        let mut deck = Deck::new();
        deck.add_standard52();
        deck.add_standard52();
        if self.config.remove_unused {
            let on_board = |rank: Rank| board.squares.iter().any(|s| s.value.rank == rank);
            deck.retain(|c| c.rank == Rank::Jack || on_board(c.rank));
        }
        deck.add_jokers(self.config.joker_count, false);
        deck
    }

    fn ensure_turn(&self, player: usize) -> Result<(), GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if self.turn != player {
            return Err(GameError::validation("not your turn"));
        }
        if !self.dealt {
            return Err(GameError::validation("unable to play a card before dealing cards"));
        }
        Ok(())
    }

    fn draw_replacement(&mut self, player: usize) {
        if let Some(card) = self.deck.draw() {
            self.players[player].hand.push(card);
        }
    }

    /// Swap a dead card (no open square shows it) for a fresh one. Does not
    /// use up the turn.
    pub fn discard_dead(&mut self, player: usize, card_id: CardId) -> Result<Outcome, GameError> {
        self.ensure_turn(player)?;
        let index = find_card(&self.players[player].hand, card_id)
            .ok_or_else(|| GameError::validation("unable to discard card not in hand"))?;
        let candidate = self.players[player].hand[index];
        if candidate.is_joker() || candidate.rank == Rank::Jack {
            return Err(GameError::validation("jacks and jokers are never dead"));
        }
        let open = self
            .board
            .squares
            .iter()
            .any(|s| s.marker.is_none() && s.value.same_face(&candidate));
        if open {
            return Err(GameError::validation(
                "unable to discard card while it can still be played",
            ));
        }

        let seat = &mut self.players[player];
        seat.hand.remove(index);
        seat.discards.push(candidate);
        self.draw_replacement(player);
        Ok(Outcome::Continue)
    }

    pub fn play_card(
        &mut self,
        player: usize,
        card_id: CardId,
        square_id: usize,
    ) -> Result<Outcome, GameError> {
        self.ensure_turn(player)?;
        let index = find_card(&self.players[player].hand, card_id)
            .ok_or_else(|| GameError::validation("unable to play card not in hand"))?;
        let played = self.players[player].hand[index];
        let team = self.players[player].team;
        let square = self
            .board
            .square(square_id)
            .ok_or_else(|| GameError::validation("unable to find square by that identifier"))?;
        square.check_play(&played, team)?;
        let removing = square.marker.is_some();
        if removing && self.in_run(square_id) {
            return Err(GameError::validation(
                "cannot remove a marker that is part of a run",
            ));
        }

        if let Some(square) = self.board.square_mut(square_id) {
            square.marker = if removing { None } else { Some(team) };
        }
        let seat = &mut self.players[player];
        seat.hand.remove(index);
        seat.history.push(played);
        self.draw_replacement(player);

        self.turn = (self.turn + 1) % self.players.len();
        if self.players[self.turn].hand.is_empty() {
            return Ok(self.finish(self.leading_team()));
        }
        Ok(Outcome::Continue)
    }

    fn in_run(&self, square_id: usize) -> bool {
        self.runs.iter().flatten().any(|run| run.contains(&square_id))
    }

    /// Claim a straight run of `run_length` squares, each held by the
    /// player's team or a wild corner.
    pub fn mark_run(&mut self, player: usize, squares: &[usize]) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        if !self.dealt {
            return Err(GameError::validation("unable to mark a run before dealing cards"));
        }
        if squares.len() != self.config.run_length {
            return Err(GameError::validation(format!(
                "can only mark runs of size {}",
                self.config.run_length
            )));
        }
        let team = self.players[player].team;

        let mut run = squares.to_vec();
        run.sort_unstable();
        run.dedup();
        if run.len() != squares.len() {
            return Err(GameError::validation("run repeats a square"));
        }
        let mut cells = Vec::with_capacity(run.len());
        let mut played = 0;
        for &id in &run {
            let square = self
                .board
                .square(id)
                .ok_or_else(|| GameError::validation(format!("unable to find square {id}")))?;
            if !square.is_wild() {
                if square.marker != Some(team) {
                    return Err(GameError::validation(
                        "all squares in a run must be held by your team or be wild",
                    ));
                }
                played += 1;
            }
            cells.push((square.x as isize, square.y as isize));
        }
        if played == 0 {
            return Err(GameError::validation("a run needs at least one played square"));
        }

        let step = (cells[1].0 - cells[0].0, cells[1].1 - cells[0].1);
        let straight = matches!(step, (0, 1) | (1, 0) | (1, 1) | (1, -1))
            && cells
                .windows(2)
                .all(|pair| (pair[1].0 - pair[0].0, pair[1].1 - pair[0].1) == step);
        if !straight {
            return Err(GameError::validation("must have connected squares in the run"));
        }

        for existing in self.runs.iter().flatten() {
            let overlap = existing.iter().filter(|id| run.contains(id)).count();
            if overlap > 1 {
                return Err(GameError::validation(
                    "run is invalid: overlaps with more than one square of another run",
                ));
            }
        }

        if self.runs.len() <= team {
            self.runs.resize(team + 1, Vec::new());
        }
        self.runs[team].push(run);
        debug!(player, team, runs = self.runs[team].len(), "[EIGHT JACKS] run marked");
        if self.runs[team].len() >= self.config.win_limit {
            return Ok(self.finish(team));
        }
        Ok(Outcome::Continue)
    }

    /// Team with the most runs; the lowest team number on a tie.
    fn leading_team(&self) -> usize {
        let mut best = 0;
        for (team, runs) in self.runs.iter().enumerate() {
            if runs.len() > self.runs[best].len() {
                best = team;
            }
        }
        best
    }

    /// End the game; the winner is the first seat on `team`.
    fn finish(&mut self, team: usize) -> Outcome {
        let winner = self
            .players
            .iter()
            .position(|p| p.team == team)
            .unwrap_or(0);
        self.finished = true;
        self.winner = Some(winner);
        Outcome::GameComplete { winner }
    }

    pub fn order(&mut self, player: usize, order: &[CardId]) -> Result<Outcome, GameError> {
        ensure_in_play(self.started, self.finished, player, self.players.len())?;
        order_cards(&mut self.players[player].hand, order);
        Ok(Outcome::Continue)
    }
}

impl GameRules for EightJacksState {
    fn start(&mut self, players: usize) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::validation("double start occurred"));
        }
        check_range("num_players", players, 2..=8)?;
        let teams = if self.assignment.is_empty() {
            (0..players).collect()
        } else if self.assignment.len() == players {
            self.assignment.clone()
        } else {
            return Err(GameError::validation(
                "team assignment does not match the number of players",
            ));
        };
        let dealer = if self.dealer < players { self.dealer } else { 0 };

        let mut shuffle = self.shuffle.clone();
        let board = Board::build(&self.config, &mut shuffle)?;
        let mut deck = self.build_deck(&board);
        if deck.len() < players * self.config.hand_size {
            return Err(ConfigError::new(
                "hand_size",
                self.config.hand_size,
                format!("at most {} cards each with this deck", deck.len() / players),
            )
            .into());
        }
        deck.shuffle(&mut shuffle.next_rng());

        let mut seats: Vec<EightJacksPlayer> = teams
            .into_iter()
            .map(|team| EightJacksPlayer {
                team,
                ..EightJacksPlayer::default()
            })
            .collect();
        let first = (dealer + 1) % players;
        for _ in 0..self.config.hand_size {
            for offset in 0..players {
                if let Some(card) = deck.draw() {
                    seats[(first + offset) % players].hand.push(card);
                }
            }
        }

        debug!(players, layout = ?self.config.layout, "[EIGHT JACKS] dealt board");
        self.shuffle = shuffle;
        self.dealer = dealer;
        self.constructed = deck.len() + players * self.config.hand_size;
        self.board = board;
        self.deck = deck;
        self.players = seats;
        self.runs = vec![Vec::new(); self.num_teams()];
        self.turn = first;
        self.dealt = true;
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
            + self
                .players
                .iter()
                .map(|p| p.hand.len() + p.history.len() + p.discards.len())
                .sum::<usize>()
    }

    fn constructed_cards(&self) -> usize {
        self.constructed
    }
}
