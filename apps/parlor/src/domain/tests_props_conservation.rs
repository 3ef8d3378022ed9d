// Card conservation under arbitrary (mostly illegal) move sequences: every
// mode keeps `counted_cards() == constructed_cards()` after every call, and a
// rejected call leaves the state untouched.

use proptest::prelude::*;

use crate::domain::cards::{Card, CardId};
use crate::domain::eight_jacks::{EightJacksConfig, EightJacksState};
use crate::domain::gin::{GinConfig, GinState};
use crate::domain::hearts::{HeartsConfig, HeartsState};
use crate::domain::letter_grid::Pos;
use crate::domain::outcome::Outcome;
use crate::domain::rules::GameRules;
use crate::domain::rush::{RushConfig, RushState};
use crate::domain::spades::{SpadesBid, SpadesConfig, SpadesState};
use crate::domain::test_prelude::proptest_config;
use crate::domain::three_thirteen::{ThreeThirteenConfig, ThreeThirteenState};
use crate::errors::GameError;

type Moves = Vec<(u8, u8)>;

fn moves() -> impl Strategy<Value = Moves> {
    prop::collection::vec((any::<u8>(), any::<u8>()), 0..120)
}

fn pick(cards: &[Card], choice: u8) -> CardId {
    if cards.is_empty() {
        0
    } else {
        cards[choice as usize % cards.len()].id
    }
}

/// Apply `op`, asserting conservation on success and no change on failure.
fn checked<G, F>(game: &mut G, op: F) -> Result<Outcome, TestCaseError>
where
    G: GameRules + Clone + PartialEq + std::fmt::Debug,
    F: FnOnce(&mut G) -> Result<Outcome, GameError>,
{
    let before = game.clone();
    match op(game) {
        Ok(outcome) => {
            prop_assert_eq!(game.counted_cards(), game.constructed_cards());
            Ok(outcome)
        }
        Err(GameError::Invariant(msg)) => Err(TestCaseError::fail(msg)),
        Err(_) => {
            prop_assert_eq!(&*game, &before);
            Ok(Outcome::Continue)
        }
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    #[test]
    fn gin_conserves_cards(seed in any::<[u8; 32]>(), moves in moves()) {
        let mut game = GinState::new(GinConfig::default(), seed).unwrap();
        game.start(2).unwrap();
        for (a, b) in moves {
            let turn = game.turn;
            let seat = &game.players[turn];
            if seat.drawn.is_none() {
                checked(&mut game, |g| g.take_card(turn, a % 2 == 0))?;
            } else {
                let id = pick(&seat.hand, b);
                checked(&mut game, |g| g.discard_card(turn, id, false))?;
            }
            if !game.dealt {
                let dealer = game.dealer;
                checked(&mut game, |g| g.deal(dealer))?;
            }
        }
    }

    #[test]
    fn three_thirteen_conserves_cards(seed in any::<[u8; 32]>(), players in 1usize..=5, moves in moves()) {
        let mut game = ThreeThirteenState::new(ThreeThirteenConfig::default(), seed).unwrap();
        game.start(players).unwrap();
        for (a, b) in moves {
            let turn = game.turn;
            let seat = &game.players[turn];
            if seat.drawn.is_none() {
                checked(&mut game, |g| g.take_card(turn, a % 2 == 0))?;
            } else {
                let id = pick(&seat.hand, b);
                checked(&mut game, |g| g.discard_card(turn, id, a % 7 == 0))?;
            }
        }
    }

    #[test]
    fn hearts_conserves_cards(seed in any::<[u8; 32]>(), players in 3usize..=7, moves in moves()) {
        let mut game = HeartsState::new(HeartsConfig::default(), seed).unwrap();
        game.start(players).unwrap();
        for (a, b) in moves {
            let seat = a as usize % players;
            let hand = &game.players[seat].hand;
            if !game.passed {
                let ids: Vec<CardId> = hand.iter().take(3).map(|c| c.id).collect();
                checked(&mut game, |g| g.pass_cards(seat, &ids))?;
            } else {
                let turn = game.turn;
                let id = pick(&game.players[turn].hand, b);
                checked(&mut game, |g| g.play_card(turn, id))?;
            }
        }
    }

    #[test]
    fn spades_conserves_cards(seed in any::<[u8; 32]>(), players in 2usize..=6, moves in moves()) {
        let mut game = SpadesState::new(SpadesConfig::default(), seed).unwrap();
        game.start(players).unwrap();
        for (a, b) in moves {
            let turn = game.turn;
            if !game.dealt {
                if game.players[turn].drawn.is_none() {
                    checked(&mut game, |g| g.peek_top(turn))?;
                } else {
                    checked(&mut game, |g| g.decide_top(turn, a % 2 == 0))?;
                }
            } else if !game.bid {
                let bid = SpadesBid::Tricks(1 + b % 4);
                checked(&mut game, |g| g.place_bid(turn, bid))?;
            } else {
                let id = pick(&game.players[turn].hand, b);
                checked(&mut game, |g| g.play_card(turn, id))?;
            }
        }
    }

    #[test]
    fn eight_jacks_conserves_cards(seed in any::<[u8; 32]>(), players in 2usize..=4, moves in moves()) {
        let mut game = EightJacksState::new(EightJacksConfig::default(), seed).unwrap();
        game.start(players).unwrap();
        for (a, b) in moves {
            let turn = game.turn;
            let id = pick(&game.players[turn].hand, a);
            if b % 5 == 0 {
                checked(&mut game, |g| g.discard_dead(turn, id))?;
            } else {
                let square = b as usize % 100 + 1;
                checked(&mut game, |g| g.play_card(turn, id, square))?;
            }
            if game.is_finished() {
                break;
            }
        }
    }

    #[test]
    fn rush_conserves_tiles(seed in any::<[u8; 32]>(), moves in moves()) {
        let mut game = RushState::new(RushConfig::default(), seed).unwrap();
        game.start(3).unwrap();
        for (a, b) in moves {
            let seat = a as usize % 3;
            let player = &game.players[seat];
            let pos = Pos::new(i32::from(b % 8), i32::from(b / 32));
            match (a / 3) % 4 {
                0 | 1 => {
                    let Some(tile) = player.hand.first().map(|t| t.id) else { continue };
                    checked(&mut game, |g| g.play_tile(seat, tile, pos))?;
                }
                2 => {
                    let Some(tile) = player.board.tiles().next().map(|p| p.tile.id) else { continue };
                    checked(&mut game, |g| g.recall_tile(seat, tile))?;
                }
                _ => {
                    let Some(tile) = player.hand.last().map(|t| t.id) else { continue };
                    checked(&mut game, |g| g.discard_tile(seat, tile))?;
                }
            }
        }
    }
}
