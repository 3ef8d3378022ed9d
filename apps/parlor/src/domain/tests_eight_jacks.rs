use std::collections::HashMap;

use crate::domain::board_layouts::BoardLayout;
use crate::domain::cards::{Card, Rank, Suit};
use crate::domain::eight_jacks::{EightJacksConfig, EightJacksState};
use crate::domain::outcome::Outcome;
use crate::domain::rules::GameRules;
use crate::errors::GameError;

fn started(config: EightJacksConfig, players: usize) -> EightJacksState {
    let mut game = EightJacksState::new(config, [8u8; 32]).unwrap();
    game.start(players).unwrap();
    game
}

fn sorted() -> EightJacksConfig {
    EightJacksConfig {
        layout: BoardLayout::Sorted,
        ..EightJacksConfig::default()
    }
}

/// Put a card with this face into the player's hand, replacing their first
/// card, and return its id.
fn hold(game: &mut EightJacksState, player: usize, rank: Rank, suit: Suit) -> i32 {
    let slot = &mut game.players[player].hand[0];
    *slot = Card::with_id(slot.id, rank, suit);
    slot.id
}

fn face_of(game: &EightJacksState, square: usize) -> Card {
    game.board.square(square).unwrap().value
}

fn claim(game: &mut EightJacksState, team: usize, squares: &[usize]) {
    for &id in squares {
        game.board.squares[id - 1].marker = Some(team);
    }
}

#[test]
fn board_and_hands_are_dealt() {
    let game = started(EightJacksConfig::default(), 2);
    assert_eq!(game.board.squares.len(), 100);

    let mut faces: HashMap<(Rank, Suit), usize> = HashMap::new();
    for square in &game.board.squares {
        *faces.entry((square.value.rank, square.value.suit)).or_default() += 1;
    }
    assert_eq!(faces.get(&(Rank::Joker, Suit::None)), Some(&4));
    assert!(!faces.keys().any(|(rank, _)| *rank == Rank::Jack));
    assert!(faces
        .iter()
        .filter(|((rank, _), _)| *rank != Rank::Joker)
        .all(|(_, count)| *count == 2));

    assert!(game.players.iter().all(|p| p.hand.len() == 7));
    assert_eq!(game.deck.len(), 104 - 14);
    assert_eq!(game.counted_cards(), 104);
    assert_eq!(game.constructed_cards(), 104);
    assert_eq!(game.turn, 1);
}

#[test]
fn sorted_board_follows_deck_order() {
    let game = started(sorted(), 2);
    // (0, 0) is a wild corner; (0, 1) takes the first card.
    assert_eq!(face_of(&game, 1).rank, Rank::Joker);
    assert_eq!(face_of(&game, 2), Card::new(Rank::Ace, Suit::Clubs));
    assert_eq!(face_of(&game, 3), Card::new(Rank::Two, Suit::Clubs));
}

#[test]
fn matching_card_claims_square() {
    let mut game = started(sorted(), 2);
    let face = face_of(&game, 2);
    let id = hold(&mut game, 1, face.rank, face.suit);

    game.play_card(1, id, 2).unwrap();
    assert_eq!(game.board.square(2).unwrap().marker, Some(1));
    assert_eq!(game.players[1].history.len(), 1);
    assert_eq!(game.players[1].hand.len(), 7);
    assert_eq!(game.turn, 0);
    assert_eq!(game.counted_cards(), game.constructed_cards());
}

#[test]
fn illegal_plays_leave_the_game_untouched() {
    let mut game = started(sorted(), 2);
    let id = hold(&mut game, 1, Rank::King, Suit::Diamonds);
    let before = game.clone();

    assert_eq!(
        game.play_card(1, id, 2).unwrap_err(),
        GameError::validation("card doesn't match square")
    );
    assert_eq!(
        game.play_card(1, id, 1).unwrap_err(),
        GameError::validation("cannot play on shared wild square")
    );
    assert!(game.play_card(1, id, 101).is_err());
    assert!(game.play_card(0, game.players[0].hand[0].id, 2).is_err());
    assert_eq!(game, before);
}

#[test]
fn jacks_claim_and_clear_squares() {
    let mut game = started(sorted(), 2);
    let two_eyed = hold(&mut game, 1, Rank::Jack, Suit::Diamonds);
    game.play_card(1, two_eyed, 50).unwrap();
    assert_eq!(game.board.square(50).unwrap().marker, Some(1));

    // Player 0 cannot clear an empty square, nor their own marker.
    let one_eyed = hold(&mut game, 0, Rank::Jack, Suit::Spades);
    assert!(game.play_card(0, one_eyed, 51).is_err());
    claim(&mut game, 0, &[52]);
    assert_eq!(
        game.play_card(0, one_eyed, 52).unwrap_err(),
        GameError::validation("cannot remove your own team's marker")
    );

    game.play_card(0, one_eyed, 50).unwrap();
    assert_eq!(game.board.square(50).unwrap().marker, None);
}

#[test]
fn dead_cards_can_be_swapped() {
    let mut game = started(sorted(), 2);
    let face = face_of(&game, 2);
    let id = hold(&mut game, 1, face.rank, face.suit);
    assert_eq!(
        game.discard_dead(1, id).unwrap_err(),
        GameError::validation("unable to discard card while it can still be played")
    );

    let both: Vec<usize> = game
        .board
        .squares
        .iter()
        .filter(|s| s.value.same_face(&face))
        .map(|s| s.id)
        .collect();
    assert_eq!(both.len(), 2);
    claim(&mut game, 0, &both);

    game.discard_dead(1, id).unwrap();
    assert_eq!(game.players[1].discards.len(), 1);
    assert_eq!(game.players[1].hand.len(), 7);
    assert_eq!(game.turn, 1);
    assert_eq!(game.counted_cards(), game.constructed_cards());
}

#[test]
fn runs_must_be_straight_and_held() {
    let config = EightJacksConfig {
        win_limit: 5,
        ..sorted()
    };
    let mut game = started(config, 2);

    // Column x = 0 from the wild corner down.
    claim(&mut game, 1, &[2, 3, 4, 5]);
    assert!(game.mark_run(1, &[1, 2, 3, 4]).is_err());
    assert_eq!(
        game.mark_run(0, &[1, 2, 3, 4, 5]).unwrap_err(),
        GameError::validation("all squares in a run must be held by your team or be wild")
    );
    claim(&mut game, 1, &[13]);
    assert_eq!(
        game.mark_run(1, &[2, 3, 4, 5, 13]).unwrap_err(),
        GameError::validation("must have connected squares in the run")
    );
    assert_eq!(game.mark_run(1, &[5, 4, 3, 2, 1]).unwrap(), Outcome::Continue);

    // Diagonal from the corner, sharing only the corner with the column.
    claim(&mut game, 1, &[12, 23, 34, 45]);
    game.mark_run(1, &[1, 12, 23, 34, 45]).unwrap();

    // Anti-diagonal from (0, 9).
    claim(&mut game, 1, &[19, 28, 37, 46]);
    game.mark_run(1, &[10, 19, 28, 37, 46]).unwrap();

    claim(&mut game, 1, &[6, 7]);
    assert!(game.mark_run(1, &[3, 4, 5, 6, 7]).is_err());
    assert_eq!(game.runs[1].len(), 3);

    // Markers inside a run are safe from one-eyed jacks.
    game.turn = 0;
    let one_eyed = hold(&mut game, 0, Rank::Jack, Suit::Hearts);
    assert_eq!(
        game.play_card(0, one_eyed, 3).unwrap_err(),
        GameError::validation("cannot remove a marker that is part of a run")
    );
    game.play_card(0, one_eyed, 7).unwrap();
}

#[test]
fn reaching_the_win_limit_ends_the_game() {
    let mut game = started(sorted(), 2);
    claim(&mut game, 1, &[2, 3, 4, 5, 6, 7, 8, 9]);
    game.mark_run(1, &[1, 2, 3, 4, 5]).unwrap();
    let outcome = game.mark_run(1, &[5, 6, 7, 8, 9]).unwrap();

    assert_eq!(outcome, Outcome::GameComplete { winner: 1 });
    assert!(game.is_finished());
    assert!(game.mark_run(0, &[1, 2, 3, 4, 5]).is_err());
}

#[test]
fn teams_are_assigned_before_the_start() {
    let mut game = EightJacksState::new(EightJacksConfig::default(), [1u8; 32]).unwrap();
    assert!(game.assign_teams(0, 4, &[vec![0, 2], vec![1, 2, 3]]).is_err());
    assert!(game.assign_teams(0, 4, &[vec![0, 2], vec![1]]).is_err());
    assert!(game.assign_teams(4, 4, &[vec![0, 2], vec![1, 3]]).is_err());
    game.assign_teams(3, 4, &[vec![0, 2], vec![1, 3]]).unwrap();

    assert!(game.clone().start(3).is_err());
    game.start(4).unwrap();
    assert_eq!(game.num_teams(), 2);
    assert_eq!(game.players[2].team, 0);
    assert_eq!(game.players[3].team, 1);
    assert_eq!(game.turn, 0);
    assert!(game.assign_teams(0, 4, &[vec![0, 1], vec![2, 3]]).is_err());

    // Seat 3 wins for team 1 only as its first member, seat 1.
    claim(&mut game, 1, &[2, 3, 4, 5, 6, 7, 8, 9]);
    game.mark_run(3, &[1, 2, 3, 4, 5]).unwrap();
    assert_eq!(
        game.mark_run(3, &[5, 6, 7, 8, 9]).unwrap(),
        Outcome::GameComplete { winner: 1 }
    );
}

#[test]
fn empty_hand_on_turn_ends_the_game() {
    let mut game = started(sorted(), 2);
    let mut spare = Vec::new();
    while let Some(card) = game.deck.draw() {
        spare.push(card);
    }
    let held: Vec<Card> = game.players[0].hand.drain(..).collect();
    game.players[0].discards.extend(held);
    game.players[0].discards.extend(spare);
    game.players[1].hand.truncate(1);

    let face = face_of(&game, 2);
    let id = hold(&mut game, 1, face.rank, face.suit);
    let outcome = game.play_card(1, id, 2).unwrap();
    assert_eq!(outcome, Outcome::GameComplete { winner: 0 });
    assert!(game.is_finished());
}

#[test]
fn configuration_is_checked() {
    let open_corners = EightJacksConfig {
        wild_corners: false,
        ..EightJacksConfig::default()
    };
    assert!(matches!(
        EightJacksState::new(open_corners, [0u8; 32]),
        Err(GameError::Config(_))
    ));
    let small_pinwheel = EightJacksConfig {
        board_width: 9,
        layout: BoardLayout::Pinwheel,
        ..EightJacksConfig::default()
    };
    assert!(EightJacksState::new(small_pinwheel, [0u8; 32]).is_err());

    let mut game = EightJacksState::new(EightJacksConfig::default(), [0u8; 32]).unwrap();
    assert!(game.start(9).is_err());
    assert!(!game.is_started());

    let jokers = started(
        EightJacksConfig {
            joker_count: 4,
            layout: BoardLayout::Pinwheel,
            ..EightJacksConfig::default()
        },
        3,
    );
    assert_eq!(jokers.constructed_cards(), 108);
    assert_eq!(jokers.counted_cards(), 108);
}
