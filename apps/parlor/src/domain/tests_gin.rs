use crate::domain::cards::{parse_hand, Card, Rank, Suit};
use crate::domain::gin::{GinConfig, GinState};
use crate::domain::outcome::Outcome;
use crate::domain::rules::GameRules;
use crate::domain::solver::Grouping;
use crate::errors::GameError;

fn started(config: GinConfig) -> GinState {
    let mut game = GinState::new(config, [7u8; 32]).unwrap();
    game.start(2).unwrap();
    game
}

/// Parse `tokens` with ids starting at `base` so test hands never collide.
fn cards(tokens: &str, base: i32) -> Vec<Card> {
    parse_hand(tokens)
        .unwrap()
        .into_iter()
        .map(|c| Card::with_id(c.id + base, c.rank, c.suit))
        .collect()
}

/// Player 1 (first to act) holds a hand ready to lay down after drawing KD.
fn ready_to_lay_down(layer_hand: &str, opponent_hand: &str) -> GinState {
    let mut game = started(GinConfig::default());
    assert_eq!(game.turn, 1);
    game.players[1].hand = cards(layer_hand, 100);
    game.players[1].drawn = Some(Card::with_id(200, Rank::King, Suit::Diamonds));
    game.players[0].hand = cards(opponent_hand, 300);
    game
}

fn ids(hand: &[Card]) -> Vec<i32> {
    hand.iter().map(|c| c.id).collect()
}

#[test]
fn deal_gives_ten_each_one_discard_and_31_remaining() {
    let game = started(GinConfig::default());
    assert!(game.players.iter().all(|p| p.hand.len() == 10));
    assert_eq!(game.discard.len(), 1);
    assert_eq!(game.deck.len(), 31);
    assert_eq!(game.counted_cards(), game.constructed_cards());
}

#[test]
fn take_then_discard_same_card_passes_turn() {
    let mut game = started(GinConfig::default());
    let player = game.turn;
    game.take_card(player, false).unwrap();
    let drawn = game.players[player].drawn.unwrap();

    let outcome = game.discard_card(player, drawn.id, false).unwrap();
    assert_eq!(outcome, Outcome::Continue);
    assert_eq!(game.turn, 1 - player);
    assert_eq!(game.players[player].hand.len(), 10);
    assert_eq!(game.discard.last(), Some(&drawn));
    assert_eq!(game.counted_cards(), 52);
}

#[test]
fn discard_from_hand_keeps_drawn_card() {
    let mut game = started(GinConfig::default());
    let player = game.turn;
    game.take_card(player, false).unwrap();
    let drawn = game.players[player].drawn.unwrap();
    let victim = game.players[player].hand[3];

    game.discard_card(player, victim.id, false).unwrap();
    let hand = &game.players[player].hand;
    assert_eq!(hand.len(), 10);
    assert!(hand.contains(&drawn));
    assert!(!hand.contains(&victim));
    assert_eq!(game.discard.last(), Some(&victim));
}

#[test]
fn taking_the_discard_and_returning_it_keeps_the_turn() {
    let mut game = started(GinConfig::default());
    let player = game.turn;
    let top = *game.discard.last().unwrap();

    game.take_card(player, true).unwrap();
    assert!(game.discard.is_empty());
    game.discard_card(player, top.id, false).unwrap();

    assert_eq!(game.turn, player);
    assert_eq!(game.discard, vec![top]);
    assert!(game.players[player].drawn.is_none());
}

#[test]
fn out_of_turn_and_double_take_are_rejected() {
    let mut game = started(GinConfig::default());
    let player = game.turn;
    let other = 1 - player;

    let err = game.take_card(other, false).unwrap_err();
    assert_eq!(err, GameError::validation("unable to play out of turn"));

    game.take_card(player, false).unwrap();
    let before = game.clone();
    assert!(game.take_card(player, false).is_err());
    assert_eq!(game, before);
}

#[test]
fn discard_requires_a_known_card() {
    let mut game = started(GinConfig::default());
    let player = game.turn;
    assert!(game.discard_card(player, 1, false).is_err());

    game.take_card(player, false).unwrap();
    let before = game.clone();
    let err = game.discard_card(player, 9999, false).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(game, before);
}

#[test]
fn laying_down_above_limit_is_rejected_without_changes() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C QD QH",
        "QS QC JH JS JC TH TS TC 3D 2D",
    );
    let before = game.clone();
    let err = game.discard_card(1, 200, true).unwrap_err();
    assert_eq!(
        err,
        GameError::validation("you cannot go out yet! must reach 10 points first!")
    );
    assert_eq!(game, before);
}

#[test]
fn gin_scores_opponent_deadwood_plus_bonus() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C 9C TC",
        "KH KS QH JD 5S 6S 9H 9D 2H 3H",
    );
    assert_eq!(game.discard_card(1, 200, true).unwrap(), Outcome::Continue);
    assert_eq!(game.laid_down, Some(1));
    assert_eq!(game.turn, 1);

    let layer_groups = Grouping {
        groups: vec![vec![101, 102, 103], vec![104, 105, 106], vec![107, 108, 109, 110]],
        leftover: vec![],
    };
    assert_eq!(game.score_by_groups(1, layer_groups).unwrap(), Outcome::Continue);
    assert_eq!(game.turn, 0);

    let opponent = Grouping {
        groups: vec![],
        leftover: ids(&game.players[0].hand),
    };
    assert_eq!(game.score_by_groups(0, opponent).unwrap(), Outcome::RoundComplete);
    assert_eq!(game.players[1].score, 74 + 10);
    assert_eq!(game.players[0].score, 0);
    assert_eq!(game.dealer, 1);
    assert!(!game.dealt);
}

#[test]
fn opponent_may_meld_onto_layer_groups() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C 9C TC",
        "4S KS QH JD 5S 6S 9H 9D 2H 3H",
    );
    game.discard_card(1, 200, true).unwrap();
    game.score_by_groups(
        1,
        Grouping {
            groups: vec![vec![101, 102, 103], vec![104, 105, 106], vec![107, 108, 109, 110]],
            leftover: vec![],
        },
    )
    .unwrap();

    // 4S extends the layer's four-kind.
    let opponent = Grouping {
        groups: vec![vec![301, 104, 105, 106]],
        leftover: vec![302, 303, 304, 305, 306, 307, 308, 309, 310],
    };
    game.score_by_groups(0, opponent).unwrap();
    assert_eq!(game.players[0].round_score, Some(10 + 10 + 10 + 5 + 6 + 9 + 9 + 2 + 3));
}

#[test]
fn undercut_rewards_the_defender() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C 9C 5D",
        "QH QS QC JH JS JC TH TS TC 3D",
    );
    game.discard_card(1, 200, true).unwrap();
    game.score_by_groups(
        1,
        Grouping {
            groups: vec![vec![101, 102, 103], vec![104, 105, 106], vec![107, 108, 109]],
            leftover: vec![110],
        },
    )
    .unwrap();
    assert_eq!(game.players[1].round_score, Some(5));

    assert_eq!(game.report_score(0, 3).unwrap(), Outcome::RoundComplete);
    assert_eq!(game.players[0].score, 5 - 3 + 10);
    assert_eq!(game.players[1].score, 0);
}

#[test]
fn reported_score_must_be_reachable() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C 9C 5D",
        "QH QS QC JH JS JC TH TS TC 3D",
    );
    game.discard_card(1, 200, true).unwrap();
    let err = game.report_score(1, 4).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(game.players[1].round_score, None);
}

#[test]
fn worse_grouping_records_suggestion() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C 9C 5D",
        "QH QS QC JH JS JC TH TS TC 3D",
    );
    game.discard_card(1, 200, true).unwrap();
    game.score_by_groups(
        1,
        Grouping {
            groups: vec![vec![104, 105, 106], vec![107, 108, 109]],
            leftover: vec![101, 102, 103, 110],
        },
    )
    .unwrap();
    assert_eq!(game.players[1].round_score, Some(1 + 2 + 3 + 5));
    assert_eq!(game.players[1].best_score, Some(5));
}

#[test]
fn reaching_win_amount_finishes_the_game() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C 9C TC",
        "KH KS QH JD 5S 6S 9H 9D 2H 3H",
    );
    game.players[1].score = 95;
    game.discard_card(1, 200, true).unwrap();
    game.score_by_groups(
        1,
        Grouping {
            groups: vec![vec![101, 102, 103], vec![104, 105, 106], vec![107, 108, 109, 110]],
            leftover: vec![],
        },
    )
    .unwrap();
    let outcome = game.report_score(0, 74).unwrap();
    assert_eq!(outcome, Outcome::GameComplete { winner: 1 });
    assert!(game.is_finished());
    assert_eq!(game.winner(), Some(1));
    assert!(game.take_card(0, false).is_err());
}

#[test]
fn big_gin_keeps_every_card() {
    let mut game = ready_to_lay_down(
        "AS 2S 3S 4H 4D 4C 7C 8C 9C TC",
        "KH KS QH JD 5S 6S 9H 9D 2H 3H",
    );
    game.players[1].drawn = Some(Card::with_id(200, Rank::Jack, Suit::Clubs));

    game.discard_card(1, 0, true).unwrap();
    assert_eq!(game.players[1].hand.len(), 11);
    game.score_by_groups(
        1,
        Grouping {
            groups: vec![vec![101, 102, 103], vec![104, 105, 106], vec![107, 108, 109, 110, 200]],
            leftover: vec![],
        },
    )
    .unwrap();
    game.report_score(0, 74).unwrap();
    assert_eq!(game.players[1].score, 74 + 20);
}

#[test]
fn big_gin_can_be_disabled() {
    let config = GinConfig {
        big_gin_amount: -1,
        ..GinConfig::default()
    };
    let mut game = started(config);
    let player = game.turn;
    game.take_card(player, false).unwrap();
    let err = game.discard_card(player, 0, true).unwrap_err();
    assert_eq!(
        err,
        GameError::validation("going big gin is not allowed in this game")
    );
}

#[test]
fn exhausted_supply_voids_the_round() {
    let mut game = started(GinConfig::default());
    let mut keep = 3;
    game.deck.retain(|_| {
        keep -= 1;
        keep >= 0
    });
    assert_eq!(game.deck.len(), 3);

    let player = game.turn;
    game.take_card(player, false).unwrap();
    let drawn = game.players[player].drawn.unwrap();
    let outcome = game.discard_card(player, drawn.id, false).unwrap();
    assert_eq!(outcome, Outcome::RoundComplete);
    assert!(!game.dealt);
    assert_eq!(game.dealer, 0);
    assert!(game.players.iter().all(|p| p.score == 0));

    // The same dealer redeals.
    assert!(game.deal(1).is_err());
    game.deal(0).unwrap();
    assert_eq!(game.deck.len(), 31);
}

#[test]
fn start_and_config_guards() {
    let err = GinState::new(
        GinConfig {
            hand_size: 7,
            ..GinConfig::default()
        },
        [0u8; 32],
    )
    .unwrap_err();
    assert!(matches!(err, GameError::Config(_)));

    let mut game = GinState::new(GinConfig::default(), [0u8; 32]).unwrap();
    assert!(game.start(3).is_err());
    game.start(2).unwrap();
    assert_eq!(
        game.start(2).unwrap_err(),
        GameError::validation("double start occurred")
    );
}

#[test]
fn jokers_extend_the_deck() {
    let game = started(GinConfig {
        add_jokers: true,
        ..GinConfig::default()
    });
    assert_eq!(game.deck.len(), 33);
    assert_eq!(game.counted_cards(), 54);
}
