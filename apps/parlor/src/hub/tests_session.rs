use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::time::Instant;

use super::session::{SessionCore, SessionSettings};
use crate::domain::dictionary::Dictionary;
use crate::domain::letter_grid::{Pos, TileId};
use crate::domain::rules::{GameMode, GameRules};
use crate::domain::rush::{RushConfig, RushState};
use crate::protocol::UserId;
use crate::store::GameRecord;

const GAME: i64 = 7;
const OWNER: UserId = 1;
const SEED: [u8; 32] = [5u8; 32];

struct Table {
    core: SessionCore,
    mode: GameMode,
    now: Instant,
    next_id: u64,
}

impl Table {
    fn new(mode: GameMode, config: Value) -> Self {
        Self::with(mode, config, Dictionary::empty(), SessionSettings::default())
    }

    fn with(mode: GameMode, config: Value, dictionary: Dictionary, settings: SessionSettings) -> Self {
        let record = GameRecord {
            game_id: GAME,
            mode,
            owner: OWNER,
            config,
            seed: SEED,
        };
        let core = SessionCore::new(record, Arc::new(dictionary), settings).unwrap();
        let mut table = Self {
            core,
            mode,
            now: Instant::now(),
            next_id: 0,
        };
        table.core.attach(OWNER, None);
        table
    }

    fn send_as(&mut self, sender: UserId, player: UserId, message_type: &str, payload: Value) -> u64 {
        self.next_id += 1;
        let mut envelope = json!({
            "game_mode": self.mode,
            "game_id": GAME,
            "player_id": player,
            "message_type": message_type,
            "message_id": self.next_id,
            "timestamp": 0,
        });
        if let (Some(header), Value::Object(extra)) = (envelope.as_object_mut(), payload) {
            header.extend(extra);
        }
        self.core.dispatch(sender, &envelope.to_string(), self.now);
        self.next_id
    }

    fn send(&mut self, user: UserId, message_type: &str, payload: Value) -> u64 {
        self.send_as(user, user, message_type, payload)
    }

    fn take(&mut self, user: UserId) -> Vec<Value> {
        self.core
            .drain(user)
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    fn types(&mut self, user: UserId) -> Vec<String> {
        self.take(user)
            .iter()
            .map(|m| m["message_type"].as_str().unwrap().to_string())
            .collect()
    }

    fn drain_all(&mut self) {
        for user in self.core.roster().users() {
            self.core.drain(user);
        }
    }

    fn elapse(&mut self, duration: Duration) {
        self.now += duration;
    }

    /// Attach and admit `players` as playing and `spectators` as watching.
    fn seat(&mut self, players: &[UserId], spectators: &[UserId]) {
        for &user in players.iter().chain(spectators) {
            self.core.attach(user, None);
        }
        for &user in players {
            self.send(OWNER, "admit", json!({ "target": user, "admitted": true, "playing": true }));
        }
        for &user in spectators {
            self.send(OWNER, "admit", json!({ "target": user, "admitted": true, "playing": false }));
        }
        self.drain_all();
    }
}

fn errors(messages: &[Value]) -> Vec<(String, u64)> {
    messages
        .iter()
        .filter(|m| m["message_type"] == "error")
        .map(|m| (m["code"].as_str().unwrap().to_string(), m["reply_to"].as_u64().unwrap()))
        .collect()
}

fn countdowns(messages: &[Value]) -> Vec<u64> {
    messages
        .iter()
        .filter(|m| m["message_type"] == "countdown")
        .map(|m| m["value"].as_u64().unwrap())
        .collect()
}

#[test]
fn owner_hears_about_joins_and_admits() {
    let mut table = Table::new(GameMode::Hearts, Value::Null);
    table.core.attach(2, None);

    let owner = table.take(OWNER);
    assert_eq!(owner.len(), 1);
    assert_eq!(owner[0]["message_type"], "notify-join");
    assert_eq!(owner[0]["joined"], 2);
    assert_eq!(owner[0]["admitted"], false);

    // Not admitted yet: a join gets nothing back.
    table.send(2, "join", json!({}));
    assert!(table.take(2).is_empty());

    table.send(OWNER, "admit", json!({ "target": 2, "admitted": true }));
    assert_eq!(table.types(2), vec!["admitted", "notify-users"]);
    let roster = table.take(OWNER);
    assert_eq!(roster[0]["message_type"], "notify-users");
    assert_eq!(roster[0]["players"].as_array().unwrap().len(), 2);
}

#[test]
fn only_the_owner_admits() {
    let mut table = Table::new(GameMode::Hearts, Value::Null);
    table.core.attach(2, None);
    table.core.attach(3, None);
    let id = table.send(2, "admit", json!({ "target": 3, "admitted": true }));
    assert_eq!(errors(&table.take(2)), vec![("VALIDATION_ERROR".to_string(), id)]);
    assert!(!table.core.roster().get(3).unwrap().admitted);
}

#[test]
fn countdown_waits_for_every_playing_user() {
    let mut table = Table::new(GameMode::ThreeThirteen, Value::Null);
    table.seat(&[2, 3], &[4]);

    table.send(OWNER, "start", json!({}));
    assert_eq!(countdowns(&table.take(OWNER)), vec![3]);
    assert_eq!(countdowns(&table.take(4)), vec![3]);
    table.drain_all();

    table.elapse(Duration::from_secs(2));
    table.send(OWNER, "countback", json!({ "value": 3 }));
    table.send(2, "countback", json!({ "value": 3 }));
    // The spectator's acknowledgement does not count.
    table.send(4, "countback", json!({ "value": 3 }));
    assert!(countdowns(&table.take(OWNER)).is_empty());

    table.send(3, "countback", json!({ "value": 3 }));
    assert_eq!(countdowns(&table.take(OWNER)), vec![2]);
    assert_eq!(countdowns(&table.take(4)), vec![2]);

    // Everyone acknowledges at once; the delay has not passed yet.
    for user in [OWNER, 2, 3] {
        table.send(user, "countback", json!({ "value": 2 }));
    }
    assert!(countdowns(&table.take(OWNER)).is_empty());
    let wakeup = table.core.next_wakeup().unwrap();
    assert_eq!(wakeup, table.now + Duration::from_millis(1000));

    table.now = wakeup;
    table.core.tick(table.now);
    assert_eq!(countdowns(&table.take(OWNER)), vec![1]);
    table.drain_all();

    table.elapse(Duration::from_secs(1));
    for user in [OWNER, 2, 3] {
        table.send(user, "countback", json!({ "value": 1 }));
    }
    assert!(table.core.driver().rules().is_started());
    assert_eq!(table.types(2), vec!["started", "state", "synopsis"]);
    let spectator = table.take(4);
    assert_eq!(spectator[0]["message_type"], "started");
    assert_eq!(spectator[0]["playing"], false);
    assert!(spectator.iter().all(|m| m["message_type"] != "state"));
    assert_eq!(table.core.roster().get(3).unwrap().index, Some(2));
    assert_eq!(table.core.roster().get(4).unwrap().index, None);
}

#[test]
fn late_admission_only_adds_its_own_acknowledgement() {
    let mut table = Table::new(GameMode::ThreeThirteen, Value::Null);
    table.seat(&[2], &[]);
    table.send(OWNER, "start", json!({}));
    table.elapse(Duration::from_secs(2));
    table.send(OWNER, "countback", json!({ "value": 3 }));

    table.core.attach(5, None);
    table.send(OWNER, "admit", json!({ "target": 5, "admitted": true }));
    table.drain_all();

    table.send(2, "countback", json!({ "value": 3 }));
    assert!(countdowns(&table.take(OWNER)).is_empty());
    assert_eq!(table.core.roster().get(OWNER).unwrap().countback, Some(3));

    table.send(5, "countback", json!({ "value": 3 }));
    assert_eq!(countdowns(&table.take(OWNER)), vec![2]);
}

#[test]
fn start_is_never_doubled() {
    let mut table = Table::new(GameMode::Hearts, Value::Null);
    table.seat(&[2, 3], &[]);
    table.send(OWNER, "start", json!({}));
    table.drain_all();

    let id = table.send(OWNER, "start", json!({}));
    let owner = table.take(OWNER);
    assert_eq!(errors(&owner), vec![("VALIDATION_ERROR".to_string(), id)]);
    assert!(owner[0]["error"].as_str().unwrap().contains("countdown"));

    table.send(OWNER, "cancel", json!({}));
    assert_eq!(table.types(2), vec!["cancelled"]);
    table.send(OWNER, "start", json!({}));
    assert_eq!(countdowns(&table.take(2)), vec![3]);
}

#[test]
fn countdown_can_be_switched_off() {
    let mut table = Table::new(GameMode::Gin, json!({ "countdown": false }));
    table.seat(&[2], &[]);
    table.send(OWNER, "start", json!({}));
    assert!(table.core.driver().rules().is_started());
    assert_eq!(table.types(OWNER), vec!["started", "state", "synopsis"]);

    let id = table.send(OWNER, "start", json!({}));
    let owner = table.take(OWNER);
    assert_eq!(errors(&owner), vec![("VALIDATION_ERROR".to_string(), id)]);
    assert_eq!(owner[0]["error"], "game has already started");
}

#[test]
fn countdown_stops_when_nobody_is_left_playing() {
    let mut table = Table::new(GameMode::ThreeThirteen, Value::Null);
    table.send(OWNER, "start", json!({}));
    assert_eq!(countdowns(&table.take(OWNER)), vec![3]);

    table.send(OWNER, "admit", json!({ "target": OWNER, "admitted": true, "playing": false }));
    assert!(table.types(OWNER).contains(&"cancelled".to_string()));

    table.send(OWNER, "countback", json!({ "value": 3 }));
    table.elapse(Duration::from_secs(5));
    table.core.tick(table.now);
    assert!(!table.core.driver().rules().is_started());
    assert!(table.core.next_wakeup().is_none());

    let id = table.send(OWNER, "start", json!({}));
    let owner = table.take(OWNER);
    assert_eq!(errors(&owner), vec![("VALIDATION_ERROR".to_string(), id)]);
    assert_eq!(owner[0]["error"], "no admitted players to seat");
}

#[test]
fn bad_player_count_fails_before_the_countdown() {
    let mut table = Table::new(GameMode::Gin, Value::Null);
    table.seat(&[2, 3], &[]);
    let id = table.send(OWNER, "start", json!({}));
    let owner = table.take(OWNER);
    assert_eq!(errors(&owner), vec![("CONFIG_ERROR".to_string(), id)]);
    assert!(countdowns(&owner).is_empty());
}

#[test]
fn dealer_modes_need_an_assignment() {
    let mut table = Table::new(GameMode::Spades, json!({ "countdown": false }));
    table.seat(&[2, 3, 4], &[]);
    let id = table.send(OWNER, "start", json!({}));
    assert_eq!(errors(&table.take(OWNER)), vec![("VALIDATION_ERROR".to_string(), id)]);

    let id = table.send(OWNER, "assign", json!({ "dealer": 1, "order": [4, 3, 2] }));
    assert_eq!(errors(&table.take(OWNER)), vec![("VALIDATION_ERROR".to_string(), id)]);

    table.send(OWNER, "assign", json!({ "dealer": 1, "order": [4, 3, 2, 1] }));
    table.drain_all();
    table.send(OWNER, "start", json!({}));
    assert!(table.core.driver().rules().is_started());
    assert_eq!(table.core.roster().get(4).unwrap().index, Some(0));
    assert_eq!(table.core.roster().get(OWNER).unwrap().index, Some(3));
}

#[test]
fn keepalive_and_word_answer_without_saving() {
    let dictionary = Dictionary::from_reader("parlor\n".as_bytes()).unwrap();
    let mut table = Table::with(GameMode::Rush, Value::Null, dictionary, SessionSettings::default());
    table.core.take_dirty();

    let id = table.send(OWNER, "keepalive", json!({}));
    table.send(OWNER, "word", json!({ "word": "Parlor" }));
    table.send(OWNER, "word", json!({ "word": "xyzzy" }));
    let owner = table.take(OWNER);
    assert_eq!(owner[0]["message_type"], "keepalive");
    assert_eq!(owner[0]["reply_to"], id);
    assert_eq!(owner[1]["valid"], true);
    assert_eq!(owner[2]["valid"], false);
    assert!(!table.core.take_dirty());
}

#[test]
fn protocol_errors_reach_the_sender() {
    let mut table = Table::new(GameMode::Hearts, Value::Null);

    let id = table.send(OWNER, "fly", json!({}));
    assert_eq!(errors(&table.take(OWNER)), vec![("PROTOCOL_ERROR".to_string(), id)]);

    table.core.dispatch(OWNER, "{not json", table.now);
    assert_eq!(errors(&table.take(OWNER)), vec![("PROTOCOL_ERROR".to_string(), 0)]);

    let wrong_game = json!({
        "game_mode": "hearts", "game_id": 99, "player_id": OWNER,
        "message_type": "join", "message_id": 50,
    });
    table.core.dispatch(OWNER, &wrong_game.to_string(), table.now);
    assert_eq!(errors(&table.take(OWNER)), vec![("PROTOCOL_ERROR".to_string(), 50)]);

    let wrong_mode = json!({
        "game_mode": "spades", "game_id": GAME, "player_id": OWNER,
        "message_type": "join", "message_id": 51,
    });
    table.core.dispatch(OWNER, &wrong_mode.to_string(), table.now);
    assert_eq!(errors(&table.take(OWNER)), vec![("PROTOCOL_ERROR".to_string(), 51)]);
}

#[test]
fn outbound_ids_increase_per_user() {
    let mut table = Table::new(GameMode::Hearts, Value::Null);
    table.seat(&[2, 3], &[]);
    for _ in 0..3 {
        table.send(2, "keepalive", json!({}));
    }
    table.send(OWNER, "start", json!({}));

    for user in [OWNER, 2] {
        let ids: Vec<u64> = table
            .take(user)
            .iter()
            .map(|m| m["message_id"].as_u64().unwrap())
            .collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");
    }
}

#[test]
fn outbox_keeps_the_newest_messages() {
    let settings = SessionSettings {
        outbox_capacity: 3,
        ..SessionSettings::default()
    };
    let mut table = Table::with(GameMode::Hearts, Value::Null, Dictionary::empty(), settings);
    table.drain_all();
    for _ in 0..5 {
        table.send(OWNER, "keepalive", json!({}));
    }
    let kept: Vec<u64> = table
        .take(OWNER)
        .iter()
        .map(|m| m["reply_to"].as_u64().unwrap())
        .collect();
    assert_eq!(kept, vec![3, 4, 5]);
}

fn started_gin() -> Table {
    let mut table = Table::new(GameMode::Gin, json!({ "countdown": false }));
    table.seat(&[2], &[3]);
    table.send(OWNER, "start", json!({}));
    table.drain_all();
    table
}

#[test]
fn bound_spectator_acts_for_the_player() {
    let mut table = started_gin();

    table.send(3, "bind-request", json!({ "target": 2 }));
    let request = table.take(2);
    assert_eq!(request[0]["message_type"], "notify-bind");
    assert_eq!(request[0]["bound"], false);

    // Until accepted, acting for the player is refused.
    let id = table.send_as(3, 2, "take", json!({ "from_discard": false }));
    assert_eq!(errors(&table.take(3)), vec![("PROTOCOL_ERROR".to_string(), id)]);

    table.send(2, "bind-accept", json!({ "target": 3 }));
    assert_eq!(table.take(2)[0]["bound"], true);
    assert_eq!(table.take(3)[0]["bound"], true);

    // Gin: seat 1 (user 2) moves first.
    table.send_as(3, 2, "take", json!({ "from_discard": false }));
    let spectator = table.take(3);
    let state = spectator.iter().find(|m| m["message_type"] == "state").unwrap();
    assert_eq!(state["state"]["seat"], 1);
    assert!(state["state"]["drawn"].is_object());
    assert!(table.types(2).contains(&"state".to_string()));

    // The bind does not extend to other players.
    let id = table.send_as(3, OWNER, "take", json!({ "from_discard": false }));
    assert_eq!(errors(&table.take(3)), vec![("PROTOCOL_ERROR".to_string(), id)]);

    table.send(2, "unbind", json!({ "target": 3 }));
    assert_eq!(table.take(3)[0]["bound"], false);
    assert!(!table.core.roster().bind_active(2, 3));
}

#[test]
fn two_players_cannot_bind() {
    let mut table = started_gin();
    let id = table.send(OWNER, "bind-request", json!({ "target": 2 }));
    assert_eq!(errors(&table.take(OWNER)), vec![("VALIDATION_ERROR".to_string(), id)]);
}

#[test]
fn join_resends_everything_after_a_reconnect() {
    let mut table = started_gin();
    let hand = table.core.driver().player_view(1).unwrap()["hand"].clone();

    // Reattaching keeps the seat.
    table.core.attach(2, None);
    assert_eq!(table.types(2), vec!["admitted"]);
    let id = table.send(2, "join", json!({}));
    let resent = table.take(2);
    let types: Vec<&str> = resent.iter().map(|m| m["message_type"].as_str().unwrap()).collect();
    assert_eq!(types, vec!["admitted", "notify-users", "started", "state", "synopsis"]);
    assert_eq!(resent[0]["reply_to"], id);
    assert_eq!(resent[3]["state"]["hand"], hand);
}

#[test]
fn peeking_is_for_spectators_while_in_play() {
    let mut table = started_gin();
    let id = table.send(2, "peek", json!({}));
    assert_eq!(errors(&table.take(2)), vec![("VALIDATION_ERROR".to_string(), id)]);

    let id = table.send(3, "peek", json!({}));
    let peeked = table.take(3);
    assert_eq!(peeked[0]["message_type"], "game-state");
    assert_eq!(peeked[0]["reply_to"], id);
    assert!(peeked[0]["state"].get("shuffle").is_none());
    assert!(peeked[0]["state"]["players"].is_array());
}

#[test]
fn mode_errors_leave_the_game_untouched() {
    let mut table = started_gin();
    table.core.take_dirty();
    let before = table.core.snapshot().unwrap();
    // Seat 0 (the owner) is not on turn.
    let id = table.send(OWNER, "take", json!({ "from_discard": false }));
    assert_eq!(errors(&table.take(OWNER)), vec![("VALIDATION_ERROR".to_string(), id)]);
    assert_eq!(table.core.snapshot().unwrap(), before);
    assert!(!table.core.take_dirty());
}

#[test]
fn finished_is_announced_once() {
    let config = json!({ "num_tiles": 16, "start_size": 7, "countdown": false });

    // Play the same deal outside the session to learn which words it forms.
    let rush_config: RushConfig = serde_json::from_value(config.clone()).unwrap();
    let mut rehearsal = RushState::new(rush_config, SEED).unwrap();
    rehearsal.start(2).unwrap();
    let opening: Vec<TileId> = rehearsal.players[0].hand.iter().map(|t| t.id).collect();
    for (x, &id) in opening.iter().enumerate() {
        rehearsal.play_tile(0, id, Pos::new(x as i32, 0)).unwrap();
    }
    let mut words = rehearsal.players[0].board.words();
    let partial = Dictionary::from_reader(words.join("\n").as_bytes()).unwrap();
    rehearsal.draw(0, 1, &partial).unwrap();
    let last = rehearsal.players[0].hand[0].id;
    rehearsal.play_tile(0, last, Pos::new(7, 0)).unwrap();
    words.extend(rehearsal.players[0].board.words());
    let dictionary = Dictionary::from_reader(words.join("\n").as_bytes()).unwrap();

    let mut table = Table::with(GameMode::Rush, config, dictionary, SessionSettings::default());
    table.seat(&[2], &[3]);
    table.send(OWNER, "start", json!({}));
    for (x, &id) in opening.iter().enumerate() {
        table.send(OWNER, "play", json!({ "tile_id": id, "x": x, "y": 0 }));
    }
    table.send(OWNER, "draw", json!({ "draw_id": 1 }));
    table.send(OWNER, "play", json!({ "tile_id": last, "x": 7, "y": 0 }));
    table.drain_all();

    table.send(OWNER, "draw", json!({ "draw_id": 2 }));
    assert!(table.core.driver().rules().is_finished());
    for user in [OWNER, 2, 3] {
        let finished: Vec<Value> = table
            .take(user)
            .into_iter()
            .filter(|m| m["message_type"] == "finished")
            .collect();
        assert_eq!(finished.len(), 1, "user {user}");
        assert_eq!(finished[0]["winner"], OWNER);
    }

    let id = table.send(OWNER, "draw", json!({ "draw_id": 2 }));
    let owner = table.take(OWNER);
    assert_eq!(errors(&owner), vec![("VALIDATION_ERROR".to_string(), id)]);
    assert!(owner.iter().all(|m| m["message_type"] != "finished"));
    assert!(!table.core.in_play());
}
