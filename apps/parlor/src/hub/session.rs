//! One game's roster, rule engine and dispatch table.
//!
//! [`SessionCore`] is synchronous and owns no I/O: the worker feeds it
//! decoded commands one at a time and drains the per-player outboxes into
//! whatever connections are attached. Every notification is stamped with the
//! recipient's next outbound id as it is queued.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::countdown::{Countdown, Step};
use super::roster::{PlayerSession, Roster};
use crate::domain::dictionary::Dictionary;
use crate::domain::outcome::Outcome;
use crate::domain::rules::GameMode;
use crate::errors::GameError;
use crate::modes::{build_driver, restore_driver, CommonOptions, Handled, ModeDriver};
use crate::protocol::notification::now_millis;
use crate::protocol::{
    Assignment, CommonMessage, Envelope, GameId, Notification, Outbound, UserId,
};
use crate::store::GameRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Minimum time between countdown ticks.
    pub countdown_delay: Duration,
    /// Notifications buffered per user while no connection is attached.
    pub outbox_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            countdown_delay: Duration::from_millis(1000),
            outbox_capacity: 1024,
        }
    }
}

/// What the store keeps for a game besides per-player records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub game: Value,
    /// Users by seat index.
    #[serde(default)]
    pub seats: Vec<UserId>,
    #[serde(default)]
    pub assignment: Option<Assignment>,
    #[serde(default)]
    pub finished_announced: bool,
}

pub struct SessionCore {
    record: GameRecord,
    options: CommonOptions,
    dictionary: Arc<Dictionary>,
    driver: Box<dyn ModeDriver>,
    roster: Roster,
    seats: Vec<UserId>,
    assignment: Option<Assignment>,
    countdown: Countdown,
    settings: SessionSettings,
    finished_announced: bool,
    dirty: bool,
}

impl SessionCore {
    pub fn new(
        record: GameRecord,
        dictionary: Arc<Dictionary>,
        settings: SessionSettings,
    ) -> Result<Self, GameError> {
        let options = CommonOptions::from_config(&record.config)?;
        let driver = build_driver(record.mode, &record.config, record.seed, dictionary.clone())?;
        Ok(Self {
            record,
            options,
            dictionary,
            driver,
            roster: Roster::default(),
            seats: Vec::new(),
            assignment: None,
            countdown: Countdown::new(settings.countdown_delay),
            settings,
            finished_announced: false,
            dirty: false,
        })
    }

    pub fn restore(
        record: GameRecord,
        snapshot: SessionSnapshot,
        dictionary: Arc<Dictionary>,
        settings: SessionSettings,
    ) -> Result<Self, GameError> {
        let options = CommonOptions::from_config(&record.config)?;
        let driver = restore_driver(record.mode, &snapshot.game, dictionary.clone())?;
        Ok(Self {
            record,
            options,
            dictionary,
            driver,
            roster: Roster::default(),
            seats: snapshot.seats,
            assignment: snapshot.assignment,
            countdown: Countdown::new(settings.countdown_delay),
            settings,
            finished_announced: snapshot.finished_announced,
            dirty: false,
        })
    }

    pub fn game_id(&self) -> GameId {
        self.record.game_id
    }

    pub fn mode(&self) -> GameMode {
        self.record.mode
    }

    pub fn owner(&self) -> UserId {
        self.record.owner
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn driver(&self) -> &dyn ModeDriver {
        self.driver.as_ref()
    }

    fn started(&self) -> bool {
        self.driver.rules().is_started()
    }

    fn finished(&self) -> bool {
        self.driver.rules().is_finished()
    }

    /// Started and not yet finished; such a session outlives its connections.
    pub fn in_play(&self) -> bool {
        self.started() && !self.finished()
    }

    /// Returns and clears the "needs saving" flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// When the worker should call [`SessionCore::tick`] next.
    pub fn next_wakeup(&self) -> Option<Instant> {
        let tick = self.countdown.current()?;
        if self.roster.all_acknowledged(tick) {
            self.countdown.deadline()
        } else {
            None
        }
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot, GameError> {
        Ok(SessionSnapshot {
            game: self.driver.snapshot()?,
            seats: self.seats.clone(),
            assignment: self.assignment.clone(),
            finished_announced: self.finished_announced,
        })
    }

    pub fn player_states(&self) -> Vec<(UserId, Value)> {
        self.roster
            .iter()
            .filter_map(|player| match serde_json::to_value(player) {
                Ok(value) => Some((player.user, value)),
                Err(err) => {
                    error!(user_id = player.user, error = %err, "[SESSION] unable to encode player");
                    None
                }
            })
            .collect()
    }

    /// Take everything queued for `user`.
    pub fn drain(&mut self, user: UserId) -> Vec<String> {
        self.roster
            .get_mut(user)
            .map(|player| player.outbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Put messages no connection accepted back ahead of anything queued
    /// since, so the user's next connection hears them in order.
    pub fn requeue(&mut self, user: UserId, messages: Vec<String>) {
        let capacity = self.settings.outbox_capacity;
        let Some(player) = self.roster.get_mut(user) else {
            return;
        };
        let newer = std::mem::take(&mut player.outbox);
        for text in messages.into_iter().chain(newer) {
            player.push(text, capacity);
        }
    }

    /// Register a connection's user, reviving `saved` when this session has
    /// not seen them since it was loaded.
    pub fn attach(&mut self, user: UserId, saved: Option<Value>) {
        if let Some(player) = self.roster.get(user) {
            if player.admitted {
                let body = Notification::Admitted {
                    admitted: player.admitted,
                    playing: player.playing,
                    ready: player.ready,
                };
                self.push(user, 0, body);
            }
            return;
        }

        let revived = saved.and_then(|value| match serde_json::from_value::<PlayerSession>(value) {
            Ok(player) if player.user == user => Some(player),
            Ok(_) => None,
            Err(err) => {
                warn!(game_id = self.game_id(), user_id = user, error = %err, "[SESSION] stored player unreadable");
                None
            }
        });
        let is_owner = user == self.owner();
        let fresh = revived.is_none();
        let mut player = revived.unwrap_or_else(|| PlayerSession::new(user));
        if is_owner {
            player.admitted = true;
        }
        if fresh {
            player.playing = player.admitted && !self.started() && !self.countdown.is_running();
        }
        self.roster.insert(player);
        self.dirty = true;
        info!(game_id = self.game_id(), user_id = user, fresh, "[SESSION] user joined");

        if fresh && !is_owner {
            self.notify_owner_of(user);
        }
    }

    fn notify_owner_of(&mut self, user: UserId) {
        let owner = self.owner();
        if owner == user || !self.roster.contains(owner) {
            return;
        }
        if let Some(joined) = self.roster.get(user) {
            let body = Notification::NotifyJoin {
                joined: user,
                admitted: joined.admitted,
                playing: joined.playing,
                ready: joined.ready,
            };
            self.push(owner, 0, body);
        }
    }

    /// Handle one inbound text frame from `sender`. Failures become an
    /// `error` notification to the sender.
    pub fn dispatch(&mut self, sender: UserId, text: &str, now: Instant) {
        let (reply_to, message_type, result) = match Envelope::decode(text) {
            Ok(envelope) => {
                let result = self.route(sender, &envelope, now);
                (envelope.message_id, envelope.message_type, result)
            }
            Err(err) => (0, String::new(), Err(err)),
        };
        if let Err(err) = result {
            self.report(sender, reply_to, &message_type, &err);
        }
    }

    /// The countdown delay elapsed.
    pub fn tick(&mut self, now: Instant) {
        self.advance_countdown(now);
    }

    fn report(&mut self, user: UserId, reply_to: u64, message_type: &str, err: &GameError) {
        let game_id = self.game_id();
        match err {
            GameError::Invariant(_) => {
                error!(game_id, user_id = user, message_type, error = %err, "[SESSION] invariant violated")
            }
            GameError::Validation(_) => {
                debug!(game_id, user_id = user, message_type, error = %err, "[SESSION] dispatch rejected")
            }
            GameError::Config(_) | GameError::Protocol(_) => {
                warn!(game_id, user_id = user, message_type, error = %err, "[SESSION] dispatch rejected")
            }
        }
        self.push(user, reply_to, Notification::error(err));
    }

    fn route(&mut self, sender: UserId, envelope: &Envelope, now: Instant) -> Result<(), GameError> {
        if envelope.game_id != self.game_id() {
            return Err(GameError::protocol(format!(
                "message for game {} arrived on game {}",
                envelope.game_id,
                self.game_id()
            )));
        }
        if envelope.game_mode != self.mode() {
            return Err(GameError::protocol(format!(
                "game {} is {}, not {}",
                self.game_id(),
                self.mode().as_str(),
                envelope.game_mode.as_str()
            )));
        }
        let player = self
            .roster
            .get_mut(sender)
            .ok_or_else(|| GameError::protocol(format!("user {sender} is not attached")))?;
        player.inbound = player.inbound.max(envelope.message_id);

        let actor = self.resolve_actor(sender, envelope.player_id)?;
        let reply_to = envelope.message_id;
        if CommonMessage::recognizes(&envelope.message_type) {
            let message: CommonMessage = envelope.body()?;
            self.common(sender, actor, reply_to, message, now)
        } else {
            self.mode_message(sender, actor, envelope)
        }
    }

    /// A spectator with an active bind may send as the bound player.
    fn resolve_actor(&self, sender: UserId, player_id: UserId) -> Result<UserId, GameError> {
        if player_id == sender {
            return Ok(sender);
        }
        let spectating = self.roster.get(sender).is_some_and(|p| !p.playing);
        if spectating && self.roster.bind_active(sender, player_id) {
            Ok(player_id)
        } else {
            Err(GameError::protocol(format!(
                "user {sender} cannot send messages for user {player_id}"
            )))
        }
    }

    fn ensure_owner(&self, actor: UserId, action: &str) -> Result<(), GameError> {
        if actor == self.owner() {
            Ok(())
        } else {
            Err(GameError::validation(format!("only the game owner may {action}")))
        }
    }

    fn common(
        &mut self,
        sender: UserId,
        actor: UserId,
        reply_to: u64,
        message: CommonMessage,
        now: Instant,
    ) -> Result<(), GameError> {
        match message {
            CommonMessage::Join => self.join(sender, reply_to),
            CommonMessage::Admit {
                target,
                admitted,
                playing,
            } => self.admit(actor, target, admitted, playing, now),
            CommonMessage::Ready { ready } => self.mark_ready(actor, ready),
            CommonMessage::Keepalive => {
                self.push(sender, reply_to, Notification::Keepalive);
                Ok(())
            }
            CommonMessage::Word { word } => {
                let valid = self.dictionary.contains(&word);
                self.push(sender, reply_to, Notification::Word { word, valid });
                Ok(())
            }
            CommonMessage::Countback { value } => {
                self.countback(actor, value, now);
                Ok(())
            }
            CommonMessage::BindRequest { target } => self.bind_request(sender, target),
            CommonMessage::BindAccept { target } => self.bind_accept(sender, target),
            CommonMessage::Unbind { target } => self.unbind(sender, target),
            CommonMessage::Start => {
                self.ensure_owner(actor, "start the game")?;
                self.start(now)
            }
            CommonMessage::Cancel => {
                self.ensure_owner(actor, "cancel the countdown")?;
                self.cancel()
            }
            CommonMessage::Assign(assignment) => {
                self.ensure_owner(actor, "assign seats")?;
                self.assign(assignment)
            }
            CommonMessage::Peek => self.peek(sender, actor, reply_to),
        }
    }

    fn join(&mut self, user: UserId, reply_to: u64) -> Result<(), GameError> {
        if user == self.owner() {
            for other in self.roster.users() {
                self.notify_owner_of(other);
            }
        }

        let Some(player) = self.roster.get(user).cloned() else {
            return Ok(());
        };
        if player.admitted {
            self.push(
                user,
                reply_to,
                Notification::Admitted {
                    admitted: player.admitted,
                    playing: player.playing,
                    ready: player.ready,
                },
            );
            let players = self.roster.entries();
            self.push(user, 0, Notification::NotifyUsers { players });
        }

        if let Some(value) = self.countdown.current() {
            if player.is_active_player() {
                self.push(user, 0, Notification::Countdown { value });
            }
        }

        if self.in_play() {
            self.push(
                user,
                0,
                Notification::Started {
                    playing: player.index.is_some(),
                },
            );
            if let Some(seat) = player.index {
                let state = self.driver.player_view(seat)?;
                self.push(user, 0, Notification::State { state });
            }
            for (seat, seated) in self.seats.clone().into_iter().enumerate() {
                if self.roster.bound_spectators(seated).contains(&user) {
                    let state = self.driver.player_view(seat)?;
                    self.push(user, 0, Notification::State { state });
                }
            }
        }
        if self.started() && player.admitted {
            let synopsis = self.driver.synopsis()?;
            self.push(user, 0, Notification::Synopsis { synopsis });
        }
        if self.finished() {
            let winner = self.winner_user();
            self.push(user, 0, Notification::Finished { winner });
        }
        Ok(())
    }

    fn admit(
        &mut self,
        actor: UserId,
        target: UserId,
        admitted: bool,
        playing: bool,
        now: Instant,
    ) -> Result<(), GameError> {
        self.ensure_owner(actor, "admit other users")?;
        if self.started() {
            return Err(GameError::validation(
                "can't admit users into a game that has already started",
            ));
        }
        let owner = self.owner();
        let player = self
            .roster
            .get_mut(target)
            .ok_or_else(|| GameError::validation(format!("user {target} has not joined this game")))?;

        let admitted = admitted || target == owner;
        player.admitted = admitted;
        player.playing = admitted && playing;
        player.countback = None;
        let body = Notification::Admitted {
            admitted: player.admitted,
            playing: player.playing,
            ready: player.ready,
        };
        self.assignment = None;
        self.dirty = true;
        info!(game_id = self.game_id(), user_id = target, admitted, playing, "[SESSION] admission changed");

        self.push(target, 0, body);
        self.broadcast_roster();
        if self.countdown.is_running() && self.roster.active_players().is_empty() {
            // Nobody left to seat.
            return self.cancel();
        }
        // Removing someone may complete the current tick.
        self.advance_countdown(now);
        Ok(())
    }

    fn mark_ready(&mut self, actor: UserId, ready: bool) -> Result<(), GameError> {
        if self.started() {
            return Err(GameError::validation(
                "can't change ready status in a game that has already started",
            ));
        }
        let player = self
            .roster
            .get_mut(actor)
            .ok_or_else(|| GameError::invariant(format!("user {actor} missing from roster")))?;
        player.ready = ready;
        let body = Notification::Admitted {
            admitted: player.admitted,
            playing: player.playing,
            ready,
        };
        self.dirty = true;
        self.push(actor, 0, body);
        self.broadcast_roster();
        Ok(())
    }

    fn countback(&mut self, actor: UserId, value: u32, now: Instant) {
        let Some(tick) = self.countdown.current() else {
            return;
        };
        let Some(player) = self.roster.get_mut(actor) else {
            return;
        };
        if !player.is_active_player() || value != tick {
            return;
        }
        player.countback = Some(value);
        self.advance_countdown(now);
    }

    fn advance_countdown(&mut self, now: Instant) {
        let acknowledged = self
            .countdown
            .current()
            .is_some_and(|tick| self.roster.all_acknowledged(tick));
        match self.countdown.advance(acknowledged, now) {
            Step::Idle | Step::Pending(_) => {}
            Step::Tick(value) => {
                debug!(game_id = self.game_id(), value, "[COUNTDOWN] tick");
                self.broadcast(Notification::Countdown { value });
            }
            Step::Start => {
                info!(game_id = self.game_id(), "[COUNTDOWN] complete");
                if let Err(err) = self.launch() {
                    let owner = self.owner();
                    self.report(owner, 0, "start", &err);
                }
            }
        }
    }

    fn start(&mut self, now: Instant) -> Result<(), GameError> {
        if self.finished() {
            return Err(GameError::validation("game has already finished"));
        }
        if self.started() {
            return Err(GameError::validation("game has already started"));
        }
        if self.countdown.is_running() {
            return Err(GameError::validation("countdown already in progress"));
        }
        let players = self.roster.active_players();
        if players.is_empty() {
            return Err(GameError::validation("no admitted players to seat"));
        }
        if self.mode().requires_assignment() && self.assignment.is_none() {
            return Err(GameError::validation(format!(
                "assign a dealer before starting {}",
                self.mode().as_str()
            )));
        }

        // Catch a bad player count now rather than at the end of the countdown.
        let mut rehearsal =
            restore_driver(self.mode(), &self.driver.snapshot()?, self.dictionary.clone())?;
        rehearsal.start(players.len())?;

        if !self.options.countdown {
            return self.launch();
        }
        for player in self.roster.iter_mut() {
            player.countback = None;
        }
        let value = self.countdown.begin(now);
        info!(game_id = self.game_id(), players = players.len(), "[COUNTDOWN] begun");
        self.broadcast(Notification::Countdown { value });
        Ok(())
    }

    /// Seat the active players and start the rule engine.
    fn launch(&mut self) -> Result<(), GameError> {
        let active = self.roster.active_players();
        let seats = match self.assignment.as_ref().map(|a| a.order.clone()) {
            Some(order) if !order.is_empty() => {
                let mut listed = order.clone();
                listed.sort_unstable();
                let mut expected = active.clone();
                expected.sort_unstable();
                if listed != expected {
                    return Err(GameError::validation(
                        "seat order no longer matches the playing users; assign again",
                    ));
                }
                order
            }
            _ => active,
        };

        self.driver.start(seats.len())?;
        for player in self.roster.iter_mut() {
            player.index = seats.iter().position(|&user| user == player.user);
            player.countback = None;
        }
        self.seats = seats;
        self.dirty = true;
        info!(game_id = self.game_id(), players = self.seats.len(), "[SESSION] game started");

        for user in self.roster.admitted() {
            let playing = self.roster.get(user).is_some_and(|p| p.index.is_some());
            self.push(user, 0, Notification::Started { playing });
        }
        self.fan_out(Outcome::Continue, false)
    }

    fn cancel(&mut self) -> Result<(), GameError> {
        if !self.countdown.is_running() {
            return Err(GameError::validation("no countdown to cancel"));
        }
        self.countdown.cancel();
        for player in self.roster.iter_mut() {
            player.countback = None;
        }
        info!(game_id = self.game_id(), "[COUNTDOWN] cancelled");
        self.broadcast(Notification::Cancelled);
        Ok(())
    }

    fn assign(&mut self, assignment: Assignment) -> Result<(), GameError> {
        if self.started() || self.countdown.is_running() {
            return Err(GameError::validation("cannot assign seats once starting"));
        }
        let active = self.roster.active_players();
        if !assignment.order.is_empty() {
            let mut listed = assignment.order.clone();
            listed.sort_unstable();
            listed.dedup();
            let mut expected = active.clone();
            expected.sort_unstable();
            if listed != expected || assignment.order.len() != active.len() {
                return Err(GameError::validation(
                    "seat order must list every playing user exactly once",
                ));
            }
        }
        self.driver.assign(&assignment, active.len())?;
        self.assignment = Some(assignment);
        self.dirty = true;

        let synopsis = self.driver.synopsis()?;
        self.broadcast(Notification::Synopsis { synopsis });
        Ok(())
    }

    fn peek(&mut self, sender: UserId, actor: UserId, reply_to: u64) -> Result<(), GameError> {
        if !self.started() {
            return Err(GameError::validation(
                "unable to peek at a game which hasn't started yet",
            ));
        }
        let involved = self
            .roster
            .get(actor)
            .is_some_and(|p| p.playing || p.index.is_some());
        if !self.finished() && involved {
            return Err(GameError::validation("no peeking while the game is in play"));
        }
        let state = self.driver.peek()?;
        let synopsis = self.driver.synopsis()?;
        self.push(sender, reply_to, Notification::GameState { state, synopsis });
        Ok(())
    }

    fn bind_request(&mut self, sender: UserId, target: UserId) -> Result<(), GameError> {
        if sender == target {
            return Err(GameError::validation("cannot bind to yourself"));
        }
        let (Some(me), Some(peer)) = (self.roster.get(sender), self.roster.get(target)) else {
            return Err(GameError::validation(format!("user {target} has not joined this game")));
        };
        if !me.admitted || !peer.admitted {
            return Err(GameError::validation("both users must be admitted to bind"));
        }
        if me.playing == peer.playing {
            return Err(GameError::validation(
                "a bind pairs one player with one spectator",
            ));
        }
        if let Some(me) = self.roster.get_mut(sender) {
            me.bound.insert(target);
        }
        self.dirty = true;

        if self.roster.bind_active(sender, target) {
            info!(game_id = self.game_id(), user_id = sender, peer = target, "[SESSION] bind active");
            self.push(sender, 0, Notification::NotifyBind { peer: target, bound: true });
            self.push(target, 0, Notification::NotifyBind { peer: sender, bound: true });
        } else {
            self.push(target, 0, Notification::NotifyBind { peer: sender, bound: false });
        }
        Ok(())
    }

    fn bind_accept(&mut self, sender: UserId, target: UserId) -> Result<(), GameError> {
        let requested = self
            .roster
            .get(target)
            .is_some_and(|peer| peer.bound.contains(&sender));
        if !requested {
            return Err(GameError::validation(format!("no bind request from user {target}")));
        }
        self.bind_request(sender, target)
    }

    fn unbind(&mut self, sender: UserId, target: UserId) -> Result<(), GameError> {
        let listed = self.roster.get(sender).is_some_and(|p| p.bound.contains(&target))
            || self.roster.get(target).is_some_and(|p| p.bound.contains(&sender));
        if !listed {
            return Err(GameError::validation(format!("not bound to user {target}")));
        }
        if let Some(me) = self.roster.get_mut(sender) {
            me.bound.remove(&target);
        }
        if let Some(peer) = self.roster.get_mut(target) {
            peer.bound.remove(&sender);
        }
        self.dirty = true;
        self.push(sender, 0, Notification::NotifyBind { peer: target, bound: false });
        self.push(target, 0, Notification::NotifyBind { peer: sender, bound: false });
        Ok(())
    }

    fn mode_message(
        &mut self,
        sender: UserId,
        actor: UserId,
        envelope: &Envelope,
    ) -> Result<(), GameError> {
        let seat = self.roster.get(actor).and_then(|p| p.index);
        let was_finished = self.finished();
        match self.driver.handle(seat, envelope)? {
            Handled::Changed(outcome) => {
                self.dirty = true;
                self.fan_out(outcome, was_finished)
            }
            Handled::Reply(body) => {
                self.push(sender, envelope.message_id, body);
                Ok(())
            }
        }
    }

    /// Views to the seated, the synopsis to every admitted user, and the
    /// finished notice once.
    fn fan_out(&mut self, outcome: Outcome, was_finished: bool) -> Result<(), GameError> {
        if outcome == Outcome::RoundComplete {
            self.broadcast(Notification::NextRound);
        }

        for (seat, user) in self.seats.clone().into_iter().enumerate() {
            let state = self.driver.player_view(seat)?;
            for spectator in self.roster.bound_spectators(user) {
                self.push(spectator, 0, Notification::State { state: state.clone() });
            }
            self.push(user, 0, Notification::State { state });
        }
        let synopsis = self.driver.synopsis()?;
        self.broadcast(Notification::Synopsis { synopsis });

        if self.finished() && !was_finished && !self.finished_announced {
            self.finished_announced = true;
            let winner = self.winner_user();
            info!(game_id = self.game_id(), ?winner, "[SESSION] game finished");
            for user in self.roster.users() {
                self.push(user, 0, Notification::Finished { winner });
            }
        }
        Ok(())
    }

    fn winner_user(&self) -> Option<UserId> {
        self.driver
            .rules()
            .winner()
            .and_then(|seat| self.seats.get(seat).copied())
    }

    fn broadcast_roster(&mut self) {
        let players = self.roster.entries();
        self.broadcast(Notification::NotifyUsers { players });
    }

    /// To every admitted user.
    fn broadcast(&mut self, body: Notification) {
        for user in self.roster.admitted() {
            self.push(user, 0, body.clone());
        }
    }

    fn push(&mut self, user: UserId, reply_to: u64, body: Notification) {
        let game_mode = self.record.mode;
        let game_id = self.record.game_id;
        let capacity = self.settings.outbox_capacity;
        let Some(player) = self.roster.get_mut(user) else {
            return;
        };
        let outbound = Outbound {
            game_mode,
            game_id,
            player_id: user,
            message_id: player.next_message_id(),
            timestamp: now_millis(),
            reply_to,
            body,
        };
        match outbound.to_json() {
            Ok(encoded) => player.push(encoded, capacity),
            Err(err) => error!(game_id, user_id = user, error = %err, "[SESSION] dropped notification"),
        }
    }
}
