//! Per-user session records, keyed by user rather than connection so they
//! survive reconnects.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::protocol::{RosterEntry, UserId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSession {
    pub user: UserId,
    /// Seat in the rule engine; only admitted, playing users get one.
    pub index: Option<usize>,
    pub admitted: bool,
    pub playing: bool,
    pub ready: bool,
    /// Highest inbound `message_id` seen.
    pub inbound: u64,
    /// Last outbound `message_id` issued.
    pub outbound: u64,
    /// Users this one has asked to bind with or accepted.
    pub bound: BTreeSet<UserId>,
    /// Last countdown tick this user acknowledged.
    pub countback: Option<u32>,
    /// Encoded notifications not yet handed to a connection.
    #[serde(skip)]
    pub outbox: VecDeque<String>,
}

impl PlayerSession {
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    pub fn is_active_player(&self) -> bool {
        self.admitted && self.playing
    }

    pub fn next_message_id(&mut self) -> u64 {
        self.outbound += 1;
        self.outbound
    }

    /// Queue an encoded message, dropping the oldest once `capacity` is hit.
    pub fn push(&mut self, encoded: String, capacity: usize) {
        while self.outbox.len() >= capacity.max(1) {
            self.outbox.pop_front();
            warn!(user_id = self.user, capacity, "[SESSION] outbox full; dropped oldest message");
        }
        self.outbox.push_back(encoded);
    }
}

/// Everyone who has ever attached to a session, in join order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    players: Vec<PlayerSession>,
}

impl Roster {
    pub fn get(&self, user: UserId) -> Option<&PlayerSession> {
        self.players.iter().find(|p| p.user == user)
    }

    pub fn get_mut(&mut self, user: UserId) -> Option<&mut PlayerSession> {
        self.players.iter_mut().find(|p| p.user == user)
    }

    pub fn contains(&self, user: UserId) -> bool {
        self.get(user).is_some()
    }

    pub fn insert(&mut self, player: PlayerSession) {
        match self.get_mut(player.user) {
            Some(existing) => *existing = player,
            None => self.players.push(player),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerSession> {
        self.players.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerSession> {
        self.players.iter_mut()
    }

    pub fn users(&self) -> Vec<UserId> {
        self.players.iter().map(|p| p.user).collect()
    }

    /// Users that would take a seat at the start, in join order.
    pub fn active_players(&self) -> Vec<UserId> {
        self.players
            .iter()
            .filter(|p| p.is_active_player())
            .map(|p| p.user)
            .collect()
    }

    pub fn admitted(&self) -> Vec<UserId> {
        self.players
            .iter()
            .filter(|p| p.admitted)
            .map(|p| p.user)
            .collect()
    }

    pub fn entries(&self) -> Vec<RosterEntry> {
        self.players
            .iter()
            .filter(|p| p.admitted)
            .map(|p| RosterEntry {
                user: p.user,
                playing: p.playing,
                ready: p.ready,
            })
            .collect()
    }

    pub fn user_at(&self, seat: usize) -> Option<UserId> {
        self.players
            .iter()
            .find(|p| p.index == Some(seat))
            .map(|p| p.user)
    }

    /// Both sides list each other, and exactly one of them is playing.
    pub fn bind_active(&self, first: UserId, second: UserId) -> bool {
        match (self.get(first), self.get(second)) {
            (Some(a), Some(b)) => {
                a.bound.contains(&second)
                    && b.bound.contains(&first)
                    && a.admitted
                    && b.admitted
                    && a.playing != b.playing
            }
            _ => false,
        }
    }

    /// Spectators with an active bind to `player`.
    pub fn bound_spectators(&self, player: UserId) -> Vec<UserId> {
        self.players
            .iter()
            .filter(|p| !p.playing && self.bind_active(p.user, player))
            .map(|p| p.user)
            .collect()
    }

    /// Drop every bind half that involves `user`.
    pub fn clear_binds(&mut self, user: UserId) -> Vec<UserId> {
        let mut peers = Vec::new();
        for player in &mut self.players {
            if player.user == user {
                peers.extend(std::mem::take(&mut player.bound));
            } else if player.bound.remove(&user) {
                peers.push(player.user);
            }
        }
        peers.sort_unstable();
        peers.dedup();
        peers
    }

    /// True once every admitted, playing user acknowledged `tick`. Never
    /// true when nobody is playing.
    pub fn all_acknowledged(&self, tick: u32) -> bool {
        let mut active = self
            .players
            .iter()
            .filter(|p| p.is_active_player())
            .peekable();
        active.peek().is_some() && active.all(|p| p.countback == Some(tick))
    }
}
