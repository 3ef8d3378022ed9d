use serde::Serialize;
use serde_json::Value;

use super::{GameId, UserId};
use crate::domain::rules::GameMode;
use crate::errors::GameError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub user: UserId,
    pub playing: bool,
    pub ready: bool,
}

/// Outbound message bodies, tagged by `message_type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "message_type", rename_all = "kebab-case")]
pub enum Notification {
    Admitted {
        admitted: bool,
        playing: bool,
        ready: bool,
    },
    /// To the owner, whenever someone joins.
    NotifyJoin {
        joined: UserId,
        admitted: bool,
        playing: bool,
        ready: bool,
    },
    NotifyUsers {
        players: Vec<RosterEntry>,
    },
    NotifyBind {
        peer: UserId,
        bound: bool,
    },
    Error {
        error: String,
        code: &'static str,
    },
    Keepalive,
    Word {
        word: String,
        valid: bool,
    },
    Countdown {
        value: u32,
    },
    /// The owner stopped the countdown.
    Cancelled,
    Started {
        playing: bool,
    },
    /// Mode-specific view for one seat.
    State {
        state: Value,
    },
    /// Public summary of the game.
    Synopsis {
        synopsis: Value,
    },
    /// Full state, for spectators and finished games.
    GameState {
        state: Value,
        synopsis: Value,
    },
    NextRound,
    Finished {
        winner: Option<UserId>,
    },
    Check {
        valid: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Notification {
    pub fn error(err: &GameError) -> Self {
        Notification::Error {
            error: err.to_string(),
            code: err.code().as_str(),
        }
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            Notification::Admitted { .. } => "admitted",
            Notification::NotifyJoin { .. } => "notify-join",
            Notification::NotifyUsers { .. } => "notify-users",
            Notification::NotifyBind { .. } => "notify-bind",
            Notification::Error { .. } => "error",
            Notification::Keepalive => "keepalive",
            Notification::Word { .. } => "word",
            Notification::Countdown { .. } => "countdown",
            Notification::Cancelled => "cancelled",
            Notification::Started { .. } => "started",
            Notification::State { .. } => "state",
            Notification::Synopsis { .. } => "synopsis",
            Notification::GameState { .. } => "game-state",
            Notification::NextRound => "next-round",
            Notification::Finished { .. } => "finished",
            Notification::Check { .. } => "check",
        }
    }
}

/// A notification stamped with the envelope header for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outbound {
    pub game_mode: GameMode,
    pub game_id: GameId,
    pub player_id: UserId,
    /// Strictly increasing per recipient, starting at 1.
    pub message_id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub reply_to: u64,
    #[serde(flatten)]
    pub body: Notification,
}

impl Outbound {
    pub fn to_json(&self) -> Result<String, GameError> {
        serde_json::to_string(self).map_err(|e| {
            GameError::invariant(format!("unable to encode {}: {e}", self.body.message_type()))
        })
    }
}

pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
