use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{GameId, UserId};
use crate::domain::rules::GameMode;
use crate::errors::GameError;

/// One inbound message. The type-specific payload sits in the same JSON
/// object as the header fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub game_mode: GameMode,
    pub game_id: GameId,
    pub player_id: UserId,
    pub message_type: String,
    #[serde(default)]
    pub message_id: u64,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub reply_to: u64,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Envelope {
    pub fn decode(text: &str) -> Result<Self, GameError> {
        serde_json::from_str(text)
            .map_err(|e| GameError::protocol(format!("malformed envelope: {e}")))
    }

    /// Decode the payload as a `message_type`-tagged enum.
    pub fn body<T: DeserializeOwned>(&self) -> Result<T, GameError> {
        let mut object = self.payload.clone();
        object.insert(
            "message_type".to_string(),
            Value::String(self.message_type.clone()),
        );
        serde_json::from_value(Value::Object(object)).map_err(|e| {
            GameError::protocol(format!("unable to handle {} message: {e}", self.message_type))
        })
    }
}

/// Seat order, dealer and teams chosen by the owner before the start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Seat index of the first dealer.
    #[serde(default)]
    pub dealer: usize,
    /// Playing users in seat order; empty keeps the join order.
    #[serde(default)]
    pub order: Vec<UserId>,
    /// Seats per team, for team modes.
    #[serde(default)]
    pub teams: Vec<Vec<usize>>,
}

fn default_playing() -> bool {
    true
}

/// Messages every mode understands. Anything else goes to the mode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "message_type", rename_all = "kebab-case")]
pub enum CommonMessage {
    Join,
    Admit {
        target: UserId,
        admitted: bool,
        #[serde(default = "default_playing")]
        playing: bool,
    },
    Ready {
        ready: bool,
    },
    Keepalive,
    Word {
        word: String,
    },
    Countback {
        value: u32,
    },
    BindRequest {
        target: UserId,
    },
    BindAccept {
        target: UserId,
    },
    Unbind {
        target: UserId,
    },
    Start,
    Cancel,
    Assign(Assignment),
    Peek,
}

impl CommonMessage {
    pub const TYPES: [&'static str; 13] = [
        "join",
        "admit",
        "ready",
        "keepalive",
        "word",
        "countback",
        "bind-request",
        "bind-accept",
        "unbind",
        "start",
        "cancel",
        "assign",
        "peek",
    ];

    pub fn recognizes(message_type: &str) -> bool {
        Self::TYPES.contains(&message_type)
    }
}
