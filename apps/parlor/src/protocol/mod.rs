//! Wire protocol: inbound envelopes, the common (mode-independent) message
//! table and outbound notifications.

pub mod envelope;
pub mod notification;

pub use envelope::{Assignment, CommonMessage, Envelope};
pub use notification::{Notification, Outbound, RosterEntry};

pub type GameId = i64;
pub type UserId = i64;
