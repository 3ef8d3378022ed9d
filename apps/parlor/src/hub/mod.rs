//! Live game sessions.
//!
//! Each game with at least one connection (or a game in play) is owned by a
//! single worker task. Connections talk to it through an mpsc queue, so every
//! session sees its messages strictly one at a time.

pub mod countdown;
pub mod registry;
pub mod roster;
pub mod session;
mod worker;

#[cfg(test)]
mod tests_session;

pub use registry::{Connection, ConnectionSender, Hub};
pub use session::{SessionCore, SessionSettings, SessionSnapshot};
