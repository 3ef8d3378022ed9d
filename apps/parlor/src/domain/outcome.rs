//! Result of a successful state-machine mutation.

use serde::Serialize;

/// Round and game completion are expected control flow, not failures:
/// mutators return them inside `Ok(..)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing terminal happened; play continues.
    Continue,
    /// The round is over; the next round must be dealt.
    RoundComplete,
    /// The game is over.
    GameComplete { winner: usize },
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Continue)
    }
}
