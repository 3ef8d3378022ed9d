//! The countback barrier run before a game starts.
//!
//! `Idle → Ticking(n) → Idle`. Each tick waits for every admitted, playing
//! user to echo it and for `delay` to pass since the previous tick. Time is
//! passed in so the session worker owns the clock.

use std::time::Duration;

use tokio::time::Instant;

/// First tick announced after `start`.
pub const COUNTDOWN_FROM: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing running, or someone has not acknowledged yet.
    Idle,
    /// Everyone acknowledged but the delay has not passed.
    Pending(Instant),
    /// Announce this tick.
    Tick(u32),
    /// Reached zero; start the game.
    Start,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    delay: Duration,
    tick: Option<u32>,
    last: Option<Instant>,
}

impl Countdown {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            tick: None,
            last: None,
        }
    }

    pub fn current(&self) -> Option<u32> {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.tick.is_some()
    }

    pub fn begin(&mut self, now: Instant) -> u32 {
        self.tick = Some(COUNTDOWN_FROM);
        self.last = Some(now);
        COUNTDOWN_FROM
    }

    pub fn cancel(&mut self) {
        self.tick = None;
        self.last = None;
    }

    /// When the next tick may fire, if one is waiting on the delay.
    pub fn deadline(&self) -> Option<Instant> {
        self.tick?;
        self.last.map(|last| last + self.delay)
    }

    pub fn advance(&mut self, all_acknowledged: bool, now: Instant) -> Step {
        let Some(tick) = self.tick else {
            return Step::Idle;
        };
        if !all_acknowledged {
            return Step::Idle;
        }
        if let Some(deadline) = self.deadline() {
            if now < deadline {
                return Step::Pending(deadline);
            }
        }

        let next = tick.saturating_sub(1);
        if next == 0 {
            self.cancel();
            Step::Start
        } else {
            self.tick = Some(next);
            self.last = Some(now);
            Step::Tick(next)
        }
    }
}
