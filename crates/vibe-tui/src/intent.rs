//! Optimistic UI for commands that take a round trip through the player core.
//!
//! Pressing play/pause sends a command and the new state only arrives with
//! the next broadcast. Until then the play button pulses; if nothing arrives
//! within [`INTENT_TIMEOUT`] it shows a warning marker.

use std::time::{Duration, Instant};

pub const INTENT_TIMEOUT: Duration = Duration::from_millis(3000);
const PULSE: u128 = 400;

#[derive(Debug, Clone)]
pub enum IntentState<T: Clone + PartialEq> {
    Confirmed(T),
    Pending {
        wanted: T,
        known: T,
        since: Instant,
    },
    TimedOut {
        wanted: T,
        known: T,
    },
}

/// How to render a value that may still be in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderHint {
    #[default]
    Normal,
    /// Pending, pulse-on frame.
    PendingVisible,
    /// Pending, pulse-off frame.
    PendingHidden,
    TimedOut,
}

impl<T: Clone + PartialEq> IntentState<T> {
    pub fn new(value: T) -> Self {
        Self::Confirmed(value)
    }

    /// The value the user asked for.
    pub fn wanted(&self) -> &T {
        match self {
            Self::Confirmed(v) => v,
            Self::Pending { wanted, .. } | Self::TimedOut { wanted, .. } => wanted,
        }
    }

    /// The last value the core reported.
    pub fn known(&self) -> &T {
        match self {
            Self::Confirmed(v) => v,
            Self::Pending { known, .. } | Self::TimedOut { known, .. } => known,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Asking for the value the core already reports confirms immediately.
    pub fn set_intent(&mut self, wanted: T) {
        let known = self.known().clone();
        *self = if wanted == known {
            Self::Confirmed(wanted)
        } else {
            Self::Pending {
                wanted,
                known,
                since: Instant::now(),
            }
        };
    }

    /// Returns true when the state changed.
    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> bool {
        if let Self::Pending {
            wanted,
            known,
            since,
        } = self
        {
            if now.duration_since(*since) >= INTENT_TIMEOUT {
                *self = Self::TimedOut {
                    wanted: wanted.clone(),
                    known: known.clone(),
                };
                return true;
            }
        }
        false
    }

    /// Feed the value from a state broadcast. Returns true when the state
    /// changed.
    pub fn on_confirmed(&mut self, value: T) -> bool {
        match self {
            Self::Pending { wanted, known, .. } => {
                if value == *wanted {
                    *self = Self::Confirmed(value);
                    true
                } else {
                    // unrelated update; keep waiting
                    *known = value;
                    false
                }
            }
            Self::TimedOut { .. } => {
                *self = Self::Confirmed(value);
                true
            }
            Self::Confirmed(v) => {
                let changed = *v != value;
                *v = value;
                changed
            }
        }
    }

    pub fn render_state(&self) -> RenderHint {
        match self {
            Self::Confirmed(_) => RenderHint::Normal,
            Self::Pending { since, .. } => {
                if (since.elapsed().as_millis() / PULSE) % 2 == 0 {
                    RenderHint::PendingVisible
                } else {
                    RenderHint::PendingHidden
                }
            }
            Self::TimedOut { .. } => RenderHint::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_value_confirms_immediately() {
        let mut s = IntentState::new(false);
        s.set_intent(false);
        assert_eq!(s.render_state(), RenderHint::Normal);
    }

    #[test]
    fn test_pending_until_broadcast_matches() {
        let mut s = IntentState::new(false);
        s.set_intent(true);
        assert!(s.is_pending());
        assert_eq!(s.wanted(), &true);
        assert_eq!(s.known(), &false);

        assert!(!s.on_confirmed(false));
        assert!(s.is_pending());

        assert!(s.on_confirmed(true));
        assert_eq!(s.render_state(), RenderHint::Normal);
    }

    #[test]
    fn test_times_out_then_accepts_core_value() {
        let mut s = IntentState::new(false);
        s.set_intent(true);
        assert!(!s.tick_at(Instant::now()));
        assert!(s.tick_at(Instant::now() + INTENT_TIMEOUT));
        assert_eq!(s.render_state(), RenderHint::TimedOut);

        assert!(s.on_confirmed(false));
        assert_eq!(s.known(), &false);
        assert_eq!(s.render_state(), RenderHint::Normal);
    }
}
