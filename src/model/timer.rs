//! The authoritative timer state machine
//!
//! There is exactly one [`Timer`] per service. It is the only thing allowed to
//! change the running/idle state, and it reports every real transition as an
//! [`Event`] for the dispatcher to fan out.

use chrono::Utc;

use crate::model::{command::Command, event::Event};

/// Milliseconds since the Unix epoch.
pub type Millis = i64;

/// Current wall clock reading in epoch milliseconds.
pub fn now_millis() -> Millis {
    Utc::now().timestamp_millis()
}

/// Either idle, or running since a given instant.
///
/// The start time only exists inside `Running`, so "start time is set iff the
/// timer runs" holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Running { start_time: Millis },
}

impl TimerState {
    pub fn running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    pub fn start_time(&self) -> Option<Millis> {
        match self {
            TimerState::Running { start_time } => Some(*start_time),
            TimerState::Idle => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Timer {
    state: TimerState,
}

impl Timer {
    pub fn new() -> Timer {
        Timer::default()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Applies a command using the wall clock.
    pub fn apply(&mut self, command: Command) -> Option<Event> {
        self.apply_at(command, now_millis())
    }

    /// Applies a command as if the clock read `now`.
    ///
    /// # Returns
    ///
    /// * `Some(Event)` - The state changed (or the command was a reset)
    /// * `None` - The command was redundant in the current state
    pub fn apply_at(&mut self, command: Command, now: Millis) -> Option<Event> {
        match (command, self.state) {
            (Command::Start, TimerState::Idle) => {
                self.state = TimerState::Running { start_time: now };
                Some(Event::Start {
                    start_time: now,
                    timestamp: now,
                })
            }
            // A second start must not move the origin instant.
            (Command::Start, TimerState::Running { .. }) => None,
            (Command::Stop, TimerState::Running { .. }) => {
                self.state = TimerState::Idle;
                Some(Event::Stop)
            }
            (Command::Stop, TimerState::Idle) => None,
            (Command::Reset, _) => {
                self.state = TimerState::Idle;
                Some(Event::Reset)
            }
        }
    }

    /// The event that brings a freshly connected client up to date.
    ///
    /// Idle clients render idle on their own, so only a running timer needs
    /// an explicit sync.
    pub fn sync_event(&self, now: Millis) -> Option<Event> {
        self.state.start_time().map(|start_time| Event::Start {
            start_time,
            timestamp: now,
        })
    }
}
