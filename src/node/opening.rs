//! Timed opening sequence shared by the gate, the entrance door and the
//! coordinator's mirror of it.
//!
//! One `OPEN` broadcast starts an independent session on every node that
//! hears it.  A session counts `remaining` down by `step` on each tick and
//! ends when it reaches zero; what each node does on a tick is up to the
//! node.

use log::debug;

use crate::config::{SystemConfig, secs};
use crate::scheduler::TimerId;

use super::NodeIo;

/// A running countdown.  `remaining` is always a positive multiple of `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningSession {
    pub remaining_secs: u32,
    pub step_secs: u32,
}

/// What one tick looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningTick {
    /// Remaining time when the tick fired, before the decrement.
    pub remaining_secs: u32,
    pub step_secs: u32,
}

impl OpeningTick {
    /// Second to last tick.
    pub fn is_penultimate(&self) -> bool {
        self.remaining_secs == 2 * self.step_secs
    }

    /// Final tick; the session is over after it.
    pub fn is_last(&self) -> bool {
        self.remaining_secs == self.step_secs
    }
}

pub struct OpeningSequencer {
    session: Option<OpeningSession>,
    duration_secs: u32,
    step_secs: u32,
}

impl OpeningSequencer {
    pub fn new(cfg: &SystemConfig) -> Self {
        Self {
            session: None,
            duration_secs: cfg.opening_duration_secs,
            step_secs: cfg.opening_step_secs,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&OpeningSession> {
        self.session.as_ref()
    }

    /// Start a session and arm the first tick.  Returns `false` if one is
    /// already running.
    pub fn begin(&mut self, io: &mut NodeIo<'_>) -> bool {
        if self.is_active() {
            debug!("opening already in progress");
            return false;
        }
        self.session = Some(OpeningSession {
            remaining_secs: self.duration_secs,
            step_secs: self.step_secs,
        });
        io.timers.set(TimerId::OpeningStep, io.now, secs(self.step_secs));
        true
    }

    /// Advance one tick.  `None` if no session is running.
    pub fn tick(&mut self, io: &mut NodeIo<'_>) -> Option<OpeningTick> {
        let session = self.session.as_mut()?;
        let tick = OpeningTick {
            remaining_secs: session.remaining_secs,
            step_secs: session.step_secs,
        };
        session.remaining_secs = session.remaining_secs.saturating_sub(session.step_secs);
        if session.remaining_secs == 0 {
            self.session = None;
        } else {
            io.timers.reset(TimerId::OpeningStep);
        }
        Some(tick)
    }
}
