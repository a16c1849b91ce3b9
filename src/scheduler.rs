//! Per-node timer engine.
//!
//! Every node owns one [`Scheduler`] holding a fixed set of named one-shot
//! timers.  When the node's clock passes a deadline the scheduler notifies
//! a [`SchedulerDelegate`]; the node host implements the delegate by
//! pushing a timer event into the node's event queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Wake-up Sources                          │
//! │                                                              │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌──────────┐   │
//! │  │ Button    │  │ Broadcast │  │ Unicast   │  │ Timer    │   │
//! │  │ press     │  │ received  │  │ received  │  │ expired  │   │
//! │  └─────┬─────┘  └─────┬─────┘  └─────┬─────┘  └─────┬────┘   │
//! │        │              │              │              │        │
//! │        ▼              ▼              ▼              ▼        │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │                    EventQueue                          │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          │                                   │
//! │                          ▼                                   │
//! │                  NodeService handlers                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timer operations follow the event-timer model of sensor-node kernels:
//!
//! - [`set`](Scheduler::set): deadline = now + interval.
//! - [`restart`](Scheduler::restart): same interval, counted from now.
//! - [`reset`](Scheduler::reset): same interval, counted from the previous
//!   deadline, so periodic loops do not drift.
//! - [`stop`](Scheduler::stop): disarm.

use log::trace;

use crate::app::ports::SchedulerDelegate;

/// Milliseconds on the node clock.
pub type Millis = u64;

// ═══════════════════════════════════════════════════════════════
//  Timer identities
// ═══════════════════════════════════════════════════════════════

/// Every timer a node can run.  Each node uses a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    /// Coordinator: sliding command-input window.
    InputWindow,
    /// Coordinator: alarm acknowledgment collection.
    AlarmAckWait,
    /// Gate, entrance and coordinator: opening sequence tick.
    OpeningStep,
    /// Peripherals: all-indicator blink while the alarm is active.
    AlarmBlink,
    /// Entrance: periodic temperature sampling.
    TemperatureSample,
    /// Bedroom: comfort loop tick.
    ComfortTick,
}

impl TimerId {
    pub const COUNT: usize = 6;

    pub const ALL: [TimerId; Self::COUNT] = [
        TimerId::InputWindow,
        TimerId::AlarmAckWait,
        TimerId::OpeningStep,
        TimerId::AlarmBlink,
        TimerId::TemperatureSample,
        TimerId::ComfortTick,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Bookkeeping for one timer.  Interval and deadline survive expiry so a
/// fired timer can be [`reset`](Scheduler::reset) from its handler.
#[derive(Debug, Clone, Copy)]
struct Timer {
    deadline: Millis,
    interval: Millis,
    armed: bool,
}

/// The timer engine.
///
/// Decoupled from the event system: expiries are reported to a
/// [`SchedulerDelegate`] rather than pushed anywhere directly.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    timers: [Option<Timer>; TimerId::COUNT],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `id` to expire `interval` ms after `now`.
    pub fn set(&mut self, id: TimerId, now: Millis, interval: Millis) {
        trace!("timer {id:?}: set {interval}ms at {now}");
        self.timers[id.index()] = Some(Timer {
            deadline: now + interval,
            interval,
            armed: true,
        });
    }

    /// Re-arm `id` with its last interval, counted from `now`.
    /// Returns `false` if the timer was never set.
    pub fn restart(&mut self, id: TimerId, now: Millis) -> bool {
        match &mut self.timers[id.index()] {
            Some(t) => {
                t.deadline = now + t.interval;
                t.armed = true;
                true
            }
            None => false,
        }
    }

    /// Re-arm `id` one interval after its previous deadline.
    /// Returns `false` if the timer was never set.
    pub fn reset(&mut self, id: TimerId) -> bool {
        match &mut self.timers[id.index()] {
            Some(t) => {
                t.deadline += t.interval;
                t.armed = true;
                true
            }
            None => false,
        }
    }

    /// Disarm `id`.  Its interval is kept for a later restart.
    pub fn stop(&mut self, id: TimerId) {
        if let Some(t) = &mut self.timers[id.index()] {
            t.armed = false;
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers[id.index()].is_some_and(|t| t.armed)
    }

    /// Deadline of `id` if armed.
    pub fn deadline(&self, id: TimerId) -> Option<Millis> {
        self.timers[id.index()]
            .filter(|t| t.armed)
            .map(|t| t.deadline)
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.timers
            .iter()
            .flatten()
            .filter(|t| t.armed)
            .map(|t| t.deadline)
            .min()
    }

    /// Fire every armed timer whose deadline is at or before `now`, in
    /// deadline order (ties broken by [`TimerId`] order).  Each fired
    /// timer is disarmed before the delegate hears about it.
    pub fn tick(&mut self, now: Millis, delegate: &mut dyn SchedulerDelegate) -> usize {
        let mut due: heapless::Vec<(Millis, TimerId), { TimerId::COUNT }> = heapless::Vec::new();
        for id in TimerId::ALL {
            if let Some(t) = &mut self.timers[id.index()] {
                if t.armed && t.deadline <= now {
                    t.armed = false;
                    // Capacity equals the number of timers.
                    let _ = due.push((t.deadline, id));
                }
            }
        }
        due.sort_unstable();
        for &(_, id) in &due {
            trace!("timer {id:?}: fired at {now}");
            delegate.on_timer_fired(id);
        }
        due.len()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Cooperative loops
// ═══════════════════════════════════════════════════════════════

/// Run state of a timer-driven loop that can be cancelled from outside.
///
/// Cancellation only takes effect at the loop's next tick: the pending
/// tick is consumed without running an iteration, so an iteration is
/// either applied in full or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancellableLoop {
    #[default]
    Stopped,
    Running,
    Cancelling,
}

impl CancellableLoop {
    pub fn start(&mut self) {
        *self = Self::Running;
    }

    /// Request cancellation.  A stopped loop stays stopped.
    pub fn cancel(&mut self) {
        if *self == Self::Running {
            *self = Self::Cancelling;
        }
    }

    pub fn is_running(&self) -> bool {
        *self == Self::Running
    }

    /// Called on each tick.  Returns `true` if an iteration should run
    /// (and the tick be re-armed).
    pub fn on_tick(&mut self) -> bool {
        match self {
            Self::Running => true,
            Self::Cancelling => {
                *self = Self::Stopped;
                false
            }
            Self::Stopped => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
