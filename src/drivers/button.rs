//! Button-burst command accumulator.
//!
//! The coordinator has a single button.  The operator selects command
//! *N* by pressing it *N* times in a burst:
//!
//! | Input                              | Effect                          |
//! |------------------------------------|---------------------------------|
//! | First press                        | count = 1, start the window     |
//! | Press before the window expires    | count += 1, restart the window  |
//! | Window expires with count > 0      | finalize to `count`, reset      |
//!
//! The window is a sliding reset, not an extension: every press pushes
//! finalization a full window past that press.  The window timer itself
//! lives in the node's [`Scheduler`](crate::scheduler::Scheduler) as
//! [`TimerId::InputWindow`](crate::scheduler::TimerId::InputWindow); this
//! type only keeps the count and tells the caller which timer operation
//! to perform.

/// Timer operation requested by a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowAction {
    /// First press of a burst: arm the window.
    Start,
    /// Later press: restart the window from now.
    Restart,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CommandAccumulator {
    count: u16,
}

impl CommandAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one press.
    pub fn press(&mut self) -> WindowAction {
        let action = if self.count == 0 {
            WindowAction::Start
        } else {
            WindowAction::Restart
        };
        self.count = self.count.saturating_add(1);
        action
    }

    /// Window expired.  Returns the burst length, or `None` if no press
    /// was pending.
    pub fn finalize(&mut self) -> Option<u16> {
        match core::mem::take(&mut self.count) {
            0 => None,
            n => Some(n),
        }
    }

    /// Presses collected in the current burst.
    pub fn pending(&self) -> u16 {
        self.count
    }
}
