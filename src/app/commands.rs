//! Operator commands on the coordinator.
//!
//! A finalized button burst of `count` presses selects command `count`.
//! [`select`] applies the guard rules; [`Menu::available`] lists what the
//! operator may currently choose.

use core::fmt;

use crate::node::alarm::AlarmState;
use crate::node::gate::GateState;

/// Commands selectable at the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    ToggleAlarm = 1,
    ToggleGateLock = 2,
    OpenGateAndDoor = 3,
    QueryTemperature = 4,
    QueryLight = 5,
}

impl Command {
    pub const COUNT: u8 = 5;

    pub fn from_count(count: u16) -> Option<Self> {
        match count {
            1 => Some(Self::ToggleAlarm),
            2 => Some(Self::ToggleGateLock),
            3 => Some(Self::OpenGateAndDoor),
            4 => Some(Self::QueryTemperature),
            5 => Some(Self::QueryLight),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8
    }
}

/// Why a finalized burst was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Only the alarm toggle is allowed while the alarm is on.
    AlarmActive,
    /// The alarm cannot be toggled during an opening sequence.
    OpeningInProgress,
    /// Burst length does not name a command.
    Invalid,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlarmActive => f.write_str("ALARM IS ACTIVE!"),
            Self::OpeningInProgress => f.write_str("GATE and DOOR OPEN!"),
            Self::Invalid => f.write_str("invalid command"),
        }
    }
}

/// Apply the guard rules, in order, to a finalized burst.
pub fn select(count: u16, alarm: AlarmState, opening_active: bool) -> Result<Command, RejectReason> {
    if alarm == AlarmState::Active && count != 1 {
        return Err(RejectReason::AlarmActive);
    }
    if opening_active && count == 1 {
        return Err(RejectReason::OpeningInProgress);
    }
    Command::from_count(count).ok_or(RejectReason::Invalid)
}

// ───────────────────────────────────────────────────────────────
// Menu
// ───────────────────────────────────────────────────────────────

/// One line of the operator menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub command: Command,
    pub label: &'static str,
}

/// The commands the operator may currently select.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Menu {
    pub items: heapless::Vec<MenuItem, { Command::COUNT as usize }>,
}

impl Menu {
    /// Alarm toggle is hidden during an opening sequence; everything else
    /// is hidden while the alarm is on.
    pub fn available(alarm: AlarmState, gate: GateState, opening_active: bool) -> Self {
        let mut items = heapless::Vec::new();
        let mut add = |command, label| {
            // Never more than five items.
            let _ = items.push(MenuItem { command, label });
        };
        if !opening_active {
            add(
                Command::ToggleAlarm,
                match alarm {
                    AlarmState::Active => "DEACTIVATE ALARM",
                    AlarmState::Inactive => "ACTIVATE ALARM",
                },
            );
        }
        if alarm == AlarmState::Inactive {
            add(
                Command::ToggleGateLock,
                match gate {
                    GateState::Locked => "UNLOCK GATE",
                    GateState::Unlocked => "LOCK GATE",
                },
            );
            add(Command::OpenGateAndDoor, "OPEN GATE & DOOR");
            add(Command::QueryTemperature, "GET AVG. TEMP");
            add(Command::QueryLight, "GET EXT. LIGHT");
        }
        Self { items }
    }

    pub fn contains(&self, command: Command) -> bool {
        self.items.iter().any(|i| i.command == command)
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("COMMANDS AVAILABLE:")?;
        for item in &self.items {
            write!(f, " {}) {};", item.command.number(), item.label)?;
        }
        Ok(())
    }
}
