//! Node addressing and the sender-address reply table.
//!
//! Every node has a fixed one-byte mesh address and a role:
//!
//! | Address | Role        | Placement                      |
//! |---------|-------------|--------------------------------|
//! | 1       | Entrance    | Entrance hall, next to the door |
//! | 2       | Gate        | Garden, next to the gate        |
//! | 3       | Coordinator | Living room, operator console   |
//! | 4       | Bedroom     | Bedroom, next to the A/C unit   |
//!
//! Integer replies carry no type tag.  The coordinator attributes their
//! meaning purely by who sent them, through [`ReplyTable`].

use core::fmt;

use serde::{Deserialize, Serialize};

/// One-byte mesh address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeAddr(pub u8);

impl NodeAddr {
    pub const ENTRANCE: Self = Self(1);
    pub const GATE: Self = Self(2);
    pub const COORDINATOR: Self = Self(3);
    pub const BEDROOM: Self = Self(4);
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.0", self.0)
    }
}

/// What a node does in the house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Coordinator,
    Entrance,
    Gate,
    Bedroom,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Self::Coordinator => "Coordinator",
            Self::Entrance => "Entrance",
            Self::Gate => "Gate",
            Self::Bedroom => "Bedroom",
        }
    }

    /// The fixed address this role is deployed at.
    pub fn address(self) -> NodeAddr {
        match self {
            Self::Coordinator => NodeAddr::COORDINATOR,
            Self::Entrance => NodeAddr::ENTRANCE,
            Self::Gate => NodeAddr::GATE,
            Self::Bedroom => NodeAddr::BEDROOM,
        }
    }
}

/// Address plus role, fixed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    pub addr: NodeAddr,
    pub role: Role,
}

impl NodeIdentity {
    pub fn of(role: Role) -> Self {
        Self {
            addr: role.address(),
            role,
        }
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.role.name(), self.addr)
    }
}

// ---------------------------------------------------------------------------
// Reply attribution
// ---------------------------------------------------------------------------

/// Meaning of an untagged integer reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    /// Mean of the entrance node's temperature window (°C).
    TemperatureAverage,
    /// Scaled external light reading from the gate node.
    ExternalLight,
}

/// Sender-address → reply meaning lookup.
///
/// A stray integer from any listed address is attributed to that
/// address's kind; there is no request/response correlation.
#[derive(Debug, Clone)]
pub struct ReplyTable {
    entries: heapless::Vec<(NodeAddr, ReplyKind), 4>,
}

impl ReplyTable {
    pub fn empty() -> Self {
        Self {
            entries: heapless::Vec::new(),
        }
    }

    /// The house layout: temperature from the entrance, light from the gate.
    pub fn house() -> Self {
        let mut table = Self::empty();
        table.insert(NodeAddr::ENTRANCE, ReplyKind::TemperatureAverage);
        table.insert(NodeAddr::GATE, ReplyKind::ExternalLight);
        table
    }

    /// Register (or replace) the meaning of replies from `addr`.
    /// Returns `false` if the table is full.
    pub fn insert(&mut self, addr: NodeAddr, kind: ReplyKind) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|(a, _)| *a == addr) {
            entry.1 = kind;
            return true;
        }
        self.entries.push((addr, kind)).is_ok()
    }

    pub fn lookup(&self, from: NodeAddr) -> Option<ReplyKind> {
        self.entries
            .iter()
            .find(|(a, _)| *a == from)
            .map(|(_, kind)| *kind)
    }
}

impl Default for ReplyTable {
    fn default() -> Self {
        Self::house()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_map_to_fixed_addresses() {
        assert_eq!(Role::Entrance.address(), NodeAddr(1));
        assert_eq!(Role::Gate.address(), NodeAddr(2));
        assert_eq!(Role::Coordinator.address(), NodeAddr(3));
        assert_eq!(Role::Bedroom.address(), NodeAddr(4));
    }

    #[test]
    fn house_table_attributes_by_sender() {
        let table = ReplyTable::house();
        assert_eq!(
            table.lookup(NodeAddr::ENTRANCE),
            Some(ReplyKind::TemperatureAverage)
        );
        assert_eq!(table.lookup(NodeAddr::GATE), Some(ReplyKind::ExternalLight));
        assert_eq!(table.lookup(NodeAddr::BEDROOM), None);
        assert_eq!(table.lookup(NodeAddr::COORDINATOR), None);
    }

    #[test]
    fn reused_address_is_misattributed() {
        // Reassigning the gate's address to temperature replies means a light
        // reading from that address is read as a temperature.
        let mut table = ReplyTable::house();
        assert!(table.insert(NodeAddr::GATE, ReplyKind::TemperatureAverage));
        assert_eq!(
            table.lookup(NodeAddr::GATE),
            Some(ReplyKind::TemperatureAverage)
        );
    }

    #[test]
    fn identity_display() {
        assert_eq!(NodeIdentity::of(Role::Gate).to_string(), "Gate[2.0]");
    }
}
