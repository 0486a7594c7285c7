//! Logical switch definitions and physical key mapping
//!
//! Two logical switches are bound to two physical key names. Edges carry the
//! switch, direction, timestamp, and whether the OS generated them as
//! auto-repeat while the key was held.

use crate::scheduler::Millis;

/// Logical switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchId {
    /// Select in single-switch mode, step in two-switch mode
    One,
    /// Commit in two-switch mode, ignored otherwise
    Two,
}

impl SwitchId {
    pub(crate) fn slot(self) -> usize {
        match self {
            SwitchId::One => 0,
            SwitchId::Two => 1,
        }
    }
}

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Down,
    Up,
}

/// A single raw switch edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchEdge {
    pub switch: SwitchId,
    pub edge: Edge,
    pub timestamp: Millis,
    /// Auto-repeat generated while the key is held
    pub is_repeat: bool,
}

impl SwitchEdge {
    pub fn down(switch: SwitchId, timestamp: Millis) -> Self {
        Self {
            switch,
            edge: Edge::Down,
            timestamp,
            is_repeat: false,
        }
    }

    pub fn repeat(switch: SwitchId, timestamp: Millis) -> Self {
        Self {
            switch,
            edge: Edge::Down,
            timestamp,
            is_repeat: true,
        }
    }

    pub fn up(switch: SwitchId, timestamp: Millis) -> Self {
        Self {
            switch,
            edge: Edge::Up,
            timestamp,
            is_repeat: false,
        }
    }
}

/// Maps physical key names onto the two logical switches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    switch1: String,
    switch2: String,
}

impl KeyMap {
    pub fn new(switch1: &str, switch2: &str) -> Self {
        Self {
            switch1: switch1.to_ascii_lowercase(),
            switch2: switch2.to_ascii_lowercase(),
        }
    }

    /// Logical switch bound to a physical key, if any
    pub fn lookup(&self, key: &str) -> Option<SwitchId> {
        let key = key.to_ascii_lowercase();
        if key == self.switch1 {
            Some(SwitchId::One)
        } else if key == self.switch2 {
            Some(SwitchId::Two)
        } else {
            None
        }
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new("space", "enter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_key_map() {
        let keys = KeyMap::default();
        assert_eq!(keys.lookup("space"), Some(SwitchId::One));
        assert_eq!(keys.lookup("Enter"), Some(SwitchId::Two));
        assert_eq!(keys.lookup("tab"), None);
    }

    #[test]
    fn test_edge_constructors() {
        let edge = SwitchEdge::repeat(SwitchId::One, 40);
        assert_eq!(edge.edge, Edge::Down);
        assert!(edge.is_repeat);
        assert!(!SwitchEdge::down(SwitchId::Two, 0).is_repeat);
        assert_eq!(SwitchEdge::up(SwitchId::Two, 9).edge, Edge::Up);
    }
}
