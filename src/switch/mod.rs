//! Switch module for two-switch input handling
//!
//! Maps physical keys onto two logical switches, reads their edges, and
//! classifies them into taps, holds, steps and commits.

mod classifier;
mod keys;
mod listener;

pub use classifier::{HoldPhase, HoldState, SwitchClassifier, SwitchCommand, HOLD_POLL_MS};
pub use keys::{Edge, KeyMap, SwitchEdge, SwitchId};
pub use listener::{parse_line, ListenerError, SwitchEvent, SwitchListener};
