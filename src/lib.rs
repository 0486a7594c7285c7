//! switch-scan: switch-accessible scanning keyboard engine
//!
//! A highlight steps through candidate letters, predicted words and editing
//! actions; one or two switches start, step and commit it. The engine is a
//! plain value driven by switch edges and fired timers, so every behaviour
//! can be exercised on a virtual clock.

pub mod alphabet;
pub mod config;
pub mod events;
pub mod lifecycle;
pub mod prediction;
pub mod scan;
pub mod scheduler;
pub mod settings;
pub mod speech;
pub mod store;
pub mod switch;

pub use events::ScanEvent;
pub use scan::{CandidateItem, Collaborators, ControlAction, ScanEngine};
pub use settings::{ScanMode, ScanSettings};
