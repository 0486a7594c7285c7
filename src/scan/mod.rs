//! Scan module: candidate list, auto-scan, commits and the engine
//!
//! The engine owns a session (candidates plus highlighted index), the
//! message being composed, and the timers that move the highlight:
//! - OneSwitch: a tap starts scanning, or commits the highlight while running
//! - TwoSwitch: switch 1 steps the highlight, switch 2 commits it

mod auto_scan;
mod candidates;
mod commit;
mod engine;
mod game;
mod session;


pub use auto_scan::{delay_for, AutoScanTimer};
pub use candidates::{build_candidates, CandidateInputs};
pub use commit::{commit, CommitContext, CommitOutcome, SPEECH_FAILED_NOTICE, SPEECH_UNSUPPORTED_NOTICE};
pub use engine::{Collaborators, ScanEngine};
pub use game::GameMode;
pub use session::{CandidateItem, ControlAction, ScanSession};
