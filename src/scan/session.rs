//! Scan session state
//!
//! The candidate list and the highlighted index only change together through
//! [`ScanSession::replace_candidates`], which always resets the index, so the
//! index can never point past the end of the list.

use crate::settings::ScanMode;

/// Control actions offered alongside letters and words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Speak,
    Undo,
    Clear,
    Space,
}

impl ControlAction {
    /// Every action, in the order they are appended to the list
    pub const ALL: [ControlAction; 4] = [
        ControlAction::Speak,
        ControlAction::Undo,
        ControlAction::Clear,
        ControlAction::Space,
    ];
}

/// One selectable item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateItem {
    Letter(char),
    Word(String),
    Action(ControlAction),
}

impl CandidateItem {
    /// Short human-readable label
    pub fn label(&self) -> String {
        match self {
            CandidateItem::Letter(c) => c.to_string(),
            CandidateItem::Word(w) => w.clone(),
            CandidateItem::Action(ControlAction::Speak) => "SPEAK".to_string(),
            CandidateItem::Action(ControlAction::Undo) => "UNDO".to_string(),
            CandidateItem::Action(ControlAction::Clear) => "CLEAR".to_string(),
            CandidateItem::Action(ControlAction::Space) => "SPACE".to_string(),
        }
    }
}

impl std::fmt::Display for CandidateItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Mode, candidates, highlight and running flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSession {
    mode: ScanMode,
    candidates: Vec<CandidateItem>,
    index: usize,
    running: bool,
}

impl ScanSession {
    pub fn new(mode: ScanMode, candidates: Vec<CandidateItem>) -> Self {
        Self {
            mode,
            candidates,
            index: 0,
            running: false,
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn candidates(&self) -> &[CandidateItem] {
        &self.candidates
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Highlighted candidate, `None` when the list is empty
    pub fn current(&self) -> Option<&CandidateItem> {
        self.candidates.get(self.index)
    }

    pub(crate) fn set_mode(&mut self, mode: ScanMode) {
        self.mode = mode;
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Swap in a new list and reset the highlight to the first item
    pub(crate) fn replace_candidates(&mut self, candidates: Vec<CandidateItem>) {
        self.candidates = candidates;
        self.index = 0;
    }

    /// Step the highlight, wrapping at the end. `None` when empty.
    pub(crate) fn advance(&mut self) -> Option<usize> {
        if self.candidates.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.candidates.len();
        Some(self.index)
    }

    /// Jump back to the first item
    pub(crate) fn restart(&mut self) {
        self.index = 0;
    }
}
