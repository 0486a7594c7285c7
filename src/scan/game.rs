//! Game mode gate
//!
//! Practice mode with a list of target phrases. The only effect on the
//! candidate list is offering Space when the target expects one next; any
//! candidate may still be committed.

use crate::alphabet::apply_case_str;
use crate::settings::LetterCase;

/// Target phrases and the one currently being typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameMode {
    phrases: Vec<String>,
    current: usize,
}

impl GameMode {
    /// Phrases are converted to `case` so they compare with the message
    pub fn new(phrases: &[String], case: LetterCase) -> Self {
        Self {
            phrases: phrases
                .iter()
                .map(|p| apply_case_str(p.trim(), case))
                .filter(|p| !p.is_empty())
                .collect(),
            current: 0,
        }
    }

    /// Phrase the user is working on
    pub fn target(&self) -> Option<&str> {
        self.phrases.get(self.current).map(String::as_str)
    }

    /// Target character at the message's length
    pub fn next_expected_char(&self, message: &str) -> Option<char> {
        self.target()?.chars().nth(message.chars().count())
    }

    /// Message matches the target, ignoring trailing spaces and case
    pub fn is_complete(&self, message: &str) -> bool {
        let Some(target) = self.target() else {
            return false;
        };
        let typed = message.trim_end();
        !typed.is_empty() && typed.to_lowercase() == target.to_lowercase()
    }

    /// Move to the next phrase, wrapping around
    pub fn advance(&mut self) {
        if !self.phrases.is_empty() {
            self.current = (self.current + 1) % self.phrases.len();
        }
    }
}
