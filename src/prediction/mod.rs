//! Prediction collaborator interface
//!
//! The language model itself lives outside this crate. The engine talks to
//! it through [`Predictor`] and uses [`NullPredictor`] when prediction is
//! disabled, so no call site has to check for presence.

use std::collections::BTreeMap;

/// One ranked prediction
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub text: String,
    pub probability: f64,
}

impl Prediction {
    pub fn new(text: impl Into<String>, probability: f64) -> Self {
        Self {
            text: text.into(),
            probability,
        }
    }
}

/// Partial configuration pushed to the predictor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictorConfig {
    /// Letters adjacent to each letter in the current scan order
    pub adjacency: Option<BTreeMap<char, Vec<char>>>,
    /// Maximum predictions per request
    pub max_predictions: Option<usize>,
}

/// Errors reported by a predictor
#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("prediction is disabled")]
    Disabled,

    #[error("predictor is not trained")]
    NotReady,

    #[error("predictor failed: {0}")]
    Backend(String),
}

/// Prediction capability consumed by the engine
pub trait Predictor: Send {
    /// Whether this predictor can produce anything at all
    fn is_available(&self) -> bool {
        true
    }

    /// Ranked next characters after `context`
    fn predict_next_character(&mut self, context: &str) -> Result<Vec<Prediction>, PredictionError>;

    /// Ranked completions of `partial`, given the text before it
    fn predict_word_completion(
        &mut self,
        partial: &str,
        preceding: &str,
    ) -> Result<Vec<Prediction>, PredictionError>;

    /// Train on a corpus of prior text
    fn train(&mut self, corpus: &str) -> Result<(), PredictionError>;

    /// Feed committed text into the adaptive context
    fn add_to_context(&mut self, text: &str);

    /// Forget the adaptive context
    fn reset_context(&mut self);

    /// Apply a partial configuration update
    fn update_config(&mut self, config: PredictorConfig);
}

/// Predictor used when prediction is turned off
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPredictor;

impl Predictor for NullPredictor {
    fn is_available(&self) -> bool {
        false
    }

    fn predict_next_character(&mut self, _context: &str) -> Result<Vec<Prediction>, PredictionError> {
        Ok(Vec::new())
    }

    fn predict_word_completion(
        &mut self,
        _partial: &str,
        _preceding: &str,
    ) -> Result<Vec<Prediction>, PredictionError> {
        Ok(Vec::new())
    }

    fn train(&mut self, _corpus: &str) -> Result<(), PredictionError> {
        Err(PredictionError::Disabled)
    }

    fn add_to_context(&mut self, _text: &str) {}

    fn reset_context(&mut self) {}

    fn update_config(&mut self, _config: PredictorConfig) {}
}

/// Letters before and after each letter in a scan order
pub fn adjacency_map(order: &[char]) -> BTreeMap<char, Vec<char>> {
    order
        .iter()
        .enumerate()
        .map(|(i, &letter)| {
            let mut neighbours = Vec::with_capacity(2);
            if i > 0 {
                neighbours.push(order[i - 1]);
            }
            if let Some(&next) = order.get(i + 1) {
                neighbours.push(next);
            }
            (letter, neighbours)
        })
        .collect()
}
