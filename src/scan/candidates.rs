//! Candidate list builder
//!
//! A pure function of its inputs. Composition order:
//! 1. predicted words (prediction ready and word display on)
//! 2. predicted letters (prediction ready)
//! 3. Speak, when something was predicted, speak-after-predictions is on,
//!    and the message is longer than one character
//! 4. the full alphabet; predicted letters appear again in place so that
//!    positions stay stable while scanning
//! 5. Space, in game mode when the target expects a space next
//! 6. the remaining actions once the message is non-empty (Speak only for
//!    messages longer than one character, and never twice)

use super::session::{CandidateItem, ControlAction};

/// Everything the list depends on
#[derive(Debug, Clone, Copy)]
pub struct CandidateInputs<'a> {
    pub alphabet: &'a [char],
    pub message: &'a str,
    pub predicted_letters: &'a [char],
    pub predicted_words: &'a [String],
    pub enable_prediction: bool,
    pub prediction_ready: bool,
    pub show_word_prediction: bool,
    pub speak_after_predictions: bool,
    pub game_mode: bool,
    /// Target phrase character at `message` length, if any
    pub game_target_next_char: Option<char>,
}

/// Build the ordered candidate list
pub fn build_candidates(inputs: &CandidateInputs<'_>) -> Vec<CandidateItem> {
    let message_len = inputs.message.chars().count();
    let mut list = Vec::with_capacity(
        inputs.predicted_words.len() + inputs.predicted_letters.len() + inputs.alphabet.len() + 5,
    );

    let mut early_speak = false;
    if inputs.enable_prediction && inputs.prediction_ready {
        if inputs.show_word_prediction {
            list.extend(inputs.predicted_words.iter().cloned().map(CandidateItem::Word));
        }
        list.extend(inputs.predicted_letters.iter().copied().map(CandidateItem::Letter));

        if !list.is_empty() && inputs.speak_after_predictions && message_len > 1 {
            list.push(CandidateItem::Action(ControlAction::Speak));
            early_speak = true;
        }
    }

    list.extend(inputs.alphabet.iter().copied().map(CandidateItem::Letter));

    if inputs.game_mode && inputs.game_target_next_char == Some(' ') {
        list.push(CandidateItem::Action(ControlAction::Space));
    }

    if message_len > 0 {
        for action in ControlAction::ALL {
            let skip = match action {
                ControlAction::Speak => early_speak || message_len <= 1,
                _ => false,
            };
            if !skip {
                list.push(CandidateItem::Action(action));
            }
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC: [char; 3] = ['A', 'B', 'C'];

    fn inputs<'a>(message: &'a str) -> CandidateInputs<'a> {
        CandidateInputs {
            alphabet: &ABC,
            message,
            predicted_letters: &[],
            predicted_words: &[],
            enable_prediction: false,
            prediction_ready: false,
            show_word_prediction: false,
            speak_after_predictions: false,
            game_mode: false,
            game_target_next_char: None,
        }
    }

    fn letters(s: &str) -> Vec<CandidateItem> {
        s.chars().map(CandidateItem::Letter).collect()
    }

    fn action(a: ControlAction) -> CandidateItem {
        CandidateItem::Action(a)
    }

    #[test]
    fn test_empty_message_is_alphabet_only() {
        assert_eq!(build_candidates(&inputs("")), letters("ABC"));
    }

    #[test]
    fn test_single_char_message_omits_speak() {
        let mut expected = letters("ABC");
        expected.extend([
            action(ControlAction::Undo),
            action(ControlAction::Clear),
            action(ControlAction::Space),
        ]);
        assert_eq!(build_candidates(&inputs("A")), expected);
    }

    #[test]
    fn test_longer_message_includes_speak_last() {
        let mut expected = letters("ABC");
        expected.extend(ControlAction::ALL.map(action));
        assert_eq!(build_candidates(&inputs("AB")), expected);
    }

    #[test]
    fn test_predictions_lead_and_letters_repeat() {
        let words = vec!["CAB".to_string()];
        let built = build_candidates(&CandidateInputs {
            predicted_letters: &['B'],
            predicted_words: &words,
            enable_prediction: true,
            prediction_ready: true,
            show_word_prediction: true,
            ..inputs("")
        });

        let mut expected = vec![CandidateItem::Word("CAB".into()), CandidateItem::Letter('B')];
        expected.extend(letters("ABC"));
        assert_eq!(built, expected);
    }

    #[test]
    fn test_words_hidden_when_display_off() {
        let words = vec!["CAB".to_string()];
        let built = build_candidates(&CandidateInputs {
            predicted_letters: &['C'],
            predicted_words: &words,
            enable_prediction: true,
            prediction_ready: true,
            show_word_prediction: false,
            ..inputs("")
        });
        assert_eq!(built[0], CandidateItem::Letter('C'));
        assert_eq!(built.len(), 4);
    }

    #[test]
    fn test_predictions_ignored_when_not_ready() {
        let built = build_candidates(&CandidateInputs {
            predicted_letters: &['C'],
            enable_prediction: true,
            prediction_ready: false,
            ..inputs("")
        });
        assert_eq!(built, letters("ABC"));
    }

    #[test]
    fn test_speak_moves_after_predictions() {
        let built = build_candidates(&CandidateInputs {
            predicted_letters: &['C'],
            enable_prediction: true,
            prediction_ready: true,
            speak_after_predictions: true,
            ..inputs("AB")
        });

        let mut expected = vec![CandidateItem::Letter('C'), action(ControlAction::Speak)];
        expected.extend(letters("ABC"));
        expected.extend([
            action(ControlAction::Undo),
            action(ControlAction::Clear),
            action(ControlAction::Space),
        ]);
        assert_eq!(built, expected);
    }

    #[test]
    fn test_speak_stays_last_when_nothing_predicted() {
        let built = build_candidates(&CandidateInputs {
            enable_prediction: true,
            prediction_ready: true,
            speak_after_predictions: true,
            ..inputs("AB")
        });
        assert_eq!(built[3], action(ControlAction::Speak));
        assert_eq!(built.len(), 7);
    }

    #[test]
    fn test_early_speak_needs_two_chars() {
        let built = build_candidates(&CandidateInputs {
            predicted_letters: &['C'],
            enable_prediction: true,
            prediction_ready: true,
            speak_after_predictions: true,
            ..inputs("A")
        });
        assert!(!built.contains(&action(ControlAction::Speak)));
    }

    #[test]
    fn test_game_mode_space_follows_alphabet() {
        let built = build_candidates(&CandidateInputs {
            game_mode: true,
            game_target_next_char: Some(' '),
            ..inputs("")
        });
        let mut expected = letters("ABC");
        expected.push(action(ControlAction::Space));
        assert_eq!(built, expected);
    }

    #[test]
    fn test_game_mode_letter_target_adds_nothing() {
        let built = build_candidates(&CandidateInputs {
            game_mode: true,
            game_target_next_char: Some('B'),
            ..inputs("")
        });
        assert_eq!(built, letters("ABC"));
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let words = vec!["BAC".to_string()];
        let input = CandidateInputs {
            predicted_letters: &['A'],
            predicted_words: &words,
            enable_prediction: true,
            prediction_ready: true,
            show_word_prediction: true,
            speak_after_predictions: true,
            ..inputs("CAB")
        };
        assert_eq!(build_candidates(&input), build_candidates(&input));
    }
}
