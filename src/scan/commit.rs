//! Selection committer
//!
//! Applies a chosen candidate to the message and to the collaborators that
//! learn from it. The caller rebuilds the candidate list afterwards.

use tracing::{debug, info, warn};

use crate::prediction::Predictor;
use crate::speech::{SpeakOutcome, SpeechOutput};
use crate::store::{KeyValueStore, SessionLog};

use super::session::{CandidateItem, ControlAction};

/// Notice shown when no speech backend is available
pub const SPEECH_UNSUPPORTED_NOTICE: &str = "Speech is not supported on this system";

/// Notice shown when the speech backend failed to start
pub const SPEECH_FAILED_NOTICE: &str = "Speech could not be started";

/// Collaborators and buffers a commit may touch
pub struct CommitContext<'a> {
    pub message: &'a mut String,
    pub predictor: &'a mut dyn Predictor,
    pub speech: &'a mut dyn SpeechOutput,
    pub store: &'a mut dyn KeyValueStore,
    pub voice_id: Option<&'a str>,
}

/// Side results of a commit beyond the message change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitOutcome {
    /// Text handed to the speech backend
    pub spoken: Option<String>,
    /// User-visible, non-fatal notice
    pub notice: Option<String>,
}

/// Apply `candidate` to the message
pub fn commit(candidate: &CandidateItem, ctx: &mut CommitContext<'_>) -> CommitOutcome {
    let mut outcome = CommitOutcome::default();

    match candidate {
        CandidateItem::Letter(c) => ctx.message.push(*c),

        CandidateItem::Word(word) => {
            let completed = format!("{word} ");
            let keep = ctx.message.rfind(' ').map(|i| i + 1).unwrap_or(0);
            ctx.message.truncate(keep);
            ctx.message.push_str(&completed);

            ctx.predictor.add_to_context(&completed);
            if let Err(e) = SessionLog::append(ctx.store, &completed) {
                warn!(?e, "failed to append to session log");
            }
        }

        CandidateItem::Action(ControlAction::Space) => {
            ctx.message.push(' ');
            ctx.predictor.add_to_context(" ");
        }

        CandidateItem::Action(ControlAction::Undo) => {
            ctx.message.pop();
        }

        CandidateItem::Action(ControlAction::Clear) => {
            ctx.message.clear();
            ctx.predictor.reset_context();
        }

        CandidateItem::Action(ControlAction::Speak) => {
            if ctx.message.is_empty() {
                debug!("speak with empty message ignored");
                return outcome;
            }

            match ctx.speech.speak(ctx.message.as_str(), ctx.voice_id) {
                Ok(SpeakOutcome::Started) => {
                    info!(chars = ctx.message.chars().count(), voice = ?ctx.voice_id, "speaking message");
                    outcome.spoken = Some(ctx.message.clone());
                }
                Ok(SpeakOutcome::Unsupported) => {
                    outcome.notice = Some(SPEECH_UNSUPPORTED_NOTICE.to_string());
                }
                Err(e) => {
                    warn!(%e, "speech failed");
                    outcome.notice = Some(SPEECH_FAILED_NOTICE.to_string());
                }
            }
        }
    }

    outcome
}
