//! Events module for scan engine transitions
//!
//! Provides structured event types for scanning, commits, hold zones and
//! collaborator notices. Renderers and audio-cue players subscribe to these.

use serde::{Deserialize, Serialize};

/// Hold duration band reached during a single-switch press
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldZone {
    Short,
    Long,
}

/// Audio cues the engine asks the cue player to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    ShortHold,
    LongHold,
}

/// Events emitted by the scan engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Auto-scan started
    ScanStarted,

    /// Auto-scan stopped
    ScanStopped,

    /// Highlight moved
    IndexAdvanced {
        /// New highlighted index
        index: usize,
    },

    /// Candidate list replaced and index reset to 0
    CandidatesRebuilt {
        /// Number of candidates in the new list
        count: usize,
    },

    /// A candidate was applied to the message
    Committed {
        /// Label of the committed candidate
        candidate: String,
        /// Message after the commit
        message: String,
    },

    /// A hold crossed into a new zone
    HoldZoneEntered { zone: HoldZone },

    /// Hold progress towards the long zone
    HoldProgress {
        /// 0..=100
        percent: u8,
    },

    /// Play an audio cue
    AudioCue { cue: AudioCue },

    /// Non-fatal user-visible notice
    Notice { message: String },

    /// Message handed to the speech collaborator
    SpeechRequested { text: String },

    /// Game mode target phrase typed correctly
    GamePhraseCompleted { phrase: String },

    /// Input was suspended or resumed (e.g. overlay opened)
    InputEnabledChanged { enabled: bool },
}

impl std::fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanEvent::ScanStarted => write!(f, "SCAN_STARTED"),
            ScanEvent::ScanStopped => write!(f, "SCAN_STOPPED"),
            ScanEvent::IndexAdvanced { index } => write!(f, "INDEX_ADVANCED ({})", index),
            ScanEvent::CandidatesRebuilt { count } => {
                write!(f, "CANDIDATES_REBUILT ({} items)", count)
            }
            ScanEvent::Committed { candidate, .. } => write!(f, "COMMITTED ({})", candidate),
            ScanEvent::HoldZoneEntered { zone } => write!(f, "HOLD_ZONE_ENTERED ({:?})", zone),
            ScanEvent::HoldProgress { percent } => write!(f, "HOLD_PROGRESS ({}%)", percent),
            ScanEvent::AudioCue { cue } => write!(f, "AUDIO_CUE ({:?})", cue),
            ScanEvent::Notice { message } => write!(f, "NOTICE ({})", message),
            ScanEvent::SpeechRequested { .. } => write!(f, "SPEECH_REQUESTED"),
            ScanEvent::GamePhraseCompleted { phrase } => {
                write!(f, "GAME_PHRASE_COMPLETED ({})", phrase)
            }
            ScanEvent::InputEnabledChanged { enabled } => {
                write!(f, "INPUT_ENABLED_CHANGED ({})", enabled)
            }
        }
    }
}
