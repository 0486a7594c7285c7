//! Speech output collaborator
//!
//! "Unsupported" is an ordinary outcome, not an error: the engine turns it
//! into a user-visible notice and carries on.

use std::io::ErrorKind;
use std::process::{Child, Command, Stdio};

use tracing::{debug, warn};

/// A voice the backend can speak with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub id: String,
    pub name: String,
}

/// Result of a speak request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// Speech was started
    Started,
    /// No speech backend on this system
    Unsupported,
}

/// Errors from a speech backend that does exist
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("failed to start speech command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Text-to-speech capability consumed by the engine
pub trait SpeechOutput: Send {
    /// Start speaking `text`, optionally with a specific voice
    fn speak(&mut self, text: &str, voice_id: Option<&str>) -> Result<SpeakOutcome, SpeechError>;

    /// Voices available for selection
    fn voices(&self) -> Vec<Voice>;
}

/// Backend for systems without speech
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSpeech;

impl SpeechOutput for NullSpeech {
    fn speak(&mut self, _text: &str, _voice_id: Option<&str>) -> Result<SpeakOutcome, SpeechError> {
        Ok(SpeakOutcome::Unsupported)
    }

    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }
}

/// Speaks by spawning an external TTS command (`espeak`-style CLI)
///
/// The command is invoked as `<program> [-v <voice>] <text>` and never
/// waited on; finished children are reaped on the next request.
pub struct CommandSpeech {
    program: String,
    voices: Vec<Voice>,
    children: Vec<Child>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            voices: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Advertise voices the command accepts via `-v`
    pub fn with_voices(mut self, voices: Vec<Voice>) -> Self {
        self.voices = voices;
        self
    }

    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl SpeechOutput for CommandSpeech {
    fn speak(&mut self, text: &str, voice_id: Option<&str>) -> Result<SpeakOutcome, SpeechError> {
        self.reap();

        let mut command = Command::new(&self.program);
        if let Some(voice) = voice_id {
            command.arg("-v").arg(voice);
        }
        command
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        match command.spawn() {
            Ok(child) => {
                debug!(program = %self.program, pid = child.id(), "speech started");
                self.children.push(child);
                Ok(SpeakOutcome::Started)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(program = %self.program, "speech command not found");
                Ok(SpeakOutcome::Unsupported)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_speech_is_unsupported() {
        let mut speech = NullSpeech;
        assert_eq!(speech.speak("HELLO", None).unwrap(), SpeakOutcome::Unsupported);
        assert!(speech.voices().is_empty());
    }

    #[test]
    fn test_missing_command_is_unsupported() {
        let mut speech = CommandSpeech::new("switch-scan-no-such-tts-binary");
        assert_eq!(speech.speak("HELLO", Some("en")).unwrap(), SpeakOutcome::Unsupported);
    }

    #[test]
    fn test_advertised_voices() {
        let speech = CommandSpeech::new("espeak").with_voices(vec![Voice {
            id: "en-gb".to_string(),
            name: "English (GB)".to_string(),
        }]);
        assert_eq!(speech.voices().len(), 1);
    }
}
