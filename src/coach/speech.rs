//! Speech delivery.
//!
//! One utterance in flight at a time: every new utterance cancels the one in
//! progress first. Synthesis failures are logged and dropped.

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech backend unavailable: {0}")]
    Unavailable(String),
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("speech interrupt failed: {0}")]
    Interrupt(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceKind {
    #[default]
    Female,
    Male,
}

impl std::str::FromStr for VoiceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(VoiceKind::Female),
            "male" => Ok(VoiceKind::Male),
            other => Err(format!("unknown voice '{other}'")),
        }
    }
}

/// The synthesis capability the coach speaks through.
pub trait SpeechBackend: Send + Sync {
    /// Stop whatever is currently being spoken.
    fn cancel(&self) -> Result<(), SpeechError>;
    /// Start speaking `text`. Returns once the utterance is queued.
    fn speak(&self, text: &str, voice: VoiceKind) -> Result<(), SpeechError>;
}

impl<T: SpeechBackend + ?Sized> SpeechBackend for Arc<T> {
    fn cancel(&self) -> Result<(), SpeechError> {
        (**self).cancel()
    }

    fn speak(&self, text: &str, voice: VoiceKind) -> Result<(), SpeechError> {
        (**self).speak(text, voice)
    }
}

/// Writes utterances to the log instead of a speaker.
#[derive(Debug, Default)]
pub struct LogSpeech;

impl SpeechBackend for LogSpeech {
    fn cancel(&self) -> Result<(), SpeechError> {
        Ok(())
    }

    fn speak(&self, text: &str, voice: VoiceKind) -> Result<(), SpeechError> {
        tracing::info!(?voice, text, "speaking");
        Ok(())
    }
}

/// Runs an external TTS program (e.g. `espeak`) per utterance. Cancelling kills
/// the running child.
#[derive(Debug)]
pub struct CommandSpeech {
    program: String,
    current: Mutex<Option<Child>>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            current: Mutex::new(None),
        }
    }

    fn voice_arg(voice: VoiceKind) -> &'static str {
        match voice {
            VoiceKind::Female => "en+f3",
            VoiceKind::Male => "en+m3",
        }
    }
}

impl SpeechBackend for CommandSpeech {
    fn cancel(&self) -> Result<(), SpeechError> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| SpeechError::Interrupt(e.to_string()))?;
        if let Some(mut child) = current.take() {
            if child
                .try_wait()
                .map_err(|e| SpeechError::Interrupt(e.to_string()))?
                .is_none()
            {
                child
                    .kill()
                    .map_err(|e| SpeechError::Interrupt(e.to_string()))?;
                let _ = child.wait();
            }
        }
        Ok(())
    }

    fn speak(&self, text: &str, voice: VoiceKind) -> Result<(), SpeechError> {
        let child = Command::new(&self.program)
            .arg("-v")
            .arg(Self::voice_arg(voice))
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => SpeechError::Unavailable(self.program.clone()),
                _ => SpeechError::Synthesis(e.to_string()),
            })?;

        let mut current = self
            .current
            .lock()
            .map_err(|e| SpeechError::Synthesis(e.to_string()))?;
        *current = Some(child);
        Ok(())
    }
}

/// Front door to the speech backend for the coaching code.
pub struct VoiceCoach<S> {
    backend: S,
    enabled: bool,
    voice: VoiceKind,
}

impl<S: SpeechBackend> VoiceCoach<S> {
    pub fn new(backend: S, enabled: bool, voice: VoiceKind) -> Self {
        Self {
            backend,
            enabled,
            voice,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_voice(&mut self, voice: VoiceKind) {
        self.voice = voice;
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Speak `text`, superseding anything still in flight. Returns whether the
    /// backend accepted the utterance.
    pub fn say(&self, text: &str) -> bool {
        if !self.enabled {
            return false;
        }

        if let Err(e) = self.backend.cancel() {
            tracing::debug!(error = %e, "speech cancel failed, continuing");
        }

        match self.backend.speak(text, self.voice) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, text, "speech failed");
                false
            }
        }
    }
}
