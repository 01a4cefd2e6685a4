//! Adaptive spoken coaching.
//!
//! - `feedback`: tier hysteresis and critical escalation
//! - `speech`: single-utterance speech delivery and backends

pub mod feedback;
pub mod speech;

use rand::seq::SliceRandom;
use rand::Rng;

pub use feedback::{Cue, FeedbackStateMachine, Tier};
pub use speech::{CommandSpeech, LogSpeech, SpeechBackend, SpeechError, VoiceCoach, VoiceKind};

pub const SESSION_START_PHRASE: &str = "Neural stride monitoring activated. I'll help you maintain healthy posture throughout your session.";

pub const BREAK_REMINDERS: [&str; 4] = [
    "Time for a quick break. Stand up and stretch for 30 seconds.",
    "You've been working hard. Take a moment to stretch your neck and shoulders.",
    "Break time! Roll your shoulders back and take a deep breath.",
    "Let's take a neural reset. Stand up and move around for a bit.",
];

pub fn session_end_phrase(duration_secs: u64, average_score: f64) -> String {
    format!(
        "Session complete. You worked for {} minutes with an average posture score of {}. Great effort!",
        duration_secs / 60,
        average_score.round() as i64
    )
}

pub fn break_reminder<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    BREAK_REMINDERS
        .choose(rng)
        .copied()
        .unwrap_or(BREAK_REMINDERS[0])
}

/// Praise for a good stretch of work, `None` when the average is too low to praise.
pub fn encouragement(average_score: f64) -> Option<&'static str> {
    if average_score >= 90.0 {
        Some("Outstanding work today! Your posture has been excellent.")
    } else if average_score >= 75.0 {
        Some("Great job maintaining good posture. Keep up the healthy habits.")
    } else if average_score >= 60.0 {
        Some("You're doing well, but there's room for improvement. Stay mindful of your posture.")
    } else {
        None
    }
}
