//! Spoken-feedback decisions.
//!
//! A tier (good / fair / poor) is derived from every score. The machine speaks
//! only when the tier changes, and never for the very first sample of a
//! session. A separate counter escalates after five consecutive critical
//! samples, independent of the tier logic.

use serde::Serialize;

pub const GOOD_TIER_MIN: u8 = 75;
pub const FAIR_TIER_MIN: u8 = 50;
/// Scores below this count toward critical escalation.
pub const CRITICAL_SCORE: u8 = 35;
/// Consecutive critical samples that trigger escalation.
pub const CRITICAL_STREAK: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Good,
    Fair,
    Poor,
}

impl Tier {
    pub fn from_score(score: u8) -> Self {
        if score >= GOOD_TIER_MIN {
            Tier::Good
        } else if score >= FAIR_TIER_MIN {
            Tier::Fair
        } else {
            Tier::Poor
        }
    }
}

/// Something the coach should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Declining,
    Improving,
    NeedsAdjustment,
    Excellent,
    Critical,
}

impl Cue {
    pub fn phrase(self) -> &'static str {
        match self {
            Cue::Declining => "Your posture is declining. Sit up straighter.",
            Cue::Improving => "Better! Keep improving.",
            Cue::NeedsAdjustment => "Your posture needs adjustment.",
            Cue::Excellent => "Excellent posture! Well done.",
            Cue::Critical => "Critical! Your posture needs immediate correction.",
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct FeedbackStateMachine {
    /// `None` until the first sample of the session.
    previous: Option<Tier>,
    critical_count: u32,
}

impl FeedbackStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_tier(&self) -> Option<Tier> {
        self.previous
    }

    pub fn critical_count(&self) -> u32 {
        self.critical_count
    }

    /// Feeds one score and returns the cues to speak, in order (at most two).
    pub fn evaluate(&mut self, score: u8) -> Vec<Cue> {
        let mut cues = Vec::with_capacity(2);
        let current = Tier::from_score(score);

        match self.previous {
            None => {
                tracing::debug!(?current, "first sample, recording tier silently");
            }
            Some(previous) if previous != current => {
                if let Some(cue) = transition_cue(previous, current) {
                    cues.push(cue);
                }
                tracing::debug!(?previous, ?current, "tier changed");
            }
            Some(_) => {}
        }
        self.previous = Some(current);

        if score < CRITICAL_SCORE {
            self.critical_count += 1;
            if self.critical_count == CRITICAL_STREAK {
                tracing::info!(score, "critical posture streak");
                cues.push(Cue::Critical);
                self.critical_count = 0;
            }
        } else {
            self.critical_count = 0;
        }

        cues
    }

    /// Forget the session: the next sample is treated as the first again.
    pub fn reset(&mut self) {
        self.previous = None;
        self.critical_count = 0;
    }
}

fn transition_cue(previous: Tier, current: Tier) -> Option<Cue> {
    match (previous, current) {
        (_, Tier::Poor) => Some(Cue::Declining),
        (Tier::Poor, Tier::Fair) => Some(Cue::Improving),
        (_, Tier::Fair) => Some(Cue::NeedsAdjustment),
        (Tier::Good, Tier::Good) => None,
        (_, Tier::Good) => Some(Cue::Excellent),
    }
}
