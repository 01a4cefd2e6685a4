use serde::Serialize;

use crate::plant::{Badge, PlantMood};

pub const INITIAL_SCORE: f64 = 50.0;

/// Who last wrote the mirrored score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScoreSource {
    Live {
        #[serde(rename = "lastUpdateMs")]
        last_update_ms: u64,
    },
    Simulated,
}

/// Background copy of the session state. Only the monitor mutates it.
#[derive(Debug, Clone)]
pub struct SessionMirror {
    pub is_monitoring: bool,
    pub current_score: f64,
    pub plant_state: PlantMood,
    pub source: ScoreSource,
    /// Set by `startMonitoring`, cleared by `stopMonitoring`.
    pub drift_armed: bool,
    pub session_started_ms: Option<u64>,
    pub session_best: f64,
    wilting_latched: bool,
}

impl Default for SessionMirror {
    fn default() -> Self {
        Self {
            is_monitoring: false,
            current_score: INITIAL_SCORE,
            plant_state: PlantMood::Dormant,
            source: ScoreSource::Simulated,
            drift_armed: false,
            session_started_ms: None,
            session_best: 0.0,
            wilting_latched: false,
        }
    }
}

/// `getStatus` reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorStatus {
    pub is_monitoring: bool,
    pub current_score: f64,
    pub plant_state: PlantMood,
}

/// Everything a display surface needs, pushed over SSE.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorView {
    #[serde(flatten)]
    pub status: MirrorStatus,
    pub source: ScoreSource,
    pub badge: Badge,
}

impl SessionMirror {
    pub fn set_score(&mut self, score: f64) {
        self.current_score = clamp_score(score);
        self.refresh();
    }

    /// Recomputes the derived plant word.
    pub fn refresh(&mut self) {
        self.plant_state = PlantMood::derive(self.is_monitoring, self.current_score);
    }

    pub fn live_feed_active(&self, now_ms: u64, timeout_ms: u64) -> bool {
        match self.source {
            ScoreSource::Live { last_update_ms } => now_ms.saturating_sub(last_update_ms) < timeout_ms,
            ScoreSource::Simulated => false,
        }
    }

    /// Returns true exactly once per excursion below `threshold`.
    pub fn take_wilting_alert(&mut self, threshold: f64) -> bool {
        if self.current_score >= threshold {
            self.wilting_latched = false;
            return false;
        }
        if self.wilting_latched {
            return false;
        }
        self.wilting_latched = true;
        true
    }

    pub fn status(&self) -> MirrorStatus {
        MirrorStatus {
            is_monitoring: self.is_monitoring,
            current_score: self.current_score,
            plant_state: self.plant_state,
        }
    }

    pub fn view(&self) -> MirrorView {
        MirrorView {
            status: self.status(),
            source: self.source,
            badge: Badge::derive(self.is_monitoring, self.current_score),
        }
    }
}

/// Clamps into [0, 100]; non-finite input reads as 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
