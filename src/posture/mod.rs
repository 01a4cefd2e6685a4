//! Posture analysis for a single detector frame.
//!
//! - `landmarks`: detector output types and the anchor indices we read
//! - `geometry`: cervical angle from ear/shoulder/hip midpoints
//! - `score`: angle → posture score mapping

pub mod geometry;
pub mod landmarks;
pub mod score;

use serde::{Deserialize, Serialize};

pub use geometry::cervical_angle;
pub use landmarks::{Landmark, PoseSample, SampleError};
pub use score::score_from_angle;

/// Per-frame posture reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureMetrics {
    pub posture_score: u8,
    /// Degrees, one decimal.
    pub cervical_angle: f64,
    pub is_person_detected: bool,
}

impl PostureMetrics {
    /// Reading for a frame without a person in it.
    pub const ABSENT: PostureMetrics = PostureMetrics {
        posture_score: 0,
        cervical_angle: 0.0,
        is_person_detected: false,
    };
}

impl Default for PostureMetrics {
    fn default() -> Self {
        Self::ABSENT
    }
}

/// Runs geometry and scoring for one frame. `None` means the detector found nobody.
pub fn analyze_sample(sample: Option<&PoseSample>) -> PostureMetrics {
    let Some(sample) = sample else {
        return PostureMetrics::ABSENT;
    };

    let angle = cervical_angle(
        sample.midpoint(landmarks::LEFT_EAR, landmarks::RIGHT_EAR),
        sample.midpoint(landmarks::LEFT_SHOULDER, landmarks::RIGHT_SHOULDER),
        sample.midpoint(landmarks::LEFT_HIP, landmarks::RIGHT_HIP),
    );

    PostureMetrics {
        posture_score: score_from_angle(angle),
        cervical_angle: round_tenths(angle),
        is_person_detected: true,
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
