use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Landmarks per pose produced by the detector (MediaPipe pose topology).
pub const LANDMARK_COUNT: usize = 33;

pub const LEFT_EAR: usize = 7;
pub const RIGHT_EAR: usize = 8;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;

/// A detector keypoint in normalised frame coordinates (0–1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    pub fn midpoint(&self, other: &Landmark) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// 2D point used by the geometry code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SampleError {
    #[error("expected {expected} landmarks, got {actual}")]
    LandmarkCount { expected: usize, actual: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// One pose detected in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseSample {
    landmarks: Vec<Landmark>,
    timestamp_ms: u64,
}

impl PoseSample {
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: u64) -> Result<Self, SampleError> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(SampleError::LandmarkCount {
                expected: LANDMARK_COUNT,
                actual: landmarks.len(),
            });
        }
        if let Some(index) = landmarks
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(SampleError::NonFinite { index });
        }
        Ok(Self {
            landmarks,
            timestamp_ms,
        })
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp_ms
    }

    /// Midpoint of a left/right landmark pair.
    pub fn midpoint(&self, left: usize, right: usize) -> Point {
        self.landmarks[left].midpoint(&self.landmarks[right])
    }
}
