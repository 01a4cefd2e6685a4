//! Cervical angle → posture score.
//!
//! Eight contiguous bands. Each band has the form
//! `anchor - round((edge - angle) * slope)`, where `anchor` is the score at the
//! band's upper edge and `slope` carries the band down to the next band's
//! anchor at its lower edge, so neighbouring bands meet exactly:
//!
//! | angle        | anchor | slope |
//! |--------------|--------|-------|
//! | ≥ 170        | 100    | -     |
//! | [165, 170)   | 100    | 3     |
//! | [160, 165)   | 85     | 3     |
//! | [150, 160)   | 70     | 2     |
//! | [140, 150)   | 50     | 2     |
//! | [130, 140)   | 30     | 1     |
//! | [120, 130)   | 20     | 1     |
//! | < 120        | 10     | 0.5   |

/// `(lower_edge, upper_edge, anchor_score, slope)`, highest band first.
const BANDS: [(f64, f64, f64, f64); 7] = [
    (165.0, 170.0, 100.0, 3.0),
    (160.0, 165.0, 85.0, 3.0),
    (150.0, 160.0, 70.0, 2.0),
    (140.0, 150.0, 50.0, 2.0),
    (130.0, 140.0, 30.0, 1.0),
    (120.0, 130.0, 20.0, 1.0),
    (f64::NEG_INFINITY, 120.0, 10.0, 0.5),
];

pub const FULL_SCORE_ANGLE: f64 = 170.0;

/// Band edges, useful for continuity checks.
pub const BAND_EDGES: [f64; 7] = [170.0, 165.0, 160.0, 150.0, 140.0, 130.0, 120.0];

/// Maps a cervical angle in degrees to a 0–100 score. Non-increasing as the
/// angle decreases; NaN scores 0.
pub fn score_from_angle(angle: f64) -> u8 {
    if angle.is_nan() {
        return 0;
    }
    if angle >= FULL_SCORE_ANGLE {
        return 100;
    }

    let raw = BANDS
        .iter()
        .find(|(lower, _, _, _)| angle >= *lower)
        .map(|&(_, upper, anchor, slope)| anchor - ((upper - angle) * slope).round())
        .unwrap_or(0.0);

    raw.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upright_range_is_full_score() {
        for angle in [170.0, 171.5, 179.9, 180.0] {
            assert_eq!(score_from_angle(angle), 100, "angle {angle}");
        }
    }

    #[test]
    fn band_anchors() {
        assert_eq!(score_from_angle(165.0), 85);
        assert_eq!(score_from_angle(160.0), 70);
        assert_eq!(score_from_angle(150.0), 50);
        assert_eq!(score_from_angle(140.0), 30);
        assert_eq!(score_from_angle(130.0), 20);
        assert_eq!(score_from_angle(120.0), 10);
        assert_eq!(score_from_angle(100.0), 0);
    }

    #[test]
    fn interior_values() {
        assert_eq!(score_from_angle(155.0), 60);
        assert_eq!(score_from_angle(145.5), 41);
        assert_eq!(score_from_angle(110.0), 5);
        assert_eq!(score_from_angle(167.0), 91);
        assert_eq!(score_from_angle(135.0), 25);
    }

    #[test]
    fn extreme_slouch_floors_at_zero() {
        assert_eq!(score_from_angle(40.0), 0);
        assert_eq!(score_from_angle(0.0), 0);
        assert_eq!(score_from_angle(-15.0), 0);
    }

    #[test]
    fn nan_scores_zero() {
        assert_eq!(score_from_angle(f64::NAN), 0);
    }

    #[test]
    fn edges_meet_their_neighbours() {
        for edge in BAND_EDGES {
            let at = score_from_angle(edge) as i32;
            let below = score_from_angle(edge - 1e-9) as i32;
            assert!((at - below).abs() <= 1, "edge {edge}: {at} vs {below}");
        }
    }

    #[test]
    fn sweep_is_non_increasing() {
        let mut previous = score_from_angle(180.0);
        let mut angle = 180.0;
        while angle > 0.0 {
            angle -= 0.05;
            let score = score_from_angle(angle);
            assert!(score <= previous, "score rose at {angle}: {previous} -> {score}");
            previous = score;
        }
    }
}
