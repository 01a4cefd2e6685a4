//! Cervical angle estimation.
//!
//! The angle is measured at the shoulder midpoint between the vector to the ear
//! midpoint and the vector to the hip midpoint. An upright sitter is close to
//! 180°, forward head posture pulls the ear forward and closes the angle.

use super::landmarks::Point;

/// Returned when either vector collapses to zero length or the input is not
/// a finite point.
pub const NEUTRAL_ANGLE_DEG: f64 = 90.0;

/// Angle (degrees) at `shoulder` between `shoulder→ear` and `shoulder→hip`.
pub fn cervical_angle(ear: Point, shoulder: Point, hip: Point) -> f64 {
    let to_ear = (ear.x - shoulder.x, ear.y - shoulder.y);
    let to_hip = (hip.x - shoulder.x, hip.y - shoulder.y);

    let magnitude_ear = to_ear.0.hypot(to_ear.1);
    let magnitude_hip = to_hip.0.hypot(to_hip.1);
    let usable = |m: f64| m.is_finite() && m > 0.0;
    if !usable(magnitude_ear) || !usable(magnitude_hip) {
        return NEUTRAL_ANGLE_DEG;
    }

    // Normalise first so huge coordinates cannot overflow the dot product.
    let dot = (to_ear.0 / magnitude_ear) * (to_hip.0 / magnitude_hip)
        + (to_ear.1 / magnitude_ear) * (to_hip.1 / magnitude_hip);
    if !dot.is_finite() {
        return NEUTRAL_ANGLE_DEG;
    }

    dot.clamp(-1.0, 1.0).acos().to_degrees()
}
