//! Closed-form collision risk heuristic

use v2v_core::Observation;

/// Time-to-collision below which risk is driven by TTC (seconds)
pub const TTC_THRESHOLD_SECS: f64 = 2.0;
/// Gap below which risk grows linearly as the vehicles close (meters)
pub const SAFE_DISTANCE_M: f64 = 30.0;

/// Collision risk in [0, 1] from distance and closing speed.
///
/// Independent of any learned values.
pub fn evaluate_collision_risk(observation: &Observation) -> f64 {
    collision_risk(observation.distance(), observation.relative_speed())
}

/// Risk from a raw gap (meters) and closing speed (m/s)
pub fn collision_risk(distance: f64, relative_speed: f64) -> f64 {
    if distance <= 0.0 {
        return 1.0;
    }

    if relative_speed > 0.0 {
        let ttc = distance / relative_speed;
        if ttc < TTC_THRESHOLD_SECS {
            return (1.0 - ttc / TTC_THRESHOLD_SECS).clamp(0.0, 1.0);
        }
    }

    if distance < SAFE_DISTANCE_M {
        return (1.0 - distance / SAFE_DISTANCE_M).clamp(0.0, 1.0);
    }

    0.0
}

/// Time-to-collision in seconds, if the vehicles are closing
pub fn time_to_collision(observation: &Observation) -> Option<f64> {
    let relative_speed = observation.relative_speed();
    (relative_speed > 0.0 && observation.distance() > 0.0)
        .then(|| observation.distance() / relative_speed)
}
