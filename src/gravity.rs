use cgmath::InnerSpace;
use cgmath::Vector3;
use cgmath::Zero;

pub const GRAVITATION_CONSTANT: f64 = 6.67430e-11;

/// Newtonian attraction felt by a mass at `offset` from an attracting mass.
///
/// `offset` points from the attractor to the attracted body, so the result points the
/// other way. A body sitting exactly on the attractor feels nothing.
pub fn force_toward_origin(offset: Vector3<f64>, m1: f64, m2: f64) -> Vector3<f64> {
    let distance_sqr = offset.magnitude2();
    if distance_sqr <= 0.0 {
        return Vector3::zero();
    }
    let inv_r_sqr = 1.0 / distance_sqr;
    let magnitude = GRAVITATION_CONSTANT * m1 * m2 * inv_r_sqr;
    -offset * inv_r_sqr.sqrt() * magnitude
}

/// Standard gravitational parameter `G * M`.
pub fn gravitational_parameter(mass: f64) -> f64 {
    GRAVITATION_CONSTANT * mass
}
