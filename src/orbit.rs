//! Two-body orbit elements from a position/velocity snapshot.

use std::f64::consts::PI;

use cgmath::InnerSpace;
use cgmath::Vector3;

use crate::gravity::gravitational_parameter;

/// Keplerian description of a trajectory around a central mass. Works for elliptic and
/// hyperbolic paths; `semi_major_axis` is negative for the latter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orbit {
    /// Gravitational parameter `G * M` of the central body.
    pub mu: f64,
    pub eccentricity: f64,
    pub eccentricity_vector: Vector3<f64>,
    pub semi_major_axis: f64,
    /// Angle in `[0, π]` between the angular momentum and the frame's +Y axis.
    ///
    /// Orbits in the XZ plane read 0 when they turn about +Y and π when they turn about
    /// -Y, so `r` along +X with `v` along +Z gives π. Polar orbits read π/2.
    pub inclination: f64,
    /// Orbital energy per unit mass.
    pub specific_energy: f64,
    /// Angular momentum per unit mass.
    pub angular_momentum: Vector3<f64>,
}

impl Orbit {
    /// `pos` and `vel` are relative to the central body in a non-rotating frame.
    /// `central_mass` must be positive.
    pub fn from_body_state(pos: Vector3<f64>, vel: Vector3<f64>, central_mass: f64) -> Orbit {
        let mu = gravitational_parameter(central_mass);
        let r = pos.magnitude();
        let h = pos.cross(vel);

        let specific_energy = 0.5 * vel.magnitude2() - mu / r;
        let eccentricity_vector = vel.cross(h) / mu - pos / r;
        let eccentricity = eccentricity_vector.magnitude();
        let semi_major_axis = -mu / (2.0 * specific_energy);

        let h_len = h.magnitude();
        let inclination = if h_len > 0.0 {
            (h.y / h_len).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        Orbit {
            mu,
            eccentricity,
            eccentricity_vector,
            semi_major_axis,
            inclination,
            specific_energy,
            angular_momentum: h,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.eccentricity < 1.0
    }

    /// Semi-latus rectum `h^2 / mu`.
    fn semi_latus_rectum(&self) -> f64 {
        self.angular_momentum.magnitude2() / self.mu
    }

    /// Closest approach to the centre.
    pub fn periapsis(&self) -> f64 {
        self.semi_latus_rectum() / (1.0 + self.eccentricity)
    }

    /// Furthest distance from the centre, if the orbit is closed.
    pub fn apoapsis(&self) -> Option<f64> {
        self.is_bound()
            .then(|| self.semi_latus_rectum() / (1.0 - self.eccentricity))
    }

    pub fn period(&self) -> Option<f64> {
        (self.is_bound() && self.semi_major_axis > 0.0)
            .then(|| 2.0 * PI * (self.semi_major_axis.powi(3) / self.mu).sqrt())
    }
}
