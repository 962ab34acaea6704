use cgmath::EuclideanSpace;
use cgmath::InnerSpace;
use cgmath::Vector3;
use cgmath::Zero;

use crate::dynamic_body::DynamicBody;
use crate::gravity;

/// Velocities with a squared length below this have no usable direction.
const DRAG_DIRECTION_EPSILON_SQR: f64 = 1e-18;

fn normalized_or_zero(v: Vector3<f64>) -> Vector3<f64> {
    let len_sqr = v.magnitude2();
    if len_sqr < DRAG_DIRECTION_EPSILON_SQR {
        Vector3::zero()
    } else {
        v / len_sqr.sqrt()
    }
}

impl DynamicBody {
    /// Magnitude of the drag from the frame planet's atmosphere.
    ///
    /// Zero unless the frame rotates and is anchored to a planet. The "area" is the
    /// bounding radius, not a cross-section.
    pub fn calc_atmospheric_force(&self, drag_coefficient: f64) -> f64 {
        let Some(frame) = self.frame() else {
            return 0.0;
        };
        let Some(planet) = frame.body() else {
            return 0.0;
        };
        if !frame.is_rot_frame() {
            return 0.0;
        }
        let Some(state) = planet.atmospheric_state(self.position().to_vec().magnitude()) else {
            return 0.0;
        };

        let speed = self.velocity.magnitude();
        let area = self.body.clip_radius();
        0.5 * state.density * speed * speed * area * drag_coefficient
    }

    /// Recomputes gravity, drag and fictitious forces for the current frame, position and
    /// velocity. Does nothing for a body outside any frame.
    pub fn calc_external_force(&mut self) {
        let Some(frame) = self.frame().cloned() else {
            return;
        };
        let position = self.position().to_vec();

        // gravity
        self.external_force = match frame.body() {
            Some(anchor) if !anchor.is_space_station() => {
                gravity::force_toward_origin(position, self.mass, anchor.mass())
            }
            _ => Vector3::zero(),
        };
        self.gravity_force = self.external_force;

        // atmospheric drag
        let in_atmosphere = frame.is_rot_frame() && frame.body().is_some_and(|b| b.is_planet());
        if in_atmosphere {
            let drag_dir = -normalized_or_zero(self.velocity);
            let drag = drag_dir * self.calc_atmospheric_force(self.drag_coefficient);

            // let the drag grow by at most one g per step so high time
            // acceleration can't produce spikes
            let capped = self.atmos_force + drag_dir * self.mass;
            self.atmos_force = if drag.magnitude2() > capped.magnitude2() {
                capped
            } else {
                drag
            };
            self.external_force += self.atmos_force;
        } else {
            self.atmos_force = Vector3::zero();
        }

        // centrifugal and coriolis
        if frame.is_rot_frame() {
            let omega = Vector3::new(0.0, frame.ang_speed(), 0.0);
            self.external_force -= omega.cross(omega.cross(position)) * self.mass;
            self.external_force -= omega.cross(self.velocity) * (2.0 * self.mass);
        }
    }
}
