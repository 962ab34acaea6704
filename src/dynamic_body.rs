//! Free-flying rigid body integrated with semi-implicit Euler.
//!
//! Each simulation tick runs in two phases. Gameplay systems (thrusters, AI, collision
//! response) first accumulate forces and torques through [`DynamicBody::add_force`] and
//! friends, then the simulation loop calls [`DynamicBody::time_step_update`] exactly once.
//! The integrator folds in the external force computed at the end of the previous step,
//! advances velocity before position, clears the accumulators and recomputes the external
//! force for the next tick.
//!
//! # Example
//! ```
//! use cgmath::Vector3;
//! use space_dynamics::DynamicBody;
//!
//! let mut body = DynamicBody::new("crate");
//! body.set_mass(1000.0);
//! for _ in 0..10 {
//!     body.add_force(Vector3::new(1000.0, 0.0, 0.0));
//!     body.time_step_update(0.1);
//! }
//! assert!((body.velocity().x - 1.0).abs() < 1e-12);
//! ```

use std::sync::Arc;

use cgmath::EuclideanSpace;
use cgmath::InnerSpace;
use cgmath::Point3;
use cgmath::Quaternion;
use cgmath::Rad;
use cgmath::Rotation;
use cgmath::Rotation3;
use cgmath::Vector3;
use cgmath::Zero;
use log::{debug, trace, warn};

use crate::body::Body;
use crate::collision::CollisionMesh;
use crate::error::{DynamicsError, Result};
use crate::features::{Feature, FeatureSet, FixedGuns, Propulsion};
use crate::frame::Frame;
use crate::orbit::Orbit;

/// Angular speeds at or below this are treated as "not rotating".
pub const ANGULAR_VELOCITY_EPSILON: f64 = 1e-16;

/// Drag coefficient of a smooth sphere.
pub const DEFAULT_DRAG_COEFF: f64 = 0.1;

/// Category of a dynamic body, used where behaviour differs per kind of object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DynamicKind {
    #[default]
    Generic,
    Ship,
    /// Fragile: takes collision damage no matter how small.
    CargoBody,
    /// About to detonate on contact.
    Missile,
}

/// Status reported by the autopilot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiError {
    #[default]
    None,
    GravTooHigh,
    RefStationTooFar,
    OrbitImpossible,
}

/// Blended transform for rendering between two physics steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpTransform {
    pub position: Point3<f64>,
    pub orientation: Quaternion<f64>,
}

#[derive(Debug, Clone)]
pub struct DynamicBody {
    pub(crate) body: Body,
    kind: DynamicKind,

    pub(crate) velocity: Vector3<f64>,
    pub(crate) angular_velocity: Vector3<f64>,
    pub(crate) mass: f64,
    pub(crate) mass_radius: f64,
    pub(crate) angular_inertia: f64,
    pub(crate) drag_coefficient: f64,

    // Accumulators, cleared after every step.
    pub(crate) force: Vector3<f64>,
    pub(crate) torque: Vector3<f64>,

    // Frame-relative; zeroed whenever the frame changes.
    pub(crate) external_force: Vector3<f64>,
    pub(crate) gravity_force: Vector3<f64>,
    pub(crate) atmos_force: Vector3<f64>,

    pub(crate) last_force: Vector3<f64>,
    pub(crate) last_torque: Vector3<f64>,

    pub(crate) is_moving: bool,
    pub(crate) previous_position: Point3<f64>,
    pub(crate) previous_angular_displacement: Vector3<f64>,

    pub(crate) features: FeatureSet,
    pub(crate) ai_message: AiError,
    pub(crate) decelerating: bool,
}

impl DynamicBody {
    /// A moving body at the origin with identity orientation, unit mass, unit inertia and
    /// unit mass radius.
    pub fn new(label: impl Into<String>) -> Self {
        let body = Body::new(label);
        let previous_position = body.position();
        Self {
            body,
            kind: DynamicKind::Generic,
            velocity: Vector3::zero(),
            angular_velocity: Vector3::zero(),
            mass: 1.0,
            mass_radius: 1.0,
            angular_inertia: 1.0,
            drag_coefficient: DEFAULT_DRAG_COEFF,
            force: Vector3::zero(),
            torque: Vector3::zero(),
            external_force: Vector3::zero(),
            gravity_force: Vector3::zero(),
            atmos_force: Vector3::zero(),
            last_force: Vector3::zero(),
            last_torque: Vector3::zero(),
            is_moving: true,
            previous_position,
            previous_angular_displacement: Vector3::zero(),
            features: FeatureSet::default(),
            ai_message: AiError::None,
            decelerating: false,
        }
    }

    /// Builder: set the body category.
    pub fn with_kind(mut self, kind: DynamicKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder: place the body in `frame` at `position`.
    pub fn with_frame(mut self, frame: Arc<Frame>, position: Point3<f64>) -> Self {
        self.set_frame(Some(frame));
        self.set_position(position);
        self.previous_position = position;
        self
    }

    pub fn kind(&self) -> DynamicKind {
        self.kind
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn label(&self) -> &str {
        self.body.label()
    }

    // -- Frame --

    pub fn frame(&self) -> Option<&Arc<Frame>> {
        self.body.frame()
    }

    /// Moves the body into another frame. Forces computed against the old frame are
    /// meaningless in the new one, so all external contributions are cleared.
    pub fn set_frame(&mut self, frame: Option<Arc<Frame>>) {
        self.body.set_frame(frame);
        self.external_force = Vector3::zero();
        self.gravity_force = Vector3::zero();
        self.atmos_force = Vector3::zero();
    }

    // -- Transform --

    pub fn position(&self) -> Point3<f64> {
        self.body.position()
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.body.set_position(position);
    }

    pub fn orientation(&self) -> Quaternion<f64> {
        self.body.orientation()
    }

    pub fn set_orientation(&mut self, orientation: Quaternion<f64>) {
        self.body.set_orientation(orientation);
    }

    pub fn set_clip_radius(&mut self, radius: f64) {
        self.body.set_clip_radius(radius);
    }

    pub fn previous_position(&self) -> Point3<f64> {
        self.previous_position
    }

    // -- Force accumulator --

    pub fn set_force(&mut self, f: Vector3<f64>) {
        self.force = f;
    }

    pub fn set_torque(&mut self, t: Vector3<f64>) {
        self.torque = t;
    }

    pub fn add_force(&mut self, f: Vector3<f64>) {
        self.force += f;
    }

    pub fn add_torque(&mut self, t: Vector3<f64>) {
        self.torque += t;
    }

    /// Adds a body-space force, rotated by the orientation at the time of the call.
    pub fn add_rel_force(&mut self, f: Vector3<f64>) {
        self.force += self.orientation().rotate_vector(f);
    }

    pub fn add_rel_torque(&mut self, t: Vector3<f64>) {
        self.torque += self.orientation().rotate_vector(t);
    }

    pub fn force(&self) -> Vector3<f64> {
        self.force
    }

    pub fn torque(&self) -> Vector3<f64> {
        self.torque
    }

    /// Force applied during the most recent step, including the external part.
    pub fn last_force(&self) -> Vector3<f64> {
        self.last_force
    }

    pub fn last_torque(&self) -> Vector3<f64> {
        self.last_torque
    }

    pub fn external_force(&self) -> Vector3<f64> {
        self.external_force
    }

    pub fn gravity_force(&self) -> Vector3<f64> {
        self.gravity_force
    }

    pub fn atmos_force(&self) -> Vector3<f64> {
        self.atmos_force
    }

    // -- Rates --

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn set_velocity(&mut self, v: Vector3<f64>) {
        self.velocity = v;
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, w: Vector3<f64>) {
        self.angular_velocity = w;
    }

    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.angular_velocity * self.angular_inertia
    }

    // -- Mass --

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn mass_radius(&self) -> f64 {
        self.mass_radius
    }

    pub fn angular_inertia(&self) -> f64 {
        self.angular_inertia
    }

    /// Sets the mass and derives the inertia of a solid sphere of radius `mass_radius`.
    ///
    /// # Panics
    /// Panics if `mass` is not positive and finite.
    pub fn set_mass(&mut self, mass: f64) {
        assert!(mass > 0.0 && mass.is_finite(), "mass must be positive and finite");
        self.mass = mass;
        self.angular_inertia = (2.0 / 5.0) * self.mass * self.mass_radius * self.mass_radius;
    }

    /// Spreads the mass over half the model's bounding sphere and re-derives inertia.
    pub fn set_mass_distribution_from_model(&mut self, mesh: &dyn CollisionMesh) {
        self.mass_radius = mesh.radius() * 0.5;
        self.set_mass(self.mass);
    }

    pub fn drag_coefficient(&self) -> f64 {
        self.drag_coefficient
    }

    pub fn set_drag_coefficient(&mut self, drag_coefficient: f64) {
        self.drag_coefficient = drag_coefficient;
    }

    // -- Transient state --

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    pub fn set_moving(&mut self, moving: bool) {
        self.is_moving = moving;
    }

    pub fn ai_message(&self) -> AiError {
        self.ai_message
    }

    pub fn set_ai_message(&mut self, message: AiError) {
        self.ai_message = message;
    }

    pub fn is_decelerating(&self) -> bool {
        self.decelerating
    }

    pub fn set_decelerating(&mut self, decelerating: bool) {
        self.decelerating = decelerating;
    }

    // -- Features --

    pub fn add_feature(&mut self, feature: Feature) {
        if self.features.add(feature) {
            debug!("{}: added {:?}", self.label(), feature);
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.has(feature)
    }

    pub fn propulsion(&self) -> Result<&Propulsion> {
        self.features
            .propulsion
            .as_ref()
            .ok_or(DynamicsError::MissingFeature(Feature::Propulsion))
    }

    pub fn propulsion_mut(&mut self) -> Result<&mut Propulsion> {
        self.features
            .propulsion
            .as_mut()
            .ok_or(DynamicsError::MissingFeature(Feature::Propulsion))
    }

    pub fn fixed_guns(&self) -> Result<&FixedGuns> {
        self.features
            .fixed_guns
            .as_ref()
            .ok_or(DynamicsError::MissingFeature(Feature::FixedGuns))
    }

    pub fn fixed_guns_mut(&mut self) -> Result<&mut FixedGuns> {
        self.features
            .fixed_guns
            .as_mut()
            .ok_or(DynamicsError::MissingFeature(Feature::FixedGuns))
    }

    /// Feeds the current thruster levels into the accumulators and burns the fuel for `dt`.
    /// The burned fuel comes off the body's mass.
    pub fn apply_propulsion(&mut self, dt: f64) -> Result<()> {
        let propulsion = self.propulsion_mut()?;
        let force = propulsion.linear_force();
        let torque = propulsion.angular_torque();
        let was_empty = propulsion.is_empty();
        let burned = propulsion.consume_fuel(dt);
        let now_empty = propulsion.is_empty();

        self.add_rel_force(force);
        self.add_rel_torque(torque);
        if burned > 0.0 && self.mass - burned > 0.0 {
            self.set_mass(self.mass - burned);
        }
        if now_empty && !was_empty {
            warn!("{}: out of fuel", self.label());
        }
        Ok(())
    }

    // -- Integration --

    /// Advances the body by `dt` seconds.
    pub fn time_step_update(&mut self, dt: f64) {
        self.previous_position = self.position();
        if !self.is_moving {
            self.previous_angular_displacement = Vector3::zero();
            return;
        }

        self.force += self.external_force;

        self.velocity += self.force * (dt / self.mass);
        self.angular_velocity += self.torque * (dt / self.angular_inertia);

        let len = self.angular_velocity.magnitude();
        if len > ANGULAR_VELOCITY_EPSILON {
            let axis = self.angular_velocity / len;
            let rotation = Quaternion::from_axis_angle(axis, Rad(len * dt));
            self.set_orientation((rotation * self.orientation()).normalize());
        }
        self.previous_angular_displacement = self.angular_velocity * dt;

        self.set_position(self.position() + self.velocity * dt);

        trace!(
            "{}: pos = {:?}, vel = {:?}, force = {:?}, external = {:?}",
            self.label(),
            self.position(),
            self.velocity,
            self.force,
            self.external_force
        );

        self.last_force = self.force;
        self.last_torque = self.torque;
        self.force = Vector3::zero();
        self.torque = Vector3::zero();

        // forces for the start of the next step
        self.calc_external_force();
    }

    /// Transform `alpha` of the way from the previous step to the current one.
    pub fn interpolated_transform(&self, alpha: f64) -> InterpTransform {
        let position = Point3::from_vec(
            self.position().to_vec() * alpha + self.previous_position.to_vec() * (1.0 - alpha),
        );

        let len = self.previous_angular_displacement.magnitude() * (1.0 - alpha);
        let orientation = if len > ANGULAR_VELOCITY_EPSILON {
            let axis = self.previous_angular_displacement.normalize();
            // rotate backwards
            (Quaternion::from_axis_angle(axis, Rad(-len)) * self.orientation()).normalize()
        } else {
            self.orientation()
        };

        InterpTransform {
            position,
            orientation,
        }
    }

    /// Stores the blended transform on the base body for the renderer.
    pub fn update_interp_transform(&mut self, alpha: f64) {
        let InterpTransform {
            position,
            orientation,
        } = self.interpolated_transform(alpha);
        self.body.set_interp_transform(position, orientation);
    }

    /// Orbit relative to the nearest non-rotating frame and its anchor.
    pub fn compute_orbit(&self) -> Result<Orbit> {
        let frame = self.frame().ok_or(DynamicsError::NoFrame)?;
        let non_rot = frame.non_rot_frame();
        let central_mass = non_rot
            .system_body_mass()
            .filter(|m| *m > 0.0)
            .ok_or(DynamicsError::NoCentralMass)?;

        let pos = frame.position_in_non_rot(self.position());
        let vel = frame.velocity_in_non_rot(self.position(), self.velocity);
        Ok(Orbit::from_body_state(pos.to_vec(), vel, central_mass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Sphere(f64);

    impl CollisionMesh for Sphere {
        fn radius(&self) -> f64 {
            self.0
        }
    }

    fn identity() -> Quaternion<f64> {
        Quaternion::new(1.0, 0.0, 0.0, 0.0)
    }

    #[test]
    fn new_body_defaults() {
        let body = DynamicBody::new("b");
        assert_eq!(body.mass(), 1.0);
        assert_eq!(body.angular_inertia(), 1.0);
        assert_eq!(body.mass_radius(), 1.0);
        assert_eq!(body.drag_coefficient(), DEFAULT_DRAG_COEFF);
        assert!(body.is_moving());
        assert_eq!(body.orientation(), identity());
        assert_eq!(body.ai_message(), AiError::None);
        assert!(!body.has_feature(Feature::Propulsion));
    }

    #[test]
    fn body_at_rest_stays_at_rest() {
        let mut body = DynamicBody::new("b");
        body.set_position(Point3::new(3.0, -4.0, 5.0));
        for dt in [0.001, 0.1, 1.0, 60.0] {
            body.time_step_update(dt);
        }
        assert_eq!(body.position(), Point3::new(3.0, -4.0, 5.0));
        assert_eq!(body.orientation(), identity());
        assert_eq!(body.velocity(), Vector3::zero());
        assert_eq!(body.angular_velocity(), Vector3::zero());
    }

    #[test]
    fn constant_force_accumulates_velocity() {
        let mut body = DynamicBody::new("b");
        body.set_mass(4.0);
        let f = Vector3::new(2.0, -1.0, 0.5);
        let dt = 0.05;
        let n = 20;
        for _ in 0..n {
            body.add_force(f);
            body.time_step_update(dt);
        }
        let expected = f * (n as f64 * dt / 4.0);
        assert_relative_eq!(body.velocity().x, expected.x, max_relative = 1e-12);
        assert_relative_eq!(body.velocity().y, expected.y, max_relative = 1e-12);
        assert_relative_eq!(body.velocity().z, expected.z, max_relative = 1e-12);
    }

    #[test]
    fn velocity_is_updated_before_position() {
        let mut body = DynamicBody::new("b");
        body.add_force(Vector3::new(1.0, 0.0, 0.0));
        body.time_step_update(1.0);
        assert_eq!(body.velocity(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(body.position(), Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn accumulators_are_cleared_after_step() {
        let mut body = DynamicBody::new("b");
        body.add_force(Vector3::new(1.0, 2.0, 3.0));
        body.add_torque(Vector3::new(0.0, 0.5, 0.0));
        body.time_step_update(0.1);
        assert_eq!(body.force(), Vector3::zero());
        assert_eq!(body.torque(), Vector3::zero());
        assert_eq!(body.last_force(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(body.last_torque(), Vector3::new(0.0, 0.5, 0.0));
    }

    #[test]
    fn set_force_replaces_pending_force() {
        let mut body = DynamicBody::new("b");
        body.add_force(Vector3::new(5.0, 0.0, 0.0));
        body.set_force(Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(body.force(), Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn relative_force_uses_orientation_at_call_time() {
        let mut body = DynamicBody::new("b");
        body.set_orientation(Quaternion::from_axis_angle(
            Vector3::unit_y(),
            Rad(std::f64::consts::FRAC_PI_2),
        ));
        body.add_rel_force(Vector3::new(1.0, 0.0, 0.0));
        body.set_orientation(identity());
        body.add_rel_force(Vector3::new(1.0, 0.0, 0.0));

        let f = body.force();
        assert_relative_eq!(f.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn inert_body_does_not_move() {
        let mut body = DynamicBody::new("b");
        body.set_moving(false);
        body.set_velocity(Vector3::new(10.0, 0.0, 0.0));
        body.add_force(Vector3::new(10.0, 0.0, 0.0));
        body.time_step_update(1.0);
        assert_eq!(body.position(), Point3::origin());
        assert_eq!(body.velocity(), Vector3::new(10.0, 0.0, 0.0));
        let interp = body.interpolated_transform(0.3);
        assert_eq!(interp.orientation, body.orientation());
    }

    #[test]
    fn tiny_angular_velocity_does_not_rotate() {
        let mut body = DynamicBody::new("b");
        body.set_angular_velocity(Vector3::new(0.0, 1e-17, 0.0));
        body.time_step_update(0.1);
        assert_eq!(body.orientation(), identity());
    }

    #[test]
    fn small_angular_velocity_rotates() {
        let mut body = DynamicBody::new("b");
        body.set_angular_velocity(Vector3::new(0.0, 1e-10, 0.0));
        body.time_step_update(0.1);
        assert_ne!(body.orientation(), identity());
    }

    #[test]
    fn torque_spins_up_about_its_axis() {
        let mut body = DynamicBody::new("b");
        body.set_mass(10.0);
        let inertia = body.angular_inertia();
        body.add_torque(Vector3::new(0.0, 0.0, 2.0));
        body.time_step_update(0.5);
        assert_relative_eq!(body.angular_velocity().z, 2.0 * 0.5 / inertia);
        let expected =
            Quaternion::from_axis_angle(Vector3::unit_z(), Rad(body.angular_velocity().z * 0.5));
        assert_relative_eq!(body.orientation().s, expected.s, epsilon = 1e-12);
        assert_relative_eq!(body.orientation().v.z, expected.v.z, epsilon = 1e-12);
    }

    #[test]
    fn set_mass_uses_solid_sphere_inertia() {
        let mut body = DynamicBody::new("b");
        body.set_mass_distribution_from_model(&Sphere(6.0));
        assert_eq!(body.mass_radius(), 3.0);
        for m in [0.5, 1.0, 1234.5, 7.0e6] {
            body.set_mass(m);
            assert_eq!(body.angular_inertia(), (2.0 / 5.0) * m * 3.0 * 3.0);
        }
    }

    #[test]
    #[should_panic(expected = "mass must be positive")]
    fn zero_mass_is_rejected() {
        DynamicBody::new("b").set_mass(0.0);
    }

    #[test]
    fn interpolation_endpoints_are_exact() {
        let mut body = DynamicBody::new("b");
        body.set_position(Point3::new(0.1, 0.2, 0.3));
        body.set_velocity(Vector3::new(1.7, -3.3, 9.1));
        body.set_angular_velocity(Vector3::new(0.3, 0.2, 0.1));
        body.time_step_update(0.016);

        let start = body.interpolated_transform(0.0);
        let end = body.interpolated_transform(1.0);
        assert_eq!(start.position, body.previous_position());
        assert_eq!(end.position, body.position());
        assert_eq!(end.orientation, body.orientation());
        assert_relative_eq!(start.orientation.s, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn update_interp_transform_writes_base_body() {
        let mut body = DynamicBody::new("b");
        body.set_velocity(Vector3::new(2.0, 0.0, 0.0));
        body.time_step_update(1.0);
        body.update_interp_transform(0.25);
        assert_eq!(body.body().interp_position(), Point3::new(0.5, 0.0, 0.0));
        // read-only with respect to the simulated state
        assert_eq!(body.position(), Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn missing_feature_accessors_fail() {
        let mut body = DynamicBody::new("b");
        assert!(matches!(
            body.propulsion(),
            Err(DynamicsError::MissingFeature(Feature::Propulsion))
        ));
        assert!(matches!(
            body.fixed_guns_mut(),
            Err(DynamicsError::MissingFeature(Feature::FixedGuns))
        ));
        body.add_feature(Feature::FixedGuns);
        assert!(body.fixed_guns().is_ok());
    }

    #[test]
    fn propulsion_pushes_along_body_axes_and_burns_mass() {
        let mut body = DynamicBody::new("ship").with_kind(DynamicKind::Ship);
        body.set_mass(1000.0);
        body.features.propulsion = Some(Propulsion::new(500.0, 0.0, 250.0, 100.0));
        body.set_orientation(Quaternion::from_axis_angle(
            Vector3::unit_y(),
            Rad(std::f64::consts::PI),
        ));
        body.propulsion_mut()
            .unwrap()
            .set_linear_thruster_state(Vector3::new(0.0, 0.0, -1.0));

        body.apply_propulsion(1.0).unwrap();
        // body -Z turned half a revolution about Y points along world +Z
        assert_relative_eq!(body.force().z, 500.0, epsilon = 1e-9);
        // 500 N at 250 m/s burns 2 kg per second
        assert_relative_eq!(body.mass(), 998.0);
        assert_relative_eq!(body.propulsion().unwrap().fuel_mass(), 98.0);
    }

    #[test]
    fn orbit_needs_a_frame() {
        let body = DynamicBody::new("b");
        assert!(matches!(body.compute_orbit(), Err(DynamicsError::NoFrame)));
        let body = DynamicBody::new("b")
            .with_frame(Frame::new("deep space", None), Point3::new(1.0, 0.0, 0.0));
        assert!(matches!(body.compute_orbit(), Err(DynamicsError::NoCentralMass)));
    }
}
