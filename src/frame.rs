//! Reference frames that dynamic bodies move in.
//!
//! A frame may be anchored to a massive body (star, planet, station) and may rotate with it.
//! Rotating frames always turn about their local Y axis and share the origin of a
//! non-rotating parent. Frames are read-only from the integrator's point of view; the
//! simulation loop owns and rebuilds them.

use std::sync::Arc;

use cgmath::EuclideanSpace;
use cgmath::Point3;
use cgmath::Quaternion;
use cgmath::Rad;
use cgmath::Rotation;
use cgmath::Rotation3;
use cgmath::Vector3;

use crate::atmosphere::{AtmosphereModel, AtmosphericState};

/// What kind of massive body anchors a frame.
#[derive(Debug)]
pub enum AnchorKind {
    Star,
    Planet {
        atmosphere: Option<Box<dyn AtmosphereModel>>,
    },
    SpaceStation,
}

/// The astronomical body a frame is attached to.
#[derive(Debug)]
pub struct FrameBody {
    name: String,
    mass: f64,
    kind: AnchorKind,
}

impl FrameBody {
    pub fn star(name: impl Into<String>, mass: f64) -> Self {
        Self {
            name: name.into(),
            mass,
            kind: AnchorKind::Star,
        }
    }

    pub fn planet(
        name: impl Into<String>,
        mass: f64,
        atmosphere: Option<Box<dyn AtmosphereModel>>,
    ) -> Self {
        Self {
            name: name.into(),
            mass,
            kind: AnchorKind::Planet { atmosphere },
        }
    }

    pub fn space_station(name: impl Into<String>, mass: f64) -> Self {
        Self {
            name: name.into(),
            mass,
            kind: AnchorKind::SpaceStation,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn kind(&self) -> &AnchorKind {
        &self.kind
    }

    pub fn is_space_station(&self) -> bool {
        matches!(self.kind, AnchorKind::SpaceStation)
    }

    pub fn is_planet(&self) -> bool {
        matches!(self.kind, AnchorKind::Planet { .. })
    }

    /// Air state at `distance` from the centre. `None` for anything that isn't a planet;
    /// planets without an atmosphere report vacuum.
    pub fn atmospheric_state(&self, distance: f64) -> Option<AtmosphericState> {
        match &self.kind {
            AnchorKind::Planet {
                atmosphere: Some(model),
            } => Some(model.atmospheric_state(distance)),
            AnchorKind::Planet { atmosphere: None } => Some(AtmosphericState::VACUUM),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct FrameRotation {
    ang_speed: f64,
    /// Current rotation about Y relative to the non-rotating parent.
    angle: f64,
    parent: Arc<Frame>,
}

#[derive(Debug)]
pub struct Frame {
    label: String,
    anchor: Option<Arc<FrameBody>>,
    rotation: Option<FrameRotation>,
}

impl Frame {
    /// Creates an inertial (non-rotating) frame.
    pub fn new(label: impl Into<String>, anchor: Option<Arc<FrameBody>>) -> Arc<Frame> {
        Arc::new(Frame {
            label: label.into(),
            anchor,
            rotation: None,
        })
    }

    /// Creates a frame co-rotating with `parent`'s anchor at `ang_speed` rad/s, currently
    /// turned `angle` radians about Y.
    pub fn new_rotating(
        label: impl Into<String>,
        parent: &Arc<Frame>,
        ang_speed: f64,
        angle: f64,
    ) -> Arc<Frame> {
        let parent = parent.non_rot_frame();
        Arc::new(Frame {
            label: label.into(),
            anchor: parent.anchor.clone(),
            rotation: Some(FrameRotation {
                ang_speed,
                angle,
                parent,
            }),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The body anchoring this frame, if any.
    pub fn body(&self) -> Option<&FrameBody> {
        self.anchor.as_deref()
    }

    pub fn is_rot_frame(&self) -> bool {
        self.rotation.is_some()
    }

    /// Angular speed about the local Y axis; zero for inertial frames.
    pub fn ang_speed(&self) -> f64 {
        self.rotation.as_ref().map_or(0.0, |r| r.ang_speed)
    }

    pub fn non_rot_frame(self: &Arc<Self>) -> Arc<Frame> {
        match &self.rotation {
            Some(rotation) => rotation.parent.clone(),
            None => self.clone(),
        }
    }

    /// Mass of the anchoring body, if the frame has one.
    pub fn system_body_mass(&self) -> Option<f64> {
        self.body().map(FrameBody::mass)
    }

    /// Orientation of this frame's basis expressed in the non-rotating parent.
    pub fn orient_in_non_rot(&self) -> Quaternion<f64> {
        match &self.rotation {
            Some(rotation) => Quaternion::from_axis_angle(Vector3::unit_y(), Rad(rotation.angle)),
            None => Quaternion::new(1.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn position_in_non_rot(&self, position: Point3<f64>) -> Point3<f64> {
        if !self.is_rot_frame() {
            return position;
        }
        Point3::from_vec(self.orient_in_non_rot().rotate_vector(position.to_vec()))
    }

    /// Velocity seen from the non-rotating parent, including the motion of the rotating basis.
    pub fn velocity_in_non_rot(
        &self,
        position: Point3<f64>,
        velocity: Vector3<f64>,
    ) -> Vector3<f64> {
        if !self.is_rot_frame() {
            return velocity;
        }
        let omega = Vector3::new(0.0, self.ang_speed(), 0.0);
        self.orient_in_non_rot()
            .rotate_vector(velocity + omega.cross(position.to_vec()))
    }
}
