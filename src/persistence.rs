//! Save/restore of the dynamic body state.
//!
//! The body writes its base section under `"body"` and its dynamics under `"dynamic_body"`:
//!
//! ```json
//! "dynamic_body": {
//!     "force": {"x": 0.0, "y": 0.0, "z": 0.0},
//!     "torque": {"x": 0.0, "y": 0.0, "z": 0.0},
//!     "vel": {"x": 0.0, "y": 0.0, "z": 0.0},
//!     "ang_vel": {"x": 0.0, "y": 0.0, "z": 0.0},
//!     "mass": "1000",
//!     "mass_radius": "12.5",
//!     "ang_inertia": "62500",
//!     "is_moving": true
//! }
//! ```
//!
//! Scalars are stored as shortest round-trip decimal strings, so a reload reproduces the
//! exact bits. Every field is required.

use std::sync::Arc;

use cgmath::Vector3;
use cgmath::Zero;
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dynamic_body::{AiError, DynamicBody};
use crate::error::{DynamicsError, Result};
use crate::features::FeatureSet;
use crate::frame::Frame;

#[derive(Serialize, Deserialize)]
struct DynamicBodyRecord {
    force: Vector3<f64>,
    torque: Vector3<f64>,
    vel: Vector3<f64>,
    ang_vel: Vector3<f64>,
    #[serde(with = "decimal_string")]
    mass: f64,
    #[serde(with = "decimal_string")]
    mass_radius: f64,
    #[serde(with = "decimal_string")]
    ang_inertia: f64,
    is_moving: bool,
}

impl DynamicBodyRecord {
    /// Mass and inertia must stay positive and finite; the integrator divides by them.
    fn check_mass_properties(&self) -> Result<()> {
        for (key, value) in [
            ("mass", self.mass),
            ("mass_radius", self.mass_radius),
            ("ang_inertia", self.ang_inertia),
        ] {
            if !(value.is_finite() && value > 0.0) {
                error!("saved game corrupt: '{key}' is {value}");
                return Err(DynamicsError::SavedGameCorrupt(format!(
                    "'{key}' must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// `f64` stored as a decimal string.
pub(crate) mod decimal_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.trim()
            .parse::<f64>()
            .map_err(|e| de::Error::custom(format!("bad number '{s}': {e}")))
    }
}

/// Pulls `key` out of a save object and decodes it, mapping every failure to a corrupt save.
pub(crate) fn section<T: DeserializeOwned>(json: &Value, key: &str) -> Result<T> {
    let value = json.get(key).ok_or_else(|| {
        error!("saved game corrupt: missing '{key}'");
        DynamicsError::SavedGameCorrupt(format!("missing '{key}'"))
    })?;
    T::deserialize(value).map_err(|e| {
        error!("saved game corrupt: '{key}': {e}");
        DynamicsError::SavedGameCorrupt(format!("'{key}': {e}"))
    })
}

impl DynamicBody {
    /// Writes the base body fields, then the `dynamic_body` section.
    pub fn save_to_json(&self, json: &mut Map<String, Value>) -> Result<()> {
        self.body.save_to_json(json)?;

        let record = DynamicBodyRecord {
            force: self.force,
            torque: self.torque,
            vel: self.velocity,
            ang_vel: self.angular_velocity,
            mass: self.mass,
            mass_radius: self.mass_radius,
            ang_inertia: self.angular_inertia,
            is_moving: self.is_moving,
        };
        json.insert("dynamic_body".to_string(), serde_json::to_value(record)?);
        Ok(())
    }

    /// Restores a body saved with [`DynamicBody::save_to_json`]. Frame labels are resolved
    /// against `frames`.
    ///
    /// Nothing is modified unless both sections decode. Autopilot status, deceleration and
    /// features are not persisted and come back at their defaults.
    pub fn load_from_json(&mut self, json: &Value, frames: &[Arc<Frame>]) -> Result<()> {
        let record: DynamicBodyRecord = section(json, "dynamic_body")?;
        record.check_mass_properties()?;
        let mut body = self.body.clone();
        body.load_from_json(json, frames)?;

        self.body = body;
        self.force = record.force;
        self.torque = record.torque;
        self.velocity = record.vel;
        self.angular_velocity = record.ang_vel;
        self.mass = record.mass;
        self.mass_radius = record.mass_radius;
        self.angular_inertia = record.ang_inertia;
        self.is_moving = record.is_moving;

        // frame-relative and not saved
        self.external_force = Vector3::zero();
        self.gravity_force = Vector3::zero();
        self.atmos_force = Vector3::zero();

        // step history belongs to whatever the body was doing before
        self.last_force = Vector3::zero();
        self.last_torque = Vector3::zero();
        self.previous_angular_displacement = Vector3::zero();
        self.previous_position = self.position();

        self.ai_message = AiError::None;
        self.decelerating = false;
        self.features = FeatureSet::default();

        debug!("{}: loaded, mass {}", self.label(), self.mass);
        Ok(())
    }

    /// Interpolation state isn't saved; start it afresh from the restored transform so a
    /// frame rendered before the first step shows the body where it was loaded.
    /// External forces are left for the first step to regenerate.
    pub fn post_load_fixup(&mut self) {
        self.previous_position = self.position();
        self.previous_angular_displacement = Vector3::zero();
    }
}
