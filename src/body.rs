//! Base transform shared by everything placed in a frame.

use std::sync::Arc;

use cgmath::EuclideanSpace;
use cgmath::Point3;
use cgmath::Quaternion;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DynamicsError, Result};
use crate::frame::Frame;
use crate::persistence::{decimal_string, section};

/// Position and orientation of a body within its frame, plus the interpolated copy the
/// renderer reads.
#[derive(Debug, Clone)]
pub struct Body {
    label: String,
    frame: Option<Arc<Frame>>,
    position: Point3<f64>,
    orientation: Quaternion<f64>,
    phys_radius: f64,
    clip_radius: f64,
    interp_position: Point3<f64>,
    interp_orientation: Quaternion<f64>,
}

#[derive(Serialize, Deserialize)]
struct BodyRecord {
    label: String,
    frame: Option<String>,
    pos: Point3<f64>,
    orient: Quaternion<f64>,
    #[serde(with = "decimal_string")]
    phys_radius: f64,
    #[serde(with = "decimal_string")]
    clip_radius: f64,
}

impl Body {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            frame: None,
            position: Point3::origin(),
            orientation: identity(),
            phys_radius: 1.0,
            clip_radius: 1.0,
            interp_position: Point3::origin(),
            interp_orientation: identity(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn frame(&self) -> Option<&Arc<Frame>> {
        self.frame.as_ref()
    }

    pub fn set_frame(&mut self, frame: Option<Arc<Frame>>) {
        debug!(
            "{}: frame {} -> {}",
            self.label,
            self.frame.as_ref().map_or("<none>", |f| f.label()),
            frame.as_ref().map_or("<none>", |f| f.label()),
        );
        self.frame = frame;
    }

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    pub fn orientation(&self) -> Quaternion<f64> {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Quaternion<f64>) {
        self.orientation = orientation;
    }

    pub fn phys_radius(&self) -> f64 {
        self.phys_radius
    }

    pub fn set_phys_radius(&mut self, radius: f64) {
        self.phys_radius = radius;
    }

    /// Bounding radius of the body's model.
    pub fn clip_radius(&self) -> f64 {
        self.clip_radius
    }

    pub fn set_clip_radius(&mut self, radius: f64) {
        self.clip_radius = radius;
    }

    pub fn interp_position(&self) -> Point3<f64> {
        self.interp_position
    }

    pub fn interp_orientation(&self) -> Quaternion<f64> {
        self.interp_orientation
    }

    pub(crate) fn set_interp_transform(
        &mut self,
        position: Point3<f64>,
        orientation: Quaternion<f64>,
    ) {
        self.interp_position = position;
        self.interp_orientation = orientation;
    }

    pub fn save_to_json(&self, json: &mut Map<String, Value>) -> Result<()> {
        let record = BodyRecord {
            label: self.label.clone(),
            frame: self.frame.as_ref().map(|f| f.label().to_string()),
            pos: self.position,
            orient: self.orientation,
            phys_radius: self.phys_radius,
            clip_radius: self.clip_radius,
        };
        json.insert("body".to_string(), serde_json::to_value(record)?);
        Ok(())
    }

    /// Restores the base section. The frame label is resolved against `frames`.
    pub fn load_from_json(&mut self, json: &Value, frames: &[Arc<Frame>]) -> Result<()> {
        let record: BodyRecord = section(json, "body")?;
        let frame = match &record.frame {
            Some(label) => Some(
                frames
                    .iter()
                    .find(|f| f.label() == label)
                    .cloned()
                    .ok_or_else(|| {
                        DynamicsError::SavedGameCorrupt(format!("unknown frame '{label}'"))
                    })?,
            ),
            None => None,
        };

        self.label = record.label;
        self.frame = frame;
        self.position = record.pos;
        self.orientation = record.orient;
        self.phys_radius = record.phys_radius;
        self.clip_radius = record.clip_radius;
        self.interp_position = record.pos;
        self.interp_orientation = record.orient;
        Ok(())
    }
}

pub(crate) fn identity() -> Quaternion<f64> {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}
