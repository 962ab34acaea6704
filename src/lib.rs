//! Rigid-body dynamics for free-flying bodies in a space simulation.
//!
//! A [`DynamicBody`] lives in a [`Frame`], accumulates forces from gameplay systems,
//! and is advanced one fixed tick at a time by a semi-implicit Euler integrator that adds
//! gravity, atmospheric drag and the fictitious forces of rotating frames.

pub mod atmosphere;
pub mod body;
pub mod collision;
pub mod config;
pub mod delta_v;
pub mod dynamic_body;
pub mod error;
pub mod external_force;
pub mod features;
pub mod frame;
pub mod gravity;
pub mod orbit;
pub mod persistence;

pub use atmosphere::{AtmosphereModel, AtmosphericState, LapseRateAtmosphere};
pub use body::Body;
pub use collision::{CollisionFlags, CollisionMesh, Counterpart, DamageSink};
pub use config::ScenarioConfig;
pub use delta_v::DeltaV;
pub use dynamic_body::{AiError, DynamicBody, DynamicKind, InterpTransform};
pub use error::{DynamicsError, Result};
pub use features::{Feature, FixedGuns, GunMount, Propulsion};
pub use frame::{AnchorKind, Frame, FrameBody};
pub use orbit::Orbit;
