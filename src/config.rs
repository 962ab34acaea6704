//! Scenario configuration for the simulation driver.

use std::fs;
use std::path::Path;

use log::error;
use serde::{Deserialize, Serialize};

use crate::error::{DynamicsError, Result};

/// A single ship in orbit around a planet, stepped at a fixed rate.
///
/// Every field has a default, so a config file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seconds per physics tick.
    pub time_step: f64,
    pub ticks: u32,
    pub central_mass: f64,
    pub central_radius: f64,
    /// Planet rotation in rad/s. Zero simulates in an inertial frame.
    pub frame_ang_speed: f64,
    /// Surface density of the planet's air; zero for no atmosphere.
    pub surface_density: f64,
    pub surface_temperature: f64,
    pub ship_mass: f64,
    pub ship_bounding_radius: f64,
    pub initial_position: [f64; 3],
    pub initial_velocity: [f64; 3],
    pub drag_coefficient: f64,
    pub linear_thrust: f64,
    pub exhaust_velocity: f64,
    pub fuel_tank_mass: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            time_step: 1.0 / 60.0,
            ticks: 6000,
            central_mass: 5.972e24,
            central_radius: 6.371e6,
            frame_ang_speed: 0.0,
            surface_density: 1.225,
            surface_temperature: 288.0,
            ship_mass: 20_000.0,
            ship_bounding_radius: 25.0,
            initial_position: [6.771e6, 0.0, 0.0],
            initial_velocity: [0.0, 0.0, 7_670.0],
            drag_coefficient: crate::dynamic_body::DEFAULT_DRAG_COEFF,
            linear_thrust: 2.0e5,
            exhaust_velocity: 3_500.0,
            fuel_tank_mass: 5_000.0,
        }
    }
}

impl ScenarioConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ScenarioConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.time_step > 0.0, "time_step must be positive"),
            (self.central_mass > 0.0, "central_mass must be positive"),
            (self.central_radius > 0.0, "central_radius must be positive"),
            (self.ship_mass > 0.0, "ship_mass must be positive"),
            (self.ship_bounding_radius > 0.0, "ship_bounding_radius must be positive"),
            (self.fuel_tank_mass >= 0.0, "fuel_tank_mass must not be negative"),
            (
                self.fuel_tank_mass < self.ship_mass,
                "fuel_tank_mass must be less than ship_mass",
            ),
            (self.exhaust_velocity > 0.0, "exhaust_velocity must be positive"),
        ];
        for (ok, reason) in checks {
            if !ok {
                error!("bad scenario config: {reason}");
                return Err(DynamicsError::Config(reason.to_string()));
            }
        }
        Ok(())
    }
}
