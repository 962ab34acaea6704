//! Atmosphere models queried by the drag calculation.

use std::fmt;

use log::error;

use crate::error::{DynamicsError, Result};
use crate::gravity::GRAVITATION_CONSTANT;

const SPECIFIC_HEAT_AIR_CP: f64 = 1000.5; // J/(kg K)
const AIR_MOLAR_MASS: f64 = 0.02897; // kg/mol
const GAS_CONSTANT_R: f64 = 8.3144621; // J/(mol K)
const PA_PER_ATMOS: f64 = 101325.0;

/// Pressure (atmospheres) and density (kg/m^3) at some point in an atmosphere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AtmosphericState {
    pub pressure: f64,
    pub density: f64,
}

impl AtmosphericState {
    pub const VACUUM: AtmosphericState = AtmosphericState {
        pressure: 0.0,
        density: 0.0,
    };
}

/// Something that can report the state of the air at a radial distance from a planet's centre.
pub trait AtmosphereModel: fmt::Debug {
    fn atmospheric_state(&self, distance: f64) -> AtmosphericState;
}

/// Troposphere-style model: temperature falls linearly with height at `g / cp`.
#[derive(Debug, Clone, PartialEq)]
pub struct LapseRateAtmosphere {
    planet_radius: f64,
    surface_gravity: f64,
    surface_temperature: f64,
    surface_density: f64,
    surface_pressure: f64,
    outer_limit: f64,
}

impl LapseRateAtmosphere {
    /// Builds the model for a planet of `planet_mass` kg and `planet_radius` m.
    ///
    /// `outer_limit` is the atmosphere's outer radius as a multiple of the planet radius;
    /// beyond it the model reports vacuum.
    pub fn new(
        planet_mass: f64,
        planet_radius: f64,
        surface_temperature: f64,
        surface_density: f64,
        outer_limit: f64,
    ) -> Result<Self> {
        let checks = [
            (planet_mass > 0.0, "planet mass must be positive"),
            (planet_radius > 0.0, "planet radius must be positive"),
            (surface_temperature > 0.0, "surface temperature must be positive"),
            (surface_density >= 0.0, "surface density must not be negative"),
            (outer_limit >= 1.0, "outer limit must be at least one planet radius"),
        ];
        for (ok, reason) in checks {
            if !ok {
                error!("rejecting atmosphere parameters: {reason}");
                return Err(DynamicsError::Config(reason.to_string()));
            }
        }

        let surface_gravity = GRAVITATION_CONSTANT * planet_mass / (planet_radius * planet_radius);
        let surface_pressure =
            (surface_density / AIR_MOLAR_MASS) * GAS_CONSTANT_R * surface_temperature
                / PA_PER_ATMOS;

        Ok(Self {
            planet_radius,
            surface_gravity,
            surface_temperature,
            surface_density,
            surface_pressure,
            outer_limit,
        })
    }

    pub fn surface_pressure(&self) -> f64 {
        self.surface_pressure
    }

    pub fn surface_gravity(&self) -> f64 {
        self.surface_gravity
    }
}

impl AtmosphereModel for LapseRateAtmosphere {
    fn atmospheric_state(&self, distance: f64) -> AtmosphericState {
        if self.surface_density <= 0.0 || distance > self.planet_radius * self.outer_limit {
            return AtmosphericState::VACUUM;
        }

        let height = distance - self.planet_radius;
        if height <= 0.0 {
            return AtmosphericState {
                pressure: self.surface_pressure,
                density: self.surface_density,
            };
        }

        let lapse_rate = self.surface_gravity / SPECIFIC_HEAT_AIR_CP;
        let temperature = self.surface_temperature - lapse_rate * height;
        if temperature <= 0.0 {
            return AtmosphericState::VACUUM;
        }

        let exponent = self.surface_gravity * AIR_MOLAR_MASS / (GAS_CONSTANT_R * lapse_rate);
        let pressure =
            self.surface_pressure * (temperature / self.surface_temperature).powf(exponent);
        let density = pressure * PA_PER_ATMOS * AIR_MOLAR_MASS / (GAS_CONSTANT_R * temperature);

        AtmosphericState { pressure, density }
    }
}
