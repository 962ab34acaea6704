//! Optional subsystems a dynamic body may carry.

use cgmath::Vector3;
use cgmath::Zero;

/// Capabilities that lazily own a subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Propulsion,
    FixedGuns,
}

/// The enabled features. A subsystem being present *is* the feature flag.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub(crate) propulsion: Option<Propulsion>,
    pub(crate) fixed_guns: Option<FixedGuns>,
}

impl FeatureSet {
    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::Propulsion => self.propulsion.is_some(),
            Feature::FixedGuns => self.fixed_guns.is_some(),
        }
    }

    /// Constructs the subsystem for `feature` unless it already exists.
    /// Returns whether anything was created.
    pub fn add(&mut self, feature: Feature) -> bool {
        match feature {
            Feature::Propulsion if self.propulsion.is_none() => {
                self.propulsion = Some(Propulsion::default());
                true
            }
            Feature::FixedGuns if self.fixed_guns.is_none() => {
                self.fixed_guns = Some(FixedGuns::default());
                true
            }
            _ => false,
        }
    }
}

/// Thrusters plus the fuel that feeds them.
#[derive(Debug, Clone, PartialEq)]
pub struct Propulsion {
    /// Maximum thrust along any body axis, in newtons.
    linear_thrust: f64,
    /// Maximum torque about any body axis, in newton metres.
    angular_thrust: f64,
    linear_state: Vector3<f64>,
    angular_state: Vector3<f64>,
    effective_exhaust_velocity: f64,
    fuel_tank_mass: f64,
    /// Fraction of the tank that is full, 0..=1.
    thruster_fuel: f64,
}

impl Default for Propulsion {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 0.0)
    }
}

impl Propulsion {
    /// A propulsion system with a full tank and idle thrusters.
    pub fn new(
        linear_thrust: f64,
        angular_thrust: f64,
        effective_exhaust_velocity: f64,
        fuel_tank_mass: f64,
    ) -> Self {
        Self {
            linear_thrust,
            angular_thrust,
            linear_state: Vector3::zero(),
            angular_state: Vector3::zero(),
            effective_exhaust_velocity,
            fuel_tank_mass,
            thruster_fuel: 1.0,
        }
    }

    pub fn effective_exhaust_velocity(&self) -> f64 {
        self.effective_exhaust_velocity
    }

    pub fn fuel_tank_mass(&self) -> f64 {
        self.fuel_tank_mass
    }

    /// Fuel left, as a fraction of the tank.
    pub fn fuel(&self) -> f64 {
        self.thruster_fuel
    }

    pub fn set_fuel(&mut self, fraction: f64) {
        self.thruster_fuel = fraction.clamp(0.0, 1.0);
    }

    /// Fuel left, in kilograms.
    pub fn fuel_mass(&self) -> f64 {
        self.fuel_tank_mass * self.thruster_fuel
    }

    pub fn is_empty(&self) -> bool {
        self.thruster_fuel <= 0.0
    }

    pub fn linear_thruster_state(&self) -> Vector3<f64> {
        self.linear_state
    }

    pub fn angular_thruster_state(&self) -> Vector3<f64> {
        self.angular_state
    }

    /// Each component is clamped to [-1, 1].
    pub fn set_linear_thruster_state(&mut self, levels: Vector3<f64>) {
        self.linear_state = clamp_levels(levels);
    }

    pub fn set_angular_thruster_state(&mut self, levels: Vector3<f64>) {
        self.angular_state = clamp_levels(levels);
    }

    /// Body-space thrust for the current thruster levels. Nothing once the tank is dry.
    pub fn linear_force(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.linear_state * self.linear_thrust
    }

    pub fn angular_torque(&self) -> Vector3<f64> {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.angular_state * self.angular_thrust
    }

    /// Burns fuel for `dt` seconds of the current linear thrust and returns the kilograms used.
    pub fn consume_fuel(&mut self, dt: f64) -> f64 {
        if self.is_empty() || self.fuel_tank_mass <= 0.0 || self.effective_exhaust_velocity <= 0.0 {
            return 0.0;
        }
        let thrust =
            self.linear_state.x.abs() + self.linear_state.y.abs() + self.linear_state.z.abs();
        let wanted = thrust * self.linear_thrust / self.effective_exhaust_velocity * dt;
        let burned = wanted.min(self.fuel_mass());
        self.thruster_fuel = ((self.fuel_mass() - burned) / self.fuel_tank_mass).max(0.0);
        burned
    }
}

fn clamp_levels(v: Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x.clamp(-1.0, 1.0), v.y.clamp(-1.0, 1.0), v.z.clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, PartialEq)]
pub struct GunMount {
    pub recharge_time: f64,
    pub heat_per_shot: f64,
    recharge: f64,
    temperature: f64,
}

impl GunMount {
    pub fn new(recharge_time: f64, heat_per_shot: f64) -> Self {
        Self {
            recharge_time,
            heat_per_shot,
            recharge: 0.0,
            temperature: 0.0,
        }
    }

    /// Normalised heat; the gun refuses to fire at 1.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }
}

/// Forward-facing weapons bolted to the hull.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedGuns {
    mounts: Vec<GunMount>,
    firing: bool,
    cooler_boost: f64,
}

impl Default for FixedGuns {
    fn default() -> Self {
        Self {
            mounts: Vec::new(),
            firing: false,
            cooler_boost: 1.0,
        }
    }
}

impl FixedGuns {
    const COOLING_RATE: f64 = 0.01;

    pub fn mount(&mut self, gun: GunMount) {
        self.mounts.push(gun);
    }

    pub fn mounts(&self) -> &[GunMount] {
        &self.mounts
    }

    pub fn set_firing(&mut self, firing: bool) {
        self.firing = firing;
    }

    pub fn is_firing(&self) -> bool {
        self.firing
    }

    pub fn set_cooler_boost(&mut self, boost: f64) {
        self.cooler_boost = boost;
    }

    /// Advances recharge and cooling; returns how many guns fired this tick.
    pub fn update(&mut self, dt: f64) -> usize {
        let mut shots = 0;
        for gun in &mut self.mounts {
            gun.recharge = (gun.recharge - dt).max(0.0);
            if self.firing && gun.recharge <= 0.0 && gun.temperature < 1.0 {
                gun.temperature += gun.heat_per_shot;
                gun.recharge = gun.recharge_time;
                shots += 1;
            }
            gun.temperature =
                (gun.temperature - Self::COOLING_RATE * self.cooler_boost * dt).max(0.0);
        }
        shots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn adding_twice_keeps_the_first_subsystem() {
        let mut features = FeatureSet::default();
        assert!(!features.has(Feature::Propulsion));
        assert!(features.add(Feature::Propulsion));
        features.propulsion.as_mut().unwrap().set_fuel(0.25);
        assert!(!features.add(Feature::Propulsion));
        assert_eq!(features.propulsion.as_ref().unwrap().fuel(), 0.25);
        assert!(!features.has(Feature::FixedGuns));
    }

    #[test]
    fn thruster_levels_are_clamped() {
        let mut p = Propulsion::new(100.0, 10.0, 1000.0, 50.0);
        p.set_linear_thruster_state(Vector3::new(2.0, -3.0, 0.5));
        assert_eq!(p.linear_force(), Vector3::new(100.0, -100.0, 50.0));
    }

    #[test]
    fn burning_drains_the_tank() {
        let mut p = Propulsion::new(1000.0, 0.0, 100.0, 20.0);
        p.set_linear_thruster_state(Vector3::new(0.0, 0.0, -1.0));
        // 1000 N at 100 m/s exhaust is 10 kg/s
        let burned = p.consume_fuel(1.0);
        assert_relative_eq!(burned, 10.0);
        assert_relative_eq!(p.fuel(), 0.5);
        let burned = p.consume_fuel(5.0);
        assert_relative_eq!(burned, 10.0);
        assert!(p.is_empty());
        assert_eq!(p.linear_force(), Vector3::zero());
    }

    #[test]
    fn guns_respect_recharge_and_heat() {
        let mut guns = FixedGuns::default();
        guns.mount(GunMount::new(0.5, 0.6));
        guns.set_firing(true);
        assert_eq!(guns.update(0.1), 1);
        // still recharging
        assert_eq!(guns.update(0.1), 0);
        assert_eq!(guns.update(0.5), 1);
        // now too hot
        assert!(guns.mounts()[0].temperature() >= 1.0);
        assert_eq!(guns.update(0.5), 0);
    }
}
