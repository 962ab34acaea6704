//! Delta-v readouts for the flight HUD.

use cgmath::InnerSpace;

use crate::dynamic_body::DynamicBody;
use crate::error::Result;

/// Rocket-equation budget of a ship, in m/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaV {
    /// What a full tank would give.
    pub max: f64,
    /// Current speed relative to the frame.
    pub current: f64,
    /// What the fuel still aboard can give.
    pub remaining: f64,
}

impl DeltaV {
    /// Computes the readout for `ship`, which must carry propulsion.
    pub fn for_ship(ship: &DynamicBody) -> Result<DeltaV> {
        let propulsion = ship.propulsion()?;
        let ve = propulsion.effective_exhaust_velocity();
        let dry_mass = ship.mass() - propulsion.fuel_mass();

        let budget = |wet: f64| {
            if dry_mass > 0.0 && wet > dry_mass {
                ve * (wet / dry_mass).ln()
            } else {
                0.0
            }
        };

        Ok(DeltaV {
            max: budget(dry_mass + propulsion.fuel_tank_mass()),
            current: ship.velocity().magnitude(),
            remaining: budget(ship.mass()),
        })
    }

    /// Fraction of the full-tank budget still available, for gauge display.
    pub fn remaining_fraction(&self) -> f64 {
        if self.max > 0.0 {
            (self.remaining / self.max).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::Vector3;

    use super::*;
    use crate::dynamic_body::DynamicKind;
    use crate::error::DynamicsError;
    use crate::features::{Feature, Propulsion};

    fn ship(fuel: f64) -> DynamicBody {
        let mut ship = DynamicBody::new("player").with_kind(DynamicKind::Ship);
        ship.add_feature(Feature::Propulsion);
        *ship.propulsion_mut().unwrap() = Propulsion::new(1.0e5, 1.0e3, 3000.0, 400.0);
        ship.propulsion_mut().unwrap().set_fuel(fuel);
        ship.set_mass(600.0 + 400.0 * fuel);
        ship
    }

    #[test]
    fn full_tank_has_the_whole_budget() {
        let dv = DeltaV::for_ship(&ship(1.0)).unwrap();
        let expected = 3000.0 * (1000.0f64 / 600.0).ln();
        assert_relative_eq!(dv.max, expected, max_relative = 1e-12);
        assert_relative_eq!(dv.remaining, expected, max_relative = 1e-12);
        assert_relative_eq!(dv.remaining_fraction(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn half_tank_and_speed() {
        let mut s = ship(0.5);
        s.set_velocity(Vector3::new(30.0, 40.0, 0.0));
        let dv = DeltaV::for_ship(&s).unwrap();
        assert_relative_eq!(dv.remaining, 3000.0 * (800.0f64 / 600.0).ln(), max_relative = 1e-12);
        assert_relative_eq!(dv.max, 3000.0 * (1000.0f64 / 600.0).ln(), max_relative = 1e-12);
        assert_relative_eq!(dv.current, 50.0);
        assert!(dv.remaining_fraction() < 1.0);
    }

    #[test]
    fn empty_tank_has_nothing_left() {
        let dv = DeltaV::for_ship(&ship(0.0)).unwrap();
        assert_eq!(dv.remaining, 0.0);
        assert!(dv.max > 0.0);
    }

    #[test]
    fn needs_propulsion() {
        let body = DynamicBody::new("rock");
        assert!(matches!(
            DeltaV::for_ship(&body),
            Err(DynamicsError::MissingFeature(Feature::Propulsion))
        ));
    }
}
