//! Collision damage hook and the collision-mesh query used for mass distribution.

use log::trace;

use crate::dynamic_body::{DynamicBody, DynamicKind};

/// Scales `mass * relVel^2` into a damage value in kilograms.
pub const KINETIC_ENERGY_MULT: f64 = 0.00001;

/// Damage below a gram is ignored, except for fragile cargo.
pub const MIN_DAMAGE: f64 = 1e-3;

/// Bounding volume of a body's collision mesh.
pub trait CollisionMesh {
    fn radius(&self) -> f64;
}

/// Whatever owns the hit points of the colliding body.
pub trait DamageSink {
    fn on_damage(&mut self, attacker: &Counterpart<'_>, kinetic_energy: f64);
}

/// Opaque flags from the collision detector, passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollisionFlags(pub u32);

/// The other party in a collision.
#[derive(Debug, Clone, Copy)]
pub enum Counterpart<'a> {
    Dynamic(&'a DynamicBody),
    /// Planets, stations and anything else that isn't integrated.
    Static,
}

impl DynamicBody {
    /// Converts a contact into damage for `sink`. Returns whether the collision was handled,
    /// which is always the case.
    pub fn on_collision(
        &self,
        other: Counterpart<'_>,
        _flags: CollisionFlags,
        rel_vel: f64,
        sink: &mut dyn DamageSink,
    ) -> bool {
        // the missile is going to blow up anyway; let its own logic react
        let other_mass = match other {
            Counterpart::Dynamic(body) if body.kind() == DynamicKind::Missile => return true,
            Counterpart::Dynamic(body) => body.mass(),
            Counterpart::Static => self.mass(),
        };

        let kinetic_energy = KINETIC_ENERGY_MULT * other_mass * rel_vel * rel_vel;
        if self.kind() == DynamicKind::CargoBody || kinetic_energy > MIN_DAMAGE {
            trace!("{}: collision damage {kinetic_energy}", self.label());
            sink.on_damage(&other, kinetic_energy);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder(Vec<f64>);

    impl DamageSink for Recorder {
        fn on_damage(&mut self, _attacker: &Counterpart<'_>, kinetic_energy: f64) {
            self.0.push(kinetic_energy);
        }
    }

    fn body(kind: DynamicKind, mass: f64) -> DynamicBody {
        let mut b = DynamicBody::new("b").with_kind(kind);
        b.set_mass(mass);
        b
    }

    #[test]
    fn uses_other_dynamic_mass() {
        let ship = body(DynamicKind::Ship, 1000.0);
        let rock = body(DynamicKind::Generic, 50.0);
        let mut sink = Recorder::default();
        assert!(ship.on_collision(Counterpart::Dynamic(&rock), CollisionFlags(0), 10.0, &mut sink));
        assert_eq!(sink.0.len(), 1);
        assert_relative_eq!(sink.0[0], KINETIC_ENERGY_MULT * 50.0 * 100.0);
    }

    #[test]
    fn uses_own_mass_against_static_bodies() {
        let ship = body(DynamicKind::Ship, 1000.0);
        let mut sink = Recorder::default();
        ship.on_collision(Counterpart::Static, CollisionFlags::default(), 2.0, &mut sink);
        assert_relative_eq!(sink.0[0], KINETIC_ENERGY_MULT * 1000.0 * 4.0);
    }

    #[test]
    fn tiny_bumps_are_ignored() {
        let ship = body(DynamicKind::Ship, 10.0);
        let mut sink = Recorder::default();
        // 1e-5 * 10 * 1 = 1e-4 < 1e-3
        assert!(ship.on_collision(Counterpart::Static, CollisionFlags(0), 1.0, &mut sink));
        assert!(sink.0.is_empty());
    }

    #[test]
    fn cargo_always_takes_damage() {
        let cargo = body(DynamicKind::CargoBody, 1.0);
        let mut sink = Recorder::default();
        cargo.on_collision(Counterpart::Static, CollisionFlags(0), 0.1, &mut sink);
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn missiles_are_handled_without_damage() {
        let ship = body(DynamicKind::Ship, 1000.0);
        let missile = body(DynamicKind::Missile, 200.0);
        let mut sink = Recorder::default();
        assert!(ship.on_collision(
            Counterpart::Dynamic(&missile),
            CollisionFlags(0),
            500.0,
            &mut sink
        ));
        assert!(sink.0.is_empty());
    }
}
