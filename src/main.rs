use std::sync::Arc;

use cgmath::EuclideanSpace;
use cgmath::InnerSpace;
use cgmath::Point3;
use cgmath::Vector3;
use log::{error, info};
use space_dynamics::{
    DeltaV, DynamicBody, DynamicKind, Feature, Frame, FrameBody, LapseRateAtmosphere,
    Propulsion, ScenarioConfig,
};

fn run(config: &ScenarioConfig) -> space_dynamics::Result<()> {
    let atmosphere = if config.surface_density > 0.0 {
        Some(Box::new(LapseRateAtmosphere::new(
            config.central_mass,
            config.central_radius,
            config.surface_temperature,
            config.surface_density,
            1.02,
        )?) as Box<dyn space_dynamics::AtmosphereModel>)
    } else {
        None
    };
    let planet = Arc::new(FrameBody::planet("Earth", config.central_mass, atmosphere));
    let inertial = Frame::new("Earth", Some(planet));
    let frame = if config.frame_ang_speed != 0.0 {
        Frame::new_rotating("EarthRotating", &inertial, config.frame_ang_speed, 0.0)
    } else {
        inertial
    };

    let [px, py, pz] = config.initial_position;
    let [vx, vy, vz] = config.initial_velocity;
    let mut space_craft = DynamicBody::new("space craft")
        .with_kind(DynamicKind::Ship)
        .with_frame(frame, Point3::new(px, py, pz));
    space_craft.set_clip_radius(config.ship_bounding_radius);
    space_craft.set_mass(config.ship_mass);
    space_craft.set_velocity(Vector3::new(vx, vy, vz));
    space_craft.set_drag_coefficient(config.drag_coefficient);
    space_craft.add_feature(Feature::Propulsion);
    *space_craft.propulsion_mut()? = Propulsion::new(
        config.linear_thrust,
        config.linear_thrust * 0.1,
        config.exhaust_velocity,
        config.fuel_tank_mass,
    );

    let orbit = space_craft.compute_orbit()?;
    info!(
        "start: e = {:.4}, periapsis = {:.0} m, apoapsis = {:?}",
        orbit.eccentricity,
        orbit.periapsis(),
        orbit.apoapsis()
    );

    for tick in 0..config.ticks {
        // gameplay phase: a short prograde burn at the start
        let burning = tick < config.ticks / 10;
        space_craft
            .propulsion_mut()?
            .set_linear_thruster_state(Vector3::new(0.0, 0.0, if burning { -1.0 } else { 0.0 }));
        if burning && space_craft.velocity().magnitude2() > 0.0 {
            let prograde = space_craft.velocity().normalize();
            space_craft.set_orientation(look_along(prograde));
        }
        space_craft.apply_propulsion(config.time_step)?;

        // integration phase
        space_craft.time_step_update(config.time_step);
        space_craft.update_interp_transform(0.5);

        if space_craft.position().to_vec().magnitude() < config.central_radius {
            println!("boom!");
            break;
        }
    }

    let orbit = space_craft.compute_orbit()?;
    let dv = DeltaV::for_ship(&space_craft)?;
    info!(
        "end: e = {:.4}, periapsis = {:.0} m, apoapsis = {:?}",
        orbit.eccentricity,
        orbit.periapsis(),
        orbit.apoapsis()
    );
    println!("Spacecraft position: {:?}", space_craft.position());
    println!("Spacecraft velocity: {:?}", space_craft.velocity());
    println!(
        "Delta-v: max {:.1} m/s, speed {:.1} m/s, remaining {:.1} m/s",
        dv.max, dv.current, dv.remaining
    );
    Ok(())
}

/// Orientation whose body -Z axis points along `dir`.
fn look_along(dir: cgmath::Vector3<f64>) -> cgmath::Quaternion<f64> {
    cgmath::Quaternion::from_arc(Vector3::new(0.0, 0.0, -1.0), dir, None)
}

fn main() {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ScenarioConfig::load(path),
        None => Ok(ScenarioConfig::default()),
    };
    let result = config.and_then(|config| run(&config));
    if let Err(e) = result {
        error!("{e}");
        std::process::exit(1);
    }
}
