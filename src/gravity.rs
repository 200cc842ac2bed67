//! Central gravity well.
//!
//! Every physics step each launched unit is pulled toward the well centre
//! with an inverse-square force scaled by its mass:
//!
//! ```text
//! F = G / max(dist, min_dist)² × m      (directed at the centre)
//! ```
//!
//! The force is *written* into `ExternalForce` each step, never accumulated,
//! so it only acts for the step it was computed in.  Once per frame the
//! well's angular drive is set from the score (`score / divisor` deg/s).

use crate::config::GameConfig;
use crate::registry::EntityRegistry;
use crate::score::TotalScore;
use crate::unit::Unit;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Field parameters of the well.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GravityWell {
    pub gravity_const: f32,
    pub center: Vec2,
    pub min_dist: f32,
    pub angular_drive_divisor: f32,
    /// Current rotational drive (deg/s), refreshed every frame.
    pub angular_drive_speed: f32,
}

impl GravityWell {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            gravity_const: config.gravity_const,
            center: config.well_center(),
            min_dist: config.min_gravity_dist,
            angular_drive_divisor: config.angular_drive_divisor,
            angular_drive_speed: 0.0,
        }
    }

    /// Force on a body of `mass` whose centre of mass is at `body_com`.
    pub fn force_on(&self, body_com: Vec2, mass: f32) -> Vec2 {
        gravity_force(body_com, mass, self.center, self.gravity_const, self.min_dist)
    }

    /// Angular drive for `total_score`.
    pub fn drive_speed_for(&self, total_score: u32) -> f32 {
        total_score as f32 / self.angular_drive_divisor
    }
}

/// Inverse-square attraction toward `center`.
///
/// The distance is floored at `min_dist`, so the result stays finite even for
/// a body sitting exactly on the centre (where the direction is zero).
pub fn gravity_force(body_com: Vec2, mass: f32, center: Vec2, gravity_const: f32, min_dist: f32) -> Vec2 {
    let delta = center - body_com;
    let dist = delta.length().max(min_dist);
    let magnitude = gravity_const / (dist * dist) * mass;
    delta.normalize_or_zero() * magnitude
}

/// Marker for the well's rotating kinematic body.
#[derive(Component, Debug)]
pub struct Well;

/// Spawn the well body at the well centre.
pub fn spawn_well(commands: &mut Commands, center: Vec2) -> Entity {
    commands
        .spawn((
            Well,
            Transform::from_translation(center.extend(0.0)),
            RigidBody::KinematicVelocityBased,
            Velocity::zero(),
        ))
        .id()
}

/// Apply the well's pull to every launched, live unit.
///
/// Runs in `FixedUpdate`, i.e. once per physics step.  Units that are not
/// launched get their force cleared; entities whose body is gone are skipped.
#[allow(clippy::type_complexity)]
pub fn gravity_well_system(
    well: Res<GravityWell>,
    registry: Res<EntityRegistry>,
    mut bodies: Query<(
        &Unit,
        &Transform,
        Option<&ReadMassProperties>,
        &mut ExternalForce,
    )>,
) {
    for &entity in registry.live_entities() {
        let Ok((unit, transform, mass_props, mut force)) = bodies.get_mut(entity) else {
            continue;
        };

        if !unit.launched {
            force.force = Vec2::ZERO;
            continue;
        }

        // Mass properties are only populated after the body's first step.
        let (mass, local_com) = match mass_props {
            Some(props) if props.mass > 0.0 => (props.mass, props.local_center_of_mass),
            _ => (unit.data.mass_class, Vec2::ZERO),
        };
        let world_com = transform.translation.truncate()
            + transform.rotation.mul_vec3(local_com.extend(0.0)).truncate();

        force.force = well.force_on(world_com, mass);
    }
}

/// Set the well's angular drive from the current score.
pub fn angular_drive_system(
    mut well: ResMut<GravityWell>,
    score: Res<TotalScore>,
    mut bodies: Query<&mut Velocity, With<Well>>,
) {
    let speed = well.drive_speed_for(score.get());
    if well.angular_drive_speed != speed {
        well.angular_drive_speed = speed;
    }
    for mut velocity in bodies.iter_mut() {
        velocity.angvel = speed.to_radians();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitCatalog;
    use bevy::ecs::system::RunSystemOnce;

    fn well() -> GravityWell {
        GravityWell {
            gravity_const: 300.0,
            center: Vec2::new(0.0, 5.0),
            min_dist: 0.001,
            angular_drive_divisor: 10.0,
            angular_drive_speed: 0.0,
        }
    }

    #[test]
    fn force_points_at_the_centre() {
        let f = well().force_on(Vec2::new(0.0, -5.0), 1.0);
        assert!(f.x.abs() < 1e-6);
        assert!(f.y > 0.0);
        // 300 / 10² × 1
        assert!((f.length() - 3.0).abs() < 1e-4);
    }

    #[test]
    fn force_scales_with_mass() {
        let w = well();
        let light = w.force_on(Vec2::new(3.0, 1.0), 1.0).length();
        let heavy = w.force_on(Vec2::new(3.0, 1.0), 2.5).length();
        assert!((heavy - 2.5 * light).abs() < 1e-3);
    }

    #[test]
    fn force_grows_as_distance_shrinks() {
        let w = well();
        let mut previous = 0.0;
        for dist in [50.0, 20.0, 10.0, 5.0, 1.0, 0.5, 0.1, 0.01] {
            let magnitude = w.force_on(w.center - Vec2::new(dist, 0.0), 1.0).length();
            assert!(magnitude > previous, "dist {dist}: {magnitude} <= {previous}");
            previous = magnitude;
        }
    }

    #[test]
    fn force_is_finite_at_the_singularity() {
        let w = well();
        let near = w.force_on(w.center + Vec2::new(1e-6, 0.0), 1.0);
        assert!(near.is_finite());
        assert!(near.length() <= w.gravity_const / (w.min_dist * w.min_dist) + 1.0);
        let exact = w.force_on(w.center, 1.0);
        assert_eq!(exact, Vec2::ZERO);
    }

    #[test]
    fn drive_speed_is_score_over_ten() {
        let w = well();
        assert_eq!(w.drive_speed_for(0), 0.0);
        assert_eq!(w.drive_speed_for(250), 25.0);
        assert!(w.drive_speed_for(1000) > w.drive_speed_for(999));
    }

    fn world_with_units() -> (World, Entity, Entity, Entity) {
        let mut world = World::new();
        let config = GameConfig::default();
        let catalog = UnitCatalog::new(config.units.clone()).unwrap();
        world.insert_resource(GravityWell::from_config(&config));

        let definition = catalog.find_by_id(1).unwrap().clone();
        let mut launched = Unit::new(definition.clone());
        launched.launched = true;
        let launched = world
            .spawn((
                launched,
                Transform::from_xyz(0.0, -5.0, 0.0),
                ExternalForce::default(),
            ))
            .id();
        let resting = world
            .spawn((
                Unit::new(definition.clone()),
                Transform::from_xyz(0.0, -6.0, 0.0),
                ExternalForce {
                    force: Vec2::new(9.0, 9.0),
                    torque: 0.0,
                },
            ))
            .id();
        let mut stray = Unit::new(definition);
        stray.launched = true;
        let stray = world
            .spawn((stray, Transform::from_xyz(2.0, 0.0, 0.0), ExternalForce::default()))
            .id();

        let mut registry = EntityRegistry::new(catalog.len());
        registry.admit(launched);
        registry.admit(resting);
        world.insert_resource(registry);
        (world, launched, resting, stray)
    }

    #[test]
    fn only_launched_registered_units_are_pulled() {
        let (mut world, launched, resting, stray) = world_with_units();
        world.run_system_once(gravity_well_system).unwrap();

        assert!(world.get::<ExternalForce>(launched).unwrap().force.y > 0.0);
        assert_eq!(world.get::<ExternalForce>(resting).unwrap().force, Vec2::ZERO);
        assert_eq!(world.get::<ExternalForce>(stray).unwrap().force, Vec2::ZERO);
    }

    #[test]
    fn force_is_overwritten_not_accumulated() {
        let (mut world, launched, _, _) = world_with_units();
        world.run_system_once(gravity_well_system).unwrap();
        let first = world.get::<ExternalForce>(launched).unwrap().force;
        world.run_system_once(gravity_well_system).unwrap();
        let second = world.get::<ExternalForce>(launched).unwrap().force;
        assert_eq!(first, second);
    }

    #[test]
    fn despawned_unit_is_skipped() {
        let (mut world, launched, _, _) = world_with_units();
        world.despawn(launched);
        assert!(world.run_system_once(gravity_well_system).is_ok());
    }

    #[test]
    fn angular_drive_follows_score() {
        let mut world = World::new();
        world.insert_resource(GravityWell::from_config(&GameConfig::default()));
        let mut score = TotalScore::default();
        score.add(450);
        world.insert_resource(score);
        let body = world.spawn((Well, Velocity::zero())).id();

        world.run_system_once(angular_drive_system).unwrap();

        assert_eq!(world.resource::<GravityWell>().angular_drive_speed, 45.0);
        let angvel = world.get::<Velocity>(body).unwrap().angvel;
        assert!((angvel - 45.0_f32.to_radians()).abs() < 1e-6);
    }
}
