//! Unit component and body construction.
//!
//! A live unit is a Bevy entity carrying [`Unit`] plus a Rapier dynamic body.
//! The entity id is the only reference other systems keep: once the entity is
//! despawned every lookup through it simply fails and is skipped.

use crate::catalog::UnitDefinition;
use crate::config::GameConfig;
use crate::registry::EntityRegistry;
use crate::respawn::RespawnCoordinator;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Per-entity unit state.
///
/// `data` is a private clone of the catalog definition; merge logic may
/// rewrite it freely.
#[derive(Component, Debug, Clone)]
pub struct Unit {
    pub data: UnitDefinition,
    /// Given an initial velocity; subject to the well's gravity.
    pub launched: bool,
    /// Resting in the collection area; no longer attracted.
    pub settled: bool,
}

impl Unit {
    pub fn new(data: UnitDefinition) -> Self {
        Self {
            data,
            launched: false,
            settled: false,
        }
    }

    /// Mark the unit as resting in the well.  Settled units stop receiving
    /// gravity, so `launched` is cleared as well.
    pub fn settle(&mut self) {
        self.settled = true;
        self.launched = false;
    }
}

/// Request to fire a unit with the given initial velocity.
///
/// Written by the aiming/launch collaborator after it received a
/// [`crate::respawn::UnitReady`] unit.
#[derive(Message, Debug, Clone, Copy)]
pub struct LaunchUnit {
    pub entity: Entity,
    pub velocity: Vec2,
}

/// Spawn the body for `data` at `position` and return its entity.
///
/// Mass comes straight from the definition's `mass_class`; world gravity is
/// disabled, so an unlaunched unit hovers where it was placed.
pub fn spawn_unit_body(
    commands: &mut Commands,
    data: UnitDefinition,
    position: Vec2,
    config: &GameConfig,
) -> Entity {
    let radius = data.radius;
    let mass = data.mass_class;
    commands
        .spawn((
            (
                Transform::from_translation(position.extend(0.1)),
                Visibility::default(),
                Unit::new(data),
                RigidBody::Dynamic,
                Collider::ball(radius),
                ColliderMassProperties::Mass(mass),
                ReadMassProperties::default(),
            ),
            (
                Restitution::coefficient(config.unit_restitution),
                Friction::coefficient(config.unit_friction),
                Damping {
                    linear_damping: config.unit_linear_damping,
                    angular_damping: 0.0,
                },
                Velocity::zero(),
                ExternalForce::default(),
                GravityScale(0.0),
                Sleeping::disabled(),
            ),
        ))
        .id()
}

/// Apply queued [`LaunchUnit`] requests and queue the next respawn.
///
/// Launching an unknown, despawned, or already-launched unit is ignored.
pub fn unit_launch_system(
    mut launches: MessageReader<LaunchUnit>,
    mut units: Query<(&mut Unit, &mut Velocity)>,
    registry: Res<EntityRegistry>,
    mut coordinator: ResMut<RespawnCoordinator>,
    time: Res<Time>,
) {
    for launch in launches.read() {
        if !registry.contains(launch.entity) {
            continue;
        }
        let Ok((mut unit, mut velocity)) = units.get_mut(launch.entity) else {
            continue;
        };
        if unit.launched || unit.settled {
            continue;
        }
        unit.launched = true;
        velocity.linvel = launch.velocity;
        coordinator.request_respawn(time.elapsed_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DisplayRef;

    fn definition() -> UnitDefinition {
        UnitDefinition {
            id: 2,
            name: "stone".into(),
            mass_class: 1.5,
            radius: 0.35,
            merge_target: 3,
            display: DisplayRef("units/stone.png".into()),
        }
    }

    #[test]
    fn settle_clears_launched() {
        let mut unit = Unit::new(definition());
        unit.launched = true;
        unit.settle();
        assert!(unit.settled);
        assert!(!unit.launched);
    }

    #[test]
    fn unit_owns_its_definition() {
        let catalog_copy = definition();
        let mut unit = Unit::new(catalog_copy.clone());
        unit.data.id = 3;
        unit.data.mass_class = 9.0;
        assert_eq!(catalog_copy.id, 2);
        assert_eq!(catalog_copy.mass_class, 1.5);
    }

    #[test]
    fn launch_marks_unit_and_requests_respawn() {
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        world.insert_resource(RespawnCoordinator::new(3.0));
        world.init_resource::<Messages<LaunchUnit>>();

        let entity = world
            .spawn((Unit::new(definition()), Velocity::zero()))
            .id();
        let mut registry = EntityRegistry::new(3);
        registry.admit(entity);
        world.insert_resource(registry);

        world.write_message(LaunchUnit {
            entity,
            velocity: Vec2::new(0.0, 15.0),
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(unit_launch_system);
        schedule.run(&mut world);

        let unit = world.get::<Unit>(entity).unwrap();
        assert!(unit.launched);
        assert_eq!(world.get::<Velocity>(entity).unwrap().linvel, Vec2::new(0.0, 15.0));
        assert!(world.resource::<RespawnCoordinator>().is_waiting());
    }

    #[test]
    fn launch_of_unregistered_entity_is_ignored() {
        let mut world = World::new();
        world.insert_resource(Time::<()>::default());
        world.insert_resource(RespawnCoordinator::new(3.0));
        world.insert_resource(EntityRegistry::new(3));
        world.init_resource::<Messages<LaunchUnit>>();

        let entity = world
            .spawn((Unit::new(definition()), Velocity::zero()))
            .id();
        world.write_message(LaunchUnit {
            entity,
            velocity: Vec2::Y,
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(unit_launch_system);
        schedule.run(&mut world);

        assert!(!world.get::<Unit>(entity).unwrap().launched);
        assert!(!world.resource::<RespawnCoordinator>().is_waiting());
    }
}
