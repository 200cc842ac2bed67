//! Scripted test scenarios for the full simulation (Rapier included).
//!
//! Selected with `MERGE_WELL_TEST=<name>`:
//!
//! | Scenario        | Script                                              | Pass condition                         |
//! |-----------------|-----------------------------------------------------|----------------------------------------|
//! | `respawn_cycle` | Every ready unit is launched straight at the well   | ≥ 3 respawns, none through an occupied zone |
//! | `gravity_pull`  | One unit launched at rest 4 u beside the well       | It falls within 2 u of the centre       |
//! | `round_clear`   | All units settled on frame 2, then a respawn request | `RoundCleared` seen, no unit spawned    |
//!
//! The verification system prints a report and exits the app once the frame
//! limit is reached.

use crate::config::GameConfig;
use crate::lifecycle::start_round_system;
use crate::registry::EntityRegistry;
use crate::respawn::{zone_occupied, RespawnCoordinator, RoundCleared, SpawnZoneHits, UnitReady};
use crate::scheduler::{SpawnKind, Spawner};
use crate::simulation::SimulationSet;
use crate::unit::{LaunchUnit, Unit};
use bevy::prelude::*;

/// Launch speed used by the `respawn_cycle` script (u/s, straight up).
const SCRIPT_LAUNCH_SPEED: f32 = 8.0;

/// Test configuration and observations.
#[derive(Resource)]
pub struct TestConfig {
    pub enabled: bool,
    pub test_name: String,
    pub frame_limit: u32,
    pub frame_count: u32,
    /// Auto respawns seen (the round's opening unit is not counted).
    pub respawn_count: u32,
    /// Respawns fired in a frame whose pre-gate sample saw the zone occupied.
    pub occupied_spawns: u32,
    /// Coordinator was waiting when sampled ahead of the gate this frame.
    pub gate_waiting: bool,
    /// Zone occupancy sampled ahead of the gate this frame.
    pub gate_occupied: bool,
    pub round_cleared: bool,
    /// Live units when the `round_clear` script requested its respawn.
    pub units_at_request: usize,
    /// Unit followed by `gravity_pull`.
    pub tracked: Option<Entity>,
    pub initial_distance: f32,
    pub closest_distance: f32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            test_name: String::new(),
            frame_limit: 300,
            frame_count: 0,
            respawn_count: 0,
            occupied_spawns: 0,
            gate_waiting: false,
            gate_occupied: false,
            round_cleared: false,
            units_at_request: 0,
            tracked: None,
            initial_distance: 0.0,
            closest_distance: f32::INFINITY,
        }
    }
}

/// Registers the scenario named `test_name`.  Unknown names fall back to
/// `respawn_cycle`.
pub struct ScenarioPlugin {
    pub test_name: String,
}

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        let name = match self.test_name.as_str() {
            "gravity_pull" | "round_clear" => self.test_name.clone(),
            _ => "respawn_cycle".to_string(),
        };

        app.insert_resource(TestConfig {
            enabled: true,
            test_name: name.clone(),
            ..Default::default()
        })
        .add_systems(Update, test_frame_counter_system.before(SimulationSet::Input))
        .add_systems(
            Update,
            (
                sample_gate_system
                    .after(SimulationSet::Occupancy)
                    .before(SimulationSet::Respawn),
                observe_respawn_system.after(SimulationSet::Respawn),
            ),
        )
        .add_systems(PostUpdate, test_verification_system);

        match name.as_str() {
            "gravity_pull" => {
                app.add_systems(Startup, setup_gravity_pull.after(start_round_system))
                    .add_systems(Update, track_gravity_pull_system);
            }
            "round_clear" => {
                app.add_systems(
                    Update,
                    settle_all_script_system
                        .after(test_frame_counter_system)
                        .before(SimulationSet::Respawn),
                );
            }
            _ => {
                app.add_systems(Startup, setup_respawn_cycle)
                    .add_systems(Update, auto_launch_system.in_set(SimulationSet::Input));
            }
        }

        println!("Running test: {}", name);
    }
}

fn test_frame_counter_system(mut test_config: ResMut<TestConfig>) {
    test_config.frame_count += 1;
}

// ── respawn_cycle ─────────────────────────────────────────────────────────────

fn setup_respawn_cycle(mut coordinator: ResMut<RespawnCoordinator>, mut test_config: ResMut<TestConfig>) {
    *coordinator = RespawnCoordinator::new(0.5);
    test_config.frame_limit = 600;
    println!("✓ respawn_cycle: cooldown 0.5s, auto-launch at {SCRIPT_LAUNCH_SPEED} u/s");
}

/// Stand-in for the player: launch every ready unit straight at the well.
fn auto_launch_system(mut ready: MessageReader<UnitReady>, mut launches: MessageWriter<LaunchUnit>) {
    for UnitReady { entity } in ready.read() {
        launches.write(LaunchUnit {
            entity: *entity,
            velocity: Vec2::Y * SCRIPT_LAUNCH_SPEED,
        });
    }
}

/// Record the gate's inputs before the coordinator sees them.
fn sample_gate_system(
    coordinator: Res<RespawnCoordinator>,
    hits: Res<SpawnZoneHits>,
    registry: Res<EntityRegistry>,
    units: Query<&Unit>,
    mut test_config: ResMut<TestConfig>,
) {
    test_config.gate_waiting = coordinator.is_waiting();
    test_config.gate_occupied = zone_occupied(&hits.0, &registry, &units);
}

/// Count respawns and check each against the sample taken ahead of the gate.
fn observe_respawn_system(
    mut ready: MessageReader<UnitReady>,
    mut cleared: MessageReader<RoundCleared>,
    mut test_config: ResMut<TestConfig>,
) {
    for _ in ready.read() {
        // Round-start units are handed out while no respawn is pending.
        if !test_config.gate_waiting {
            continue;
        }
        test_config.respawn_count += 1;
        if test_config.gate_occupied {
            test_config.occupied_spawns += 1;
        }
    }
    if cleared.read().count() > 0 {
        test_config.round_cleared = true;
    }
}

// ── gravity_pull ──────────────────────────────────────────────────────────────

fn setup_gravity_pull(
    mut spawner: Spawner,
    mut launches: MessageWriter<LaunchUnit>,
    mut test_config: ResMut<TestConfig>,
) {
    let offset = Vec2::new(4.0, 0.0);
    let position = spawner.config.well_center() + offset;
    let Some(entity) = spawner.spawn(SpawnKind::Unit(1), Some(position)) else {
        return;
    };
    launches.write(LaunchUnit {
        entity,
        velocity: Vec2::ZERO,
    });
    test_config.tracked = Some(entity);
    test_config.initial_distance = offset.length();
    test_config.frame_limit = 240;
    println!("✓ gravity_pull: unit at rest {:.1} u from the well", offset.length());
}

fn track_gravity_pull_system(
    mut test_config: ResMut<TestConfig>,
    config: Res<GameConfig>,
    units: Query<&Transform, With<Unit>>,
) {
    let Some(entity) = test_config.tracked else {
        return;
    };
    let Ok(transform) = units.get(entity) else {
        return;
    };
    let dist = transform
        .translation
        .truncate()
        .distance(config.well_center());
    test_config.closest_distance = test_config.closest_distance.min(dist);
}

// ── round_clear ───────────────────────────────────────────────────────────────

fn settle_all_script_system(
    mut test_config: ResMut<TestConfig>,
    registry: Res<EntityRegistry>,
    mut units: Query<&mut Unit>,
    mut coordinator: ResMut<RespawnCoordinator>,
    time: Res<Time>,
) {
    if test_config.frame_count != 2 {
        return;
    }
    for &entity in registry.live_entities() {
        if let Ok(mut unit) = units.get_mut(entity) {
            unit.settle();
        }
    }
    coordinator.request_respawn(time.elapsed_secs());
    test_config.units_at_request = registry.len();
    test_config.frame_limit = 30;
    println!("✓ round_clear: settled {} units, respawn requested", registry.len());
}

// ── Verification ──────────────────────────────────────────────────────────────

/// Verify test results at the end
pub fn test_verification_system(
    test_config: Res<TestConfig>,
    registry: Res<EntityRegistry>,
    mut exit: MessageWriter<AppExit>,
) {
    if !test_config.enabled || test_config.frame_count != test_config.frame_limit {
        return;
    }

    println!("\n╔════════════════════════════════════════════╗");
    println!("║           TEST COMPLETE                    ║");
    println!("╚════════════════════════════════════════════╝");
    println!("Test: {}", test_config.test_name);
    println!("Frames: {}", test_config.frame_count);
    println!("Live units: {}", registry.len());

    let (pass, detail) = match test_config.test_name.as_str() {
        "gravity_pull" => (
            test_config.closest_distance < test_config.initial_distance * 0.5,
            format!(
                "closest approach {:.2} u (start {:.2} u)",
                test_config.closest_distance, test_config.initial_distance
            ),
        ),
        "round_clear" => (
            test_config.round_cleared && registry.len() == test_config.units_at_request,
            format!(
                "round_cleared={}, units {} → {}",
                test_config.round_cleared,
                test_config.units_at_request,
                registry.len()
            ),
        ),
        _ => (
            test_config.respawn_count >= 3 && test_config.occupied_spawns == 0,
            format!(
                "respawns {}, spawns through occupied zone {}",
                test_config.respawn_count, test_config.occupied_spawns
            ),
        ),
    };

    if pass {
        println!("✓ PASS: {}: {}", test_config.test_name, detail);
        exit.write(AppExit::Success);
    } else {
        println!("✗ FAIL: {}: {}", test_config.test_name, detail);
        exit.write(AppExit::error());
    }
}
