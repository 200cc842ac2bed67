//! Simulation plugins for Bevy ECS.
//!
//! [`SimulationPlugin`] owns the core: it is constructed once from a validated
//! [`GameConfig`] and [`UnitCatalog`], inserts every resource the core needs,
//! and registers the systems in a fixed order.  Nothing in the core reaches
//! for global state; each system names the resources it touches.
//!
//! ## Frame order (`Update`)
//!
//! | Set                         | Systems                                               |
//! |-----------------------------|-------------------------------------------------------|
//! | `SimulationSet::Input`      | `unit_launch_system`, `reset_round_system`, `reset_score_system` |
//! | `SimulationSet::Cull`       | `out_of_play_system`                                  |
//! | `SimulationSet::Occupancy`  | `spawn_zone_scan_system` (added by [`SpawnZoneScanPlugin`]) |
//! | `SimulationSet::Respawn`    | `respawn_coordinator_system`                          |
//! | `SimulationSet::Drive`      | `angular_drive_system`, `score_change_system`         |
//!
//! `gravity_well_system` runs in `FixedUpdate`, once per physics step.  Rapier
//! must be configured with `in_fixed_schedule()` so its step follows in
//! `FixedPostUpdate`.

use crate::catalog::UnitCatalog;
use crate::config::GameConfig;
use crate::error::SimResult;
use crate::gravity::{angular_drive_system, gravity_well_system, spawn_well, GravityWell};
use crate::lifecycle::{out_of_play_system, reset_round_system, start_round_system, ResetRound};
use crate::registry::EntityRegistry;
use crate::respawn::{
    respawn_coordinator_system, spawn_spawn_zone, spawn_zone_scan_system, RespawnCoordinator,
    RoundCleared, SpawnZoneHits, UnitReady,
};
use crate::scheduler::{NextUnitChanged, SpawnScheduler};
use crate::score::{reset_score_system, score_change_system, ScoreChanged, TotalScore};
use crate::unit::{unit_launch_system, LaunchUnit};
use bevy::prelude::*;

/// Ordering contract for the per-frame systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Cull,
    Occupancy,
    Respawn,
    Drive,
}

pub struct SimulationPlugin {
    config: GameConfig,
    catalog: UnitCatalog,
}

impl SimulationPlugin {
    /// Validate `config`, build the catalog, and return the plugin.
    ///
    /// Any configuration problem is returned here, before the app starts.
    pub fn new(config: GameConfig) -> SimResult<Self> {
        config.validate()?;
        let catalog = UnitCatalog::new(config.units.clone())?;
        config.validate_unit_refs(&catalog)?;
        Ok(Self { config, catalog })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn catalog(&self) -> &UnitCatalog {
        &self.catalog
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            .insert_resource(self.catalog.clone())
            .insert_resource(EntityRegistry::new(self.catalog.len()))
            .insert_resource(SpawnScheduler::new(&self.config, &self.catalog))
            .insert_resource(RespawnCoordinator::new(self.config.respawn_delay))
            .insert_resource(GravityWell::from_config(&self.config))
            .init_resource::<TotalScore>()
            .init_resource::<SpawnZoneHits>()
            .add_message::<NextUnitChanged>()
            .add_message::<UnitReady>()
            .add_message::<RoundCleared>()
            .add_message::<ScoreChanged>()
            .add_message::<LaunchUnit>()
            .add_message::<ResetRound>()
            .configure_sets(
                Update,
                (
                    SimulationSet::Input,
                    SimulationSet::Cull,
                    SimulationSet::Occupancy,
                    SimulationSet::Respawn,
                    SimulationSet::Drive,
                )
                    .chain(),
            )
            .add_systems(Startup, (setup_field_system, start_round_system).chain())
            .add_systems(FixedUpdate, gravity_well_system)
            .add_systems(
                Update,
                (
                    (unit_launch_system, reset_score_system, reset_round_system)
                        .chain()
                        .in_set(SimulationSet::Input),
                    out_of_play_system.in_set(SimulationSet::Cull),
                    respawn_coordinator_system.in_set(SimulationSet::Respawn),
                    (angular_drive_system, score_change_system).in_set(SimulationSet::Drive),
                ),
            );
    }
}

/// Place the well body and the spawn-zone sensor.
pub fn setup_field_system(mut commands: Commands, config: Res<GameConfig>) {
    spawn_well(&mut commands, config.well_center());
    spawn_spawn_zone(
        &mut commands,
        config.spawn_position(),
        config.spawn_zone_radius,
    );
}

/// Feeds spawn-zone occupancy from Rapier.  Requires the Rapier plugin.
pub struct SpawnZoneScanPlugin;

impl Plugin for SpawnZoneScanPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            spawn_zone_scan_system.in_set(SimulationSet::Occupancy),
        );
    }
}
