//! Round lifecycle: round start, round reset, and removal of units that left play.

use crate::respawn::{RespawnCoordinator, UnitReady};
use crate::scheduler::{SpawnKind, Spawner};
use crate::unit::Unit;
use bevy::prelude::*;

/// Request a fresh round: every unit is removed, counters and score are
/// cleared, any pending respawn is cancelled, and the first unit is spawned.
#[derive(Message, Debug, Clone, Copy, Default)]
pub struct ResetRound;

/// Spawn the round's opening unit and hand it to the aiming collaborator.
pub fn start_round(spawner: &mut Spawner, ready: &mut MessageWriter<UnitReady>) -> Option<Entity> {
    let first = spawner.config.first_unit_id;
    let entity = spawner.spawn(SpawnKind::Unit(first), None)?;
    ready.write(UnitReady { entity });
    info!("Round started with unit {}", first);
    Some(entity)
}

pub fn start_round_system(mut spawner: Spawner, mut ready: MessageWriter<UnitReady>) {
    start_round(&mut spawner, &mut ready);
}

/// Handle [`ResetRound`].  Several requests in one frame reset once.
pub fn reset_round_system(
    mut resets: MessageReader<ResetRound>,
    mut coordinator: ResMut<RespawnCoordinator>,
    mut spawner: Spawner,
    mut ready: MessageWriter<UnitReady>,
) {
    if resets.read().count() == 0 {
        return;
    }

    coordinator.cancel_respawn();
    let removed = spawner.despawn_all();
    spawner.registry.reset_counts();
    info!("Round reset; removed {} units", removed);

    start_round(&mut spawner, &mut ready);
}

/// Despawn units that drifted beyond `cull_distance` from the well centre.
pub fn out_of_play_system(mut spawner: Spawner, units: Query<&Transform, With<Unit>>) {
    let center = spawner.config.well_center();
    let cull_distance = spawner.config.cull_distance;

    let departed: Vec<Entity> = spawner
        .registry
        .live_entities()
        .iter()
        .copied()
        .filter(|e| {
            units
                .get(*e)
                .is_ok_and(|t| t.translation.truncate().distance(center) > cull_distance)
        })
        .collect();

    for entity in departed {
        spawner.despawn(entity);
    }
}
