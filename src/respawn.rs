//! Respawn gate: decides when the next auto unit may enter play.
//!
//! ## States
//!
//! | State       | Meaning                                                   |
//! |-------------|-----------------------------------------------------------|
//! | `Idle`      | No respawn pending                                        |
//! | `Waiting`   | Respawn requested; polled once per frame                  |
//! | `Fulfilled` | Gate opened this frame; the spawn is being carried out    |
//!
//! While `Waiting`, each frame evaluates, in order:
//!
//! 1. **Round clear**: every live unit is settled (and there is at least
//!    one).  The watch ends with no spawn and [`RoundCleared`] is published.
//! 2. **Gate**: the cooldown has elapsed *and* no live unit overlaps the
//!    spawn zone.  The previewed unit is spawned and handed to the aiming
//!    collaborator through [`UnitReady`].
//! 3. Otherwise keep waiting.
//!
//! ## Systems
//!
//! | System                        | Schedule | Purpose                                   |
//! |-------------------------------|----------|-------------------------------------------|
//! | `spawn_zone_scan_system`     | Update   | Refill [`SpawnZoneHits`] from Rapier      |
//! | `respawn_coordinator_system`  | Update   | Advance the gate and perform the spawn    |

use crate::registry::EntityRegistry;
use crate::scheduler::{SpawnKind, Spawner};
use crate::unit::Unit;
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

// ── Messages ──────────────────────────────────────────────────────────────────

/// A unit spawned by the respawn gate, ready to be aimed and launched.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitReady {
    pub entity: Entity,
}

/// Every live unit has settled; the round is over.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundCleared;

// ── State machine ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RespawnState {
    #[default]
    Idle,
    Waiting,
    Fulfilled,
}

/// Outcome of one [`RespawnCoordinator::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespawnTick {
    /// Not waiting; nothing evaluated.
    Idle,
    /// Conditions not met yet.
    Waiting,
    /// All units settled; returned to `Idle` without spawning.
    RoundClear,
    /// Gate open: spawn now, then call [`RespawnCoordinator::complete`].
    Fire,
}

#[derive(Resource, Debug, Clone)]
pub struct RespawnCoordinator {
    state: RespawnState,
    /// Virtual-clock time (s) at which the cooldown elapses.
    ready_at: f32,
    cooldown: f32,
}

impl RespawnCoordinator {
    pub fn new(cooldown: f32) -> Self {
        Self {
            state: RespawnState::Idle,
            ready_at: 0.0,
            cooldown,
        }
    }

    pub fn state(&self) -> RespawnState {
        self.state
    }

    pub fn is_waiting(&self) -> bool {
        self.state == RespawnState::Waiting
    }

    pub fn ready_at(&self) -> f32 {
        self.ready_at
    }

    pub fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Start a respawn watch.  Returns `false` (and changes nothing) if one is
    /// already running.
    pub fn request_respawn(&mut self, now: f32) -> bool {
        if self.state != RespawnState::Idle {
            return false;
        }
        self.ready_at = now + self.cooldown;
        self.state = RespawnState::Waiting;
        true
    }

    /// Abort any pending watch.  Valid in every state.
    pub fn cancel_respawn(&mut self) {
        self.state = RespawnState::Idle;
        self.ready_at = 0.0;
    }

    /// Evaluate one frame of the watch.
    pub fn advance(&mut self, now: f32, all_settled: bool, zone_occupied: bool) -> RespawnTick {
        if self.state != RespawnState::Waiting {
            return RespawnTick::Idle;
        }
        if all_settled {
            self.state = RespawnState::Idle;
            return RespawnTick::RoundClear;
        }
        let time_ready = now >= self.ready_at;
        if time_ready && !zone_occupied {
            self.state = RespawnState::Fulfilled;
            return RespawnTick::Fire;
        }
        RespawnTick::Waiting
    }

    /// Finish a `Fire` transition.
    pub fn complete(&mut self) {
        if self.state == RespawnState::Fulfilled {
            self.state = RespawnState::Idle;
        }
    }
}

/// `true` iff there is at least one unit and every one is settled.
///
/// `None` marks a unit whose body could not be resolved; it counts as not
/// settled.
pub fn all_settled<I>(settled_flags: I) -> bool
where
    I: IntoIterator<Item = Option<bool>>,
{
    let mut any = false;
    for flag in settled_flags {
        if flag != Some(true) {
            return false;
        }
        any = true;
    }
    any
}

// ── Spawn zone ────────────────────────────────────────────────────────────────

/// Marker for the sensor collider covering the spawn position.
#[derive(Component, Debug)]
pub struct SpawnZone;

/// Entities overlapping the spawn zone this frame.
///
/// Cleared before every refill; never read across frames.
#[derive(Resource, Debug, Default)]
pub struct SpawnZoneHits(pub Vec<Entity>);

/// Spawn the fixed sensor that respawns must wait to be clear.
pub fn spawn_spawn_zone(commands: &mut Commands, position: Vec2, radius: f32) -> Entity {
    commands
        .spawn((
            SpawnZone,
            Transform::from_translation(position.extend(0.0)),
            RigidBody::Fixed,
            Collider::ball(radius),
            Sensor,
        ))
        .id()
}

/// Copy the spawn zone's current intersections into [`SpawnZoneHits`].
pub fn spawn_zone_scan_system(
    rapier_context: ReadRapierContext,
    zone: Query<Entity, With<SpawnZone>>,
    mut hits: ResMut<SpawnZoneHits>,
) {
    hits.0.clear();
    let Ok(zone_entity) = zone.single() else {
        return;
    };
    let Ok(rapier) = rapier_context.single() else {
        return;
    };
    for (e1, e2, intersecting) in rapier.intersection_pairs_with(zone_entity) {
        if !intersecting {
            continue;
        }
        let other = if e1 == zone_entity { e2 } else { e1 };
        hits.0.push(other);
    }
}

/// `true` if any entity in `hits` is a live registered unit.
///
/// Units already despawned this frame are absent from the registry and so
/// never count, even while their components still exist.
pub fn zone_occupied(hits: &[Entity], registry: &EntityRegistry, units: &Query<&Unit>) -> bool {
    hits.iter()
        .any(|e| registry.contains(*e) && units.get(*e).is_ok())
}

/// Advance the respawn gate and carry out the spawn when it opens.
pub fn respawn_coordinator_system(
    mut coordinator: ResMut<RespawnCoordinator>,
    mut spawner: Spawner,
    units: Query<&Unit>,
    hits: Res<SpawnZoneHits>,
    time: Res<Time>,
    mut ready: MessageWriter<UnitReady>,
    mut cleared: MessageWriter<RoundCleared>,
) {
    if !coordinator.is_waiting() {
        return;
    }

    let now = time.elapsed_secs();
    let settled = all_settled(
        spawner
            .registry
            .live_entities()
            .iter()
            .map(|e| units.get(*e).ok().map(|u| u.settled)),
    );
    let occupied = zone_occupied(&hits.0, &spawner.registry, &units);

    match coordinator.advance(now, settled, occupied) {
        RespawnTick::RoundClear => {
            info!("All units settled; round clear");
            cleared.write(RoundCleared);
        }
        RespawnTick::Fire => {
            if let Some(entity) = spawner.spawn(SpawnKind::Auto, None) {
                info!("Respawned unit {:?}", entity);
                ready.write(UnitReady { entity });
            }
            coordinator.complete();
        }
        RespawnTick::Idle | RespawnTick::Waiting => {}
    }
}
