//! Spawn scheduling: which unit comes next, and the spawn entry point.
//!
//! ## Auto-pick
//!
//! | Total score      | Tiers picked from |
//! |------------------|-------------------|
//! | `0..=100`        | `1..=3`           |
//! | `101..=500`      | `1..=4`           |
//! | `501..`          | `1..=5`           |
//!
//! The pick is uniform within the range.  An auto spawn releases the unit
//! currently shown in the preview and immediately picks its successor, so the
//! player always sees the next unit one spawn ahead.
//!
//! [`Spawner`] bundles every collaborator a spawn needs (registry, catalog,
//! scheduler, score, config, preview sink) into one system parameter.

use crate::catalog::{DisplayRef, UnitCatalog};
use crate::config::GameConfig;
use crate::constants::{
    PICK_TIER_LOW_SCORE, PICK_TIER_MID_SCORE, PICK_WIDTH_HIGH, PICK_WIDTH_LOW, PICK_WIDTH_MID,
};
use crate::registry::EntityRegistry;
use crate::score::TotalScore;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Published whenever the previewed next unit changes.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct NextUnitChanged {
    pub id: u32,
    pub display: DisplayRef,
}

/// What to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    /// The previewed unit; advances the preview.
    Auto,
    /// A specific tier (merge products, debug spawns).  Leaves the preview alone.
    Unit(u32),
}

/// Width of the auto-pick range at `total_score`.
pub fn pick_width(total_score: u32) -> u32 {
    if total_score <= PICK_TIER_LOW_SCORE {
        PICK_WIDTH_LOW
    } else if total_score <= PICK_TIER_MID_SCORE {
        PICK_WIDTH_MID
    } else {
        PICK_WIDTH_HIGH
    }
}

/// Draw the next tier for `total_score`, uniform over `1..=width`.
///
/// The width is clamped to `catalog_len` so the pick always resolves.
pub fn pick_next<R: Rng + ?Sized>(total_score: u32, catalog_len: usize, rng: &mut R) -> u32 {
    let limit = u32::try_from(catalog_len).unwrap_or(u32::MAX).max(1);
    let width = pick_width(total_score).min(limit);
    rng.gen_range(1..=width)
}

#[derive(Resource, Debug)]
pub struct SpawnScheduler {
    /// Tier released by the next auto spawn.
    pending_id: u32,
    preview: DisplayRef,
    rng: StdRng,
}

impl SpawnScheduler {
    /// Scheduler previewing `config.initial_preview_id`.
    ///
    /// `config` must already have passed
    /// [`GameConfig::validate_unit_refs`] against `catalog`.
    pub fn new(config: &GameConfig, catalog: &UnitCatalog) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pending_id = config.initial_preview_id;
        let preview = catalog
            .find_by_id(pending_id)
            .map(|d| d.display.clone())
            .unwrap_or_default();
        Self {
            pending_id,
            preview,
            rng,
        }
    }

    pub fn pending_id(&self) -> u32 {
        self.pending_id
    }

    /// Visual of the upcoming auto spawn, for the preview UI.
    pub fn current_preview(&self) -> &DisplayRef {
        &self.preview
    }

    /// Take the pending tier and pick its successor.
    ///
    /// Returns `(released, next)`; the preview is updated to `next`.
    pub fn advance(&mut self, total_score: u32, catalog: &UnitCatalog) -> (u32, u32) {
        let released = self.pending_id;
        let next = pick_next(total_score, catalog.len(), &mut self.rng);
        self.pending_id = next;
        self.preview = catalog
            .find_by_id(next)
            .map(|d| d.display.clone())
            .unwrap_or_default();
        (released, next)
    }
}

/// Everything needed to put a unit into play.
#[derive(SystemParam)]
pub struct Spawner<'w, 's> {
    pub commands: Commands<'w, 's>,
    pub registry: ResMut<'w, EntityRegistry>,
    pub scheduler: ResMut<'w, SpawnScheduler>,
    pub catalog: Res<'w, UnitCatalog>,
    pub config: Res<'w, GameConfig>,
    pub score: Res<'w, TotalScore>,
    pub next_changed: MessageWriter<'w, NextUnitChanged>,
}

impl Spawner<'_, '_> {
    /// Spawn a unit at `position` (or the spawn point).
    ///
    /// `SpawnKind::Auto` releases the previewed tier and publishes the new
    /// preview; `SpawnKind::Unit` spawns the given tier and returns `None` if
    /// it is unknown.
    pub fn spawn(&mut self, kind: SpawnKind, position: Option<Vec2>) -> Option<Entity> {
        let id = match kind {
            SpawnKind::Auto => {
                let (released, next) = self.scheduler.advance(self.score.get(), &self.catalog);
                self.next_changed.write(NextUnitChanged {
                    id: next,
                    display: self.scheduler.current_preview().clone(),
                });
                released
            }
            SpawnKind::Unit(id) => id,
        };
        self.registry
            .spawn(&mut self.commands, &self.catalog, &self.config, id, position)
    }

    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.registry.despawn(&mut self.commands, entity)
    }

    pub fn despawn_all(&mut self) -> usize {
        self.registry.despawn_all(&mut self.commands)
    }
}
