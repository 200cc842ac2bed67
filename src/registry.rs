//! Authoritative set of live unit entities and per-tier merge counters.
//!
//! Every unit enters play through [`EntityRegistry::spawn`] and leaves through
//! [`EntityRegistry::despawn`].  Bookkeeping happens immediately while the
//! entity itself is released through `Commands`, so a unit removed this frame
//! is already absent from [`EntityRegistry::live_entities`] even though its
//! components linger until the command buffer is applied.

use crate::catalog::UnitCatalog;
use crate::config::GameConfig;
use crate::unit::spawn_unit_body;
use bevy::prelude::*;

#[derive(Resource, Debug, Default)]
pub struct EntityRegistry {
    /// Live units in spawn order.
    spawned: Vec<Entity>,
    /// Merge counters indexed by `id - 1`.
    unit_counts: Vec<u32>,
}

impl EntityRegistry {
    /// Empty registry with one counter per catalog tier.
    pub fn new(catalog_len: usize) -> Self {
        Self {
            spawned: Vec::new(),
            unit_counts: vec![0; catalog_len],
        }
    }

    // ── Spawn / despawn ───────────────────────────────────────────────────────

    /// Spawn unit `id` at `position` (or the configured spawn position).
    ///
    /// Returns `None` when `id` is not in the catalog.
    pub fn spawn(
        &mut self,
        commands: &mut Commands,
        catalog: &UnitCatalog,
        config: &GameConfig,
        id: u32,
        position: Option<Vec2>,
    ) -> Option<Entity> {
        let Some(data) = catalog.find_by_id(id) else {
            warn!("Spawn requested for unknown unit id {}", id);
            return None;
        };
        let position = position.unwrap_or_else(|| config.spawn_position());
        let entity = spawn_unit_body(commands, data.clone(), position, config);
        self.admit(entity);
        debug!("Spawned unit {} ({:?}) at {:?}", id, entity, position);
        Some(entity)
    }

    /// Record an already-spawned unit entity as live.  Admitting twice is a no-op.
    pub fn admit(&mut self, entity: Entity) {
        if !self.spawned.contains(&entity) {
            self.spawned.push(entity);
        }
    }

    /// Remove `entity` from the live set without touching the world.
    /// Returns `false` if it was not live.
    pub fn forget(&mut self, entity: Entity) -> bool {
        match self.spawned.iter().position(|e| *e == entity) {
            Some(index) => {
                self.spawned.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove `entity` from play and release its body.
    ///
    /// Despawning an entity that is not live does nothing and returns `false`.
    pub fn despawn(&mut self, commands: &mut Commands, entity: Entity) -> bool {
        if !self.forget(entity) {
            return false;
        }
        commands.entity(entity).try_despawn();
        debug!("Despawned unit {:?}", entity);
        true
    }

    /// Despawn every live unit, newest first.  Returns how many were removed.
    pub fn despawn_all(&mut self, commands: &mut Commands) -> usize {
        let mut removed = 0;
        for index in (0..self.spawned.len()).rev() {
            let entity = self.spawned[index];
            if self.despawn(commands, entity) {
                removed += 1;
            }
        }
        removed
    }

    // ── Counters ──────────────────────────────────────────────────────────────

    /// Bump the merge counter for tier `id`.  Returns `false` on an unknown id.
    pub fn increment_count(&mut self, id: u32) -> bool {
        match self.counter_mut(id) {
            Some(count) => {
                *count += 1;
                true
            }
            None => {
                warn!("Merge counter requested for unknown unit id {}", id);
                false
            }
        }
    }

    pub fn reset_counts(&mut self) {
        self.unit_counts.iter_mut().for_each(|c| *c = 0);
    }

    /// Merge counter for tier `id`; unknown ids read as zero.
    pub fn count_for(&self, id: u32) -> u32 {
        id.checked_sub(1)
            .and_then(|i| self.unit_counts.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    fn counter_mut(&mut self, id: u32) -> Option<&mut u32> {
        let index = id.checked_sub(1)? as usize;
        self.unit_counts.get_mut(index)
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn live_entities(&self) -> &[Entity] {
        &self.spawned
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.spawned.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.spawned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spawned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Unit;
    use bevy::ecs::system::RunSystemOnce;

    fn world_with_registry() -> World {
        let mut world = World::new();
        let config = GameConfig::default();
        let catalog = UnitCatalog::new(config.units.clone()).unwrap();
        world.insert_resource(EntityRegistry::new(catalog.len()));
        world.insert_resource(catalog);
        world.insert_resource(config);
        world
    }

    fn spawn_in(world: &mut World, id: u32, position: Option<Vec2>) -> Option<Entity> {
        world
            .run_system_once(
                move |mut commands: Commands,
                      mut registry: ResMut<EntityRegistry>,
                      catalog: Res<UnitCatalog>,
                      config: Res<GameConfig>| {
                    registry.spawn(&mut commands, &catalog, &config, id, position)
                },
            )
            .expect("spawn system should run")
    }

    fn despawn_in(world: &mut World, entity: Entity) -> bool {
        world
            .run_system_once(
                move |mut commands: Commands, mut registry: ResMut<EntityRegistry>| {
                    registry.despawn(&mut commands, entity)
                },
            )
            .expect("despawn system should run")
    }

    #[test]
    fn spawn_clones_definition_and_places_body() {
        let mut world = world_with_registry();
        let entity = spawn_in(&mut world, 3, Some(Vec2::new(1.0, 2.0))).unwrap();

        let unit = world.get::<Unit>(entity).unwrap();
        assert_eq!(unit.data.id, 3);
        assert!(!unit.launched && !unit.settled);
        let translation = world.get::<Transform>(entity).unwrap().translation;
        assert_eq!(translation.truncate(), Vec2::new(1.0, 2.0));
        assert_eq!(world.resource::<EntityRegistry>().live_entities(), &[entity]);
    }

    #[test]
    fn spawn_without_position_uses_spawn_point() {
        let mut world = world_with_registry();
        let entity = spawn_in(&mut world, 1, None).unwrap();
        let expected = world.resource::<GameConfig>().spawn_position();
        let translation = world.get::<Transform>(entity).unwrap().translation;
        assert_eq!(translation.truncate(), expected);
    }

    #[test]
    fn spawn_unknown_id_is_a_lookup_miss() {
        let mut world = world_with_registry();
        assert!(spawn_in(&mut world, 0, None).is_none());
        assert!(spawn_in(&mut world, 99, None).is_none());
        assert!(world.resource::<EntityRegistry>().is_empty());
    }

    #[test]
    fn mutating_a_unit_copy_leaves_catalog_untouched() {
        let mut world = world_with_registry();
        let entity = spawn_in(&mut world, 2, None).unwrap();
        world.get_mut::<Unit>(entity).unwrap().data.mass_class = 42.0;
        let catalog = world.resource::<UnitCatalog>();
        assert_ne!(catalog.find_by_id(2).unwrap().mass_class, 42.0);
    }

    #[test]
    fn double_despawn_is_a_no_op() {
        let mut world = world_with_registry();
        let a = spawn_in(&mut world, 1, None).unwrap();
        let _b = spawn_in(&mut world, 2, None).unwrap();

        assert!(despawn_in(&mut world, a));
        assert_eq!(world.resource::<EntityRegistry>().len(), 1);
        assert!(world.get_entity(a).is_err());

        assert!(!despawn_in(&mut world, a));
        assert_eq!(world.resource::<EntityRegistry>().len(), 1);
    }

    #[test]
    fn despawn_all_empties_live_set_but_keeps_counts() {
        let mut world = world_with_registry();
        for id in [1, 2, 3, 1] {
            spawn_in(&mut world, id, None).unwrap();
        }
        {
            let mut registry = world.resource_mut::<EntityRegistry>();
            assert!(registry.increment_count(1));
            assert!(registry.increment_count(1));
            assert!(registry.increment_count(4));
        }

        let removed = world
            .run_system_once(|mut commands: Commands, mut registry: ResMut<EntityRegistry>| {
                registry.despawn_all(&mut commands)
            })
            .unwrap();
        assert_eq!(removed, 4);

        let registry = world.resource::<EntityRegistry>();
        assert!(registry.live_entities().is_empty());
        assert_eq!(registry.count_for(1), 2);
        assert_eq!(registry.count_for(4), 1);
        assert_eq!(world.query::<&Unit>().iter(&world).count(), 0);
    }

    #[test]
    fn reset_counts_clears_every_tier() {
        let mut registry = EntityRegistry::new(5);
        registry.increment_count(2);
        registry.increment_count(5);
        registry.reset_counts();
        assert!((1..=5).all(|id| registry.count_for(id) == 0));
    }

    #[test]
    fn counter_misses_are_reported() {
        let mut registry = EntityRegistry::new(3);
        assert!(!registry.increment_count(0));
        assert!(!registry.increment_count(4));
        assert_eq!(registry.count_for(0), 0);
        assert_eq!(registry.count_for(4), 0);
    }
}
