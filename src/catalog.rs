//! Unit catalog: the immutable table of unit definitions.
//!
//! Definitions are supplied as plain data (the `[[units]]` tables of
//! `assets/game.toml`) and validated once when the catalog is built.  Every
//! spawned unit receives its own clone of a definition, so merges that mutate
//! a unit's copy never reach back into the catalog.

use crate::error::{validate_positive, SimError, SimResult};
use bevy::prelude::*;
use serde::Deserialize;

/// Opaque reference to a unit's visual (a sprite asset path).
///
/// The core never resolves it; it is handed to the preview sink as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct DisplayRef(pub String);

/// Static description of one unit tier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitDefinition {
    /// Tier identifier, `1..=N` across the catalog.
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Physical mass assigned to the unit's collider.
    pub mass_class: f32,
    /// Collider radius (world units).
    pub radius: f32,
    /// Tier produced when two units of this tier merge.
    pub merge_target: u32,
    /// Visual shown in the next-unit preview.
    #[serde(default)]
    pub display: DisplayRef,
}

/// Catalog resource, ordered by identifier.
#[derive(Resource, Debug, Clone)]
pub struct UnitCatalog {
    definitions: Vec<UnitDefinition>,
}

impl UnitCatalog {
    /// Validate and order `definitions`.
    ///
    /// Fails on an empty list, a repeated id, a gap in `1..=N`, or a
    /// non-positive mass or radius.
    pub fn new(mut definitions: Vec<UnitDefinition>) -> SimResult<Self> {
        if definitions.is_empty() {
            return Err(SimError::EmptyCatalog);
        }

        definitions.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.name.cmp(&b.name)));

        for pair in definitions.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(SimError::DuplicateUnitId { id: pair[0].id });
            }
        }
        for (index, def) in definitions.iter().enumerate() {
            let expected = index as u32 + 1;
            if def.id != expected {
                return Err(SimError::NonContiguousUnitIds {
                    found: def.id,
                    expected,
                });
            }
            validate_positive("mass_class", def.mass_class)?;
            validate_positive("radius", def.radius)?;
        }

        Ok(Self { definitions })
    }

    pub fn find_by_id(&self, id: u32) -> Option<&UnitDefinition> {
        // Ids are contiguous from 1, so the id doubles as an index.
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.definitions.get(index)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.find_by_id(id).is_some()
    }

    /// All definitions in identifier order.
    pub fn definitions(&self) -> &[UnitDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Never `true` for a catalog built through [`UnitCatalog::new`].
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Identifier of the highest tier (the final merge product).
    pub fn final_id(&self) -> u32 {
        self.definitions.last().map_or(0, |d| d.id)
    }
}

/// Default eleven-tier catalog used when `assets/game.toml` has no `[[units]]`.
pub fn default_unit_definitions() -> Vec<UnitDefinition> {
    const NAMES: [&str; 11] = [
        "pebble", "stone", "rock", "boulder", "crag", "mound", "hill", "mesa", "peak", "summit",
        "mountain",
    ];
    NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let id = i as u32 + 1;
            UnitDefinition {
                id,
                name: (*name).to_string(),
                mass_class: 1.0 + i as f32 * 0.5,
                radius: 0.25 + i as f32 * 0.1,
                merge_target: (id + 1).min(NAMES.len() as u32),
                display: DisplayRef(format!("units/{name}.png")),
            }
        })
        .collect()
}
