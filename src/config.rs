//! Runtime configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`] and carries the unit catalog as plain data.
//! [`load_game_config`] reads the TOML file and overwrites the defaults with
//! any values present.  Missing keys fall back to the compile-time defaults,
//! so a minimal TOML can override just the values you care about.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/game.toml`.
//! 2. Restart; no recompilation required.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::catalog::{default_unit_definitions, UnitDefinition};
use crate::constants::*;
use crate::error::{
    validate_gravity_const, validate_min_gravity_dist, validate_positive, validate_respawn_delay,
    SimError, SimResult,
};
use bevy::prelude::*;
use serde::Deserialize;

/// Default location of the configuration file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/game.toml";

/// Runtime-tunable simulation configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Gravity Well ──────────────────────────────────────────────────────────
    pub gravity_const: f32,
    pub min_gravity_dist: f32,
    pub angular_drive_divisor: f32,

    // ── Field Layout ──────────────────────────────────────────────────────────
    pub hole_y: f32,
    pub spawn_pos_y: f32,
    /// Vertical offset supplied by the host's camera sizing; pushes the well
    /// up and the spawn position down by the same amount.
    pub size_delta: f32,
    pub spawn_zone_radius: f32,
    pub cull_distance: f32,

    // ── Respawn ───────────────────────────────────────────────────────────────
    pub respawn_delay: f32,
    pub first_unit_id: u32,
    pub initial_preview_id: u32,
    /// Seed for the auto-pick RNG; `None` seeds from entropy.
    pub rng_seed: Option<u64>,

    // ── Unit Bodies ───────────────────────────────────────────────────────────
    pub unit_restitution: f32,
    pub unit_friction: f32,
    pub unit_linear_damping: f32,

    // ── Camera ────────────────────────────────────────────────────────────────
    pub camera_scale: f32,

    // ── Catalog ───────────────────────────────────────────────────────────────
    pub units: Vec<UnitDefinition>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Gravity Well
            gravity_const: GRAVITY_CONST,
            min_gravity_dist: MIN_GRAVITY_DIST,
            angular_drive_divisor: ANGULAR_DRIVE_DIVISOR,
            // Field Layout
            hole_y: HOLE_Y,
            spawn_pos_y: SPAWN_POS_Y,
            size_delta: 0.0,
            spawn_zone_radius: SPAWN_ZONE_RADIUS,
            cull_distance: CULL_DISTANCE,
            // Respawn
            respawn_delay: RESPAWN_DELAY,
            first_unit_id: FIRST_UNIT_ID,
            initial_preview_id: INITIAL_PREVIEW_ID,
            rng_seed: None,
            // Unit Bodies
            unit_restitution: UNIT_RESTITUTION,
            unit_friction: UNIT_FRICTION,
            unit_linear_damping: UNIT_LINEAR_DAMPING,
            // Camera
            camera_scale: CAMERA_SCALE,
            // Catalog
            units: default_unit_definitions(),
        }
    }
}

impl GameConfig {
    /// World-space centre of the gravity well.
    pub fn well_center(&self) -> Vec2 {
        Vec2::new(0.0, self.hole_y + self.size_delta)
    }

    /// Default world-space spawn position for new units.
    pub fn spawn_position(&self) -> Vec2 {
        Vec2::new(0.0, self.spawn_pos_y - self.size_delta)
    }

    /// Check every physics and timing constant.  Catalog-level checks live in
    /// [`crate::catalog::UnitCatalog::new`]; unit-id references are checked
    /// against the built catalog by [`GameConfig::validate_unit_refs`].
    pub fn validate(&self) -> SimResult<()> {
        validate_gravity_const(self.gravity_const)?;
        validate_min_gravity_dist(self.min_gravity_dist)?;
        validate_positive("angular_drive_divisor", self.angular_drive_divisor)?;
        validate_respawn_delay(self.respawn_delay)?;
        validate_positive("spawn_zone_radius", self.spawn_zone_radius)?;
        validate_positive("cull_distance", self.cull_distance)?;
        Ok(())
    }

    /// Both configured unit ids must resolve in the catalog.
    pub fn validate_unit_refs(&self, catalog: &crate::catalog::UnitCatalog) -> SimResult<()> {
        if !catalog.contains(self.first_unit_id) {
            return Err(SimError::UnknownUnit {
                context: "first_unit_id",
                id: self.first_unit_id,
            });
        }
        if !catalog.contains(self.initial_preview_id) {
            return Err(SimError::UnknownUnit {
                context: "initial_preview_id",
                id: self.initial_preview_id,
            });
        }
        Ok(())
    }
}

/// Parse a configuration document.  Missing keys keep their defaults.
pub fn parse_game_config(path: &str, contents: &str) -> SimResult<GameConfig> {
    toml::from_str::<GameConfig>(contents).map_err(|e| SimError::ConfigParse {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Read `path` and return the resulting configuration.
///
/// A missing file is not an error: the compiled defaults are returned.  TOML
/// parse errors are printed to stderr and also fall back to defaults, so a
/// typo in a tuning file never prevents the game from starting.
pub fn load_game_config(path: &str) -> GameConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => match parse_game_config(path, &contents) {
            Ok(loaded) => {
                println!("✓ Loaded game config from {path}");
                loaded
            }
            Err(e) => {
                eprintln!("⚠ {e}; using defaults");
                GameConfig::default()
            }
        },
        Err(_) => {
            println!("ℹ No {path} found; using compiled defaults");
            GameConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UnitCatalog;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        let catalog = UnitCatalog::new(config.units.clone()).unwrap();
        assert!(config.validate_unit_refs(&catalog).is_ok());
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = parse_game_config("inline", "gravity_const = 120.0\nrespawn_delay = 1.5\n")
            .expect("partial config should parse");
        assert_eq!(config.gravity_const, 120.0);
        assert_eq!(config.respawn_delay, 1.5);
        assert_eq!(config.hole_y, HOLE_Y);
        assert_eq!(config.units.len(), default_unit_definitions().len());
    }

    #[test]
    fn units_table_replaces_default_catalog() {
        let toml = r#"
            [[units]]
            id = 1
            name = "seed"
            mass_class = 1.0
            radius = 0.3
            merge_target = 2
            display = "units/seed.png"

            [[units]]
            id = 2
            mass_class = 2.0
            radius = 0.4
            merge_target = 2
        "#;
        let config = parse_game_config("inline", toml).unwrap();
        assert_eq!(config.units.len(), 2);
        assert_eq!(config.units[0].display.0, "units/seed.png");
        assert!(config.units[1].name.is_empty());
    }

    #[test]
    fn malformed_toml_reports_path() {
        let err = parse_game_config("assets/game.toml", "gravity_const = [").unwrap_err();
        assert!(err.to_string().contains("assets/game.toml"));
    }

    #[test]
    fn size_delta_spreads_well_and_spawn_apart() {
        let config = GameConfig {
            size_delta: 2.0,
            ..Default::default()
        };
        assert_eq!(config.well_center(), Vec2::new(0.0, HOLE_Y + 2.0));
        assert_eq!(config.spawn_position(), Vec2::new(0.0, SPAWN_POS_Y - 2.0));
    }

    #[test]
    fn unknown_first_unit_is_a_configuration_error() {
        let config = GameConfig {
            first_unit_id: 99,
            ..Default::default()
        };
        let catalog = UnitCatalog::new(config.units.clone()).unwrap();
        assert_eq!(
            config.validate_unit_refs(&catalog).unwrap_err(),
            SimError::UnknownUnit {
                context: "first_unit_id",
                id: 99
            }
        );
    }
}
