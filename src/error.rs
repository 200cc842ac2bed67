//! Simulation-specific error types.
//!
//! Configuration problems are fatal and surface once, at startup, through
//! [`SimError`].  Runtime misses (an unknown unit id, an entity that was
//! already despawned this frame) are not errors: the affected operation
//! returns `None` / `false` and the caller decides what to do.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use merge_well::error::SimResult;
//!
//! fn build() -> SimResult<UnitCatalog> {
//!     let config = load_game_config("assets/game.toml");
//!     config.validate()?;
//!     UnitCatalog::new(config.units.clone())
//! }
//! ```

use std::fmt;

/// Top-level error enum for the merge-well simulation core.
#[derive(Debug, Clone, PartialEq)]
pub enum SimError {
    /// The unit catalog has no definitions; nothing could ever be spawned.
    EmptyCatalog,

    /// Two catalog entries share the same identifier.
    DuplicateUnitId {
        /// The repeated identifier.
        id: u32,
    },

    /// Catalog identifiers must run `1..=N` with no gaps so per-unit counters
    /// can be indexed by `id - 1`.
    NonContiguousUnitIds {
        /// Identifier found where `expected` should have been.
        found: u32,
        /// Identifier required at this position.
        expected: u32,
    },

    /// A configured unit id (first unit, initial preview) is not in the catalog.
    UnknownUnit {
        /// Name of the configuration key that referenced the id.
        context: &'static str,
        /// The missing identifier.
        id: u32,
    },

    /// Physics or timing constant is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },

    /// `assets/game.toml` exists but could not be parsed.
    ConfigParse {
        /// Path of the offending file.
        path: String,
        /// Parser message.
        message: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyCatalog => write!(f, "unit catalog is empty"),
            SimError::DuplicateUnitId { id } => {
                write!(f, "unit id {} appears more than once in the catalog", id)
            }
            SimError::NonContiguousUnitIds { found, expected } => write!(
                f,
                "unit ids must be contiguous from 1: found {} where {} was expected",
                found, expected
            ),
            SimError::UnknownUnit { context, id } => {
                write!(f, "'{}' references unknown unit id {}", context, id)
            }
            SimError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
            SimError::ConfigParse { path, message } => {
                write!(f, "failed to parse {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for SimError {}

/// Convenience alias: a `Result` using `SimError` as the error type.
pub type SimResult<T> = Result<T, SimError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `gravity_const` is not strictly positive and finite.
pub fn validate_gravity_const(value: f32) -> SimResult<()> {
    if !value.is_finite() || value <= 0.0 {
        Err(SimError::UnsafeConstant {
            name: "gravity_const",
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if the distance floor would allow a division by zero.
pub fn validate_min_gravity_dist(value: f32) -> SimResult<()> {
    if !value.is_finite() || value <= 0.0 {
        Err(SimError::UnsafeConstant {
            name: "min_gravity_dist",
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if the respawn cooldown is negative.
pub fn validate_respawn_delay(value: f32) -> SimResult<()> {
    if !value.is_finite() || value < 0.0 {
        Err(SimError::UnsafeConstant {
            name: "respawn_delay",
            value,
            safe_range: "[0.0, ∞)",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if `value` (a unit radius or mass class) is not strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> SimResult<()> {
    if !value.is_finite() || value <= 0.0 {
        Err(SimError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    } else {
        Ok(())
    }
}
