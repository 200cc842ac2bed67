//! Merge Well simulation core library
//!
//! Spawn/despawn lifecycle and central gravity well for a merge-style physics
//! game: units are spawned at the bottom of the field, launched into an
//! inverse-square well, and respawned behind a cooldown and occupancy gate.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod graphics;
pub mod gravity;
pub mod lifecycle;
pub mod registry;
pub mod respawn;
pub mod scheduler;
pub mod score;
pub mod simulation;
pub mod testing;
pub mod unit;
