//! Centralised simulation and gameplay constants.
//!
//! All tuneable values live here so they can be found and modified in one
//! place.  [`crate::config::GameConfig::default`] mirrors every value, and
//! `assets/game.toml` can override any subset at startup.

// ── Gravity Well ──────────────────────────────────────────────────────────────

/// Inverse-square attraction constant of the central well.
///
/// Force on a launched unit is `GRAVITY_CONST / dist² × mass`.  At 300 a unit
/// launched from the spawn position reaches the well in well under a second.
pub const GRAVITY_CONST: f32 = 300.0;

/// Distance floor used in the force law so the singularity at the well centre
/// never produces an infinite force.
pub const MIN_GRAVITY_DIST: f32 = 0.001;

/// Score is divided by this to obtain the well's angular drive speed (deg/s).
pub const ANGULAR_DRIVE_DIVISOR: f32 = 10.0;

// ── Field Layout ──────────────────────────────────────────────────────────────

/// Base height of the well centre before the host's camera-size offset.
pub const HOLE_Y: f32 = 5.0;

/// Base height of the spawn position before the host's camera-size offset.
pub const SPAWN_POS_Y: f32 = -6.0;

/// Radius of the spawn-zone sensor.  A unit overlapping it blocks respawn.
pub const SPAWN_ZONE_RADIUS: f32 = 0.6;

/// Units farther than this from the well centre have left play and are despawned.
pub const CULL_DISTANCE: f32 = 30.0;

// ── Respawn ───────────────────────────────────────────────────────────────────

/// Minimum time between a respawn request and the respawn itself (seconds).
pub const RESPAWN_DELAY: f32 = 3.0;

/// Unit spawned manually at the start of every round.
pub const FIRST_UNIT_ID: u32 = 1;

/// Unit shown in the preview before the first auto-pick.
pub const INITIAL_PREVIEW_ID: u32 = 1;

// ── Auto-pick Tiers ───────────────────────────────────────────────────────────

/// Score up to which only the three smallest tiers are picked.
pub const PICK_TIER_LOW_SCORE: u32 = 100;

/// Score up to which the four smallest tiers are picked.
pub const PICK_TIER_MID_SCORE: u32 = 500;

pub const PICK_WIDTH_LOW: u32 = 3;
pub const PICK_WIDTH_MID: u32 = 4;
pub const PICK_WIDTH_HIGH: u32 = 5;

// ── Unit Bodies ───────────────────────────────────────────────────────────────

/// Restitution for unit–unit and unit–well contacts.
pub const UNIT_RESTITUTION: f32 = 0.1;

/// Friction coefficient for unit contacts.
pub const UNIT_FRICTION: f32 = 0.6;

/// Linear damping on unit bodies so launched units do not orbit forever.
pub const UNIT_LINEAR_DAMPING: f32 = 0.2;

// ── Camera ────────────────────────────────────────────────────────────────────

/// World units shown per screen pixel by the debug camera.
pub const CAMERA_SCALE: f32 = 0.02;
