use crate::config::GameConfig;
use bevy::prelude::*;

/// Setup a 2D camera framing the field between the spawn point and the well.
pub fn setup_camera(mut commands: Commands, config: Res<GameConfig>) {
    let mid_y = (config.well_center().y + config.spawn_position().y) / 2.0;
    commands.spawn((
        Camera2d,
        Transform::from_xyz(0.0, mid_y, 0.0).with_scale(Vec3::splat(config.camera_scale)),
    ));
    eprintln!("[SETUP] Camera spawned");
}
