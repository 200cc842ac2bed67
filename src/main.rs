use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;
use merge_well::config::{load_game_config, CONFIG_PATH};
use merge_well::graphics;
use merge_well::simulation::{SimulationPlugin, SpawnZoneScanPlugin};
use merge_well::testing::ScenarioPlugin;
use std::env;

/// Configure Rapier physics: the well is the only source of gravity.
fn setup_physics_config(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::ZERO;
    }
}

fn main() {
    // Check for test mode
    let test_mode = env::var("MERGE_WELL_TEST").ok();

    let config = load_game_config(CONFIG_PATH);
    let simulation = match SimulationPlugin::new(config) {
        Ok(plugin) => plugin,
        Err(e) => {
            eprintln!("✗ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "✓ Unit catalog ready: {} tiers (final tier {})",
        simulation.catalog().len(),
        simulation.catalog().final_id()
    );

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Merge Well".into(),
            resolution: WindowResolution::new(720, 1080),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::BLACK))
    // pixels_per_meter(1.0) keeps world units identical to physics units, so
    // the well's force constant reads the same in both.  The physics step runs
    // in FixedPostUpdate, right after the well's FixedUpdate force pass.
    .add_plugins(
        RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0).in_fixed_schedule(),
    )
    .add_plugins(RapierDebugRenderPlugin::default())
    .add_plugins(simulation)
    .add_plugins(SpawnZoneScanPlugin)
    .add_systems(Startup, (graphics::setup_camera, setup_physics_config));

    // Add scripted scenario if in test mode
    if let Some(test_name) = test_mode {
        app.add_plugins(ScenarioPlugin { test_name });
    }

    app.run();
}
