//! Drive-through resume using Bevy.
//!
//! Steer a carriage along a forest trail; resume panels open as it passes
//! each waypoint marker.

mod drive;
mod input;
mod launch_params;
mod scene;
mod ui;

use bevy::prelude::*;
use drive::{DrivePlugin, DriveSession};
use input::InputPlugin;
use scene::ScenePlugin;
use ui::{ResumeContent, ResumeUiPlugin};
use waypath_core::{Course, FrameDriver, SessionStart};

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((InputPlugin, ScenePlugin, DrivePlugin, ResumeUiPlugin));
    }
}

/// Build the drive session from launch parameters.
fn build_session(params: &launch_params::LaunchParams) -> Result<DriveSession, String> {
    let config = params.drive_config()?;
    let course = Course::forest_resume();
    let start = SessionStart {
        camera_mode: params.camera_mode,
        ..Default::default()
    };
    let driver =
        FrameDriver::new(config, course.waypoints, start).map_err(|e| e.to_string())?;
    Ok(DriveSession {
        driver,
        trail: course.trail,
    })
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();
    let session = match build_session(&params) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    let content = ResumeContent::load(params.resume_path.as_deref());

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "waypath".to_string(),
        resolution: (1280, 720).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }));

    app.insert_resource(params)
        .insert_resource(session)
        .insert_resource(content)
        .add_plugins(AppPlugin)
        .run();
}
