//! Input action definitions.
//!
//! Maps keyboard and mouse to driving actions using `leafwing-input-manager`
//! and adapts the action state to the core's [`InputSource`].

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use waypath_core::{InputSnapshot, InputSource, KeyLevels};

/// Actions for driving and camera control.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum DriveAction {
    /// Accelerate (W / Up).
    Accelerate,
    /// Brake, then reverse (S / Down).
    Brake,
    /// Steer left (A / Left).
    SteerLeft,
    /// Steer right (D / Right).
    SteerRight,
    /// Cycle chase, orbit and free camera (C).
    CycleCamera,
    /// Mouse look in free camera mode.
    #[actionlike(DualAxis)]
    Look,
}

/// Create the default input map for driving.
pub fn default_drive_input_map() -> InputMap<DriveAction> {
    InputMap::default()
        .with(DriveAction::Accelerate, KeyCode::KeyW)
        .with(DriveAction::Accelerate, KeyCode::ArrowUp)
        .with(DriveAction::Brake, KeyCode::KeyS)
        .with(DriveAction::Brake, KeyCode::ArrowDown)
        .with(DriveAction::SteerLeft, KeyCode::KeyA)
        .with(DriveAction::SteerLeft, KeyCode::ArrowLeft)
        .with(DriveAction::SteerRight, KeyCode::KeyD)
        .with(DriveAction::SteerRight, KeyCode::ArrowRight)
        .with(DriveAction::CycleCamera, KeyCode::KeyC)
        .with_dual_axis(DriveAction::Look, MouseMove::default())
}

/// Plugin that registers the driving actions and spawns the input entity.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<DriveAction>::default())
            .add_systems(Startup, spawn_input_entity);
    }
}

fn spawn_input_entity(mut commands: Commands) {
    commands.spawn((
        Name::new("Driver input"),
        default_drive_input_map(),
        ActionState::<DriveAction>::default(),
    ));
}

/// Reads key levels from an action state.
///
/// The camera toggle is passed through as a level; the frame driver does
/// its own edge detection.
pub struct ActionInput<'a>(pub &'a ActionState<DriveAction>);

impl InputSource for ActionInput<'_> {
    fn sample(&mut self) -> InputSnapshot {
        let state = self.0;
        InputSnapshot::from_keys(KeyLevels {
            accelerate: state.pressed(&DriveAction::Accelerate),
            brake: state.pressed(&DriveAction::Brake),
            left: state.pressed(&DriveAction::SteerLeft),
            right: state.pressed(&DriveAction::SteerRight),
            cycle_camera: state.pressed(&DriveAction::CycleCamera),
        })
    }
}
