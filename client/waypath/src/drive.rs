//! Hosts the core frame driver inside Bevy.
//!
//! One `Update` system ticks the [`FrameDriver`] each frame and applies the
//! resulting vehicle and camera poses to their entities. Panels opened by
//! the proximity trigger land on the [`PanelBoard`] for the UI to draw.

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use waypath_core::{
    CameraMode, CameraPose, FrameDriver, PanelId, PanelSink, RenderSink, TrailPath, VehicleState,
};

use crate::input::{ActionInput, DriveAction};

/// Radians of camera rotation per pixel of mouse movement in free mode.
const FREE_LOOK_SENSITIVITY: f32 = 0.003;

/// Distance ahead of the free camera used as its look target.
const FREE_LOOK_DISTANCE: f32 = 10.0;

/// Pitch limit for free look, just short of straight up or down.
const FREE_LOOK_MAX_PITCH: f32 = 1.5;

/// Plugin that runs the drive session each frame.
pub struct DrivePlugin;

impl Plugin for DrivePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PanelBoard>()
            .add_systems(Update, (free_look_system, drive_system).chain());
    }
}

// ============================================================================
// Resources and components
// ============================================================================

/// The running session and the trail it drives on.
#[derive(Resource)]
pub struct DriveSession {
    /// Owns all per-frame state.
    pub driver: FrameDriver,
    /// Trail, for scenery and drawing; the markers live in the driver.
    pub trail: TrailPath,
}

/// Panels currently open, in the order they were opened.
#[derive(Resource, Default)]
pub struct PanelBoard {
    open: Vec<PanelId>,
    /// Panels the user closed since the last frame.
    dismissed: Vec<PanelId>,
}

impl PanelBoard {
    /// Open panels.
    pub fn open_panels(&self) -> &[PanelId] {
        &self.open
    }

    /// Close a panel at the user's request.
    pub fn close(&mut self, panel: &PanelId) {
        self.open.retain(|p| p != panel);
        self.dismissed.push(panel.clone());
    }

    fn take_dismissed(&mut self) -> Vec<PanelId> {
        std::mem::take(&mut self.dismissed)
    }
}

impl PanelSink for PanelBoard {
    fn show(&mut self, panel: &PanelId) {
        if !self.open.contains(panel) {
            self.open.push(panel.clone());
        }
    }

    fn hide(&mut self, panel: &PanelId) {
        self.open.retain(|p| p != panel);
    }
}

/// Marker for the vehicle's root entity.
#[derive(Component)]
pub struct VehicleBody;

/// Marker for the camera driven by the session.
#[derive(Component)]
pub struct DriveCamera;

// ============================================================================
// Systems
// ============================================================================

/// Applies frame results to the scene entities.
struct SceneRender<'a> {
    vehicle: Option<Mut<'a, Transform>>,
    camera: Option<(Mut<'a, Transform>, Mut<'a, Projection>)>,
}

impl RenderSink for SceneRender<'_> {
    fn render(&mut self, vehicle: &VehicleState, camera: &CameraPose) {
        if let Some(transform) = self.vehicle.as_mut() {
            transform.translation = vehicle.position;
            transform.rotation = Quat::from_rotation_y(vehicle.heading);
        }

        // Free mode leaves the camera to `free_look_system`.
        if camera.mode == CameraMode::Free {
            return;
        }
        if let Some((transform, projection)) = self.camera.as_mut() {
            **transform =
                Transform::from_translation(camera.position).looking_at(camera.look_at, Vec3::Y);
            if let Projection::Perspective(perspective) = &mut **projection {
                perspective.fov = camera.fov.to_radians();
            }
        }
    }
}

/// Tick the session once per frame.
fn drive_system(
    time: Res<Time>,
    mut session: ResMut<DriveSession>,
    mut board: ResMut<PanelBoard>,
    action_query: Query<&ActionState<DriveAction>>,
    mut vehicle_query: Query<&mut Transform, (With<VehicleBody>, Without<DriveCamera>)>,
    mut camera_query: Query<(&mut Transform, &mut Projection), (With<DriveCamera>, Without<VehicleBody>)>,
) -> Result {
    let Ok(action_state) = action_query.single() else {
        return Ok(());
    };

    for panel in board.take_dismissed() {
        session.driver.dismiss_panel(&panel);
    }

    let mut render = SceneRender {
        vehicle: vehicle_query.single_mut().ok(),
        camera: camera_query.single_mut().ok(),
    };
    let report = session.driver.tick(
        time.elapsed_secs_f64(),
        &mut ActionInput(action_state),
        &mut *board,
        &mut render,
    )?;

    if report.mode_changed {
        tracing::info!("Camera mode: {}", report.camera.mode);
    }
    Ok(())
}

/// Mouse look while the camera is in free mode.
fn free_look_system(
    mut session: ResMut<DriveSession>,
    action_query: Query<&ActionState<DriveAction>>,
    mut camera_query: Query<&mut Transform, With<DriveCamera>>,
) {
    if session.driver.camera().mode() != CameraMode::Free {
        return;
    }
    let Ok(action_state) = action_query.single() else {
        return;
    };
    let Ok(mut transform) = camera_query.single_mut() else {
        return;
    };

    let delta = action_state.axis_pair(&DriveAction::Look) * FREE_LOOK_SENSITIVITY;
    if delta != Vec2::ZERO {
        let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        let yaw = yaw - delta.x;
        let pitch = (pitch - delta.y).clamp(-FREE_LOOK_MAX_PITCH, FREE_LOOK_MAX_PITCH);
        transform.rotation = Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
    }

    let look_at = transform.translation + transform.forward() * FREE_LOOK_DISTANCE;
    session
        .driver
        .camera_mut()
        .set_free_pose(transform.translation, look_at);
}
