//! Chase/orbit camera controller.
//!
//! ## Camera mode state machine
//!
//! Modes only change through [`CameraController::cycle_mode`]; there are no
//! automatic transitions.
//!
//! ```text
//! Chase -> Orbit -> Free -> Chase
//! ```
//!
//! In **Free** mode the controller does nothing and the host owns the camera.

use std::{fmt, str::FromStr};

use glam::Vec3;

use crate::{
    config::CameraParams,
    error::{Error, Result},
    time::FrameDelta,
    vehicle::VehicleState,
};

/// Camera follow mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CameraMode {
    /// Trail behind and above the vehicle.
    #[default]
    Chase,
    /// Circle the vehicle at a fixed radius.
    Orbit,
    /// Externally controlled.
    Free,
}

impl CameraMode {
    /// All modes in cycle order.
    pub const ALL: [CameraMode; 3] = [CameraMode::Chase, CameraMode::Orbit, CameraMode::Free];

    /// The mode that follows this one in the cycle.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Chase => Self::Orbit,
            Self::Orbit => Self::Free,
            Self::Free => Self::Chase,
        }
    }

    /// Look up a mode by its position in [`CameraMode::ALL`].
    pub fn from_index(index: u8) -> Result<Self> {
        Self::ALL.get(usize::from(index)).copied().ok_or_else(|| {
            Error::invalid_input(
                "camera mode",
                format!("index {index} out of range 0..{}", Self::ALL.len()),
            )
        })
    }

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chase => "chase",
            Self::Orbit => "orbit",
            Self::Free => "free",
        }
    }
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::invalid_input(
                    "camera mode",
                    format!("expected chase, orbit or free, got '{s}'"),
                )
            })
    }
}

/// Camera state carried across frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraState {
    /// Camera position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Vertical field of view (degrees).
    pub fov: f32,
    /// Active mode.
    pub mode: CameraMode,
    /// Orbit angle accumulator (radians).
    pub orbit_angle: f32,
}

/// What the host applies to its camera each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Camera position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub look_at: Vec3,
    /// Vertical field of view (degrees).
    pub fov: f32,
    /// Active mode.
    pub mode: CameraMode,
}

/// Smoothed follow camera.
#[derive(Clone, Debug)]
pub struct CameraController {
    params: CameraParams,
    /// Forward top speed, mapped to the full moving field of view.
    /// Zero keeps the resting field of view.
    max_velocity: f32,
    state: CameraState,
}

impl CameraController {
    /// Create a controller starting at `position`, looking at `look_at`.
    pub fn new(
        params: CameraParams,
        max_velocity: f32,
        mode: CameraMode,
        position: Vec3,
        look_at: Vec3,
    ) -> Result<Self> {
        params.validate()?;
        if !(max_velocity.is_finite() && max_velocity >= 0.0) {
            return Err(Error::configuration(
                "vehicle.max_velocity",
                format!("camera needs a non-negative top speed, got {max_velocity}"),
            ));
        }
        let state = CameraState {
            position,
            look_at,
            fov: params.rest_fov,
            mode,
            orbit_angle: 0.0,
        };
        Ok(Self {
            params,
            max_velocity,
            state,
        })
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> CameraMode {
        self.state.mode
    }

    /// Pose to apply to the host camera.
    #[must_use]
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.state.position,
            look_at: self.state.look_at,
            fov: self.state.fov,
            mode: self.state.mode,
        }
    }

    /// Advance to the next mode and return it.
    pub fn cycle_mode(&mut self) -> CameraMode {
        let previous = self.state.mode;
        self.state.mode = previous.next();
        tracing::debug!("Camera mode {} -> {}", previous, self.state.mode);
        self.state.mode
    }

    /// Record the pose chosen by the external owner in free mode.
    ///
    /// Chase and orbit blend from this pose once they resume.
    pub fn set_free_pose(&mut self, position: Vec3, look_at: Vec3) {
        if self.state.mode == CameraMode::Free {
            self.state.position = position;
            self.state.look_at = look_at;
        }
    }

    /// Follow the vehicle for one frame.
    pub fn update(&mut self, vehicle: &VehicleState, delta: FrameDelta) -> CameraPose {
        if delta.is_zero() {
            return self.pose();
        }
        let dt = delta.secs();
        let forward = vehicle.forward();

        let target = match self.state.mode {
            CameraMode::Chase => {
                vehicle.position - forward * self.params.follow_distance
                    + Vec3::Y * self.params.follow_height
            }
            CameraMode::Orbit => {
                self.state.orbit_angle += self.params.orbit_rate * dt;
                let (sin, cos) = self.state.orbit_angle.sin_cos();
                Vec3::new(
                    vehicle.position.x + sin * self.params.orbit_radius,
                    vehicle.position.y + self.params.follow_height,
                    vehicle.position.z + cos * self.params.orbit_radius,
                )
            }
            CameraMode::Free => return self.pose(),
        };

        let blend = 1.0 - (-self.params.follow_sharpness * dt).exp();
        self.state.position = self.state.position.lerp(target, blend);
        self.state.look_at = vehicle.position
            + forward * self.params.look_ahead
            + Vec3::Y * self.params.look_height;

        let speed_factor = if self.max_velocity > 0.0 {
            (vehicle.velocity.abs() / self.max_velocity).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let desired_fov = lerp(self.params.rest_fov, self.params.moving_fov, speed_factor);
        let ease = (self.params.fov_transition_rate * dt).min(1.0);
        self.state.fov = lerp(self.state.fov, desired_fov, ease);

        self.pose()
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
