//! Tunable constants for a drive session.
//!
//! Every struct deserializes with per-field defaults, so a config file only
//! needs to name the values it changes. Call [`DriveConfig::validate`] before
//! handing a config to the models.

use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Default clamp for a single frame step (50 ms).
pub const DEFAULT_MAX_DELTA: f32 = 0.05;

/// Vehicle kinematic constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Maximum wheel steering angle (radians).
    pub max_steering: f32,
    /// Distance between axles, drives the turning radius.
    pub wheel_base: f32,
    /// Rate the steering angle moves under steering intent (rad/s).
    pub steering_speed: f32,
    /// Exponential return rate toward straight ahead with no intent (1/s).
    pub steering_return: f32,
    /// Velocity gained per second while accelerating.
    pub acceleration: f32,
    /// Velocity lost per second while braking or reversing.
    pub brake_deceleration: f32,
    /// Velocity magnitude lost per second to rolling friction.
    pub friction: f32,
    /// Top forward speed.
    pub max_velocity: f32,
    /// Top reverse speed (negative).
    pub min_velocity: f32,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            max_steering: std::f32::consts::FRAC_PI_4,
            wheel_base: 1.8,
            steering_speed: 2.0,
            steering_return: 3.0,
            acceleration: 10.0,
            brake_deceleration: 10.0,
            friction: 5.0,
            max_velocity: 20.0,
            min_velocity: -10.0,
        }
    }
}

impl VehicleParams {
    /// Check the constants describe a drivable vehicle.
    pub fn validate(&self) -> Result<()> {
        ensure_finite("vehicle.max_steering", self.max_steering)?;
        if self.max_steering <= 0.0 || self.max_steering >= FRAC_PI_2 {
            return Err(Error::configuration(
                "vehicle.max_steering",
                format!("must be in (0, pi/2), got {}", self.max_steering),
            ));
        }
        ensure_positive("vehicle.wheel_base", self.wheel_base)?;
        ensure_non_negative("vehicle.steering_speed", self.steering_speed)?;
        ensure_non_negative("vehicle.steering_return", self.steering_return)?;
        ensure_non_negative("vehicle.acceleration", self.acceleration)?;
        ensure_non_negative("vehicle.brake_deceleration", self.brake_deceleration)?;
        ensure_non_negative("vehicle.friction", self.friction)?;
        ensure_finite("vehicle.max_velocity", self.max_velocity)?;
        ensure_finite("vehicle.min_velocity", self.min_velocity)?;
        if self.max_velocity < self.min_velocity {
            return Err(Error::configuration(
                "vehicle.max_velocity",
                format!(
                    "max velocity {} is below min velocity {}",
                    self.max_velocity, self.min_velocity
                ),
            ));
        }
        if self.min_velocity > 0.0 || self.max_velocity < 0.0 {
            return Err(Error::configuration(
                "vehicle.min_velocity",
                format!(
                    "velocity range [{}, {}] must contain rest",
                    self.min_velocity, self.max_velocity
                ),
            ));
        }
        Ok(())
    }
}

/// Camera follow constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraParams {
    /// Distance behind the vehicle in chase mode.
    pub follow_distance: f32,
    /// Height above the vehicle in chase and orbit modes.
    pub follow_height: f32,
    /// Exponential approach rate toward the follow target (1/s).
    pub follow_sharpness: f32,
    /// Orbit angular rate (rad/s).
    pub orbit_rate: f32,
    /// Orbit radius around the vehicle.
    pub orbit_radius: f32,
    /// Forward lead of the look-at target.
    pub look_ahead: f32,
    /// Height of the look-at target above the vehicle.
    pub look_height: f32,
    /// Field of view at rest (degrees).
    pub rest_fov: f32,
    /// Field of view at top speed (degrees).
    pub moving_fov: f32,
    /// Rate the field of view eases toward its target (1/s).
    pub fov_transition_rate: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            follow_distance: 5.0,
            follow_height: 2.0,
            // Equivalent to a 0.1 lerp per frame at 60 Hz.
            follow_sharpness: 6.32,
            orbit_rate: 0.5,
            orbit_radius: 5.0,
            look_ahead: 0.5,
            look_height: 0.5,
            rest_fov: 75.0,
            moving_fov: 80.0,
            fov_transition_rate: 1.0,
        }
    }
}

impl CameraParams {
    /// Check the constants describe a usable camera rig.
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("camera.follow_distance", self.follow_distance)?;
        ensure_finite("camera.follow_height", self.follow_height)?;
        ensure_non_negative("camera.follow_sharpness", self.follow_sharpness)?;
        ensure_finite("camera.orbit_rate", self.orbit_rate)?;
        ensure_non_negative("camera.orbit_radius", self.orbit_radius)?;
        ensure_finite("camera.look_ahead", self.look_ahead)?;
        ensure_finite("camera.look_height", self.look_height)?;
        ensure_fov("camera.rest_fov", self.rest_fov)?;
        ensure_fov("camera.moving_fov", self.moving_fov)?;
        ensure_non_negative("camera.fov_transition_rate", self.fov_transition_rate)?;
        Ok(())
    }
}

/// Waypoint proximity constants.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProximityParams {
    /// Distance below which a waypoint's panel is shown.
    pub threshold: f32,
    /// Hide a panel again once the vehicle leaves the threshold.
    pub hide_on_exit: bool,
}

impl Default for ProximityParams {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            hide_on_exit: false,
        }
    }
}

impl ProximityParams {
    /// Check the threshold is usable.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("proximity.threshold", self.threshold)
    }
}

/// Complete configuration for a drive session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Vehicle kinematics.
    pub vehicle: VehicleParams,
    /// Camera rig.
    pub camera: CameraParams,
    /// Waypoint triggers.
    pub proximity: ProximityParams,
    /// Largest step a single frame may advance (seconds).
    pub max_delta: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleParams::default(),
            camera: CameraParams::default(),
            proximity: ProximityParams::default(),
            max_delta: DEFAULT_MAX_DELTA,
        }
    }
}

impl DriveConfig {
    /// Read, parse and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let load_error = |detail: String| Error::ConfigFile {
            path: path.to_path_buf(),
            detail,
        };
        let text = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let config: Self = serde_json::from_str(&text).map_err(|e| load_error(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("max_delta", self.max_delta)?;
        self.vehicle.validate()?;
        self.camera.validate()?;
        self.proximity.validate()
    }
}

fn ensure_finite(field: &'static str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::configuration(field, format!("must be finite, got {value}")))
    }
}

fn ensure_positive(field: &'static str, value: f32) -> Result<()> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(Error::configuration(field, format!("must be positive, got {value}")))
    }
}

fn ensure_non_negative(field: &'static str, value: f32) -> Result<()> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(Error::configuration(
            field,
            format!("must not be negative, got {value}"),
        ))
    }
}

fn ensure_fov(field: &'static str, value: f32) -> Result<()> {
    ensure_finite(field, value)?;
    if value > 0.0 && value < 180.0 {
        Ok(())
    } else {
        Err(Error::configuration(
            field,
            format!("must be in (0, 180) degrees, got {value}"),
        ))
    }
}
