//! Core of the waypath drive-through resume.
//!
//! Vehicle kinematics, the follow camera, waypoint proximity triggers and
//! the frame driver that sequences them. Nothing here touches a renderer:
//! hosts plug in through [`InputSource`], [`PanelSink`] and [`RenderSink`].

pub mod camera;
pub mod config;
pub mod course;
pub mod error;
pub mod frame;
pub mod input;
pub mod path;
pub mod proximity;
pub mod telemetry;
pub mod time;
pub mod vehicle;

pub use camera::{CameraController, CameraMode, CameraPose, CameraState};
pub use config::{CameraParams, DriveConfig, ProximityParams, VehicleParams};
pub use course::{Course, RESUME_SECTIONS, Section};
pub use error::{Error, Result};
pub use frame::{FrameDriver, FrameReport, NoRender, RenderSink, SessionStart};
pub use input::{EdgeTrigger, InputSnapshot, InputSource, KeyLevels};
pub use path::TrailPath;
pub use proximity::{PanelEvent, PanelId, PanelSink, ProximityTrigger, Waypoint};
pub use time::FrameDelta;
pub use vehicle::{ControlInput, SteerIntent, ThrottleIntent, VehicleModel, VehicleState};
