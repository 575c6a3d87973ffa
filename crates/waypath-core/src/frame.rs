//! Per-frame orchestration.
//!
//! [`FrameDriver`] owns every piece of mutable session state and runs the
//! fixed frame sequence: input, delta, vehicle, camera, proximity, render.
//! Hosts call [`FrameDriver::tick`] once per display refresh.

use glam::Vec3;

use crate::{
    camera::{CameraController, CameraMode, CameraPose},
    config::DriveConfig,
    course::{CAMERA_START, VEHICLE_START},
    error::{Error, Result},
    input::{EdgeTrigger, InputSnapshot, InputSource},
    proximity::{PanelEvent, PanelId, PanelSink, ProximityTrigger, Waypoint},
    time::FrameDelta,
    vehicle::{VehicleModel, VehicleState},
};

/// Render collaborator, invoked last in every frame.
pub trait RenderSink {
    /// Apply the frame's vehicle and camera pose and draw.
    fn render(&mut self, vehicle: &VehicleState, camera: &CameraPose);
}

/// Render sink that draws nothing, for headless runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRender;

impl RenderSink for NoRender {
    fn render(&mut self, _vehicle: &VehicleState, _camera: &CameraPose) {}
}

/// Initial poses for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionStart {
    /// Vehicle state at the first frame.
    pub vehicle: VehicleState,
    /// Camera position at the first frame.
    pub camera_position: Vec3,
    /// Camera mode at the first frame.
    pub camera_mode: CameraMode,
}

impl Default for SessionStart {
    fn default() -> Self {
        Self {
            vehicle: VehicleState::at(VEHICLE_START, 0.0),
            camera_position: CAMERA_START,
            camera_mode: CameraMode::default(),
        }
    }
}

/// What happened in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// Frame counter, starting at 0.
    pub frame: u64,
    /// Clamped step used for this frame.
    pub delta: FrameDelta,
    /// Input sampled this frame.
    pub input: InputSnapshot,
    /// Whether the camera mode changed this frame.
    pub mode_changed: bool,
    /// Vehicle state after the step.
    pub vehicle: VehicleState,
    /// Camera pose after the step.
    pub camera: CameraPose,
    /// Panel visibility changes emitted this frame.
    pub events: Vec<PanelEvent>,
}

/// Owns the session state and advances it one frame at a time.
#[derive(Clone, Debug)]
pub struct FrameDriver {
    vehicle: VehicleModel,
    camera: CameraController,
    proximity: ProximityTrigger,
    mode_toggle: EdgeTrigger,
    max_delta: f32,
    /// Host timestamp of the previous tick, in seconds.
    last_timestamp: Option<f64>,
    frame: u64,
}

impl FrameDriver {
    /// Validate `config` and build a session.
    pub fn new(config: DriveConfig, waypoints: Vec<Waypoint>, start: SessionStart) -> Result<Self> {
        config.validate()?;
        let max_velocity = config.vehicle.max_velocity;
        let vehicle = VehicleModel::new(config.vehicle, start.vehicle)?;
        let look_at = vehicle.state().position;
        let camera = CameraController::new(
            config.camera,
            max_velocity,
            start.camera_mode,
            start.camera_position,
            look_at,
        )?;
        let proximity = ProximityTrigger::new(waypoints, config.proximity)?;
        tracing::debug!(
            "Drive session ready: {} waypoints, camera {}",
            proximity.waypoints().len(),
            camera.mode()
        );
        Ok(Self {
            vehicle,
            camera,
            proximity,
            mode_toggle: EdgeTrigger::default(),
            max_delta: config.max_delta,
            last_timestamp: None,
            frame: 0,
        })
    }

    /// Vehicle state snapshot.
    #[must_use]
    pub fn vehicle(&self) -> &VehicleState {
        self.vehicle.state()
    }

    /// The camera controller.
    #[must_use]
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Mutable camera access, for free-mode hosts and explicit mode changes.
    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    /// The proximity trigger.
    #[must_use]
    pub fn proximity(&self) -> &ProximityTrigger {
        &self.proximity
    }

    /// Forward a user-closed panel to the trigger.
    pub fn dismiss_panel(&mut self, panel: &PanelId) {
        self.proximity.dismiss(panel);
    }

    /// Run one frame at host time `now` (seconds, monotonic).
    ///
    /// The first tick advances by zero. A non-finite timestamp, or one
    /// earlier than the previous, is rejected and leaves the session
    /// untouched.
    pub fn tick(
        &mut self,
        now: f64,
        input: &mut impl InputSource,
        ui: &mut impl PanelSink,
        render: &mut impl RenderSink,
    ) -> Result<FrameReport> {
        if !now.is_finite() {
            return Err(Error::invalid_input(
                "frame timestamp",
                format!("timestamp must be finite, got {now}"),
            ));
        }
        let snapshot = input.sample();
        let elapsed = match self.last_timestamp {
            Some(last) if now < last => {
                return Err(Error::invalid_input(
                    "frame timestamp",
                    format!("time went backwards from {last} to {now}"),
                ));
            }
            Some(last) => now - last,
            None => 0.0,
        };
        #[allow(clippy::cast_possible_truncation)]
        let delta = FrameDelta::new(elapsed as f32, self.max_delta)?;
        self.last_timestamp = Some(now);
        Ok(self.step(snapshot, delta, ui, render))
    }

    /// Run one frame with a host-measured elapsed time in seconds.
    pub fn tick_delta(
        &mut self,
        elapsed: f32,
        input: &mut impl InputSource,
        ui: &mut impl PanelSink,
        render: &mut impl RenderSink,
    ) -> Result<FrameReport> {
        let snapshot = input.sample();
        let delta = FrameDelta::new(elapsed, self.max_delta)?;
        Ok(self.step(snapshot, delta, ui, render))
    }

    fn step(
        &mut self,
        input: InputSnapshot,
        delta: FrameDelta,
        ui: &mut impl PanelSink,
        render: &mut impl RenderSink,
    ) -> FrameReport {
        let mode_changed = self.mode_toggle.rising(input.cycle_camera);
        if mode_changed {
            self.camera.cycle_mode();
        }

        let vehicle = *self.vehicle.advance(delta, input.control);
        let camera = self.camera.update(&vehicle, delta);
        let events = self.proximity.evaluate(vehicle.position, ui);
        render.render(&vehicle, &camera);

        tracing::trace!(
            frame = self.frame,
            dt = delta.secs(),
            velocity = vehicle.velocity,
            steering = vehicle.steering,
            "frame"
        );

        let report = FrameReport {
            frame: self.frame,
            delta,
            input,
            mode_changed,
            vehicle,
            camera,
            events,
        };
        self.frame += 1;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        course::Course,
        input::KeyLevels,
        vehicle::{ControlInput, SteerIntent, ThrottleIntent},
    };

    /// Records the order collaborators are called in.
    #[derive(Default)]
    struct CallLog {
        calls: Vec<&'static str>,
    }

    struct LoggedInput<'a> {
        log: &'a std::cell::RefCell<CallLog>,
        snapshot: InputSnapshot,
    }

    impl InputSource for LoggedInput<'_> {
        fn sample(&mut self) -> InputSnapshot {
            self.log.borrow_mut().calls.push("input");
            self.snapshot
        }
    }

    struct LoggedUi<'a>(&'a std::cell::RefCell<CallLog>);

    impl PanelSink for LoggedUi<'_> {
        fn show(&mut self, _panel: &PanelId) {
            self.0.borrow_mut().calls.push("show");
        }

        fn hide(&mut self, _panel: &PanelId) {
            self.0.borrow_mut().calls.push("hide");
        }
    }

    struct LoggedRender<'a>(&'a std::cell::RefCell<CallLog>);

    impl RenderSink for LoggedRender<'_> {
        fn render(&mut self, _vehicle: &VehicleState, _camera: &CameraPose) {
            self.0.borrow_mut().calls.push("render");
        }
    }

    fn waypoint_at(z: f32) -> Waypoint {
        Waypoint {
            position: Vec3::new(0.0, 0.0, z),
            label: "About".to_string(),
            panel: PanelId::new("about-panel"),
            color: 0,
        }
    }

    fn driver(waypoints: Vec<Waypoint>) -> FrameDriver {
        let start = SessionStart {
            vehicle: VehicleState::default(),
            camera_position: Vec3::new(0.0, 2.0, -5.0),
            camera_mode: CameraMode::Chase,
        };
        FrameDriver::new(DriveConfig::default(), waypoints, start).unwrap()
    }

    fn accelerate() -> InputSnapshot {
        InputSnapshot {
            control: ControlInput {
                steer: SteerIntent::Straight,
                throttle: ThrottleIntent::Accelerate,
            },
            cycle_camera: false,
        }
    }

    #[test]
    fn test_first_tick_advances_nothing() {
        let mut driver = driver(Vec::new());
        let mut input = accelerate();
        let report = driver
            .tick(100.0, &mut input, &mut Vec::new(), &mut NoRender)
            .unwrap();
        assert!(report.delta.is_zero());
        assert_eq!(report.vehicle, VehicleState::default());
        assert_eq!(report.frame, 0);
    }

    #[test]
    fn test_tick_clamps_long_frames() {
        let mut driver = driver(Vec::new());
        let mut input = accelerate();
        driver.tick(1.0, &mut input, &mut Vec::new(), &mut NoRender).unwrap();
        let report = driver
            .tick(3.0, &mut input, &mut Vec::new(), &mut NoRender)
            .unwrap();
        assert_eq!(report.delta.secs(), 0.05);
        assert!((report.vehicle.velocity - 0.5).abs() < 1e-6);
        assert_eq!(report.frame, 1);
    }

    #[test]
    fn test_backwards_time_rejected_without_side_effects() {
        let mut driver = driver(Vec::new());
        let mut input = accelerate();
        driver.tick(5.0, &mut input, &mut Vec::new(), &mut NoRender).unwrap();
        let before = *driver.vehicle();
        let result = driver.tick(4.0, &mut input, &mut Vec::new(), &mut NoRender);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
        assert_eq!(*driver.vehicle(), before);

        let result = driver.tick_delta(-0.1, &mut input, &mut Vec::new(), &mut NoRender);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_finite_timestamp_rejected() {
        let mut driver = driver(Vec::new());
        let mut input = accelerate();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = driver.tick(bad, &mut input, &mut Vec::new(), &mut NoRender);
            assert!(matches!(result, Err(Error::InvalidInput { .. })));
        }

        let first = driver
            .tick(1.0, &mut input, &mut Vec::new(), &mut NoRender)
            .unwrap();
        assert!(first.delta.is_zero());
        let second = driver
            .tick(1.02, &mut input, &mut Vec::new(), &mut NoRender)
            .unwrap();
        assert!(second.vehicle.velocity > 0.0);

        let result = driver.tick(f64::NAN, &mut input, &mut Vec::new(), &mut NoRender);
        assert!(result.is_err());
        let third = driver
            .tick(1.04, &mut input, &mut Vec::new(), &mut NoRender)
            .unwrap();
        assert!(third.vehicle.velocity > second.vehicle.velocity);
    }

    #[test]
    fn test_fov_reaches_moving_at_forward_top_speed() {
        let mut config = DriveConfig::default();
        config.vehicle.max_velocity = 5.0;
        config.vehicle.min_velocity = -20.0;
        let mut driver = FrameDriver::new(config, Vec::new(), SessionStart::default()).unwrap();
        let mut input = accelerate();
        for _ in 0..2000 {
            driver
                .tick_delta(0.05, &mut input, &mut Vec::new(), &mut NoRender)
                .unwrap();
        }
        assert!((driver.vehicle().velocity - 5.0).abs() < 1e-6);
        assert!((driver.camera().state().fov - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_collaborators_called_in_order() {
        let log = std::cell::RefCell::new(CallLog::default());
        let mut driver = driver(vec![waypoint_at(0.5)]);
        let mut input = LoggedInput {
            log: &log,
            snapshot: accelerate(),
        };
        driver
            .tick_delta(0.016, &mut input, &mut LoggedUi(&log), &mut LoggedRender(&log))
            .unwrap();
        assert_eq!(log.borrow().calls, vec!["input", "show", "render"]);
    }

    #[test]
    fn test_mode_toggle_fires_on_edge_only() {
        let mut driver = driver(Vec::new());
        let mut held = InputSnapshot::from_keys(KeyLevels {
            cycle_camera: true,
            ..Default::default()
        });
        for _ in 0..5 {
            driver
                .tick_delta(0.016, &mut held, &mut Vec::new(), &mut NoRender)
                .unwrap();
        }
        assert_eq!(driver.camera().mode(), CameraMode::Orbit);

        let mut released = InputSnapshot::default();
        for _ in 0..2 {
            driver
                .tick_delta(0.016, &mut released, &mut Vec::new(), &mut NoRender)
                .unwrap();
            driver
                .tick_delta(0.016, &mut held, &mut Vec::new(), &mut NoRender)
                .unwrap();
        }
        assert_eq!(driver.camera().mode(), CameraMode::Chase);
    }

    #[test]
    fn test_drive_past_waypoint_shows_panel_once() {
        let mut driver = driver(vec![waypoint_at(10.0)]);
        let mut input = accelerate();
        let mut ui = Vec::new();
        let mut shown_at = None;
        for _ in 0..200 {
            let report = driver
                .tick_delta(0.05, &mut input, &mut ui, &mut NoRender)
                .unwrap();
            if !report.events.is_empty() {
                assert!(shown_at.is_none());
                shown_at = Some(report.vehicle.position.z);
            }
        }
        assert_eq!(ui, vec![PanelEvent::Show(PanelId::new("about-panel"))]);
        let z = shown_at.unwrap();
        assert!(z > 7.0 && z < 8.0, "shown at z = {z}");
    }

    #[test]
    fn test_zero_delta_frame_changes_nothing() {
        let mut driver = driver(Vec::new());
        let mut input = accelerate();
        for _ in 0..10 {
            driver
                .tick_delta(0.05, &mut input, &mut Vec::new(), &mut NoRender)
                .unwrap();
        }
        let vehicle = *driver.vehicle();
        let camera = *driver.camera().state();
        driver
            .tick_delta(0.0, &mut input, &mut Vec::new(), &mut NoRender)
            .unwrap();
        assert_eq!(*driver.vehicle(), vehicle);
        assert_eq!(*driver.camera().state(), camera);
    }

    #[test]
    fn test_forest_course_session() {
        let course = Course::forest_resume();
        let mut driver =
            FrameDriver::new(DriveConfig::default(), course.waypoints, SessionStart::default())
                .unwrap();
        assert_eq!(driver.vehicle().position, VEHICLE_START);
        let mut input = accelerate();
        let report = driver
            .tick_delta(0.05, &mut input, &mut Vec::new(), &mut NoRender)
            .unwrap();
        assert!(report.vehicle.position.z > VEHICLE_START.z);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DriveConfig::default();
        config.vehicle.min_velocity = 50.0;
        let result = FrameDriver::new(config, Vec::new(), SessionStart::default());
        assert!(matches!(result, Err(Error::Configuration { .. })));
    }
}
