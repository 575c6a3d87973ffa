//! Headless drive simulator.
//!
//! Runs a scripted drive through the same frame driver as the app and writes
//! per-frame telemetry as CSV. Panel events are logged as they happen.
//!
//! Run with: cargo run -p waypath --bin drive-sim -- --pattern follow --seconds 40

#[cfg(target_family = "wasm")]
fn main() {
    // Headless runs need a filesystem and a terminal.
}

#[cfg(not(target_family = "wasm"))]
mod sim {
    use std::fs::File;
    use std::io::{self, BufWriter, Write};
    use std::path::PathBuf;

    use clap::{Parser, ValueEnum};
    use glam::Vec3;
    use waypath_core::{
        CameraMode, ControlInput, Course, DriveConfig, FrameDriver, InputSnapshot, NoRender,
        PanelEvent, SessionStart, SteerIntent, ThrottleIntent, VehicleState, telemetry,
    };

    /// Points sampled along the trail for path following.
    const FOLLOW_SAMPLES: usize = 400;

    /// How many samples ahead of the nearest one to aim for.
    const FOLLOW_LOOKAHEAD: usize = 20;

    /// Heading error (radians) below which the follower steers straight.
    const FOLLOW_DEADBAND: f32 = 0.05;

    /// Scripted steering pattern.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
    enum Pattern {
        /// Full throttle, no steering.
        Straight,
        /// Full throttle, alternating left and right.
        Weave,
        /// Steer toward a point ahead on the trail.
        Follow,
    }

    #[derive(Parser)]
    #[command(about = "Run a scripted drive and write frame telemetry as CSV")]
    struct Args {
        /// Steering pattern.
        #[arg(long, value_enum, default_value = "follow")]
        pattern: Pattern,

        /// Simulated duration in seconds.
        #[arg(long, default_value_t = 30.0)]
        seconds: f32,

        /// Simulated frame rate.
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Seconds between steering changes for the weave pattern.
        #[arg(long, default_value_t = 1.5)]
        weave_period: f32,

        /// Target speed for the follow pattern (m/s).
        #[arg(long, default_value_t = 8.0)]
        cruise_speed: f32,

        /// Press the camera key once every this many seconds (0 = never).
        #[arg(long, default_value_t = 0.0)]
        cycle_camera_every: f32,

        /// JSON file overriding the drive constants.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write CSV here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    }

    /// Produces the input for each simulated frame.
    struct Script {
        pattern: Pattern,
        weave_period: f32,
        cruise_speed: f32,
        cycle_camera_every: f32,
        trail: Vec<Vec3>,
    }

    impl Script {
        fn input(&self, elapsed: f32, frame_secs: f32, vehicle: &VehicleState) -> InputSnapshot {
            let control = match self.pattern {
                Pattern::Straight => ControlInput {
                    steer: SteerIntent::Straight,
                    throttle: ThrottleIntent::Accelerate,
                },
                Pattern::Weave => {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let phase = (elapsed / self.weave_period) as u32;
                    ControlInput {
                        steer: if phase % 2 == 0 {
                            SteerIntent::Left
                        } else {
                            SteerIntent::Right
                        },
                        throttle: ThrottleIntent::Accelerate,
                    }
                }
                Pattern::Follow => ControlInput {
                    steer: self.follow_steer(vehicle),
                    throttle: if vehicle.velocity < self.cruise_speed {
                        ThrottleIntent::Accelerate
                    } else {
                        ThrottleIntent::None
                    },
                },
            };

            // Hold the key for one frame at each multiple of the period.
            let cycle_camera = self.cycle_camera_every > 0.0
                && elapsed > 0.0
                && (elapsed % self.cycle_camera_every) < frame_secs;

            InputSnapshot {
                control,
                cycle_camera,
            }
        }

        /// Pure pursuit toward a trail point a little ahead of the vehicle.
        fn follow_steer(&self, vehicle: &VehicleState) -> SteerIntent {
            let nearest = self
                .trail
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    vehicle
                        .position
                        .distance_squared(**a)
                        .total_cmp(&vehicle.position.distance_squared(**b))
                })
                .map_or(0, |(i, _)| i);
            let Some(target) = self
                .trail
                .get((nearest + FOLLOW_LOOKAHEAD).min(self.trail.len().saturating_sub(1)))
            else {
                return SteerIntent::Straight;
            };

            let to_target = *target - vehicle.position;
            let desired = to_target.x.atan2(to_target.z);
            let error = wrap_angle(desired - vehicle.heading);
            if error > FOLLOW_DEADBAND {
                SteerIntent::Right
            } else if error < -FOLLOW_DEADBAND {
                SteerIntent::Left
            } else {
                SteerIntent::Straight
            }
        }
    }

    /// Wrap an angle into (-pi, pi].
    fn wrap_angle(angle: f32) -> f32 {
        use std::f32::consts::{PI, TAU};
        let wrapped = (angle + PI).rem_euclid(TAU) - PI;
        if wrapped <= -PI { wrapped + TAU } else { wrapped }
    }

    fn run(args: &Args) -> Result<(), String> {
        if !(args.fps.is_finite() && args.fps > 0.0) {
            return Err(format!("--fps must be positive, got {}", args.fps));
        }
        if !(args.seconds.is_finite() && args.seconds >= 0.0) {
            return Err(format!("--seconds must be non-negative, got {}", args.seconds));
        }
        if !(args.weave_period.is_finite() && args.weave_period > 0.0) {
            return Err(format!(
                "--weave-period must be positive, got {}",
                args.weave_period
            ));
        }

        let config = match &args.config {
            Some(path) => DriveConfig::from_json_file(path).map_err(|e| e.to_string())?,
            None => DriveConfig::default(),
        };
        let course = Course::forest_resume();
        let script = Script {
            pattern: args.pattern,
            weave_period: args.weave_period,
            cruise_speed: args.cruise_speed,
            cycle_camera_every: args.cycle_camera_every,
            trail: course.trail.polyline(FOLLOW_SAMPLES),
        };
        let mut driver = FrameDriver::new(config, course.waypoints, SessionStart::default())
            .map_err(|e| e.to_string())?;

        let mut out: Box<dyn Write> = match &args.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).map_err(|e| format!("failed to create {}: {e}", path.display()))?,
            )),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        telemetry::write_header(&mut out).map_err(|e| e.to_string())?;

        let frame_secs = 1.0 / args.fps;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frames = (args.seconds * args.fps).ceil() as u64;
        let mut shown: Vec<PanelEvent> = Vec::new();

        tracing::info!(
            "Simulating {frames} frames at {} fps with the {:?} pattern",
            args.fps,
            args.pattern
        );

        for index in 0..frames {
            #[allow(clippy::cast_precision_loss)]
            let elapsed = index as f32 * frame_secs;
            let mut input = script.input(elapsed, frame_secs, driver.vehicle());
            let report = driver
                .tick_delta(frame_secs, &mut input, &mut shown, &mut NoRender)
                .map_err(|e| e.to_string())?;

            if report.mode_changed && report.camera.mode == CameraMode::Chase {
                tracing::debug!("Camera cycled back to chase at {elapsed:.2}s");
            }
            for event in &report.events {
                match event {
                    PanelEvent::Show(panel) => tracing::info!("{elapsed:.2}s: show {panel}"),
                    PanelEvent::Hide(panel) => tracing::info!("{elapsed:.2}s: hide {panel}"),
                }
            }
            telemetry::write_row(&mut out, &report).map_err(|e| e.to_string())?;
        }
        out.flush().map_err(|e| e.to_string())?;

        let vehicle = driver.vehicle();
        let opened = shown
            .iter()
            .filter(|e| matches!(e, PanelEvent::Show(_)))
            .count();
        tracing::info!(
            "Finished at ({:.1}, {:.1}, {:.1}) moving {:.1} m/s; {opened} panels opened",
            vehicle.position.x,
            vehicle.position.y,
            vehicle.position.z,
            vehicle.velocity
        );
        Ok(())
    }

    pub fn main() {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        // Logs go to stderr so CSV on stdout stays clean.
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();

        let args = Args::parse();
        if let Err(e) = run(&args) {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn script(pattern: Pattern) -> Script {
            Script {
                pattern,
                weave_period: 1.0,
                cruise_speed: 8.0,
                cycle_camera_every: 0.0,
                trail: Course::forest_resume().trail.polyline(FOLLOW_SAMPLES),
            }
        }

        #[test]
        fn test_wrap_angle() {
            use std::f32::consts::PI;
            assert!((wrap_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
            assert!((wrap_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-5);
            assert!((wrap_angle(0.25) - 0.25).abs() < 1e-6);
        }

        #[test]
        fn test_weave_alternates() {
            let script = script(Pattern::Weave);
            let vehicle = VehicleState::default();
            assert_eq!(
                script.input(0.5, 0.016, &vehicle).control.steer,
                SteerIntent::Left
            );
            assert_eq!(
                script.input(1.5, 0.016, &vehicle).control.steer,
                SteerIntent::Right
            );
        }

        #[test]
        fn test_follow_turns_toward_trail() {
            let script = script(Pattern::Follow);
            // Facing +Z with the trail off to the +X side: turn right.
            let vehicle = VehicleState {
                position: Vec3::new(-15.0, 0.0, -40.0),
                ..Default::default()
            };
            assert_eq!(script.follow_steer(&vehicle), SteerIntent::Right);
        }

        #[test]
        fn test_follow_drive_tracks_trail() {
            let script = script(Pattern::Follow);
            let course = Course::forest_resume();
            let mut driver = FrameDriver::new(
                DriveConfig::default(),
                course.waypoints,
                SessionStart::default(),
            )
            .unwrap();
            let mut events: Vec<PanelEvent> = Vec::new();
            let frame_secs = 1.0 / 60.0;
            for index in 0..(60 * 12) {
                #[allow(clippy::cast_precision_loss)]
                let elapsed = index as f32 * frame_secs;
                let mut input = script.input(elapsed, frame_secs, driver.vehicle());
                driver
                    .tick_delta(frame_secs, &mut input, &mut events, &mut NoRender)
                    .unwrap();
            }

            let position = driver.vehicle().position;
            assert!(position.z > 0.0, "stalled at {position}");
            let off_trail = script
                .trail
                .iter()
                .map(|p| p.distance(position))
                .fold(f32::INFINITY, f32::min);
            assert!(off_trail < 5.0, "{off_trail} from the trail");
        }
    }
}

#[cfg(not(target_family = "wasm"))]
fn main() {
    sim::main();
}
