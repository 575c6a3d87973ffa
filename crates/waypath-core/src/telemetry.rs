//! Frame telemetry as CSV.
//!
//! Used by headless runs to inspect the kinematics frame by frame.

use std::io::{self, Write};

use crate::{
    frame::FrameReport,
    proximity::PanelEvent,
    vehicle::{SteerIntent, ThrottleIntent},
};

/// Define the CSV schema once and generate the header and row writers.
///
/// Keeps column names and row formats in sync.
macro_rules! define_telemetry {
    (
        columns: { $( $name:ident : $fmt:literal ),* $(,)? },
        prelude: |$report:ident| { $( $prelude:stmt );* $(;)? },
        row_values: { $( $val:expr ),* $(,)? }
    ) => {
        /// Write the CSV header line.
        pub fn write_header(out: &mut impl Write) -> io::Result<()> {
            const CSV_HEADER: &str = concat!( $( stringify!($name), "," ),* );
            writeln!(out, "{}", CSV_HEADER.trim_end_matches(','))
        }

        /// Write one CSV row for a frame.
        pub fn write_row(out: &mut impl Write, $report: &FrameReport) -> io::Result<()> {
            $( $prelude )*

            let line = format!( concat!( $( $fmt, "," ),* ), $( $val ),* );
            writeln!(out, "{}", line.trim_end_matches(','))
        }
    };
}

define_telemetry! {
    columns: {
        frame: "{}",
        dt: "{:.4}",
        steer: "{}",
        throttle: "{}",
        mode: "{}",
        x: "{:.3}",
        y: "{:.3}",
        z: "{:.3}",
        heading: "{:.4}",
        steering: "{:.4}",
        velocity: "{:.3}",
        cam_x: "{:.3}",
        cam_y: "{:.3}",
        cam_z: "{:.3}",
        fov: "{:.2}",
        events: "{}",
    },
    prelude: |report| {
        let vehicle = &report.vehicle;
        let camera = &report.camera;
        let events = report
            .events
            .iter()
            .map(|event| match event {
                PanelEvent::Show(panel) => format!("+{panel}"),
                PanelEvent::Hide(panel) => format!("-{panel}"),
            })
            .collect::<Vec<_>>()
            .join(" ");
    },
    row_values: {
        report.frame,
        report.delta.secs(),
        steer_label(report.input.control.steer),
        throttle_label(report.input.control.throttle),
        camera.mode,
        vehicle.position.x,
        vehicle.position.y,
        vehicle.position.z,
        vehicle.heading,
        vehicle.steering,
        vehicle.velocity,
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.fov,
        events,
    }
}

fn steer_label(steer: SteerIntent) -> &'static str {
    match steer {
        SteerIntent::Left => "left",
        SteerIntent::Straight => "straight",
        SteerIntent::Right => "right",
    }
}

fn throttle_label(throttle: ThrottleIntent) -> &'static str {
    match throttle {
        ThrottleIntent::Accelerate => "accelerate",
        ThrottleIntent::Brake => "brake",
        ThrottleIntent::None => "none",
    }
}
