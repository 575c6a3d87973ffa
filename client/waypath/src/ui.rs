//! Resume panels, controls overlay and status line.

use std::collections::BTreeMap;
use std::path::Path;

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};

use crate::drive::{DriveSession, PanelBoard};

/// Plugin for the egui overlay.
pub struct ResumeUiPlugin;

impl Plugin for ResumeUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_systems(EguiPrimaryContextPass, (controls_ui_system, panels_ui_system));
    }
}

/// Panel text keyed by section title.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ResumeContent {
    sections: BTreeMap<String, String>,
}

impl Default for ResumeContent {
    fn default() -> Self {
        let sections = [
            ("About", "A short introduction. Pass --resume to load your own text."),
            ("Skills", "Languages, tools and areas of practice."),
            ("Experience", "Roles held, most recent first."),
            ("Projects", "Things built along the way."),
            ("Education", "Schools, degrees and courses."),
        ]
        .into_iter()
        .map(|(title, body)| (title.to_string(), body.to_string()))
        .collect();
        Self { sections }
    }
}

impl ResumeContent {
    /// Parse a JSON object mapping section titles to panel text.
    ///
    /// Sections the file leaves out keep their built-in text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let overrides: BTreeMap<String, String> = serde_json::from_str(text)?;
        let mut content = Self::default();
        content.sections.extend(overrides);
        Ok(content)
    }

    /// Load from `path`, falling back to the built-in text on any failure.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| Self::from_json(&text).map_err(|e| e.to_string()));
        match loaded {
            Ok(content) => {
                tracing::info!(
                    "Loaded {} resume sections from {}",
                    content.sections.len(),
                    path.display()
                );
                content
            }
            Err(e) => {
                tracing::warn!("Failed to load resume from {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Text for a section, or an empty string.
    pub fn body(&self, title: &str) -> &str {
        self.sections.get(title).map_or("", String::as_str)
    }
}

/// Controls help and the status line.
fn controls_ui_system(mut contexts: EguiContexts, session: Res<DriveSession>) -> Result {
    let ctx = contexts.ctx_mut()?;
    let mode = session.driver.camera().mode();
    let speed = session.driver.vehicle().velocity;

    egui::Window::new("Controls")
        .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("W / Up - Accelerate");
            ui.label("S / Down - Brake / Reverse");
            ui.label("A / Left - Steer left");
            ui.label("D / Right - Steer right");
            ui.label("C - Change camera mode");
            ui.label("Drive up to the signs to read each section.");
            ui.separator();
            ui.label(format!("Camera: {mode}  Speed: {speed:.1} m/s"));
        });
    Ok(())
}

/// One window per open panel; closing a window dismisses the panel.
fn panels_ui_system(
    mut contexts: EguiContexts,
    session: Res<DriveSession>,
    content: Res<ResumeContent>,
    mut board: ResMut<PanelBoard>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let waypoints = session.driver.proximity().waypoints();

    let mut closed = Vec::new();
    for (index, panel) in board.open_panels().iter().enumerate() {
        let Some(waypoint) = waypoints.iter().find(|w| &w.panel == panel) else {
            continue;
        };
        let [_, r, g, b] = waypoint.color.to_be_bytes();

        let mut open = true;
        #[allow(clippy::cast_precision_loss)]
        let offset = index as f32 * 30.0;
        egui::Window::new(waypoint.label.as_str())
            .id(egui::Id::new(panel.as_str()))
            .open(&mut open)
            .anchor(egui::Align2::RIGHT_TOP, [-10.0 - offset, 10.0 + offset])
            .default_width(340.0)
            .show(ctx, |ui| {
                ui.colored_label(egui::Color32::from_rgb(r, g, b), waypoint.label.as_str());
                ui.separator();
                ui.label(content.body(&waypoint.label));
            });
        if !open {
            closed.push(panel.clone());
        }
    }

    for panel in closed {
        board.close(&panel);
    }
    Ok(())
}
