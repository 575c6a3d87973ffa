//! Waypoint proximity triggers.
//!
//! Each waypoint tracks whether its panel is shown, so repeated evaluation
//! at the same position emits nothing new.

use std::fmt;

use glam::Vec3;

use crate::{
    config::ProximityParams,
    error::{Error, Result},
};

/// Identifier of a UI panel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(String);

impl PanelId {
    /// Create a panel identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed point of interest.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    /// Marker position.
    pub position: Vec3,
    /// Display label.
    pub label: String,
    /// Panel opened near this waypoint.
    pub panel: PanelId,
    /// Marker colour as `0xRRGGBB`.
    pub color: u32,
}

/// A visibility change emitted by the trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelEvent {
    /// The vehicle came within range.
    Show(PanelId),
    /// The vehicle left range.
    Hide(PanelId),
}

/// UI collaborator that owns the panels.
pub trait PanelSink {
    /// Make a panel visible.
    fn show(&mut self, panel: &PanelId);

    /// Hide a panel.
    fn hide(&mut self, panel: &PanelId);
}

/// Sink that records events, for hosts without a UI.
impl PanelSink for Vec<PanelEvent> {
    fn show(&mut self, panel: &PanelId) {
        self.push(PanelEvent::Show(panel.clone()));
    }

    fn hide(&mut self, panel: &PanelId) {
        self.push(PanelEvent::Hide(panel.clone()));
    }
}

/// Per-waypoint visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Visibility {
    #[default]
    Hidden,
    Shown,
    /// Closed by the user while in range; held until the vehicle leaves.
    Dismissed,
}

/// Emits show/hide events as the vehicle passes waypoints.
#[derive(Clone, Debug)]
pub struct ProximityTrigger {
    waypoints: Vec<Waypoint>,
    visibility: Vec<Visibility>,
    params: ProximityParams,
}

impl ProximityTrigger {
    /// Create a trigger over a fixed waypoint list.
    pub fn new(waypoints: Vec<Waypoint>, params: ProximityParams) -> Result<Self> {
        params.validate()?;
        if let Some(bad) = waypoints.iter().find(|w| !w.position.is_finite()) {
            return Err(Error::configuration(
                "waypoints",
                format!("waypoint '{}' has a non-finite position", bad.label),
            ));
        }
        let visibility = vec![Visibility::Hidden; waypoints.len()];
        Ok(Self {
            waypoints,
            visibility,
            params,
        })
    }

    /// The waypoints, in creation order.
    #[must_use]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Whether a panel is currently shown.
    #[must_use]
    pub fn is_shown(&self, panel: &PanelId) -> bool {
        self.waypoints
            .iter()
            .zip(&self.visibility)
            .any(|(w, v)| &w.panel == panel && *v == Visibility::Shown)
    }

    /// Check every waypoint against `position`, notifying `sink` of changes.
    pub fn evaluate(&mut self, position: Vec3, sink: &mut impl PanelSink) -> Vec<PanelEvent> {
        let mut events = Vec::new();
        for (waypoint, visibility) in self.waypoints.iter().zip(self.visibility.iter_mut()) {
            let inside = waypoint.position.distance(position) < self.params.threshold;
            match (*visibility, inside) {
                (Visibility::Hidden, true) => {
                    tracing::info!("Reached waypoint '{}', showing {}", waypoint.label, waypoint.panel);
                    *visibility = Visibility::Shown;
                    sink.show(&waypoint.panel);
                    events.push(PanelEvent::Show(waypoint.panel.clone()));
                }
                (Visibility::Shown, false) if self.params.hide_on_exit => {
                    tracing::info!("Left waypoint '{}', hiding {}", waypoint.label, waypoint.panel);
                    *visibility = Visibility::Hidden;
                    sink.hide(&waypoint.panel);
                    events.push(PanelEvent::Hide(waypoint.panel.clone()));
                }
                (Visibility::Dismissed, false) => {
                    *visibility = Visibility::Hidden;
                }
                _ => {}
            }
        }
        events
    }

    /// Record that the user closed a panel.
    ///
    /// The panel stays closed until the vehicle leaves and re-enters range.
    pub fn dismiss(&mut self, panel: &PanelId) {
        for (waypoint, visibility) in self.waypoints.iter().zip(self.visibility.iter_mut()) {
            if &waypoint.panel == panel && *visibility == Visibility::Shown {
                tracing::debug!("Panel {} dismissed", panel);
                *visibility = Visibility::Dismissed;
            }
        }
    }
}
