//! Resume course layout: which sections exist and where their markers sit.

use glam::Vec3;

use crate::{
    path::TrailPath,
    proximity::{PanelId, Waypoint},
};

/// Sideways distance from the trail to each marker.
pub const MARKER_OFFSET: f32 = 3.0;

/// Where the vehicle starts, facing +Z along the trail.
pub const VEHICLE_START: Vec3 = Vec3::new(0.0, 0.0, -40.0);

/// Where the camera starts, just ahead of the vehicle.
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 2.0, -35.0);

/// A resume section placed along the trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Section {
    /// Title, also used for the panel identifier.
    pub title: &'static str,
    /// Position along the trail in [-0.5, 0.5]; values outside are clamped.
    pub trail_position: f32,
    /// Marker colour as `0xRRGGBB`.
    pub color: u32,
}

/// The sections of the resume, in driving order.
pub const RESUME_SECTIONS: [Section; 5] = [
    Section {
        title: "About",
        trail_position: -0.9,
        color: 0xFF_63_47,
    },
    Section {
        title: "Skills",
        trail_position: -0.7,
        color: 0x64_95_ED,
    },
    Section {
        title: "Experience",
        trail_position: -0.4,
        color: 0x9A_CD_32,
    },
    Section {
        title: "Projects",
        trail_position: -0.1,
        color: 0xDA_70_D6,
    },
    Section {
        title: "Education",
        trail_position: 0.2,
        color: 0xFF_A5_00,
    },
];

impl Section {
    /// Panel identifier for this section, e.g. `skills-panel`.
    #[must_use]
    pub fn panel_id(&self) -> PanelId {
        PanelId::new(format!("{}-panel", self.title.to_lowercase()))
    }

    /// Arc-length fraction of the trail where the marker sits.
    #[must_use]
    pub fn trail_fraction(&self) -> f32 {
        (self.trail_position + 0.5).clamp(0.0, 1.0)
    }
}

/// The trail together with its waypoint markers.
#[derive(Clone, Debug)]
pub struct Course {
    /// The drivable trail.
    pub trail: TrailPath,
    /// Markers, one per section.
    pub waypoints: Vec<Waypoint>,
}

impl Course {
    /// Lay `sections` out beside `trail`.
    #[must_use]
    pub fn layout(trail: TrailPath, sections: &[Section]) -> Self {
        let waypoints = sections
            .iter()
            .map(|section| place_marker(&trail, section))
            .collect();
        Self { trail, waypoints }
    }

    /// The forest trail with the full resume.
    #[must_use]
    pub fn forest_resume() -> Self {
        Self::layout(TrailPath::forest_trail(), &RESUME_SECTIONS)
    }
}

/// Put a section's marker beside the trail, to the left of travel.
fn place_marker(trail: &TrailPath, section: &Section) -> Waypoint {
    let fraction = section.trail_fraction();
    let on_trail = trail.point_at(fraction);
    let tangent = trail.tangent_at(fraction);
    let side = Vec3::new(-tangent.z, 0.0, tangent.x).normalize_or_zero();
    Waypoint {
        position: on_trail + side * MARKER_OFFSET,
        label: section.title.to_string(),
        panel: section.panel_id(),
        color: section.color,
    }
}
