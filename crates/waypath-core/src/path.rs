//! Procedural trail through the forest.
//!
//! A centripetal Catmull-Rom spline through sampled points, with an
//! arc-length table so callers can place things at even distances.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::error::{Error, Result};

/// Number of samples in the generated trail.
pub const TRAIL_POINTS: usize = 100;

/// Segments in the arc-length lookup table.
const ARC_LENGTH_DIVISIONS: usize = 200;

/// Parameter step for tangent estimation.
const TANGENT_EPSILON: f32 = 1e-4;

/// Height of the trail surface above the ground.
const TRAIL_HEIGHT: f32 = 0.05;

/// Smooth curve through a list of control points.
#[derive(Clone, Debug)]
pub struct TrailPath {
    points: Vec<Vec3>,
    /// Cumulative length at each of `ARC_LENGTH_DIVISIONS + 1` samples.
    lengths: Vec<f32>,
}

impl TrailPath {
    /// Build a curve through `points`.
    pub fn new(points: Vec<Vec3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::configuration(
                "path",
                format!("need at least 2 control points, got {}", points.len()),
            ));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(Error::configuration("path", "control points must be finite"));
        }
        let path = Self::build(points);
        if path.length() <= 0.0 {
            return Err(Error::configuration("path", "control points are all coincident"));
        }
        Ok(path)
    }

    /// The winding trail used by the resume course.
    ///
    /// One full sine period of amplitude 20 across the z range [-50, 50].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn forest_trail() -> Self {
        let points = (0..TRAIL_POINTS)
            .map(|i| {
                let t = i as f32 / (TRAIL_POINTS - 1) as f32;
                Vec3::new(20.0 * (t * TAU).sin(), TRAIL_HEIGHT, -50.0 + t * 100.0)
            })
            .collect();
        Self::build(points)
    }

    fn build(points: Vec<Vec3>) -> Self {
        let mut path = Self {
            points,
            lengths: Vec::new(),
        };
        path.lengths = path.compute_lengths();
        path
    }

    /// Control points.
    #[must_use]
    pub fn control_points(&self) -> &[Vec3] {
        &self.points
    }

    /// Total arc length.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at curve parameter `t` in [0, 1] (not arc-length uniform).
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn point(&self, t: f32) -> Vec3 {
        let last = self.points.len() - 1;
        let scaled = last as f32 * t.clamp(0.0, 1.0);
        let mut segment = scaled.floor() as usize;
        let mut weight = scaled - segment as f32;
        if segment >= last {
            segment = last - 1;
            weight = 1.0;
        }

        let p1 = self.points[segment];
        let p2 = self.points[segment + 1];
        // Extrapolate phantom end points.
        let p0 = if segment > 0 {
            self.points[segment - 1]
        } else {
            p1 + (p1 - p2)
        };
        let p3 = if segment + 2 <= last {
            self.points[segment + 2]
        } else {
            p2 + (p2 - p1)
        };

        centripetal_segment(p0, p1, p2, p3, weight)
    }

    /// Point at fraction `u` of the arc length.
    #[must_use]
    pub fn point_at(&self, u: f32) -> Vec3 {
        self.point(self.arc_to_parameter(u))
    }

    /// Unit tangent at fraction `u` of the arc length.
    #[must_use]
    pub fn tangent_at(&self, u: f32) -> Vec3 {
        let t = self.arc_to_parameter(u);
        let before = self.point((t - TANGENT_EPSILON).max(0.0));
        let after = self.point((t + TANGENT_EPSILON).min(1.0));
        (after - before).normalize_or_zero()
    }

    /// `count` points evenly spaced along the arc, ends included.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn polyline(&self, count: usize) -> Vec<Vec3> {
        let count = count.max(2);
        (0..count)
            .map(|i| self.point_at(i as f32 / (count - 1) as f32))
            .collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn compute_lengths(&self) -> Vec<f32> {
        let mut lengths = Vec::with_capacity(ARC_LENGTH_DIVISIONS + 1);
        let mut total = 0.0;
        let mut previous = self.point(0.0);
        lengths.push(0.0);
        for i in 1..=ARC_LENGTH_DIVISIONS {
            let current = self.point(i as f32 / ARC_LENGTH_DIVISIONS as f32);
            total += current.distance(previous);
            lengths.push(total);
            previous = current;
        }
        lengths
    }

    /// Map an arc-length fraction to a curve parameter.
    #[allow(clippy::cast_precision_loss)]
    fn arc_to_parameter(&self, u: f32) -> f32 {
        let target = u.clamp(0.0, 1.0) * self.length();
        // Last sample whose cumulative length does not exceed the target.
        let index = self
            .lengths
            .partition_point(|&l| l <= target)
            .saturating_sub(1)
            .min(ARC_LENGTH_DIVISIONS - 1);
        let before = self.lengths[index];
        let after = self.lengths[index + 1];
        let segment = after - before;
        let fraction = if segment > 0.0 {
            ((target - before) / segment).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (index as f32 + fraction) / ARC_LENGTH_DIVISIONS as f32
    }
}

/// Evaluate one centripetal Catmull-Rom segment between `p1` and `p2`.
fn centripetal_segment(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);

    // Repeated points would divide by zero.
    if dt1 < 1e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1e-4 {
        dt0 = dt1;
    }
    if dt2 < 1e-4 {
        dt2 = dt1;
    }

    let m1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
    let m2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

    let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * m1 - m2;
    let c3 = 2.0 * p1 - 2.0 * p2 + m1 + m2;
    p1 + m1 * t + c2 * t * t + c3 * t * t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_curve_passes_through_control_points() {
        let path = TrailPath::forest_trail();
        let points = path.control_points();
        assert_eq!(points.len(), TRAIL_POINTS);
        assert!(path.point(0.0).distance(points[0]) < 1e-4);
        assert!(path.point(1.0).distance(points[TRAIL_POINTS - 1]) < 1e-4);
        let mid = (TRAIL_POINTS - 1) / 3;
        let t = mid as f32 / (TRAIL_POINTS - 1) as f32;
        assert!(path.point(t).distance(points[mid]) < 1e-3);
    }

    #[test]
    fn test_arc_length_endpoints() {
        let path = TrailPath::forest_trail();
        assert!(path.point_at(0.0).distance(Vec3::new(0.0, 0.05, -50.0)) < 1e-4);
        assert!(path.point_at(1.0).distance(Vec3::new(0.0, 0.05, 50.0)) < 1e-3);
        // Longer than the straight-line distance because of the sine.
        assert!(path.length() > 100.0);
    }

    #[test]
    fn test_polyline_is_evenly_spaced() {
        let path = TrailPath::forest_trail();
        let line = path.polyline(21);
        let expected = path.length() / 20.0;
        for pair in line.windows(2) {
            let gap = pair[0].distance(pair[1]);
            assert!((gap - expected).abs() / expected < 0.03, "gap {gap} vs {expected}");
        }
    }

    #[test]
    fn test_tangent_follows_direction_of_travel() {
        let path = TrailPath::forest_trail();
        for u in [0.0, 0.25, 0.5, 0.9, 1.0] {
            let tangent = path.tangent_at(u);
            assert!((tangent.length() - 1.0).abs() < 1e-4);
            assert!(tangent.z > 0.0);
        }
    }

    #[test]
    fn test_straight_path() {
        let path = TrailPath::new(vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 10.0)]).unwrap();
        assert!((path.length() - 10.0).abs() < 1e-3);
        assert!(path.point_at(0.5).distance(Vec3::new(0.0, 0.0, 5.0)) < 1e-3);
        assert!(path.tangent_at(0.5).distance(Vec3::Z) < 1e-4);
    }

    #[test]
    fn test_degenerate_paths_rejected() {
        assert!(TrailPath::new(vec![Vec3::ZERO]).is_err());
        assert!(TrailPath::new(vec![Vec3::ZERO, Vec3::ZERO]).is_err());
        assert!(TrailPath::new(vec![Vec3::ZERO, Vec3::splat(f32::NAN)]).is_err());
    }
}
