//! Arc Expander
//!
//! Converts circular moves into linear segments for arcs the controller
//! cannot run: anything outside the XY plane, and helices.

use marlinpost_core::{Plane, Point3};
use std::f64::consts::PI;

/// Arc expansion configuration
#[derive(Debug, Clone)]
pub struct ArcExpanderConfig {
    /// Maximum distance between a segment and the true arc (mm)
    pub tolerance: f64,
    /// Minimum number of segments per arc
    pub min_segments: usize,
}

impl Default for ArcExpanderConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            min_segments: 2,
        }
    }
}

/// Converts arc moves to line segments
#[derive(Debug)]
pub struct ArcExpander {
    config: ArcExpanderConfig,
}

/// (in-plane u, in-plane v, normal w)
fn to_plane(p: &Point3, plane: Plane) -> (f64, f64, f64) {
    match plane {
        Plane::XY => (p.x, p.y, p.z),
        Plane::ZX => (p.z, p.x, p.y),
        Plane::YZ => (p.y, p.z, p.x),
    }
}

fn from_plane(u: f64, v: f64, w: f64, plane: Plane) -> Point3 {
    match plane {
        Plane::XY => Point3::new(u, v, w),
        Plane::ZX => Point3::new(v, w, u),
        Plane::YZ => Point3::new(w, u, v),
    }
}

impl ArcExpander {
    /// Create a new arc expander
    pub fn new(config: ArcExpanderConfig) -> Self {
        Self { config }
    }

    /// Create an expander with the given chord tolerance
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self::new(ArcExpanderConfig {
            tolerance,
            ..ArcExpanderConfig::default()
        })
    }

    /// Swept angle from start to end, signed by direction. Coincident start
    /// and end angles make a full circle.
    fn sweep(start_angle: f64, end_angle: f64, is_clockwise: bool) -> f64 {
        let mut angle_delta = end_angle - start_angle;
        if is_clockwise && angle_delta >= 0.0 {
            angle_delta -= 2.0 * PI;
        } else if !is_clockwise && angle_delta <= 0.0 {
            angle_delta += 2.0 * PI;
        }
        angle_delta
    }

    /// Number of segments keeping every chord within tolerance
    pub fn segment_count(&self, radius: f64, sweep: f64) -> usize {
        let min = self.config.min_segments.max(1);
        if radius <= self.config.tolerance {
            return min;
        }
        // chord deviation r(1 - cos(a/2)) <= tol  =>  a <= 2 acos(1 - tol/r)
        let max_step = 2.0 * (1.0 - self.config.tolerance / radius).acos();
        let needed = (sweep.abs() / max_step).ceil() as usize;
        needed.max(min)
    }

    /// Expand an arc into the end points of its segments
    ///
    /// The last point is exactly `end`. The normal-axis coordinate is
    /// interpolated linearly, so helices are handled as well.
    pub fn expand_arc(
        &self,
        start: Point3,
        end: Point3,
        center: Point3,
        is_clockwise: bool,
        plane: Plane,
    ) -> Vec<Point3> {
        let (su, sv, sw) = to_plane(&start, plane);
        let (eu, ev, ew) = to_plane(&end, plane);
        let (cu, cv, _) = to_plane(&center, plane);

        // Calculate radius
        let radius_u = su - cu;
        let radius_v = sv - cv;
        let radius = (radius_u * radius_u + radius_v * radius_v).sqrt();

        // Calculate angles
        let start_angle = radius_v.atan2(radius_u);
        let end_angle = (ev - cv).atan2(eu - cu);
        let angle_delta = Self::sweep(start_angle, end_angle, is_clockwise);

        let num_segments = self.segment_count(radius, angle_delta);
        let mut segments = Vec::with_capacity(num_segments);

        // Generate segments
        for i in 1..num_segments {
            let fraction = i as f64 / num_segments as f64;
            let angle = start_angle + angle_delta * fraction;
            let u = cu + radius * angle.cos();
            let v = cv + radius * angle.sin();
            let w = sw + (ew - sw) * fraction;
            segments.push(from_plane(u, v, w, plane));
        }
        segments.push(end);

        segments
    }
}

impl Default for ArcExpander {
    fn default() -> Self {
        Self::new(ArcExpanderConfig::default())
    }
}
