//! Data models for the job description
//!
//! This module provides:
//! - 3-axis positions
//! - Axis-aligned bounding boxes for sections and the whole job
//! - Arc plane selection
//! - Tool definitions
//! - Sections and job-level information

pub mod section;
pub mod tools;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the 3 linear axes, in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
}

impl Point3 {
    /// Create a new point
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Arc plane selection (G17/G18/G19)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    /// XY plane (G17)
    #[default]
    XY,
    /// ZX plane (G18)
    ZX,
    /// YZ plane (G19)
    YZ,
}

impl Plane {
    /// The G code number selecting this plane
    pub fn gcode(&self) -> u32 {
        match self {
            Self::XY => 17,
            Self::ZX => 18,
            Self::YZ => 19,
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XY => write!(f, "XY"),
            Self::ZX => write!(f, "ZX"),
            Self::YZ => write!(f, "YZ"),
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Lower corner
    pub min: Point3,
    /// Upper corner
    pub max: Point3,
}

impl BoundingBox {
    /// Create a bounding box from its corners
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    /// Smallest box enclosing both `self` and `other`
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    /// Check whether a point lies inside the box (bounds inclusive)
    pub fn contains(&self, p: &Point3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}
