//! Tool definitions
//!
//! Tools are supplied by the CAM engine already resolved; the post only
//! reports them and reacts to tool number changes between sections.

use serde::{Deserialize, Serialize};

/// Tool types for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    /// Flat end mill
    #[default]
    EndMillFlat,
    /// Ball end mill / ball nose
    EndMillBall,
    /// Bull nose / corner radius end mill
    EndMillBullNose,
    /// Tapered end mill
    EndMillTapered,
    /// Drill bit (twist drill)
    Drill,
    /// Engraving tool / V-bit
    Engraving,
    /// Laser cutter
    LaserCutter,
    /// Plasma cutter
    PlasmaCutter,
    /// Water jet
    WaterJet,
}

impl std::fmt::Display for ToolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndMillFlat => write!(f, "flat end mill"),
            Self::EndMillBall => write!(f, "ball end mill"),
            Self::EndMillBullNose => write!(f, "bull nose end mill"),
            Self::EndMillTapered => write!(f, "tapered end mill"),
            Self::Drill => write!(f, "drill"),
            Self::Engraving => write!(f, "engrave"),
            Self::LaserCutter => write!(f, "laser cutter"),
            Self::PlasmaCutter => write!(f, "plasma cutter"),
            Self::WaterJet => write!(f, "water jet"),
        }
    }
}

/// Complete tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool number
    pub number: u32,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Tool type
    #[serde(default)]
    pub tool_type: ToolType,
    /// Cutting diameter in mm
    pub diameter: f64,
    /// Corner radius in mm
    #[serde(default)]
    pub corner_radius: f64,
    /// Taper angle in radians
    #[serde(default)]
    pub taper_angle: f64,
}

impl Tool {
    /// Create a new tool with basic properties
    pub fn new(number: u32, name: impl Into<String>, tool_type: ToolType, diameter: f64) -> Self {
        Self {
            number,
            name: name.into(),
            tool_type,
            diameter,
            corner_radius: 0.0,
            taper_angle: 0.0,
        }
    }

    /// Set the corner radius
    pub fn with_corner_radius(mut self, corner_radius: f64) -> Self {
        self.corner_radius = corner_radius;
        self
    }

    /// Set the taper angle, in radians
    pub fn with_taper_angle(mut self, taper_angle: f64) -> Self {
        self.taper_angle = taper_angle;
        self
    }
}
