//! Sections and job-level information

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::tools::Tool;
use super::BoundingBox;
use crate::error::PostError;

/// How a section removes material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Mechanical cutting with a rotating tool
    #[default]
    Milling,
    /// Laser, plasma or water jet cutting
    Jet,
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Milling => write!(f, "milling"),
            Self::Jet => write!(f, "jet"),
        }
    }
}

/// Cutter power level for jet sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CuttingMode {
    /// Cut all the way through the stock
    Through,
    /// Mark the surface
    Etch,
    /// Remove a thin surface layer
    Vaporize,
}

impl fmt::Display for CuttingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Through => write!(f, "through"),
            Self::Etch => write!(f, "etch"),
            Self::Vaporize => write!(f, "vaporize"),
        }
    }
}

impl FromStr for CuttingMode {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "through" | "cut" => Ok(Self::Through),
            "etch" => Ok(Self::Etch),
            "vaporize" => Ok(Self::Vaporize),
            other => Err(PostError::invalid_config(format!(
                "unsupported cutting mode '{}'",
                other
            ))),
        }
    }
}

/// One machining operation
///
/// The cutting mode is kept as the raw string the CAM engine supplied; it is
/// resolved when the section opens so an unknown mode aborts generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Milling or jet cutting
    #[serde(default)]
    pub kind: SectionKind,
    /// Tool used by this section
    pub tool: Tool,
    /// Cutting sub-mode for jet sections
    #[serde(default)]
    pub cutting_mode: Option<String>,
    /// Extent of the section's toolpath
    pub bounds: BoundingBox,
    /// Free-text comment, usually the operation name
    #[serde(default)]
    pub comment: String,
    /// Work coordinate system, 1..=6 for G54..G59 (0 selects G54)
    #[serde(default)]
    pub work_offset: u32,
}

impl Section {
    /// Create a milling section
    pub fn milling(tool: Tool, bounds: BoundingBox) -> Self {
        Self {
            kind: SectionKind::Milling,
            tool,
            cutting_mode: None,
            bounds,
            comment: String::new(),
            work_offset: 0,
        }
    }

    /// Create a jet-cutting section with the given sub-mode
    pub fn jet(tool: Tool, bounds: BoundingBox, cutting_mode: impl Into<String>) -> Self {
        Self {
            kind: SectionKind::Jet,
            tool,
            cutting_mode: Some(cutting_mode.into()),
            bounds,
            comment: String::new(),
            work_offset: 0,
        }
    }

    /// Set the section comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set the work offset
    pub fn with_work_offset(mut self, work_offset: u32) -> Self {
        self.work_offset = work_offset;
        self
    }

    /// Resolve the cutting sub-mode
    pub fn resolve_cutting_mode(&self) -> Result<CuttingMode, PostError> {
        match &self.cutting_mode {
            Some(mode) => mode.parse(),
            None => Err(PostError::invalid_config(
                "jet section without a cutting mode",
            )),
        }
    }
}

/// Job-level information supplied when the job opens
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobInfo {
    /// Program name, written to the header
    #[serde(default)]
    pub program_name: String,
    /// Program comment, written to the header
    #[serde(default)]
    pub program_comment: String,
    /// All tools used by the job, in first-use order
    #[serde(default)]
    pub tools: Vec<Tool>,
}
