//! # marlinpost Core
//!
//! Core types for the marlinpost workspace.
//! Provides the machine-independent job description handed over by the CAM
//! engine, the tagged event stream that drives the post-processor, and the
//! error type shared by every layer that produces G-code.

pub mod data;
pub mod error;
pub mod event;

pub use data::{
    section::{CuttingMode, JobInfo, Section, SectionKind},
    tools::{Tool, ToolType},
    BoundingBox, Plane, Point3,
};

pub use error::{PostError, PostResult};

pub use event::{JobEvent, JobEventKind};
