//! Job event stream
//!
//! The CAM engine drives the post-processor with one event at a time, in job
//! order. Every event the post understands is a variant of [`JobEvent`];
//! a single dispatch function consumes them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::section::{JobInfo, Section};
use crate::data::{Plane, Point3};

/// An event from the CAM engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JobEvent {
    /// Start of the job
    OpenJob(JobInfo),
    /// Free-text metadata, e.g. `generated-at` or `operation-comment`
    Parameter {
        /// Parameter name
        key: String,
        /// Parameter value
        value: String,
    },
    /// Start of a machining section
    OpenSection(Section),
    /// Positioning move; absent axes stay where they are
    Rapid {
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        z: Option<f64>,
    },
    /// Cutting move at the given feed
    Linear { x: f64, y: f64, z: f64, feed: f64 },
    /// Circular move around `center` ending at (`x`, `y`, `z`)
    Circular {
        clockwise: bool,
        center: Point3,
        x: f64,
        y: f64,
        z: f64,
        feed: f64,
        #[serde(default)]
        plane: Plane,
    },
    /// Positioning move with rotary axes
    #[serde(rename = "rapid5d")]
    Rapid5D {
        x: f64,
        y: f64,
        z: f64,
        a: f64,
        b: f64,
        c: f64,
    },
    /// Cutting move with rotary axes
    #[serde(rename = "linear5d")]
    Linear5D {
        x: f64,
        y: f64,
        z: f64,
        a: f64,
        b: f64,
        c: f64,
        feed: f64,
    },
    /// Cutter power on or off
    Power { on: bool },
    /// Pause for a number of seconds
    Dwell { seconds: f64 },
    /// Spindle speed change
    SpindleSpeed { rpm: f64 },
    /// End of the current section
    CloseSection,
    /// End of the job
    CloseJob,
}

/// Event discriminant, used for logging and error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEventKind {
    OpenJob,
    Parameter,
    OpenSection,
    Rapid,
    Linear,
    Circular,
    Rapid5D,
    Linear5D,
    Power,
    Dwell,
    SpindleSpeed,
    CloseSection,
    CloseJob,
}

impl JobEvent {
    /// The kind of this event
    pub fn kind(&self) -> JobEventKind {
        match self {
            Self::OpenJob(_) => JobEventKind::OpenJob,
            Self::Parameter { .. } => JobEventKind::Parameter,
            Self::OpenSection(_) => JobEventKind::OpenSection,
            Self::Rapid { .. } => JobEventKind::Rapid,
            Self::Linear { .. } => JobEventKind::Linear,
            Self::Circular { .. } => JobEventKind::Circular,
            Self::Rapid5D { .. } => JobEventKind::Rapid5D,
            Self::Linear5D { .. } => JobEventKind::Linear5D,
            Self::Power { .. } => JobEventKind::Power,
            Self::Dwell { .. } => JobEventKind::Dwell,
            Self::SpindleSpeed { .. } => JobEventKind::SpindleSpeed,
            Self::CloseSection => JobEventKind::CloseSection,
            Self::CloseJob => JobEventKind::CloseJob,
        }
    }
}

impl fmt::Display for JobEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenJob => "open_job",
            Self::Parameter => "parameter",
            Self::OpenSection => "open_section",
            Self::Rapid => "rapid",
            Self::Linear => "linear",
            Self::Circular => "circular",
            Self::Rapid5D => "rapid5d",
            Self::Linear5D => "linear5d",
            Self::Power => "power",
            Self::Dwell => "dwell",
            Self::SpindleSpeed => "spindle_speed",
            Self::CloseSection => "close_section",
            Self::CloseJob => "close_job",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names() {
        assert_eq!(JobEvent::CloseJob.kind().to_string(), "close_job");
        assert_eq!(
            JobEvent::Rapid {
                x: Some(1.0),
                y: None,
                z: None
            }
            .kind(),
            JobEventKind::Rapid
        );
    }

    #[test]
    fn test_deserialize_tagged_events() {
        let json = r#"[
            {"event": "rapid", "x": 10.0, "y": 20.0},
            {"event": "linear", "x": 1.0, "y": 2.0, "z": -1.0, "feed": 800.0},
            {"event": "circular", "clockwise": true, "center": {"x": 0.0, "y": 0.0, "z": 0.0},
             "x": 5.0, "y": 0.0, "z": 0.0, "feed": 500.0},
            {"event": "power", "on": true},
            {"event": "dwell", "seconds": 1.5},
            {"event": "close_section"}
        ]"#;
        let events: Vec<JobEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events.len(), 6);
        assert_eq!(
            events[0],
            JobEvent::Rapid {
                x: Some(10.0),
                y: Some(20.0),
                z: None
            }
        );
        match &events[2] {
            JobEvent::Circular { plane, .. } => assert_eq!(*plane, Plane::XY),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(events[5], JobEvent::CloseSection);
    }
}
