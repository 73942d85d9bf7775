//! Per-job state shared by every part of the post
//!
//! A [`JobContext`] is created when the job opens and dropped when it
//! closes. Nothing survives from one job to the next.

use marlinpost_core::{BoundingBox, Point3};
use marlinpost_settings::PostProperties;

use crate::arc_expander::ArcExpander;
use crate::format::WordSeparator;
use crate::modal::{ModalSet, SequenceNumbers};
use crate::writer::BlockWriter;

/// Machine state tracked across the job
#[derive(Debug, Clone, Default)]
pub struct MachineState {
    /// Tool number of the current section
    pub tool: Option<u32>,
    /// Cutter power flag
    pub power_on: bool,
    /// Cutter-on command locked in by the current jet section
    pub cutter_on_command: Option<String>,
    /// Active work coordinate system, 1..=6
    pub work_offset: Option<u32>,
    /// Last commanded position
    pub position: Point3,
    /// Union of all section bounds seen so far
    pub job_bounds: Option<BoundingBox>,
    /// Sections opened so far
    pub section_count: usize,
}

impl MachineState {
    /// Extend the job boundary with a section's bounds
    pub fn include_bounds(&mut self, bounds: &BoundingBox) {
        self.job_bounds = Some(match &self.job_bounds {
            Some(current) => current.union(bounds),
            None => *bounds,
        });
    }
}

/// Everything one job needs: properties, channels, machine state and output
#[derive(Debug)]
pub struct JobContext {
    pub properties: PostProperties,
    pub modals: ModalSet,
    pub machine: MachineState,
    pub writer: BlockWriter,
    pub arcs: ArcExpander,
}

impl JobContext {
    /// Create the context for a new job
    pub fn new(properties: PostProperties) -> Self {
        let format = &properties.format;
        let sequence = if format.sequence_numbers {
            SequenceNumbers::new(true, format.sequence_start, format.sequence_increment)
        } else {
            SequenceNumbers::disabled()
        };
        let writer = BlockWriter::new(WordSeparator::new(format.separate_words), sequence);
        let arcs = ArcExpander::with_tolerance(format.arc_tolerance);

        Self {
            properties,
            modals: ModalSet::new(),
            machine: MachineState::default(),
            writer,
            arcs,
        }
    }

    /// Write a configured command string as one opaque word
    pub fn write_command(&mut self, command: &str) {
        self.writer.write_block(&[command.trim()]);
    }

    /// Write an LCD status message
    pub fn write_status(&mut self, message: &str) {
        let text = crate::writer::strip_comment_text(message);
        self.writer.write_block(&["M117", text.as_str()]);
    }

    /// Write a comment
    pub fn comment(&mut self, text: &str) {
        self.writer.write_comment(text);
    }
}
