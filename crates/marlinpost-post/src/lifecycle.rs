//! Section and job lifecycle
//!
//! [`PostProcessor`] consumes the job event stream through [`PostProcessor::dispatch`]
//! and drives the header, per-section preamble and teardown, and the footer.
//!
//! Lifecycle:
//! - `NotStarted` --open_job--> `JobOpen` (writes `%`)
//! - `JobOpen` --open_section--> job header, section preamble, `InSection`
//! - `InSection` --close_section--> section teardown, `BetweenSections`
//! - `BetweenSections` --open_section--> section preamble, `InSection`
//! - any open state --close_job--> job footer, `Done`
//!
//! A fatal error moves the processor to `Failed`; it accepts nothing after that.

use marlinpost_core::{
    BoundingBox, JobEvent, JobInfo, Point3, PostError, PostResult, Section, SectionKind,
};
use marlinpost_settings::PostProperties;
use std::fmt;
use tracing::{debug, info};

use crate::context::JobContext;
use crate::format::NumberFormat;

/// Metadata parameters written to the program header
const HEADER_PARAMETERS: &[(&str, &str)] = &[
    ("generated-at", "Generated"),
    ("document-path", "Document"),
    ("job-description", "Job"),
];

/// Parameter supplying the comment of the next section
const OPERATION_COMMENT: &str = "operation-comment";

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No job yet
    NotStarted,
    /// Job opened, header not yet written
    JobOpen,
    /// Inside a section body
    InSection,
    /// A section closed, waiting for the next one or the end of the job
    BetweenSections,
    /// Footer written
    Done,
    /// Generation aborted
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Marlin post-processor for one job
#[derive(Debug)]
pub struct PostProcessor {
    state: LifecycleState,
    ctx: JobContext,
    job: JobInfo,
    metadata: Vec<(String, String)>,
    pending_comment: Option<String>,
}

impl PostProcessor {
    /// Create a post-processor; `properties` must already be validated
    pub fn new(properties: PostProperties) -> Self {
        Self {
            state: LifecycleState::NotStarted,
            ctx: JobContext::new(properties),
            job: JobInfo::default(),
            metadata: Vec::new(),
            pending_comment: None,
        }
    }

    /// Run a complete event stream, returning the program text
    ///
    /// The first fatal error aborts the run and no output is returned.
    pub fn run<I>(properties: PostProperties, events: I) -> PostResult<String>
    where
        I: IntoIterator<Item = JobEvent>,
    {
        let mut post = Self::new(properties);
        for event in events {
            post.dispatch(event)?;
        }
        post.finish()
    }

    /// Current lifecycle state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Program text written so far
    pub fn output(&self) -> &str {
        self.ctx.writer.as_str()
    }

    /// The job context
    pub fn context(&self) -> &JobContext {
        &self.ctx
    }

    /// Consume the processor, returning the program once the job is closed
    pub fn finish(self) -> PostResult<String> {
        if self.state != LifecycleState::Done {
            return Err(PostError::UnexpectedEvent {
                state: self.state.to_string(),
                event: "finish".to_string(),
            });
        }
        Ok(self.ctx.writer.into_output())
    }

    /// Handle one event
    pub fn dispatch(&mut self, event: JobEvent) -> PostResult<()> {
        let result = self.handle(event);
        if result.is_err() {
            self.state = LifecycleState::Failed;
        }
        result
    }

    fn handle(&mut self, event: JobEvent) -> PostResult<()> {
        use LifecycleState::*;

        let kind = event.kind();
        match (self.state, event) {
            (NotStarted, JobEvent::OpenJob(job)) => {
                self.open_job(job);
                Ok(())
            }
            (JobOpen | InSection | BetweenSections, JobEvent::Parameter { key, value }) => {
                self.parameter(key, value);
                Ok(())
            }
            (JobOpen | BetweenSections, JobEvent::OpenSection(section)) => {
                if self.state == JobOpen {
                    self.job_header();
                }
                self.section_preamble(section)?;
                self.state = InSection;
                Ok(())
            }
            (InSection, JobEvent::Rapid { x, y, z }) => {
                self.ctx.rapid(x, y, z);
                Ok(())
            }
            (InSection, JobEvent::Linear { x, y, z, feed }) => {
                self.ctx.linear(x, y, z, feed);
                Ok(())
            }
            (
                InSection,
                JobEvent::Circular {
                    clockwise,
                    center,
                    x,
                    y,
                    z,
                    feed,
                    plane,
                },
            ) => {
                self.ctx
                    .circular(clockwise, center, Point3::new(x, y, z), feed, plane);
                Ok(())
            }
            (JobOpen | InSection | BetweenSections, JobEvent::Rapid5D { .. }) => {
                self.ctx.rapid_5d()
            }
            (JobOpen | InSection | BetweenSections, JobEvent::Linear5D { .. }) => {
                self.ctx.linear_5d()
            }
            (InSection, JobEvent::Power { on }) => {
                self.ctx.power(on);
                Ok(())
            }
            (InSection, JobEvent::Dwell { seconds }) => {
                self.ctx.dwell(seconds);
                Ok(())
            }
            (InSection, JobEvent::SpindleSpeed { rpm }) => {
                self.ctx.spindle_speed(rpm);
                Ok(())
            }
            (InSection, JobEvent::CloseSection) => {
                self.section_teardown();
                self.state = BetweenSections;
                Ok(())
            }
            (JobOpen | InSection | BetweenSections, JobEvent::CloseJob) => {
                if self.state == JobOpen {
                    self.job_header();
                }
                if self.state == InSection {
                    self.section_teardown();
                }
                self.job_footer();
                self.state = Done;
                Ok(())
            }
            (state, _) => Err(PostError::UnexpectedEvent {
                state: state.to_string(),
                event: kind.to_string(),
            }),
        }
    }

    fn open_job(&mut self, job: JobInfo) {
        info!(
            "Starting job '{}' with {} tools",
            job.program_name,
            job.tools.len()
        );
        self.ctx.writer.write_raw("%");
        self.job = job;
        self.state = LifecycleState::JobOpen;
    }

    fn parameter(&mut self, key: String, value: String) {
        debug!("Parameter {} = {}", key, value);
        if key == OPERATION_COMMENT {
            self.pending_comment = Some(value);
        } else if HEADER_PARAMETERS.iter().any(|(k, _)| *k == key) {
            if self.state == LifecycleState::JobOpen {
                self.metadata.push((key, value));
            } else {
                debug!("Header already written, dropping parameter {}", key);
            }
        }
    }

    fn job_header(&mut self) {
        debug!("Writing job header");

        if !self.job.program_name.is_empty() {
            let name = self.job.program_name.clone();
            self.ctx.comment(&name);
        }
        if !self.job.program_comment.is_empty() {
            let comment = self.job.program_comment.clone();
            self.ctx.comment(&comment);
        }

        let header = self.ctx.properties.header.clone();
        if header.write_machine_info {
            let machine = format!("{} {}", header.machine_vendor, header.machine_model);
            self.ctx.comment(&format!("Machine: {}", machine.trim()));
            if !header.machine_description.is_empty() {
                self.ctx
                    .comment(&format!("Description: {}", header.machine_description));
            }
        }

        for (key, label) in HEADER_PARAMETERS {
            let values: Vec<String> = self
                .metadata
                .iter()
                .filter(|(k, _)| k.as_str() == *key)
                .map(|(_, v)| v.clone())
                .collect();
            for value in values {
                self.ctx.comment(&format!("{}: {}", label, value));
            }
        }

        if header.write_tool_list {
            let taper = NumberFormat::taper();
            let coordinate = NumberFormat::new("", 3);
            let mut listed = Vec::new();
            for tool in self.job.tools.clone() {
                if listed.contains(&tool.number) {
                    continue;
                }
                listed.push(tool.number);
                let mut line = format!(
                    "{} D={} CR={}",
                    NumberFormat::tool().word(f64::from(tool.number)),
                    coordinate.number(tool.diameter),
                    coordinate.number(tool.corner_radius),
                );
                if tool.taper_angle != 0.0 {
                    line.push_str(&format!(" TAPER={}deg", taper.number(tool.taper_angle)));
                }
                line.push_str(&format!(" - {}", tool.tool_type));
                if !tool.name.is_empty() {
                    line.push_str(&format!(" - {}", tool.name));
                }
                self.ctx.comment(&line);
            }
        }

        self.ctx.writer.write_blank();

        let modals = &mut self.ctx.modals;
        let distance = modals.distance.format(90.0);
        let units = modals.units.format(21.0);
        self.ctx.writer.write_words(&[distance]);
        self.ctx.writer.write_words(&[units]);
        self.ctx.writer.write_block(&["M84", "S0"]);
        if self.ctx.properties.job.set_origin_on_start {
            self.ctx.writer.write_block(&["G92", "X0", "Y0", "Z0"]);
        }
        self.ctx.writer.write_block(&["M106"]);
    }

    fn section_preamble(&mut self, mut section: Section) -> PostResult<()> {
        let index = self.ctx.machine.section_count;
        self.ctx.machine.section_count += 1;
        debug!("Opening section {} ({})", index + 1, section.kind);

        if section.comment.is_empty() {
            if let Some(comment) = self.pending_comment.take() {
                section.comment = comment;
            }
        }
        self.pending_comment = None;

        let tool = section.tool.clone();
        let previous_tool = self.ctx.machine.tool;
        if self.ctx.properties.tool_change.enabled
            && previous_tool.is_some_and(|t| t != tool.number)
        {
            self.ctx.tool_change(&tool);
        }
        self.ctx.machine.tool = Some(tool.number);

        if !section.comment.is_empty() {
            self.ctx.comment(&section.comment);
        }

        match section.kind {
            SectionKind::Milling => {
                self.ctx.machine.cutter_on_command = None;
                let coordinate = NumberFormat::new("", 3);
                let mut line = format!(
                    "Tool T{} D={} CR={}",
                    tool.number,
                    coordinate.number(tool.diameter),
                    coordinate.number(tool.corner_radius)
                );
                if tool.taper_angle != 0.0 {
                    line.push_str(&format!(
                        " TAPER={}deg",
                        NumberFormat::taper().number(tool.taper_angle)
                    ));
                }
                line.push_str(&format!(" - {}", tool.tool_type));
                self.ctx.comment(&line);
            }
            SectionKind::Jet => {
                let mode = section.resolve_cutting_mode()?;
                let command = self.ctx.properties.cutter.command_for(mode).trim().to_string();
                if command.is_empty() {
                    return Err(PostError::invalid_config(format!(
                        "no cutter-on command configured for {} mode",
                        mode
                    )));
                }
                self.ctx
                    .comment(&format!("Jet cutting, {} mode: {}", mode, command));
                self.ctx.machine.cutter_on_command = Some(command);
            }
        }

        self.bounds_comments("", &section.bounds);
        self.ctx.machine.include_bounds(&section.bounds);

        let work_offset = section.work_offset.clamp(1, 6);
        if let Some(word) = self
            .ctx
            .modals
            .work_offset
            .format(f64::from(53 + work_offset))
        {
            self.ctx.writer.write_block(&[word]);
        }
        self.ctx.machine.work_offset = Some(work_offset);

        let status = if section.comment.is_empty() {
            format!("Section {}", index + 1)
        } else {
            section.comment.clone()
        };
        self.ctx.write_status(&status);

        if index == 0 && self.ctx.properties.job.probe_on_start {
            self.ctx.probe_tool(&tool);
        }

        Ok(())
    }

    fn bounds_comments(&mut self, prefix: &str, bounds: &BoundingBox) {
        let coordinate = NumberFormat::new("", 3);
        let axes = [
            ("X", bounds.min.x, bounds.max.x),
            ("Y", bounds.min.y, bounds.max.y),
            ("Z", bounds.min.z, bounds.max.z),
        ];
        for (axis, min, max) in axes {
            self.ctx.comment(&format!(
                "{}{} Min: {} - {} Max: {}",
                prefix,
                axis,
                coordinate.number(min),
                axis,
                coordinate.number(max)
            ));
        }
    }

    fn section_teardown(&mut self) {
        debug!("Closing section {}", self.ctx.machine.section_count);
        self.ctx.modals.reset_motion();
        self.ctx.writer.write_blank();
    }

    fn job_footer(&mut self) {
        debug!("Writing job footer");

        if let Some(bounds) = self.ctx.machine.job_bounds {
            self.bounds_comments("Job ", &bounds);
        }

        self.ctx.writer.write_block(&["M107"]);
        self.ctx.write_status("Job complete");

        let job = self.ctx.properties.job.clone();
        if job.go_home_on_finish {
            let command = job.safe_retract_command.trim();
            self.ctx.writer.write_block(&[command, "Z"]);
            self.ctx.writer.write_block(&[command, "X", "Y"]);
        } else if job.go_origin_on_finish {
            self.ctx.rapid(Some(0.0), Some(0.0), None);
            self.ctx.rapid(None, None, Some(0.0));
        }

        if job.power_down_motors_on_finish {
            self.ctx.writer.write_block(&["M84"]);
        }

        info!(
            "Job finished: {} sections, {} blocks",
            self.ctx.machine.section_count,
            self.ctx.writer.block_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlinpost_core::{Tool, ToolType};

    fn section(tool: u32) -> Section {
        Section::milling(
            Tool::new(tool, "flat", ToolType::EndMillFlat, 3.0),
            BoundingBox::new(Point3::new(0.0, 0.0, -2.0), Point3::new(10.0, 5.0, 5.0)),
        )
    }

    #[test]
    fn test_state_transitions() {
        let mut post = PostProcessor::new(PostProperties::default());
        assert_eq!(post.state(), LifecycleState::NotStarted);

        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        assert_eq!(post.state(), LifecycleState::JobOpen);
        assert_eq!(post.output(), "%\n");

        post.dispatch(JobEvent::OpenSection(section(1))).unwrap();
        assert_eq!(post.state(), LifecycleState::InSection);

        post.dispatch(JobEvent::CloseSection).unwrap();
        assert_eq!(post.state(), LifecycleState::BetweenSections);

        post.dispatch(JobEvent::CloseJob).unwrap();
        assert_eq!(post.state(), LifecycleState::Done);
        assert!(post.finish().is_ok());
    }

    #[test]
    fn test_motion_outside_section_is_rejected() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        let err = post
            .dispatch(JobEvent::Linear {
                x: 1.0,
                y: 1.0,
                z: 1.0,
                feed: 100.0,
            })
            .unwrap_err();
        assert_eq!(
            err,
            PostError::UnexpectedEvent {
                state: "JobOpen".to_string(),
                event: "linear".to_string()
            }
        );
        assert_eq!(post.state(), LifecycleState::Failed);
        assert!(post.dispatch(JobEvent::CloseJob).is_err());
    }

    #[test]
    fn test_finish_before_close_job_fails() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        assert!(post.finish().is_err());
    }

    #[test]
    fn test_header_written_once() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        post.dispatch(JobEvent::OpenSection(section(1))).unwrap();
        post.dispatch(JobEvent::CloseSection).unwrap();
        post.dispatch(JobEvent::OpenSection(section(1))).unwrap();
        assert_eq!(post.output().matches("M84 S0").count(), 1);
        assert_eq!(post.output().matches("G90").count(), 1);
        assert_eq!(post.output().matches("M117 Section").count(), 2);
    }

    #[test]
    fn test_operation_comment_parameter() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        post.dispatch(JobEvent::Parameter {
            key: "operation-comment".to_string(),
            value: "Adaptive (roughing)".to_string(),
        })
        .unwrap();
        post.dispatch(JobEvent::OpenSection(section(1))).unwrap();
        assert!(post.output().contains("; Adaptive roughing\n"));
        assert!(post.output().contains("M117 Adaptive roughing\n"));
    }

    #[test]
    fn test_work_offset_emitted_on_change() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        post.dispatch(JobEvent::OpenSection(section(1))).unwrap();
        post.dispatch(JobEvent::CloseSection).unwrap();
        post.dispatch(JobEvent::OpenSection(section(1).with_work_offset(1)))
            .unwrap();
        post.dispatch(JobEvent::CloseSection).unwrap();
        post.dispatch(JobEvent::OpenSection(section(1).with_work_offset(2)))
            .unwrap();
        assert_eq!(post.output().matches("G54\n").count(), 1);
        assert_eq!(post.output().matches("G55\n").count(), 1);
    }

    #[test]
    fn test_rotary_motion_between_sections_is_unsupported() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        post.dispatch(JobEvent::OpenSection(section(1))).unwrap();
        post.dispatch(JobEvent::CloseSection).unwrap();

        let err = post
            .dispatch(JobEvent::Linear5D {
                x: 0.0,
                y: 0.0,
                z: 0.0,
                a: 0.0,
                b: 45.0,
                c: 0.0,
                feed: 100.0,
            })
            .unwrap_err();
        assert!(matches!(err, PostError::UnsupportedFeature(_)));
        assert_eq!(post.state(), LifecycleState::Failed);
    }

    #[test]
    fn test_rotary_motion_before_first_section_is_unsupported() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        let err = post
            .dispatch(JobEvent::Rapid5D {
                x: 0.0,
                y: 0.0,
                z: 5.0,
                a: 90.0,
                b: 0.0,
                c: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, PostError::UnsupportedFeature(_)));
        assert_eq!(post.output(), "%\n");
    }

    #[test]
    fn test_late_header_parameter_is_dropped() {
        let mut post = PostProcessor::new(PostProperties::default());
        post.dispatch(JobEvent::OpenJob(JobInfo::default())).unwrap();
        post.dispatch(JobEvent::OpenSection(section(1))).unwrap();
        post.dispatch(JobEvent::Parameter {
            key: "generated-at".to_string(),
            value: "2026-10-17".to_string(),
        })
        .unwrap();
        assert!(post.metadata.is_empty());
        post.dispatch(JobEvent::CloseJob).unwrap();
        assert!(!post.output().contains("Generated"));
    }
}
