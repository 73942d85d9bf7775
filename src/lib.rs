//! # marlinpost
//!
//! A post-processor turning CAM job event streams into G-code for Marlin
//! based CNC routers, laser cutters and other jet machines.
//!
//! ## Architecture
//!
//! marlinpost is organized as a workspace with multiple crates:
//!
//! 1. **marlinpost-core** - Job data model, event stream, error type
//! 2. **marlinpost-settings** - Post properties, validation, file loading
//! 3. **marlinpost-post** - Formatting, modal output, motion, tool changes, lifecycle
//! 4. **marlinpost** - Command line binary that integrates all crates

use anyhow::Context;
use std::path::Path;
use tracing::info;

pub use marlinpost_core::{
    BoundingBox, CuttingMode, JobEvent, JobEventKind, JobInfo, Plane, Point3, PostError,
    PostResult, Section, SectionKind, Tool, ToolType,
};
pub use marlinpost_post::{LifecycleState, PostProcessor};
pub use marlinpost_settings::{PostProperties, SettingsError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Log output goes to stderr so that G-code written to stdout stays clean.
/// `RUST_LOG` overrides the default level, which is `info`, or `debug` when
/// `verbose` is set.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(verbose);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    Ok(())
}

/// Read a job event stream from a JSON file
pub fn load_events(path: &Path) -> anyhow::Result<Vec<JobEvent>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    let events: Vec<JobEvent> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid job file {}", path.display()))?;
    Ok(events)
}

/// Load post properties from a file, or use the defaults
pub fn load_properties(path: Option<&Path>) -> anyhow::Result<PostProperties> {
    match path {
        Some(path) => PostProperties::load_from_file(path)
            .with_context(|| format!("Failed to load properties from {}", path.display())),
        None => Ok(PostProperties::default()),
    }
}

/// Post-process a job file into a G-code program
pub fn post_process_file(job: &Path, properties: Option<&Path>) -> anyhow::Result<String> {
    let properties = load_properties(properties)?;
    let events = load_events(job)?;
    info!("Loaded {} events from {}", events.len(), job.display());

    let program = PostProcessor::run(properties, events)
        .with_context(|| format!("Post-processing {} failed", job.display()))?;
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const JOB: &str = r#"[
        {"event": "open_job", "program_name": "plate"},
        {"event": "open_section", "kind": "milling",
         "tool": {"number": 1, "diameter": 3.0},
         "bounds": {"min": {"x": 0.0, "y": 0.0, "z": -1.0}, "max": {"x": 10.0, "y": 10.0, "z": 0.0}}},
        {"event": "linear", "x": 1.0, "y": 2.0, "z": -1.0, "feed": 600.0},
        {"event": "close_section"},
        {"event": "close_job"}
    ]"#;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_post_process_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let job = write_file(dir.path(), "job.json", JOB);

        let program = post_process_file(&job, None).unwrap();
        assert!(program.starts_with("%\n; plate\n"));
        assert!(program.contains("G1 X1.000 Y2.000 Z-1.000 F600\n"));
    }

    #[test]
    fn test_post_process_file_with_properties() {
        let dir = tempfile::tempdir().unwrap();
        let job = write_file(dir.path(), "job.json", JOB);
        let props = write_file(
            dir.path(),
            "post.toml",
            "[format]\nsequence_numbers = true\nsequence_start = 100\n",
        );

        let program = post_process_file(&job, Some(&props)).unwrap();
        assert!(program.contains("N100 G90\n"));
    }

    #[test]
    fn test_invalid_properties_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let job = write_file(dir.path(), "job.json", JOB);
        let props = write_file(dir.path(), "post.toml", "[travel]\nxy_speed = -5.0\n");

        assert!(post_process_file(&job, Some(&props)).is_err());
    }

    #[test]
    fn test_failed_job_returns_no_program() {
        let dir = tempfile::tempdir().unwrap();
        let job = write_file(
            dir.path(),
            "job.json",
            r#"[{"event": "open_job"}, {"event": "close_section"}]"#,
        );

        let err = post_process_file(&job, None).unwrap_err();
        let post_error = err.downcast_ref::<PostError>().unwrap();
        assert!(matches!(post_error, PostError::UnexpectedEvent { .. }));
    }
}
