//! Post properties for marlinpost
//!
//! Provides property file handling, defaults and validation.
//! Supports JSON and TOML file formats.
//!
//! Properties are organized into logical sections:
//! - Header (machine info, tool list)
//! - Output format (sequence numbers, word separation, arc tolerance)
//! - Cutter commands for jet sections
//! - Travel speeds substituted for rapid moves
//! - Job start and finish behaviour
//! - Tool change handling

use marlinpost_core::CuttingMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ConfigError, SettingsError, SettingsResult};

/// Program header settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderSettings {
    /// Write machine vendor/model comments
    pub write_machine_info: bool,
    /// Write one comment per tool used by the job
    pub write_tool_list: bool,
    /// Machine vendor
    pub machine_vendor: String,
    /// Machine model
    pub machine_model: String,
    /// Machine description
    pub machine_description: String,
}

impl Default for HeaderSettings {
    fn default() -> Self {
        Self {
            write_machine_info: true,
            write_tool_list: true,
            machine_vendor: "Marlin".to_string(),
            machine_model: "CNC".to_string(),
            machine_description: String::new(),
        }
    }
}

/// Output format settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    /// Prefix blocks with N sequence numbers
    pub sequence_numbers: bool,
    /// First sequence number
    pub sequence_start: u32,
    /// Sequence number increment
    pub sequence_increment: u32,
    /// Separate words with a space
    pub separate_words: bool,
    /// Maximum chord deviation when arcs are linearized (mm)
    pub arc_tolerance: f64,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            sequence_numbers: false,
            sequence_start: 10,
            sequence_increment: 1,
            separate_words: true,
            arc_tolerance: 0.01,
        }
    }
}

/// Cutter power commands
///
/// These are opaque strings written verbatim; the post never interprets them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterSettings {
    /// Cutter on, through cutting
    pub on_through: String,
    /// Cutter on, etching
    pub on_etch: String,
    /// Cutter on, vaporizing
    pub on_vaporize: String,
    /// Cutter off, all modes
    pub off: String,
}

impl Default for CutterSettings {
    fn default() -> Self {
        Self {
            on_through: "M3 O255".to_string(),
            on_etch: "M3 O200".to_string(),
            on_vaporize: "M3 O100".to_string(),
            off: "M5".to_string(),
        }
    }
}

impl CutterSettings {
    /// Cutter-on command for a cutting mode
    pub fn command_for(&self, mode: CuttingMode) -> &str {
        match mode {
            CuttingMode::Through => &self.on_through,
            CuttingMode::Etch => &self.on_etch,
            CuttingMode::Vaporize => &self.on_vaporize,
        }
    }
}

/// Travel speeds used in place of rapid moves (mm/min)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelSettings {
    /// XY travel speed
    pub xy_speed: f64,
    /// Z travel speed
    pub z_speed: f64,
}

impl Default for TravelSettings {
    fn default() -> Self {
        Self {
            xy_speed: 2500.0,
            z_speed: 300.0,
        }
    }
}

/// Job start and finish settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSettings {
    /// Set the current position as origin (G92) when the job starts
    pub set_origin_on_start: bool,
    /// Return to XY origin, then Z origin, when the job finishes
    pub go_origin_on_finish: bool,
    /// Home Z then XY when the job finishes; wins over `go_origin_on_finish`
    pub go_home_on_finish: bool,
    /// Power down all motors when the job finishes
    pub power_down_motors_on_finish: bool,
    /// Homing command used for the safe retract
    pub safe_retract_command: String,
    /// Probe before the first section
    pub probe_on_start: bool,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            set_origin_on_start: true,
            go_origin_on_finish: true,
            go_home_on_finish: false,
            power_down_motors_on_finish: true,
            safe_retract_command: "G28".to_string(),
            probe_on_start: false,
        }
    }
}

/// How a tool change is carried out
#[derive(Debug, Clone, PartialEq)]
pub enum ToolChangeSequence {
    /// Park, prompt and wait, generated by the post
    BuiltIn,
    /// Code loaded verbatim from the external tool-change file
    External(String),
}

/// Tool change settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolChangeSettings {
    /// Handle tool number changes between sections
    pub enabled: bool,
    /// Park position X
    pub x: f64,
    /// Park position Y
    pub y: f64,
    /// Park position Z
    pub z: f64,
    /// Disable the Z stepper while the tool is swapped
    pub disable_z_stepper: bool,
    /// Probe Z after the tool has been swapped
    pub probe_after_change: bool,
    /// File with a custom tool-change sequence, replaces the built-in one
    pub external_file: Option<PathBuf>,
    /// Contents of `external_file`, filled by [`PostProperties::resolve`]
    #[serde(skip)]
    pub external_code: Option<String>,
}

impl Default for ToolChangeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            x: 0.0,
            y: 0.0,
            z: 40.0,
            disable_z_stepper: true,
            probe_after_change: false,
            external_file: None,
            external_code: None,
        }
    }
}

impl ToolChangeSettings {
    /// The sequence to run on a tool change
    pub fn sequence(&self) -> ToolChangeSequence {
        match &self.external_code {
            Some(code) => ToolChangeSequence::External(code.clone()),
            None => ToolChangeSequence::BuiltIn,
        }
    }
}

/// Complete post properties
///
/// Aggregates all property sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PostProperties {
    /// Program header
    pub header: HeaderSettings,
    /// Output format
    pub format: FormatSettings,
    /// Cutter commands
    pub cutter: CutterSettings,
    /// Travel speeds
    pub travel: TravelSettings,
    /// Job start and finish
    pub job: JobSettings,
    /// Tool change handling
    pub tool_change: ToolChangeSettings,
}

impl PostProperties {
    /// Create new properties with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load properties from file (JSON or TOML), validated and resolved
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let mut properties: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        debug!("Loaded post properties from {}", path.display());

        properties.validate()?;
        properties.resolve()?;
        Ok(properties)
    }

    /// Save properties to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate properties
    pub fn validate(&self) -> SettingsResult<()> {
        if self.travel.xy_speed <= 0.0 {
            return Err(out_of_range("travel.xy_speed", self.travel.xy_speed));
        }

        if self.travel.z_speed <= 0.0 {
            return Err(out_of_range("travel.z_speed", self.travel.z_speed));
        }

        if self.format.arc_tolerance <= 0.0 {
            return Err(out_of_range(
                "format.arc_tolerance",
                self.format.arc_tolerance,
            ));
        }

        if self.format.sequence_numbers && self.format.sequence_increment == 0 {
            return Err(out_of_range(
                "format.sequence_increment",
                self.format.sequence_increment,
            ));
        }

        if self.job.go_home_on_finish && self.job.safe_retract_command.trim().is_empty() {
            return Err(SettingsError::invalid(
                "job.safe_retract_command",
                "must not be empty when homing on finish",
            ));
        }

        Ok(())
    }

    /// Load the external tool-change file, if one is configured
    pub fn resolve(&mut self) -> SettingsResult<()> {
        if let Some(path) = &self.tool_change.external_file {
            let code = std::fs::read_to_string(path).map_err(|e| ConfigError::ExternalFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            debug!(
                "Loaded external tool-change sequence from {} ({} bytes)",
                path.display(),
                code.len()
            );
            self.tool_change.external_code = Some(code);
        }
        Ok(())
    }
}

fn out_of_range(key: &str, value: impl ToString) -> SettingsError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let properties = PostProperties::new();
        assert!(properties.validate().is_ok());
        assert_eq!(properties.travel.xy_speed, 2500.0);
        assert_eq!(properties.cutter.off, "M5");
        assert_eq!(properties.tool_change.sequence(), ToolChangeSequence::BuiltIn);
    }

    #[test]
    fn test_command_for_mode() {
        let cutter = CutterSettings::default();
        assert_eq!(cutter.command_for(CuttingMode::Through), "M3 O255");
        assert_eq!(cutter.command_for(CuttingMode::Etch), "M3 O200");
        assert_eq!(cutter.command_for(CuttingMode::Vaporize), "M3 O100");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut properties = PostProperties::new();
        properties.travel.z_speed = 0.0;
        assert!(matches!(
            properties.validate(),
            Err(SettingsError::Config(ConfigError::ValueOutOfRange { .. }))
        ));

        let mut properties = PostProperties::new();
        properties.format.arc_tolerance = -0.1;
        assert!(properties.validate().is_err());

        let mut properties = PostProperties::new();
        properties.format.sequence_numbers = true;
        properties.format.sequence_increment = 0;
        assert!(properties.validate().is_err());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[travel]\nxy_speed = 1800.0\n\n[tool_change]\nenabled = true\nz = 55.0"
        )
        .unwrap();

        let properties = PostProperties::load_from_file(file.path()).unwrap();
        assert_eq!(properties.travel.xy_speed, 1800.0);
        assert_eq!(properties.travel.z_speed, 300.0);
        assert!(properties.tool_change.enabled);
        assert_eq!(properties.tool_change.z, 55.0);
        assert!(properties.header.write_tool_list);
    }

    #[test]
    fn test_load_json_and_resolve_external_file() {
        let mut code = tempfile::NamedTempFile::new().unwrap();
        writeln!(code, "M400\nM0 Change tool").unwrap();

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::json!({
            "tool_change": { "enabled": true, "external_file": code.path() }
        });
        write!(file, "{}", json).unwrap();

        let properties = PostProperties::load_from_file(file.path()).unwrap();
        assert_eq!(
            properties.tool_change.sequence(),
            ToolChangeSequence::External("M400\nM0 Change tool\n".to_string())
        );
    }

    #[test]
    fn test_missing_external_file() {
        let mut properties = PostProperties::new();
        properties.tool_change.external_file = Some(PathBuf::from("/nonexistent/tool.gcode"));
        assert!(matches!(
            properties.resolve(),
            Err(SettingsError::Config(ConfigError::ExternalFile { .. }))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            PostProperties::load_from_file(file.path()),
            Err(SettingsError::Config(ConfigError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_save_and_reload_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.toml");

        let mut properties = PostProperties::new();
        properties.format.sequence_numbers = true;
        properties.job.go_home_on_finish = true;
        properties.save_to_file(&path).unwrap();

        let loaded = PostProperties::load_from_file(&path).unwrap();
        assert_eq!(loaded, properties);
    }
}
