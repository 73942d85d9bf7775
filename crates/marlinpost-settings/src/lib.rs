//! marlinpost Settings Crate
//!
//! Handles post properties: the fixed set of options resolved once before a
//! job starts and immutable while it runs.

pub mod config;
pub mod error;

pub use config::{
    CutterSettings, FormatSettings, HeaderSettings, JobSettings, PostProperties,
    ToolChangeSequence, ToolChangeSettings, TravelSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
