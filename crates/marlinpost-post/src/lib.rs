//! # marlinpost post-processor
//!
//! Turns a CAM job event stream into a Marlin G-code program.
//!
//! ## Modules
//!
//! - **Format**: number and word formatting
//! - **Modal**: modal channels, reference channels and sequence numbers
//! - **Writer**: the block and comment output stream
//! - **Motion**: rapid, linear and circular moves, power, dwell and spindle speed
//! - **Arc Expander**: linearization of arcs Marlin cannot run
//! - **Tool Change**: built-in and external tool-change sequences
//! - **Lifecycle**: job header, section preamble and teardown, job footer

pub mod arc_expander;
pub mod context;
pub mod format;
pub mod lifecycle;
pub mod modal;
pub mod motion;
pub mod tool_change;
pub mod writer;

pub use arc_expander::{ArcExpander, ArcExpanderConfig};
pub use context::{JobContext, MachineState};
pub use format::{NumberFormat, WordSeparator};
pub use lifecycle::{LifecycleState, PostProcessor};
pub use modal::{ModalChannel, ModalSet, ReferenceChannel, SequenceNumbers};
pub use writer::{BlockWriter, COMMENT_MARKER};

pub use marlinpost_core::{PostError, PostResult};
