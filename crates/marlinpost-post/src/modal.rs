//! Modal word emission
//!
//! A modal channel remembers the last word it emitted and suppresses the next
//! one when the formatted text is unchanged. Resetting a channel makes its
//! value unknown, so the next request always emits.

use crate::format::NumberFormat;

/// Per-word cache of the last emitted value
#[derive(Debug, Clone)]
pub struct ModalChannel {
    format: NumberFormat,
    last: Option<String>,
    force: bool,
}

impl ModalChannel {
    /// Create a channel that suppresses repeated values
    pub fn new(format: NumberFormat) -> Self {
        Self {
            format,
            last: None,
            force: false,
        }
    }

    /// Create a channel that emits on every request
    pub fn forced(format: NumberFormat) -> Self {
        Self {
            format,
            last: None,
            force: true,
        }
    }

    /// Format `value`, returning `None` when the word is suppressed
    pub fn format(&mut self, value: f64) -> Option<String> {
        let word = self.format.word(value);
        if !self.force && self.last.as_deref() == Some(word.as_str()) {
            return None;
        }
        self.last = Some(word.clone());
        Some(word)
    }

    /// Format an optional value; `None` in gives `None` out
    pub fn format_opt(&mut self, value: Option<f64>) -> Option<String> {
        value.and_then(|v| self.format(v))
    }

    /// Forget the last value
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// The last emitted word, if known
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

/// Word that never suppresses, used for arc center offsets
#[derive(Debug, Clone)]
pub struct ReferenceChannel {
    format: NumberFormat,
}

impl ReferenceChannel {
    /// Create a reference channel
    pub fn new(format: NumberFormat) -> Self {
        Self { format }
    }

    /// Format `value`
    pub fn format(&self, value: f64) -> String {
        self.format.word(value)
    }
}

/// Optional N-word block numbering
#[derive(Debug, Clone)]
pub struct SequenceNumbers {
    enabled: bool,
    next: u32,
    increment: u32,
}

impl SequenceNumbers {
    /// Create a counter starting at `start`
    pub fn new(enabled: bool, start: u32, increment: u32) -> Self {
        Self {
            enabled,
            next: start,
            increment,
        }
    }

    /// Disabled numbering
    pub fn disabled() -> Self {
        Self::new(false, 0, 0)
    }

    /// The N word for the next block, advancing the counter
    pub fn advance(&mut self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let word = format!("N{}", self.next);
        self.next = self.next.saturating_add(self.increment);
        Some(word)
    }
}

/// All channels used by the post
#[derive(Debug, Clone)]
pub struct ModalSet {
    pub x: ModalChannel,
    pub y: ModalChannel,
    pub z: ModalChannel,
    pub feed: ModalChannel,
    pub speed: ModalChannel,
    /// Motion mode; Marlin needs a G word on every motion block
    pub motion: ModalChannel,
    pub plane: ModalChannel,
    pub distance: ModalChannel,
    pub units: ModalChannel,
    pub work_offset: ModalChannel,
    pub i: ReferenceChannel,
    pub j: ReferenceChannel,
}

impl ModalSet {
    /// Create the channel set with every value unknown
    pub fn new() -> Self {
        Self {
            x: ModalChannel::new(NumberFormat::coordinate("X")),
            y: ModalChannel::new(NumberFormat::coordinate("Y")),
            z: ModalChannel::new(NumberFormat::coordinate("Z")),
            feed: ModalChannel::new(NumberFormat::feed()),
            speed: ModalChannel::forced(NumberFormat::speed()),
            motion: ModalChannel::forced(NumberFormat::gcode()),
            plane: ModalChannel::new(NumberFormat::gcode()),
            distance: ModalChannel::new(NumberFormat::gcode()),
            units: ModalChannel::new(NumberFormat::gcode()),
            work_offset: ModalChannel::new(NumberFormat::gcode()),
            i: ReferenceChannel::new(NumberFormat::coordinate("I")),
            j: ReferenceChannel::new(NumberFormat::coordinate("J")),
        }
    }

    /// Forget the positional and feed values
    pub fn reset_motion(&mut self) {
        self.x.reset();
        self.y.reset();
        self.z.reset();
        self.feed.reset();
    }
}

impl Default for ModalSet {
    fn default() -> Self {
        Self::new()
    }
}
