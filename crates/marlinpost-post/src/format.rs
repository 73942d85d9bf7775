//! Number formatting for G-code words
//!
//! Every word the post writes is a letter prefix plus a number rendered with
//! a fixed precision. [`NumberFormat`] captures one such convention.

use std::f64::consts::PI;

/// How a value is rendered into a word
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    /// Word letter(s), e.g. `X` or `G`
    pub prefix: &'static str,
    /// Digits after the decimal point
    pub decimals: usize,
    /// Append a decimal point even when `decimals` is zero
    pub force_decimal: bool,
    /// Factor applied before rounding
    pub scale: f64,
}

impl NumberFormat {
    /// Create a format with unit scale and no forced decimal point
    pub const fn new(prefix: &'static str, decimals: usize) -> Self {
        Self {
            prefix,
            decimals,
            force_decimal: false,
            scale: 1.0,
        }
    }

    /// Always write a decimal point
    pub const fn with_forced_decimal(mut self) -> Self {
        self.force_decimal = true;
        self
    }

    /// Multiply values by `scale` before formatting
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Coordinates: 3 decimals
    pub const fn coordinate(prefix: &'static str) -> Self {
        Self::new(prefix, 3)
    }

    /// Feed rate: whole mm/min
    pub const fn feed() -> Self {
        Self::new("F", 0)
    }

    /// Spindle speed: whole RPM
    pub const fn speed() -> Self {
        Self::new("S", 0)
    }

    /// Dwell time: seconds with 3 decimals and a forced decimal point
    pub const fn seconds() -> Self {
        Self::new("S", 3).with_forced_decimal()
    }

    /// Tool number
    pub const fn tool() -> Self {
        Self::new("T", 0)
    }

    /// Modal G code
    pub const fn gcode() -> Self {
        Self::new("G", 0)
    }

    /// Taper angle: radians in, degrees with 1 decimal out
    pub const fn taper() -> Self {
        Self::new("", 1).with_scale(180.0 / PI)
    }

    /// Render the number without the prefix
    pub fn number(&self, value: f64) -> String {
        let scaled = value * self.scale;
        let mut text = format!("{:.*}", self.decimals, scaled);
        // "-0.000" renders as "0.000"
        if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
            text.remove(0);
        }
        if self.force_decimal && !text.contains('.') {
            text.push('.');
        }
        text
    }

    /// Render the full word, prefix included
    pub fn word(&self, value: f64) -> String {
        format!("{}{}", self.prefix, self.number(value))
    }
}

/// Joins words into a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSeparator {
    separate: bool,
}

impl WordSeparator {
    /// Create a separator; `separate` inserts a space between words
    pub fn new(separate: bool) -> Self {
        Self { separate }
    }

    /// The text placed between two words
    pub fn as_str(&self) -> &'static str {
        if self.separate {
            " "
        } else {
            ""
        }
    }

    /// Join the words, skipping empty ones
    pub fn join<S: AsRef<str>>(&self, words: &[S]) -> String {
        words
            .iter()
            .map(|w| w.as_ref())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(self.as_str())
    }
}

impl Default for WordSeparator {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_format() {
        let x = NumberFormat::coordinate("X");
        assert_eq!(x.word(10.0), "X10.000");
        assert_eq!(x.word(-2.5), "X-2.500");
        assert_eq!(x.word(1.23456), "X1.235");
    }

    #[test]
    fn test_negative_zero_is_normalized() {
        let x = NumberFormat::coordinate("X");
        assert_eq!(x.word(-0.0001), "X0.000");
        assert_eq!(NumberFormat::feed().word(-0.2), "F0");
    }

    #[test]
    fn test_feed_and_speed_have_no_decimals() {
        assert_eq!(NumberFormat::feed().word(2500.0), "F2500");
        assert_eq!(NumberFormat::feed().word(812.6), "F813");
        assert_eq!(NumberFormat::speed().word(12000.0), "S12000");
        assert_eq!(NumberFormat::gcode().word(1.0), "G1");
    }

    #[test]
    fn test_seconds_force_decimal() {
        assert_eq!(NumberFormat::seconds().word(1.5), "S1.500");
        let whole = NumberFormat::new("P", 0).with_forced_decimal();
        assert_eq!(whole.word(2.0), "P2.");
    }

    #[test]
    fn test_taper_converts_to_degrees() {
        assert_eq!(NumberFormat::taper().number(PI / 4.0), "45.0");
        assert_eq!(NumberFormat::taper().number(0.0), "0.0");
    }

    #[test]
    fn test_word_separator() {
        let words = ["G1", "", "X1.000", "F100"];
        assert_eq!(WordSeparator::new(true).join(&words), "G1 X1.000 F100");
        assert_eq!(WordSeparator::new(false).join(&words), "G1X1.000F100");
    }
}
