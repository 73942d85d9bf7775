//! Output stream of blocks and comments

use crate::format::WordSeparator;
use crate::modal::SequenceNumbers;

/// Comment marker used by Marlin
pub const COMMENT_MARKER: &str = ";";

/// Accumulates the program text, one instruction per line
#[derive(Debug, Clone)]
pub struct BlockWriter {
    separator: WordSeparator,
    sequence: SequenceNumbers,
    output: String,
    blocks: usize,
}

impl BlockWriter {
    /// Create an empty writer
    pub fn new(separator: WordSeparator, sequence: SequenceNumbers) -> Self {
        Self {
            separator,
            sequence,
            output: String::new(),
            blocks: 0,
        }
    }

    /// Write a block from its words; empty words are skipped and a block with
    /// no words is not written at all
    pub fn write_block<S: AsRef<str>>(&mut self, words: &[S]) -> bool {
        let body = self.separator.join(words);
        if body.is_empty() {
            return false;
        }
        match self.sequence.advance() {
            Some(n) => {
                let line = self.separator.join(&[n, body]);
                self.push_line(&line);
            }
            None => self.push_line(&body),
        }
        self.blocks += 1;
        true
    }

    /// Write a block from optional words, e.g. modal channel output
    pub fn write_words(&mut self, words: &[Option<String>]) -> bool {
        let present: Vec<&str> = words.iter().flatten().map(String::as_str).collect();
        self.write_block(&present)
    }

    /// Write a comment line
    pub fn write_comment(&mut self, text: &str) {
        let line = format!("{} {}", COMMENT_MARKER, strip_comment_text(text));
        self.push_line(line.trim_end());
    }

    /// Write an empty separator line
    pub fn write_blank(&mut self) {
        self.output.push('\n');
    }

    /// Write a line verbatim, without numbering
    pub fn write_raw(&mut self, line: &str) {
        self.push_line(line);
    }

    /// Number of blocks written so far, comments excluded
    pub fn block_count(&self) -> usize {
        self.blocks
    }

    /// The program text written so far
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Consume the writer, returning the program text
    pub fn into_output(self) -> String {
        self.output
    }

    fn push_line(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

/// Make free text safe to place on a single comment or message line
///
/// Grouping characters that Marlin would take as nested comments are removed.
/// Line breaks and other control characters become spaces, so the text can
/// never start a new block.
pub fn strip_comment_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}
