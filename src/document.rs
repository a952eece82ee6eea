//! # Document Module
//!
//! A line-array view of a document's text. The document remembers whether it
//! used `\r\n` or `\n` and whether its last line was terminated, so text
//! written back keeps the conventions it was read with.

use std::ops::RangeInclusive;

/// Line terminator used by a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
  #[default]
  Lf,
  CrLf,
}

impl LineEnding {
  pub const fn as_str(self) -> &'static str {
    match self {
      LineEnding::Lf => "\n",
      LineEnding::CrLf => "\r\n",
    }
  }
}

/// The lines of a document, without terminators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
  lines: Vec<String>,
  line_ending: LineEnding,
  trailing_newline: bool,
}

impl Document {
  /// Split `text` into lines.
  ///
  /// The line ending is `\r\n` when the first terminator found is `\r\n`. An
  /// empty text counts as terminated, so content inserted into it ends with a
  /// newline.
  pub fn parse(text: &str) -> Self {
    let line_ending = match text.find('\n') {
      Some(index) if text[..index].ends_with('\r') => LineEnding::CrLf,
      _ => LineEnding::Lf,
    };

    let trailing_newline = text.is_empty() || text.ends_with('\n');
    let body = text.strip_suffix('\n').unwrap_or(text);
    let lines = if text.is_empty() {
      Vec::new()
    } else {
      body
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
    };

    Self {
      lines,
      line_ending,
      trailing_newline,
    }
  }

  /// A terminated `\n` document from `lines`.
  pub fn from_lines<I, S>(lines: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      lines: lines.into_iter().map(Into::into).collect(),
      line_ending: LineEnding::Lf,
      trailing_newline: true,
    }
  }

  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  pub fn len(&self) -> usize {
    self.lines.len()
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  pub const fn line_ending(&self) -> LineEnding {
    self.line_ending
  }

  /// Insert `new_lines` before line `at` (clamped to the end).
  pub fn insert_lines(&mut self, at: usize, new_lines: Vec<String>) {
    let at = at.min(self.lines.len());
    self.lines.splice(at..at, new_lines);
  }

  /// Replace the inclusive `range` of lines with `replacement`. The range is
  /// clamped to the document.
  pub fn replace_lines(&mut self, range: RangeInclusive<usize>, replacement: Vec<String>) {
    let len = self.lines.len();
    let start = (*range.start()).min(len);
    let end = range.end().saturating_add(1).clamp(start, len);
    self.lines.splice(start..end, replacement);
  }

  /// Replace a single line, ignoring out-of-range indices.
  pub fn set_line(&mut self, index: usize, line: String) {
    if let Some(slot) = self.lines.get_mut(index) {
      *slot = line;
    }
  }

  /// Join the lines back into text with the original conventions.
  pub fn to_text(&self) -> String {
    let newline = self.line_ending.as_str();
    let mut text = self.lines.join(newline);
    if self.trailing_newline && !self.lines.is_empty() {
      text.push_str(newline);
    }
    text
  }
}
