//! Locating an existing header block by its separator lines.
//!
//! All line-shape patterns shared by the header modules live here, so "is this
//! a rule", "is this a comment" and "strip the comment token" mean the same
//! thing everywhere.

use std::sync::LazyLock;

use regex::Regex;

/// Lines searched for the opening separator.
pub const OPENING_WINDOW: usize = 10;

/// Lines after the opening separator searched for the closing one.
pub const CLOSING_WINDOW: usize = 50;

/// Span assumed when no closing separator is found.
pub const FALLBACK_SPAN: usize = 30;

/// Lines searched by the [`has_header`] fast path.
pub const DUPLICATE_GUARD_WINDOW: usize = 20;

/// Minimum rule length for either separator form.
const MIN_RULE_LEN: usize = 4;

static DECORATIVE_RULE_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[/*#%\-+=]{4,}[\-+=\s]*$").expect("separator regex must compile"));

/// Inclusive, 0-based line range of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderBounds {
  pub start: usize,
  pub end: usize,
}

impl HeaderBounds {
  pub const fn line_count(&self) -> usize {
    self.end - self.start + 1
  }

  pub const fn contains(&self, line: usize) -> bool {
    self.start <= line && line <= self.end
  }
}

/// Whether `line` is a separator.
///
/// A separator is either a decorative rule of `/*#%-+=` characters, or the
/// comment token followed directly by a run of one punctuation character.
pub fn is_separator(line: &str, comment: &str) -> bool {
  let trimmed = line.trim();
  DECORATIVE_RULE_REGEX.is_match(trimmed) || is_comment_rule(trimmed, comment)
}

fn is_comment_rule(trimmed: &str, comment: &str) -> bool {
  if comment.is_empty() {
    return false;
  }
  let Some(rule) = trimmed.strip_prefix(comment) else {
    return false;
  };
  let mut chars = rule.chars();
  match chars.next() {
    Some(first) if first.is_ascii_punctuation() => {
      chars.all(|c| c == first) && rule.chars().count() >= MIN_RULE_LEN
    }
    _ => false,
  }
}

/// Whether `line` begins with the comment token, ignoring indentation.
pub fn is_comment_line(line: &str, comment: &str) -> bool {
  !comment.is_empty() && line.trim_start().starts_with(comment)
}

/// The text of a line with indentation, the comment token and surrounding
/// whitespace removed.
pub fn comment_text<'a>(line: &'a str, comment: &str) -> &'a str {
  let trimmed = line.trim();
  if comment.is_empty() {
    return trimmed;
  }
  trimmed.strip_prefix(comment).unwrap_or(trimmed).trim()
}

/// Find the header's line range.
///
/// The opening separator must be within the first [`OPENING_WINDOW`] lines.
/// A header is one continuous comment block: the closing separator is the
/// last separator found within [`CLOSING_WINDOW`] lines of the opening one
/// before a blank or uncommented line ends the block. Without one, the range
/// ends [`FALLBACK_SPAN`] lines after the opening separator, or at the end of
/// the document; see [`is_comment_block`] before editing such a range.
pub fn find_bounds(lines: &[String], comment: &str) -> Option<HeaderBounds> {
  let start = lines
    .iter()
    .take(OPENING_WINDOW)
    .position(|line| is_separator(line, comment))?;

  let last = lines.len() - 1;
  let limit = (start + CLOSING_WINDOW).min(last);
  let mut end = None;

  for (index, line) in lines.iter().enumerate().take(limit + 1).skip(start + 1) {
    if is_separator(line, comment) {
      end = Some(index);
    } else if !is_comment_line(line, comment) {
      break;
    }
  }

  let end = end.unwrap_or_else(|| (start + FALLBACK_SPAN).min(last));
  Some(HeaderBounds { start, end })
}

/// Whether every line in `bounds` is a comment or a separator, so replacing
/// the range can't touch code.
pub fn is_comment_block(lines: &[String], bounds: HeaderBounds, comment: &str) -> bool {
  lines
    .get(bounds.start..=bounds.end)
    .is_some_and(|block| block.iter().all(|line| is_separator(line, comment) || is_comment_line(line, comment)))
}

/// Whether a separator carrying the comment token appears in the first
/// [`DUPLICATE_GUARD_WINDOW`] lines.
pub fn has_header(lines: &[String], comment: &str) -> bool {
  lines
    .iter()
    .take(DUPLICATE_GUARD_WINDOW)
    .any(|line| is_comment_line(line, comment) && is_separator(line, comment))
}
