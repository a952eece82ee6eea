//! Save-time refresh of the volatile header fields.
//!
//! Only the value after the field label is rewritten; the label, its
//! alignment and every other line are left alone.

use std::sync::LazyLock;

use regex::Regex;

use super::locator::{HeaderBounds, comment_text, is_comment_line};
use crate::config::HeaderConfig;
use crate::document::Document;
use crate::variables::TemplateVariables;

/// Lines searched by [`collapse_repeated_labels`].
pub const LABEL_REPAIR_WINDOW: usize = 50;

static UPDATED_LABEL_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(?:Last\s+)*Updated\s*:").expect("updated label regex must compile"));

static UPDATED_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<head>.*?\bUpdated\s*:[ \t]*)(?P<value>.*?)\s*$").expect("updated value regex must compile")
});

static EDITOR_LABEL_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^Editor\s*:").expect("editor label regex must compile"));

static EDITOR_VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<head>.*?\bEditor\s*:[ \t]*)(?P<value>.*?)\s*$").expect("editor value regex must compile")
});

static REPEATED_LAST_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\bLast\s+(?:Last\s+)+Updated\b").expect("repeated label regex must compile"));

/// A header field refreshed on save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
  /// `Last Updated : <timestamp> (by <user>)`
  LastModified,
  /// `Editor : <editor>, <space|tab> size (<n>)`
  EditorInfo,
}

impl HeaderField {
  pub const ALL: [HeaderField; 2] = [HeaderField::LastModified, HeaderField::EditorInfo];

  /// Whether the configuration enables refreshing this field.
  pub const fn is_enabled(self, config: &HeaderConfig) -> bool {
    match self {
      HeaderField::LastModified => config.auto_update_last_modified,
      HeaderField::EditorInfo => config.auto_update_editor,
    }
  }

  /// Whether `line` carries this field.
  fn matches(self, line: &str, comment: &str) -> bool {
    if !is_comment_line(line, comment) {
      return false;
    }
    let text = comment_text(line, comment);
    match self {
      HeaderField::LastModified => UPDATED_LABEL_REGEX.is_match(text),
      HeaderField::EditorInfo => EDITOR_LABEL_REGEX.is_match(text),
    }
  }

  fn value_regex(self) -> &'static Regex {
    match self {
      HeaderField::LastModified => &UPDATED_VALUE_REGEX,
      HeaderField::EditorInfo => &EDITOR_VALUE_REGEX,
    }
  }

  /// The fresh value of this field.
  pub fn value(self, variables: &TemplateVariables) -> String {
    match self {
      HeaderField::LastModified => format!(
        "{} (by {})",
        variables.get("lastModifiedDate").unwrap_or_default(),
        variables.get("lastModifiedUser").unwrap_or_default()
      ),
      HeaderField::EditorInfo => variables.get("editorInfo").unwrap_or_default().to_string(),
    }
  }

  /// `line` with its value replaced, if it carries this field.
  pub fn rewrite(self, line: &str, comment: &str, value: &str) -> Option<String> {
    if !self.matches(line, comment) {
      return None;
    }
    let caps = self.value_regex().captures(line)?;
    Some(format!("{}{}", &caps["head"], value))
  }
}

/// One replaced line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
  pub line: usize,
  pub text: String,
}

impl LineChange {
  pub fn apply(&self, document: &mut Document) {
    document.set_line(self.line, self.text.clone());
  }
}

/// Rewrite the enabled fields inside `bounds`. Only lines whose text actually
/// changes are returned.
pub fn refresh_fields(
  lines: &[String],
  bounds: HeaderBounds,
  comment: &str,
  fields: &[(HeaderField, String)],
) -> Vec<LineChange> {
  lines
    .iter()
    .enumerate()
    .take(bounds.end + 1)
    .skip(bounds.start)
    .filter_map(|(index, line)| {
      fields
        .iter()
        .find_map(|(field, value)| field.rewrite(line, comment, value))
        .filter(|text| text != line)
        .map(|text| LineChange { line: index, text })
    })
    .collect()
}

/// Collapse `Last Last ... Updated` into `Last Updated` within the first
/// [`LABEL_REPAIR_WINDOW`] lines.
pub fn collapse_repeated_labels(lines: &[String]) -> Vec<LineChange> {
  lines
    .iter()
    .enumerate()
    .take(LABEL_REPAIR_WINDOW)
    .filter(|(_, line)| REPEATED_LAST_REGEX.is_match(line))
    .map(|(index, line)| LineChange {
      line: index,
      text: REPEATED_LAST_REGEX.replace_all(line, "Last Updated").into_owned(),
    })
    .collect()
}
