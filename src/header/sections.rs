//! Labelled sections inside a header, and carrying their content across a
//! re-render.
//!
//! A section starts at a label line such as `// File History :` and runs until
//! the next label, the next separator, or the end of the header.

use std::cmp::Reverse;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::locator::{comment_text, is_separator};
use crate::interpolate::has_placeholder;

static LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(Description|File History|To-Do List)\s*:\s*$").expect("section label regex must compile")
});

static CREATION_DATE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(?P<prefix>.*?\b(?:First Created|Creation Date|Created)\s*:\s*)(?P<value>\S.*?)\s*$")
    .expect("creation date regex must compile")
});

/// A labelled section whose content survives updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
  Description,
  FileHistory,
  TodoList,
}

impl Section {
  pub const ALL: [Section; 3] = [Section::Description, Section::FileHistory, Section::TodoList];

  /// The label text as written in headers.
  pub const fn label(self) -> &'static str {
    match self {
      Section::Description => "Description",
      Section::FileHistory => "File History",
      Section::TodoList => "To-Do List",
    }
  }

  fn from_label(label: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|section| section.label() == label)
  }
}

impl fmt::Display for Section {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

/// The section `line` labels, if it is a label line.
pub fn section_label(line: &str, comment: &str) -> Option<Section> {
  LABEL_REGEX
    .captures(comment_text(line, comment))
    .and_then(|caps| Section::from_label(&caps[1]))
}

/// Index of the first line labelling `section`.
pub fn find_label(lines: &[String], comment: &str, section: Section) -> Option<usize> {
  lines
    .iter()
    .position(|line| section_label(line, comment) == Some(section))
}

/// The body of `section`: the lines after its label up to the next label or
/// separator.
pub fn section_body(lines: &[String], comment: &str, section: Section) -> Option<Range<usize>> {
  let label = find_label(lines, comment, section)?;
  let start = label + 1;
  let end = lines[start..]
    .iter()
    .position(|line| section_label(line, comment).is_some() || is_separator(line, comment))
    .map_or(lines.len(), |offset| start + offset);
  Some(start..end)
}

/// Whether `line` holds nothing but the comment token.
pub fn is_blank(line: &str, comment: &str) -> bool {
  comment_text(line, comment).is_empty()
}

/// Whether `line` is an empty bullet such as `o` or `*`.
fn is_bare_bullet(line: &str, comment: &str) -> bool {
  matches!(comment_text(line, comment), "o" | "*" | "-")
}

/// Whether `line` is scaffolding left by a template rather than user text: it
/// still contains a `${...}` placeholder or one of the sentinel strings.
pub fn is_placeholder(line: &str, sentinels: &[String]) -> bool {
  has_placeholder(line)
    || sentinels
      .iter()
      .map(|sentinel| sentinel.trim())
      .any(|sentinel| !sentinel.is_empty() && line.contains(sentinel))
}

/// User-written content captured from an existing header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
  pub description: Vec<String>,
  pub file_history: Vec<String>,
  pub todo_list: Vec<String>,
  /// The value of the creation date field
  pub creation_date: Option<String>,
}

impl ExtractedContent {
  /// Capture section content and the creation date from `header` lines.
  ///
  /// Placeholder lines are dropped and blank lines at either end of a section
  /// are trimmed; blank lines between content are kept. A missing or
  /// unparseable section extracts as empty.
  pub fn extract(header: &[String], comment: &str, sentinels: &[String]) -> Self {
    let capture = |section: Section| -> Vec<String> {
      let Some(range) = section_body(header, comment, section) else {
        return Vec::new();
      };
      let kept: Vec<&String> = header[range]
        .iter()
        .filter(|line| !is_placeholder(line, sentinels))
        .collect();
      let first = kept.iter().position(|line| !is_blank(line, comment));
      let last = kept.iter().rposition(|line| !is_blank(line, comment));
      match (first, last) {
        (Some(first), Some(last)) => kept[first..=last].iter().map(|line| (*line).clone()).collect(),
        _ => Vec::new(),
      }
    };

    let creation_date = header
      .iter()
      .filter_map(|line| CREATION_DATE_REGEX.captures(line))
      .map(|caps| caps["value"].to_string())
      .find(|value| !is_placeholder(value, sentinels));

    Self {
      description: capture(Section::Description),
      file_history: capture(Section::FileHistory),
      todo_list: capture(Section::TodoList),
      creation_date,
    }
  }

  pub fn section(&self, section: Section) -> &[String] {
    match section {
      Section::Description => &self.description,
      Section::FileHistory => &self.file_history,
      Section::TodoList => &self.todo_list,
    }
  }

  /// Whether `section` holds anything beyond blanks and empty bullets.
  pub fn has_content(&self, section: Section, comment: &str) -> bool {
    self
      .section(section)
      .iter()
      .any(|line| !is_blank(line, comment) && !is_bare_bullet(line, comment))
  }

  /// Splice this content into a freshly rendered header.
  ///
  /// Each section with content replaces the fresh body between its leading
  /// and trailing blank lines. Sections without content keep the fresh
  /// scaffolding. Everything outside the sections comes from `fresh`, except
  /// the creation date, which keeps its old value.
  pub fn merge_into(&self, fresh: &[String], comment: &str) -> Vec<String> {
    let mut merged = fresh.to_vec();

    let mut spans: Vec<(Range<usize>, Section)> = Section::ALL
      .into_iter()
      .filter(|section| self.has_content(*section, comment))
      .filter_map(|section| section_body(&merged, comment, section).map(|range| (range, section)))
      .collect();
    // Splice bottom-up so earlier ranges stay valid
    spans.sort_by_key(|(range, _)| Reverse(range.start));

    for (range, section) in spans {
      let body = &merged[range.clone()];
      let leading = body.iter().take_while(|line| is_blank(line, comment)).count();
      let trailing = body[leading..]
        .iter()
        .rev()
        .take_while(|line| is_blank(line, comment))
        .count();

      let mut replacement = body[..leading].to_vec();
      replacement.extend_from_slice(self.section(section));
      replacement.extend_from_slice(&body[body.len() - trailing..]);
      merged.splice(range, replacement);
    }

    if let Some(date) = &self.creation_date
      && let Some(line) = merged.iter_mut().find(|line| CREATION_DATE_REGEX.is_match(line))
    {
      *line = CREATION_DATE_REGEX
        .replace(line, |caps: &regex::Captures| format!("{}{}", &caps["prefix"], date))
        .into_owned();
    }

    merged
  }
}
