//! Version-history and to-do entries: finding the existing ones, computing the
//! next number, and placing the new line.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::Notice;
use super::locator::{comment_text, is_comment_line, is_separator};
use super::sections::{Section, find_label};
use crate::document::Document;
use crate::interpolate::{VersionFields, VersionNumber};

static VERSION_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\(v?(\d+)(?:\.(\d+))?(?:[.p](\d+))?,").expect("version entry regex must compile"));

static TODO_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\(ToDo#(\d+),").expect("todo entry regex must compile"));

/// Which list an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
  Version,
  Todo,
}

impl EntryKind {
  pub const fn section(self) -> Section {
    match self {
      EntryKind::Version => Section::FileHistory,
      EntryKind::Todo => Section::TodoList,
    }
  }
}

/// Parse the `(v01p02,` signature of a history entry.
pub fn parse_version(line: &str) -> Option<VersionNumber> {
  let caps = VERSION_REGEX.captures(line)?;
  let number = |index: usize| -> Option<u32> {
    match caps.get(index) {
      Some(m) => m.as_str().parse().ok(),
      None => Some(0),
    }
  };
  Some(VersionNumber::new(number(1)?, number(2)?, number(3)?))
}

/// Parse the `(ToDo#03,` signature of a to-do entry.
pub fn parse_todo_index(line: &str) -> Option<u32> {
  TODO_REGEX.captures(line)?.get(1)?.as_str().parse().ok()
}

/// Where the entries of one section are, and what they contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryScan {
  /// The label line, if the section exists
  pub label: Option<usize>,
  /// The last bulleted line following the label
  pub last_entry: Option<usize>,
  pub versions: Vec<VersionNumber>,
  pub todo_indices: Vec<u32>,
}

impl EntryScan {
  /// Scan the bulleted lines following the label of `kind`'s section.
  ///
  /// Lines whose signature does not parse are skipped; they still count as
  /// entries for placement.
  pub fn scan(lines: &[String], comment: &str, kind: EntryKind) -> Self {
    let mut scan = Self {
      label: find_label(lines, comment, kind.section()),
      last_entry: None,
      versions: Vec::new(),
      todo_indices: Vec::new(),
    };

    let Some(label) = scan.label else {
      return scan;
    };

    for (index, line) in lines.iter().enumerate().skip(label + 1) {
      if !is_comment_line(line, comment)
        || is_separator(line, comment)
        || !comment_text(line, comment).starts_with('*')
      {
        break;
      }
      scan.last_entry = Some(index);
      match kind {
        EntryKind::Version => scan.versions.extend(parse_version(line)),
        EntryKind::Todo => scan.todo_indices.extend(parse_todo_index(line)),
      }
    }

    trace!(?kind, label, last_entry = ?scan.last_entry, "scanned entries");
    scan
  }

  /// The highest version with its patch incremented, or `1.0.0`.
  pub fn next_version(&self) -> VersionNumber {
    self.next_version_for(VersionFields::ALL)
  }

  /// The next version for a format rendering only `fields`.
  ///
  /// Existing versions are compared on the rendered fields alone, so an entry
  /// written in one format and read back keeps the numbering increasing.
  pub fn next_version_for(&self, fields: VersionFields) -> VersionNumber {
    self
      .versions
      .iter()
      .map(|version| version.masked(fields))
      .max()
      .map(|max| max.bump(fields))
      .unwrap_or_default()
  }

  /// One more than the highest to-do index, or 0.
  pub fn next_todo_index(&self) -> u32 {
    self.todo_indices.iter().max().map_or(0, |max| max.saturating_add(1))
  }

  /// Line index for a new entry and the notice to surface, if any.
  pub fn insertion_point(&self, kind: EntryKind) -> (usize, Option<Notice>) {
    match (self.last_entry, self.label) {
      (Some(last), _) => (last + 1, None),
      (None, Some(label)) => (label + 1, None),
      (None, None) => (0, Some(Notice::SectionNotFound(kind.section()))),
    }
  }
}

/// A rendered entry and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInsertion {
  pub kind: EntryKind,
  /// Line index the entry is inserted before
  pub line: usize,
  pub text: String,
  pub notice: Option<Notice>,
}

impl EntryInsertion {
  pub fn apply(&self, document: &mut Document) {
    document.insert_lines(self.line, vec![self.text.clone()]);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
  }

  #[test]
  fn test_parse_version_variants() {
    assert_eq!(parse_version("* 2024/01/01 : (v01p02,  kim) x"), Some(VersionNumber::new(1, 0, 2)));
    assert_eq!(parse_version("(v01.03, kim)"), Some(VersionNumber::new(1, 3, 0)));
    assert_eq!(parse_version("(2.5.11, kim)"), Some(VersionNumber::new(2, 5, 11)));
    assert_eq!(parse_version("(v3, kim)"), Some(VersionNumber::new(3, 0, 0)));
    assert_eq!(parse_version("(ToDo#01, kim)"), None);
    assert_eq!(parse_version("no signature"), None);
    assert_eq!(parse_version("(v99999999999p01, kim)"), None);
  }

  #[test]
  fn test_parse_todo_index() {
    assert_eq!(parse_todo_index("* 2024/01/01 : (ToDo#03, kim) x"), Some(3));
    assert_eq!(parse_todo_index("(v01p00, kim)"), None);
  }

  #[test]
  fn test_scan_history_and_next_version() {
    let doc = lines(
      "// File History :\n//      * 2024/01/01 : (v01p00,  a) First\n//      * 2024/02/01 : (v01p02,  a) Second\n// To-Do List   :\n",
    );
    let scan = EntryScan::scan(&doc, "//", EntryKind::Version);

    assert_eq!(scan.label, Some(0));
    assert_eq!(scan.last_entry, Some(2));
    assert_eq!(scan.next_version(), VersionNumber::new(1, 0, 3));
    assert_eq!(scan.insertion_point(EntryKind::Version), (3, None));
  }

  #[test]
  fn test_major_dominates_when_picking_max() {
    let doc = lines("# File History :\n#  * (v02p00, a)\n#  * (v01p07, a)\n");
    let scan = EntryScan::scan(&doc, "#", EntryKind::Version);
    assert_eq!(scan.next_version(), VersionNumber::new(2, 0, 1));
  }

  #[test]
  fn test_dotted_minor_is_ignored_by_patch_only_format() {
    let fields = VersionFields::of("v{major:02d}p{patch:02d}");
    let doc = lines("# File History :\n#  * (v01.03, a)\n#  * (v01p01, a)\n");
    let scan = EntryScan::scan(&doc, "#", EntryKind::Version);

    assert_eq!(scan.next_version(), VersionNumber::new(1, 3, 1));
    assert_eq!(scan.next_version_for(fields), VersionNumber::new(1, 0, 2));
  }

  #[test]
  fn test_unparseable_entries_are_skipped() {
    let doc = lines("// To-Do List   :\n//  * (ToDo#00, a)\n//  * garbage\n//  * (ToDo#03, a)\n");
    let scan = EntryScan::scan(&doc, "//", EntryKind::Todo);
    assert_eq!(scan.todo_indices, vec![0, 3]);
    assert_eq!(scan.next_todo_index(), 4);
    assert_eq!(scan.last_entry, Some(3));
  }

  #[test]
  fn test_empty_section_defaults() {
    let doc = lines("// File History :\n// To-Do List   :\n//----------\n");
    let history = EntryScan::scan(&doc, "//", EntryKind::Version);
    assert_eq!(history.next_version(), VersionNumber::new(1, 0, 0));
    assert_eq!(history.insertion_point(EntryKind::Version), (1, None));

    let todo = EntryScan::scan(&doc, "//", EntryKind::Todo);
    assert_eq!(todo.next_todo_index(), 0);
    assert_eq!(todo.insertion_point(EntryKind::Todo), (2, None));
  }

  #[test]
  fn test_star_rule_is_not_an_entry() {
    let doc = lines("// To-Do List   :\n//  * (ToDo#01, a)\n//**********\n");
    let scan = EntryScan::scan(&doc, "//", EntryKind::Todo);
    assert_eq!(scan.last_entry, Some(1));
  }

  #[test]
  fn test_missing_section_inserts_at_top_with_notice() {
    let scan = EntryScan::scan(&lines("fn main() {}\n"), "//", EntryKind::Todo);
    assert_eq!(
      scan.insertion_point(EntryKind::Todo),
      (0, Some(Notice::SectionNotFound(Section::TodoList)))
    );
  }
}
