//! # Header Module
//!
//! Text surgery on a document's header block: fresh insertion, update with
//! content preservation, version and to-do entries, and the save-time
//! refresh of volatile fields.
//!
//! Every operation reads a [`Document`] and returns a description of the edit
//! ([`HeaderOutcome`], [`EntryInsertion`] or a list of [`LineChange`]s) for the
//! caller to apply. Nothing here fails on malformed input; unexpected shapes
//! degrade to a [`Notice`].

pub mod entries;
pub mod locator;
pub mod refresh;
pub mod sections;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

pub use self::entries::{EntryInsertion, EntryKind, EntryScan};
pub use self::locator::{HeaderBounds, find_bounds, has_header, is_comment_block, is_separator};
pub use self::refresh::{HeaderField, LineChange, collapse_repeated_labels};
pub use self::sections::{ExtractedContent, Section};
use crate::config::HeaderConfig;
use crate::datetime::DateTimeFormatter;
use crate::document::Document;
use crate::interpolate::{VersionFields, format_version, interpolate};
use crate::templates::TemplateCatalog;
use crate::variables::{FileContext, TemplateVariables, VariableResolver};

/// First lines that must stay first when a header is inserted, compared
/// against the lowercased line.
const PINNED_PREFIXES: &[&str] = &[
  "#!",                       // shebang
  "<?xml",                    // XML declaration
  "<!doctype",                // HTML doctype
  "# encoding:",              // Ruby encoding
  "# frozen_string_literal:", // Ruby interpreter instruction
  "<?php",                    // PHP opening tag
  "# escape",                 // Dockerfile directive
  "# syntax",                 // Dockerfile directive
];

/// A fallback condition for the caller to surface to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
  /// Insertion skipped because a header is already there
  HeaderAlreadyPresent,
  /// No header to update; one was inserted or nothing was done
  HeaderNotFound,
  /// The labelled section is missing; the entry goes at the top
  SectionNotFound(Section),
  /// The rendered header has no separator the locator would find again
  UnlocatableTemplate,
  /// The header has no closing separator, so its extent is a guess
  UnterminatedHeader,
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Notice::HeaderAlreadyPresent => write!(f, "File already has a header"),
      Notice::HeaderNotFound => write!(f, "No existing header found"),
      Notice::SectionNotFound(section) => write!(f, "'{section}' section not found; inserting at top of file"),
      Notice::UnlocatableTemplate => write!(f, "Header template has no separator line; refusing to insert"),
      Notice::UnterminatedHeader => write!(f, "Header has no closing separator; leaving it unchanged"),
    }
  }
}

/// The edit produced by a header insertion or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderOutcome {
  /// Insert `lines` before line `line`
  Inserted {
    line: usize,
    lines: Vec<String>,
    notice: Option<Notice>,
  },
  /// Replace the lines in `bounds` with `lines`
  Updated { bounds: HeaderBounds, lines: Vec<String> },
  /// Nothing to do
  Skipped(Notice),
}

impl HeaderOutcome {
  /// Apply the edit to `document`.
  pub fn apply(&self, document: &mut Document) {
    match self {
      HeaderOutcome::Inserted { line, lines, .. } => document.insert_lines(*line, lines.clone()),
      HeaderOutcome::Updated { bounds, lines } => document.replace_lines(bounds.start..=bounds.end, lines.clone()),
      HeaderOutcome::Skipped(_) => {}
    }
  }

  pub const fn notice(&self) -> Option<Notice> {
    match self {
      HeaderOutcome::Inserted { notice, .. } => *notice,
      HeaderOutcome::Updated { .. } => None,
      HeaderOutcome::Skipped(notice) => Some(*notice),
    }
  }

  pub const fn is_change(&self) -> bool {
    !matches!(self, HeaderOutcome::Skipped(_))
  }
}

/// Renders headers and computes edits against documents.
///
/// Holds the template catalog and the variable resolver; every per-document
/// call takes the file context and a configuration snapshot.
#[derive(Debug, Clone)]
pub struct HeaderEngine {
  catalog: Arc<TemplateCatalog>,
  resolver: VariableResolver,
}

impl HeaderEngine {
  pub fn new(catalog: Arc<TemplateCatalog>) -> Self {
    Self::with_formatter(catalog, DateTimeFormatter::new())
  }

  /// An engine whose dates come from `formatter`.
  pub const fn with_formatter(catalog: Arc<TemplateCatalog>, formatter: DateTimeFormatter) -> Self {
    Self {
      catalog,
      resolver: VariableResolver::new(formatter),
    }
  }

  pub fn catalog(&self) -> &TemplateCatalog {
    &self.catalog
  }

  /// The variables for one render, in the configured time zone.
  pub fn variables(&self, context: &FileContext, config: &HeaderConfig) -> TemplateVariables {
    self.resolver.resolve(context, config, config.time_zone.as_deref())
  }

  /// The header body for the configured style, interpolated.
  pub fn render_header(&self, context: &FileContext, config: &HeaderConfig) -> Vec<String> {
    let variables = self.variables(context, config);
    self.render_with(&variables, config)
  }

  fn render_with(&self, variables: &TemplateVariables, config: &HeaderConfig) -> Vec<String> {
    self
      .catalog
      .header_body(config.header_style)
      .iter()
      .map(|line| interpolate(line, variables))
      .collect()
  }

  /// Whether `document` already carries a header.
  pub fn has_header(&self, document: &Document, context: &FileContext, config: &HeaderConfig) -> bool {
    has_header(document.lines(), &comment_of(&self.variables(context, config)))
  }

  /// The bounds of the existing header, if any.
  pub fn locate(&self, document: &Document, context: &FileContext, config: &HeaderConfig) -> Option<HeaderBounds> {
    let comment = comment_of(&self.variables(context, config));
    locate_in(document.lines(), &comment)
  }

  /// Insert a fresh header.
  ///
  /// Skipped when a header is already present. A pinned first line (shebang,
  /// XML declaration and the like) stays above the header; otherwise the
  /// configured shebang for the language, if any, is emitted first.
  pub fn insert_header(&self, document: &Document, context: &FileContext, config: &HeaderConfig) -> HeaderOutcome {
    let variables = self.variables(context, config);
    let comment = comment_of(&variables);
    let lines = document.lines();

    if has_header(lines, &comment) {
      debug!(path = %context.full_path, "header already present");
      return HeaderOutcome::Skipped(Notice::HeaderAlreadyPresent);
    }

    let header = self.render_with(&variables, config);
    if !header
      .iter()
      .any(|line| locator::is_comment_line(line, &comment) && is_separator(line, &comment))
    {
      return HeaderOutcome::Skipped(Notice::UnlocatableTemplate);
    }

    let mut block = Vec::with_capacity(header.len() + 2);
    let line = match lines.first() {
      Some(first) if is_pinned_prefix(first) => {
        block.push(String::new());
        1
      }
      _ => {
        if let Some(interpreter) = config
          .shebang_per_language
          .get(&context.language_id)
          .filter(|interpreter| !interpreter.trim().is_empty())
        {
          block.push(format!("#!{}", interpreter.trim()));
        }
        0
      }
    };

    block.extend(header);
    if lines.get(line).is_some_and(|next| !next.trim().is_empty()) {
      block.push(String::new());
    }

    trace!(line, count = block.len(), "inserting header");
    HeaderOutcome::Inserted {
      line,
      lines: block,
      notice: None,
    }
  }

  /// Re-render the existing header, keeping its description, history, to-do
  /// list and creation date.
  ///
  /// A document without a header gets a fresh one, with
  /// [`Notice::HeaderNotFound`] attached. A header whose closing separator
  /// can't be found is left alone.
  pub fn update_header(&self, document: &Document, context: &FileContext, config: &HeaderConfig) -> HeaderOutcome {
    let variables = self.variables(context, config);
    let comment = comment_of(&variables);
    let lines = document.lines();

    if !has_header(lines, &comment) {
      return match self.insert_header(document, context, config) {
        HeaderOutcome::Inserted { line, lines, .. } => HeaderOutcome::Inserted {
          line,
          lines,
          notice: Some(Notice::HeaderNotFound),
        },
        other => other,
      };
    }

    let Some(bounds) = locate_in(lines, &comment) else {
      return HeaderOutcome::Skipped(Notice::HeaderNotFound);
    };
    if bounds.start == bounds.end
      || !is_separator(&lines[bounds.end], &comment)
      || !is_comment_block(lines, bounds, &comment)
    {
      debug!(?bounds, "header is not terminated by a separator");
      return HeaderOutcome::Skipped(Notice::UnterminatedHeader);
    }

    let existing = &lines[bounds.start..=bounds.end];
    let extracted = ExtractedContent::extract(existing, &comment, &config.extraction_sentinels);
    let fresh = self.render_with(&variables, config);
    let merged = extracted.merge_into(&fresh, &comment);

    trace!(?bounds, old = existing.len(), new = merged.len(), "updating header");
    HeaderOutcome::Updated { bounds, lines: merged }
  }

  /// A new version-history entry numbered after the highest existing one.
  pub fn insert_version_entry(
    &self,
    document: &Document,
    context: &FileContext,
    config: &HeaderConfig,
  ) -> EntryInsertion {
    self.insert_entry(document, context, config, EntryKind::Version)
  }

  /// A new to-do entry numbered after the highest existing one.
  pub fn insert_todo_entry(&self, document: &Document, context: &FileContext, config: &HeaderConfig) -> EntryInsertion {
    self.insert_entry(document, context, config, EntryKind::Todo)
  }

  fn insert_entry(
    &self,
    document: &Document,
    context: &FileContext,
    config: &HeaderConfig,
    kind: EntryKind,
  ) -> EntryInsertion {
    let variables = self.variables(context, config);
    let comment = comment_of(&variables);
    let scan = EntryScan::scan(document.lines(), &comment, kind);
    let (line, notice) = scan.insertion_point(kind);

    let (template, variables) = match kind {
      EntryKind::Version => {
        let format = config.effective_version_format();
        let version = scan.next_version_for(VersionFields::of(format));
        let variables = variables
          .with("version", format_version(format, version))
          .with("major", format!("{:02}", version.major))
          .with("minor", format!("{:02}", version.minor))
          .with("patch", format!("{:02}", version.patch));
        (self.catalog.version_entry(config.header_style), variables)
      }
      EntryKind::Todo => {
        let index = scan.next_todo_index();
        let variables = variables.with("index", format!("{index:02}"));
        (self.catalog.todo_entry(config.header_style), variables)
      }
    };

    EntryInsertion {
      kind,
      line,
      text: interpolate(&template, &variables),
      notice,
    }
  }

  /// Rewrite the enabled volatile fields of the existing header and repair
  /// repeated `Last` labels.
  ///
  /// Returns `None` when there is no header or nothing would change.
  pub fn refresh(&self, document: &Document, context: &FileContext, config: &HeaderConfig) -> Option<Vec<LineChange>> {
    let variables = self.variables(context, config);
    let comment = comment_of(&variables);
    let bounds = locate_in(document.lines(), &comment)?;

    let mut lines = document.lines().to_vec();
    let mut changes = collapse_repeated_labels(&lines);
    for change in &changes {
      lines[change.line].clone_from(&change.text);
    }

    let fields: Vec<(HeaderField, String)> = HeaderField::ALL
      .into_iter()
      .filter(|field| field.is_enabled(config))
      .map(|field| (field, field.value(&variables)))
      .collect();

    for change in refresh::refresh_fields(&lines, bounds, &comment, &fields) {
      match changes.iter_mut().find(|existing| existing.line == change.line) {
        Some(existing) => existing.text = change.text,
        None => changes.push(change),
      }
    }

    changes.sort_by_key(|change| change.line);
    (!changes.is_empty()).then_some(changes)
  }
}

fn comment_of(variables: &TemplateVariables) -> String {
  variables.get("comment").unwrap_or_default().to_string()
}

fn locate_in(lines: &[String], comment: &str) -> Option<HeaderBounds> {
  if !has_header(lines, comment) {
    return None;
  }
  find_bounds(lines, comment)
}

fn is_pinned_prefix(line: &str) -> bool {
  let line = line.to_lowercase();
  PINNED_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  fn engine_at(hour: u32) -> HeaderEngine {
    let instant = Utc.with_ymd_and_hms(2025, 9, 8, hour, 4, 52).unwrap();
    HeaderEngine::with_formatter(Arc::new(TemplateCatalog::builtin()), DateTimeFormatter::fixed(instant))
  }

  fn context(language: &str) -> FileContext {
    FileContext::new(language, "/work/src/lib.rs").with_user_name("kim")
  }

  fn apply(document: &Document, outcome: &HeaderOutcome) -> Document {
    let mut document = document.clone();
    outcome.apply(&mut document);
    document
  }

  #[test]
  fn test_insert_into_plain_document() {
    let engine = engine_at(7);
    let config = HeaderConfig::default();
    let document = Document::parse("fn main() {}\n");

    let outcome = engine.insert_header(&document, &context("rust"), &config);
    let HeaderOutcome::Inserted { line, lines, notice } = &outcome else {
      panic!("expected insertion, got {outcome:?}");
    };
    assert_eq!(*line, 0);
    assert_eq!(*notice, None);
    assert!(lines[0].starts_with("//---"));
    assert_eq!(lines.last().map(String::as_str), Some(""));

    let updated = apply(&document, &outcome);
    assert!(engine.has_header(&updated, &context("rust"), &config));
    assert_eq!(updated.lines().last().map(String::as_str), Some("fn main() {}"));
  }

  #[test]
  fn test_second_insert_is_skipped() {
    let engine = engine_at(7);
    let config = HeaderConfig::default();
    let document = Document::parse("x = 1\n");
    let once = apply(&document, &engine.insert_header(&document, &context("python"), &config));

    let again = engine.insert_header(&once, &context("python"), &config);
    assert_eq!(again, HeaderOutcome::Skipped(Notice::HeaderAlreadyPresent));
    assert_eq!(apply(&once, &again).len(), once.len());
  }

  #[test]
  fn test_pinned_prefix_stays_first() {
    let engine = engine_at(7);
    let config = HeaderConfig::default();
    let document = Document::parse("#!/usr/bin/env python3\nprint('hi')\n");

    let updated = apply(&document, &engine.insert_header(&document, &context("python"), &config));
    assert_eq!(updated.lines()[0], "#!/usr/bin/env python3");
    assert_eq!(updated.lines()[1], "");
    assert!(updated.lines()[2].starts_with("#---"));
  }

  #[test]
  fn test_configured_shebang_is_emitted() {
    let engine = engine_at(7);
    let mut config = HeaderConfig::default();
    config
      .shebang_per_language
      .insert("shellscript".to_string(), "/bin/bash".to_string());
    let document = Document::parse("");

    let updated = apply(&document, &engine.insert_header(&document, &context("shellscript"), &config));
    assert_eq!(updated.lines()[0], "#!/bin/bash");
    assert!(updated.lines()[1].starts_with("#---"));
    assert!(updated.to_text().ends_with(&format!("#{}\n", "-".repeat(69))));
  }

  #[test]
  fn test_update_preserves_content_and_refreshes_timestamp() {
    let config = HeaderConfig::default();
    let first = engine_at(7);
    let document = Document::parse("fn main() {}\n");
    let mut document = apply(&document, &first.insert_header(&document, &context("rust"), &config));

    let description = document
      .lines()
      .iter()
      .position(|line| line.contains("This module provides"))
      .unwrap();
    document.set_line(description, "//     Custom text A".to_string());

    let later = engine_at(9);
    let outcome = later.update_header(&document, &context("rust"), &config);
    assert!(matches!(outcome, HeaderOutcome::Updated { .. }));
    let updated = apply(&document, &outcome);

    assert!(updated.lines().iter().any(|line| line == "//     Custom text A"));
    assert!(updated.lines().iter().any(|line| line.contains("2025-09-08 09:04:52 (by kim)")));
    assert!(!updated.lines().iter().any(|line| line.contains("07:04:52")));
    assert_eq!(updated.len(), document.len());
  }

  #[test]
  fn test_update_without_header_inserts_with_notice() {
    let engine = engine_at(7);
    let outcome = engine.update_header(&Document::parse("x\n"), &context("rust"), &HeaderConfig::default());
    assert_eq!(outcome.notice(), Some(Notice::HeaderNotFound));
    assert!(outcome.is_change());
  }

  #[test]
  fn test_update_leaves_unterminated_header_alone() {
    let engine = engine_at(7);
    let document = Document::parse("//----------\n// Description   :\n// text\n");
    let outcome = engine.update_header(&document, &context("rust"), &HeaderConfig::default());
    assert_eq!(outcome, HeaderOutcome::Skipped(Notice::UnterminatedHeader));
  }

  #[test]
  fn test_update_never_spans_code_between_banners() {
    let engine = engine_at(7);
    let document = Document::parse("#==========\nimport os\n\ndef f():\n    pass\n#==========\nx = 1\n");

    let outcome = engine.update_header(&document, &context("python"), &HeaderConfig::default());
    assert_eq!(outcome, HeaderOutcome::Skipped(Notice::UnterminatedHeader));
    assert_eq!(apply(&document, &outcome), document);
  }

  #[test]
  fn test_entries_follow_existing_numbering() {
    let engine = engine_at(7);
    let config = HeaderConfig::default();
    let document = Document::parse(
      "// File History :\n//      * 2024/01/01 : (v01p00,  a) A\n//      * 2024/01/02 : (v01p02,  a) B\n// To-Do List   :\n//      * 2024/01/01 : (ToDo#03, a) C\n",
    );

    let version = engine.insert_version_entry(&document, &context("rust"), &config);
    assert_eq!(version.line, 3);
    assert_eq!(version.text, "//      * 2025/09/08 : (v01p03,  kim) Description");

    let todo = engine.insert_todo_entry(&document, &context("rust"), &config);
    assert_eq!(todo.line, 5);
    assert_eq!(todo.text, "//      * 2025/09/08 : (ToDo#04, kim) Description");
    assert_eq!(todo.notice, None);
  }

  #[test]
  fn test_refresh_rewrites_enabled_fields_only() {
    let config = HeaderConfig {
      auto_update_editor: false,
      ..HeaderConfig::default()
    };
    let document = Document::parse(
      "//----------\n// Last Last Updated  : old (by a)\n// Editor        : vim, tab size (8)\n//----------\ncode\n",
    );

    let changes = engine_at(7).refresh(&document, &context("rust"), &config).unwrap();
    assert_eq!(
      changes,
      vec![LineChange {
        line: 1,
        text: "// Last Updated  : 2025-09-08 07:04:52 (by kim)".to_string()
      }]
    );
  }

  #[test]
  fn test_refresh_without_header_is_none() {
    let engine = engine_at(7);
    assert_eq!(engine.refresh(&Document::parse("code\n"), &context("rust"), &HeaderConfig::default()), None);
  }

  #[test]
  fn test_notice_messages() {
    assert_eq!(
      Notice::SectionNotFound(Section::TodoList).to_string(),
      "'To-Do List' section not found; inserting at top of file"
    );
  }
}
