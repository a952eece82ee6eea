mod common;

use chrono::{TimeZone, Utc};
use common::{engine_at, first_instant, later_instant, rust_context, section_text};
use fileheader::comment_syntax::CommentSyntaxTable;
use fileheader::config::HeaderConfig;
use fileheader::datetime::DateTimeFormatter;
use fileheader::document::Document;
use fileheader::header::{EntryKind, EntryScan, HeaderOutcome, Notice, Section};
use fileheader::interpolate::{VersionNumber, interpolate};
use fileheader::templates::HeaderStyle;
use fileheader::variables::{FileContext, VariableResolver};

fn replace_line_containing(document: &mut Document, needle: &str, replacement: Vec<&str>) {
  let index = document
    .lines()
    .iter()
    .position(|line| line.contains(needle))
    .unwrap_or_else(|| panic!("no line contains {needle:?}"));
  document.replace_lines(index..=index, replacement.into_iter().map(str::to_string).collect());
}

#[test]
fn test_duplicate_insertion_is_a_no_op() {
  let engine = engine_at(first_instant());
  let config = HeaderConfig::default();
  let context = rust_context();
  let mut document = Document::parse("fn main() {}\n");

  engine.insert_header(&document, &context, &config).apply(&mut document);
  assert!(engine.has_header(&document, &context, &config));
  let length = document.len();

  let second = engine.insert_header(&document, &context, &config);
  assert_eq!(second, HeaderOutcome::Skipped(Notice::HeaderAlreadyPresent));
  second.apply(&mut document);

  assert!(engine.has_header(&document, &context, &config));
  assert_eq!(document.len(), length);
}

#[test]
fn test_update_round_trips_user_content() {
  let config = HeaderConfig::default();
  let context = rust_context();
  let mut document = Document::parse("fn main() {}\n");
  engine_at(first_instant())
    .insert_header(&document, &context, &config)
    .apply(&mut document);

  replace_line_containing(
    &mut document,
    "This module provides",
    vec!["//     Custom text A", "//     Custom text B"],
  );
  replace_line_containing(
    &mut document,
    "(v01p00,",
    vec!["//      * 2024/01/01 : (v01p00, alice) First"],
  );
  replace_line_containing(
    &mut document,
    "(ToDo#00,",
    vec!["//      * 2024/01/01 : (ToDo#00, alice) Fix X"],
  );
  let before = document.to_text();

  let engine = engine_at(later_instant());
  let outcome = engine.update_header(&document, &context, &config);
  assert!(matches!(outcome, HeaderOutcome::Updated { .. }));
  outcome.apply(&mut document);
  let after = document.to_text();

  assert_eq!(section_text(&after, "//", "Description"), vec!["Custom text A", "Custom text B"]);
  assert_eq!(
    section_text(&after, "//", "File History"),
    vec!["* 2024/01/01 : (v01p00, alice) First"]
  );
  assert_eq!(
    section_text(&after, "//", "To-Do List"),
    vec!["* 2024/01/01 : (ToDo#00, alice) Fix X"]
  );

  assert!(before.contains("Last Updated  : 2025-09-08 07:04:52 (by alice)"));
  assert!(after.contains("Last Updated  : 2025-09-10 18:30:00 (by alice)"));
  assert!(after.contains("First Created : 2025/09/08"));
  assert!(after.ends_with("fn main() {}\n"));
}

#[test]
fn test_update_is_stable_when_nothing_changed() {
  let engine = engine_at(first_instant());
  let config = HeaderConfig::default();
  let context = rust_context();
  let mut document = Document::parse("fn main() {}\n");
  engine.insert_header(&document, &context, &config).apply(&mut document);
  let inserted = document.to_text();

  engine.update_header(&document, &context, &config).apply(&mut document);
  assert_eq!(document.to_text(), inserted);
}

#[test]
fn test_version_numbering() {
  let engine = engine_at(first_instant());
  let config = HeaderConfig::default();
  let context = rust_context();

  let history = Document::parse(
    "// File History :\n//      * 2024/01/01 : (v01p00,  a) A\n//      * 2024/02/01 : (v01p02,  a) B\n",
  );
  let entry = engine.insert_version_entry(&history, &context, &config);
  assert!(entry.text.contains("(v01p03,"), "{}", entry.text);
  assert_eq!(entry.line, 3);

  let empty = Document::parse("// File History :\n// To-Do List   :\n");
  let entry = engine.insert_version_entry(&empty, &context, &config);
  assert!(entry.text.contains("(v01p00,"), "{}", entry.text);
  assert_eq!(entry.line, 1);

  let scan = EntryScan::scan(history.lines(), "//", EntryKind::Version);
  assert_eq!(scan.next_version(), VersionNumber::new(1, 0, 3));
}

#[test]
fn test_custom_version_format() {
  let engine = engine_at(first_instant());
  let config = HeaderConfig {
    version_format: "custom".to_string(),
    custom_version_format: "{major}.{minor}.{patch}".to_string(),
    ..HeaderConfig::default()
  };
  let document = Document::parse("// File History :\n//      * 2024/01/01 : (v01p07,  a) A\n");

  let entry = engine.insert_version_entry(&document, &rust_context(), &config);
  assert!(entry.text.contains("(1.0.8,"), "{}", entry.text);
}

#[test]
fn test_todo_numbering() {
  let engine = engine_at(first_instant());
  let config = HeaderConfig::default();
  let context = rust_context();

  let todos = Document::parse("// To-Do List   :\n//      * x : (ToDo#00, a) A\n//      * x : (ToDo#03, a) B\n");
  let entry = engine.insert_todo_entry(&todos, &context, &config);
  assert!(entry.text.contains("(ToDo#04,"), "{}", entry.text);

  let empty = Document::parse("// To-Do List   :\n");
  let entry = engine.insert_todo_entry(&empty, &context, &config);
  assert!(entry.text.contains("(ToDo#00,"), "{}", entry.text);
}

#[test]
fn test_missing_section_inserts_at_top_with_notice() {
  let engine = engine_at(first_instant());
  let document = Document::parse("fn main() {}\n");

  let entry = engine.insert_todo_entry(&document, &rust_context(), &HeaderConfig::default());
  assert_eq!(entry.line, 0);
  assert_eq!(entry.notice, Some(Notice::SectionNotFound(Section::TodoList)));
}

#[test]
fn test_interpolation_safety() {
  assert_eq!(interpolate("${name} likes ${name}", &[("name", "Kim")]), "Kim likes Kim");
  assert_eq!(interpolate("${a} and ${b}", &[("a", "x")]), "x and ${b}");
}

#[test]
fn test_comment_resolution_is_deterministic() {
  let table = CommentSyntaxTable::builtin();
  assert_eq!(table.resolve("python"), table.resolve(".py"));
  assert_eq!(table.resolve("unknown-xyz").line_token(), "//");
}

#[test]
fn test_time_zones_can_land_on_different_days() {
  let instant = Utc.with_ymd_and_hms(2025, 9, 8, 16, 30, 0).unwrap();
  let formatter = DateTimeFormatter::fixed(instant);

  assert_eq!(formatter.today(Some("Asia/Seoul")), "2025/09/09");
  assert_eq!(formatter.today(Some("UTC")), "2025/09/08");
  assert_eq!(formatter.today(None), "2025/09/08");
}

#[test]
fn test_configured_time_zone_reaches_rendered_dates() {
  let engine = engine_at(Utc.with_ymd_and_hms(2025, 12, 31, 20, 0, 0).unwrap());
  let config = HeaderConfig {
    time_zone: Some("Asia/Seoul".to_string()),
    ..HeaderConfig::default()
  };

  let header = engine.render_header(&rust_context(), &config).join("\n");
  assert!(header.contains("First Created : 2026/01/01"));
  assert!(header.contains("(C) Copyright 2026-2026 Company"));
}

#[test]
fn test_separator_width_matches_configured_length() {
  let resolver = VariableResolver::new(DateTimeFormatter::fixed(first_instant()));

  for language in ["rust", "python", "sql", "shellscript"] {
    let context = FileContext::new(language, "/work/file");
    for length in 10..=200 {
      let config = HeaderConfig {
        separator_length: length,
        ..HeaderConfig::default()
      };
      let variables = resolver.resolve(&context, &config, None);
      let rule = format!(
        "{}{}",
        variables.get("comment").unwrap(),
        variables.get("separator").unwrap()
      );
      assert_eq!(rule.chars().count(), length, "{language} at {length}");
    }
  }
}

#[test]
fn test_every_style_round_trips_through_the_locator() {
  let engine = engine_at(first_instant());
  let context = rust_context();

  for style in HeaderStyle::ALL {
    let config = HeaderConfig {
      header_style: style,
      ..HeaderConfig::default()
    };
    let mut document = Document::parse("fn main() {}\n");
    engine.insert_header(&document, &context, &config).apply(&mut document);

    let bounds = engine
      .locate(&document, &context, &config)
      .unwrap_or_else(|| panic!("{style} header not found"));
    assert_eq!(bounds.start, 0, "{style}");
    assert_eq!(document.lines()[bounds.end + 1], "", "{style}");
    assert_eq!(document.lines()[bounds.end + 2], "fn main() {}", "{style}");
  }
}

#[test]
fn test_refresh_rewrites_only_volatile_fields() {
  let config = HeaderConfig::default();
  let context = rust_context().with_indent(2, false);
  let mut document = Document::parse("fn main() {}\n");
  engine_at(first_instant())
    .insert_header(&document, &context, &config)
    .apply(&mut document);
  let before = document.clone();

  let changes = engine_at(later_instant())
    .refresh(&document, &context, &config)
    .expect("timestamp changed");
  for change in &changes {
    change.apply(&mut document);
  }

  assert_eq!(changes.len(), 1);
  assert!(document.lines()[changes[0].line].ends_with("2025-09-10 18:30:00 (by alice)"));
  let differing = before
    .lines()
    .iter()
    .zip(document.lines())
    .filter(|(a, b)| a != b)
    .count();
  assert_eq!(differing, 1);
}

#[test]
fn test_update_keeps_code_between_two_banners() {
  let engine = engine_at(first_instant());
  let context = FileContext::new("python", "/work/project/app.py").with_user_name("alice");
  let text = "#==========\nimport os\n\ndef f():\n    pass\n#==========\nx = 1\n";
  let mut document = Document::parse(text);

  let outcome = engine.update_header(&document, &context, &HeaderConfig::default());
  assert_eq!(outcome, HeaderOutcome::Skipped(Notice::UnterminatedHeader));
  outcome.apply(&mut document);

  assert_eq!(document.to_text(), text);
}

#[test]
fn test_version_numbering_keeps_increasing_after_dotted_entry() {
  let engine = engine_at(first_instant());
  let config = HeaderConfig::default();
  let context = FileContext::new("python", "/work/project/app.py").with_user_name("kim");
  let mut document = Document::parse("# File History :\n#      * 2024/01/01 : (v01.03,  kim) Dotted\n");

  let first = engine.insert_version_entry(&document, &context, &config);
  first.apply(&mut document);
  let second = engine.insert_version_entry(&document, &context, &config);

  assert!(first.text.contains("(v01p01,"), "{}", first.text);
  assert!(second.text.contains("(v01p02,"), "{}", second.text);
  assert_ne!(first.text, second.text);
}
