//! # Variables Module
//!
//! Assembles the variable map consumed by header and entry templates from a
//! [`FileContext`] and a [`HeaderConfig`] snapshot.
//!
//! Resolution is a pure function of its inputs: the only outside state it reads
//! is the clock inside its [`DateTimeFormatter`], which tests can pin.

use std::collections::BTreeMap;
use std::path::Path;

use crate::comment_syntax::CommentSyntaxTable;
use crate::config::HeaderConfig;
use crate::datetime::DateTimeFormatter;
use crate::interpolate::{VariableSource, interpolate};

/// Name used when neither the configuration nor the host names a user.
pub const UNKNOWN_USER: &str = "unknown";

/// License text used when a license type is unknown and no custom text is set.
pub const DEFAULT_LICENSE_TEXT: &str = "All Rights Reserved";

const LICENSE_TEXTS: &[(&str, &str)] = &[
  ("All Rights Reserved", "All Rights Reserved"),
  ("MIT", "Licensed under the MIT License"),
  ("Apache-2.0", "Licensed under the Apache License, Version 2.0"),
  ("GPL-3.0", "Licensed under the GNU General Public License v3.0"),
  ("GPL-2.0", "Licensed under the GNU General Public License v2.0"),
  ("LGPL-3.0", "Licensed under the GNU Lesser General Public License v3.0"),
  ("LGPL-2.1", "Licensed under the GNU Lesser General Public License v2.1"),
  ("BSD-3-Clause", "Licensed under the BSD 3-Clause License"),
  ("BSD-2-Clause", "Licensed under the BSD 2-Clause License"),
  ("ISC", "Licensed under the ISC License"),
  ("MPL-2.0", "Licensed under the Mozilla Public License 2.0"),
  ("Unlicense", "Released into the public domain"),
];

/// What the host knows about the document being rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContext {
  /// Language id (`rust`) or extension (`.rs`)
  pub language_id: String,
  /// Absolute path of the document
  pub full_path: String,
  /// Path relative to the workspace, or the file name without a workspace
  pub relative_path: String,
  pub tab_size: u32,
  pub insert_spaces: bool,
  /// The host's user name; may be empty
  pub user_name: String,
}

impl FileContext {
  /// A context for `full_path` with 4-space indentation, no workspace and no
  /// known user.
  pub fn new(language_id: &str, full_path: &str) -> Self {
    Self {
      language_id: language_id.to_string(),
      full_path: full_path.to_string(),
      relative_path: file_name(full_path),
      tab_size: 4,
      insert_spaces: true,
      user_name: String::new(),
    }
  }

  pub fn with_relative_path(mut self, relative_path: &str) -> Self {
    self.relative_path = relative_path.to_string();
    self
  }

  pub const fn with_indent(mut self, tab_size: u32, insert_spaces: bool) -> Self {
    self.tab_size = tab_size;
    self.insert_spaces = insert_spaces;
    self
  }

  pub fn with_user_name(mut self, user_name: &str) -> Self {
    self.user_name = user_name.to_string();
    self
  }
}

fn file_name(path: &str) -> String {
  Path::new(path)
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.to_string())
}

fn file_stem(path: &str) -> String {
  Path::new(path)
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default()
}

/// The resolved variables for one render.
///
/// Built fresh for every render and read-only afterwards; entry templates add
/// their own keys through [`TemplateVariables::with`], which returns a new map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateVariables(BTreeMap<String, String>);

impl TemplateVariables {
  pub fn get(&self, key: &str) -> Option<&str> {
    self.0.get(key).map(String::as_str)
  }

  /// A copy of these variables with `key` set to `value`.
  pub fn with(&self, key: &str, value: impl Into<String>) -> Self {
    let mut map = self.0.clone();
    map.insert(key.to_string(), value.into());
    Self(map)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl FromIterator<(String, String)> for TemplateVariables {
  fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

impl VariableSource for TemplateVariables {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.get(key)
  }
}

/// Builds [`TemplateVariables`] from file context and configuration.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
  formatter: DateTimeFormatter,
}

impl VariableResolver {
  pub const fn new(formatter: DateTimeFormatter) -> Self {
    Self { formatter }
  }

  pub const fn formatter(&self) -> &DateTimeFormatter {
    &self.formatter
  }

  /// Resolve every well-known variable.
  ///
  /// `time_zone` selects the zone for dates and years; `None` means UTC.
  pub fn resolve(&self, context: &FileContext, config: &HeaderConfig, time_zone: Option<&str>) -> TemplateVariables {
    let comment = CommentSyntaxTable::from_config(config)
      .resolve(&context.language_id)
      .line_token()
      .to_string();
    let separator = separator(&comment, config.separator_char, config.separator_length);

    let author = non_empty(config.author_full_name.as_deref())
      .or_else(|| non_empty(Some(context.user_name.as_str())))
      .unwrap_or(UNKNOWN_USER)
      .to_string();
    let last_modified_user = non_empty(Some(context.user_name.as_str())).unwrap_or(UNKNOWN_USER);

    let today = self.formatter.today(time_zone);
    let current_year = self.formatter.year_in(time_zone);
    let start_year = non_empty(config.copyright_start_years.as_deref())
      .unwrap_or(current_year.as_str())
      .to_string();

    let project_description = interpolate(
      &config.project_description,
      &[("projectName", config.project_name.as_str())],
    );
    let copyright_notice = interpolate(
      &config.copyright_notice,
      &[
        ("startYear", start_year.as_str()),
        ("endYear", current_year.as_str()),
        ("companyName", config.company_name.as_str()),
        ("author", author.as_str()),
      ],
    );

    let editor_info = format!(
      "{}, {} size ({})",
      config.editor_name,
      if context.insert_spaces { "space" } else { "tab" },
      context.tab_size
    );

    let entries: [(&str, String); 34] = [
      ("comment", comment),
      ("separator", separator),
      ("projectName", config.project_name.clone()),
      ("projectDescription", project_description.clone()),
      ("companyName", config.company_name.clone()),
      ("fileName", file_name(&context.full_path)),
      ("fullPath", context.full_path.clone()),
      ("relativePath", context.relative_path.clone()),
      ("baseFileName", file_stem(&context.full_path)),
      ("author", author.clone()),
      ("authorName", author.clone()),
      ("authorEmail", config.author_email.clone()),
      ("authorFullName", config.author_full_name.clone().unwrap_or_default()),
      ("authorTitle", config.author_title.clone()),
      (
        "authorWithTitle",
        author_with_title(&author, &config.author_title, &config.author_email),
      ),
      ("teamName", config.team_name.clone()),
      ("today", today.clone()),
      ("lastModifiedDate", self.formatter.timestamp(time_zone)),
      ("lastModifiedUser", last_modified_user.to_string()),
      ("currentDate", today.clone()),
      ("currentYear", current_year.clone()),
      ("startYear", start_year),
      ("endYear", current_year),
      ("creationDate", today),
      ("description", project_description),
      ("copyright", copyright_notice.clone()),
      ("fileHistory", String::new()),
      ("todoList", String::new()),
      ("authorWithEmail", author_with_email(&author, &config.author_email)),
      ("editorInfo", editor_info),
      ("copyrightNotice", copyright_notice),
      (
        "licenseText",
        license_text(&config.license_type, config.custom_license_text.as_deref()),
      ),
      ("licenseType", config.license_type.clone()),
      ("licenseUrl", config.license_url.clone()),
    ];

    entries
      .into_iter()
      .map(|(key, value)| (key.to_string(), value))
      .collect()
  }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.trim().is_empty())
}

/// The rule that follows `comment` so the whole line is `length` characters.
pub fn separator(comment: &str, rule_char: char, length: usize) -> String {
  let width = length.saturating_sub(comment.chars().count());
  std::iter::repeat_n(rule_char, width).collect()
}

/// `name (email)`, unless there is no email or the name already contains it.
pub fn author_with_email(name: &str, email: &str) -> String {
  if email.is_empty() || name.contains(email) {
    name.to_string()
  } else {
    format!("{name} ({email})")
  }
}

/// The most specific of `name - title <email>`, `name - title`,
/// `name <email>` and `name`.
pub fn author_with_title(name: &str, title: &str, email: &str) -> String {
  match (title.trim().is_empty(), email.trim().is_empty()) {
    (false, false) => format!("{name} - {title} <{email}>"),
    (false, true) => format!("{name} - {title}"),
    (true, false) => format!("{name} <{email}>"),
    (true, true) => name.to_string(),
  }
}

/// The one-line license statement for a license id.
///
/// `Custom` and unknown ids use `custom_text`, or [`DEFAULT_LICENSE_TEXT`]
/// when that is missing or blank.
pub fn license_text(license_type: &str, custom_text: Option<&str>) -> String {
  let known = (license_type != "Custom")
    .then(|| LICENSE_TEXTS.iter().find(|(id, _)| *id == license_type))
    .flatten();

  match known {
    Some((_, text)) => (*text).to_string(),
    None => non_empty(custom_text).unwrap_or(DEFAULT_LICENSE_TEXT).to_string(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  fn resolver() -> VariableResolver {
    let instant = Utc
      .with_ymd_and_hms(2025, 9, 8, 7, 4, 52)
      .single()
      .expect("valid instant");
    VariableResolver::new(DateTimeFormatter::fixed(instant))
  }

  fn context() -> FileContext {
    FileContext::new("rust", "/work/apollo/src/engine.rs")
      .with_relative_path("src/engine.rs")
      .with_user_name("kim")
  }

  #[test]
  fn test_defaults_fill_every_well_known_key() {
    let vars = resolver().resolve(&context(), &HeaderConfig::default(), None);

    assert_eq!(vars.len(), 34);
    assert_eq!(vars.get("comment"), Some("//"));
    assert_eq!(vars.get("projectName"), Some("Untitled Project"));
    assert_eq!(vars.get("companyName"), Some("Company"));
    assert_eq!(vars.get("fileName"), Some("engine.rs"));
    assert_eq!(vars.get("baseFileName"), Some("engine"));
    assert_eq!(vars.get("relativePath"), Some("src/engine.rs"));
    assert_eq!(vars.get("author"), Some("kim"));
    assert_eq!(vars.get("today"), Some("2025/09/08"));
    assert_eq!(vars.get("creationDate"), Some("2025/09/08"));
    assert_eq!(vars.get("lastModifiedDate"), Some("2025-09-08 07:04:52"));
    assert_eq!(vars.get("lastModifiedUser"), Some("kim"));
    assert_eq!(vars.get("copyrightNotice"), Some("(C) Copyright 2025-2025 Company"));
    assert_eq!(vars.get("licenseText"), Some("All Rights Reserved"));
    assert_eq!(vars.get("fileHistory"), Some(""));
  }

  #[test]
  fn test_two_level_interpolation() {
    let config = HeaderConfig {
      project_name: "Apollo".to_string(),
      company_name: "Acme".to_string(),
      copyright_start_years: Some("2021".to_string()),
      copyright_notice: "(C) ${startYear}-${endYear} ${companyName} by ${author} ${unknown}".to_string(),
      ..HeaderConfig::default()
    };
    let vars = resolver().resolve(&context(), &config, None);

    assert_eq!(vars.get("copyrightNotice"), Some("(C) 2021-2025 Acme by kim ${unknown}"));
    assert_eq!(
      vars.get("projectDescription"),
      Some("This module provides core functionality for the Apollo application")
    );
  }

  #[test]
  fn test_configured_author_wins_over_user_name() {
    let config = HeaderConfig {
      author_full_name: Some("Kim Min".to_string()),
      author_email: "kim@example.com".to_string(),
      author_title: "Engineer".to_string(),
      ..HeaderConfig::default()
    };
    let vars = resolver().resolve(&context(), &config, None);

    assert_eq!(vars.get("author"), Some("Kim Min"));
    assert_eq!(vars.get("lastModifiedUser"), Some("kim"));
    assert_eq!(vars.get("authorWithEmail"), Some("Kim Min (kim@example.com)"));
    assert_eq!(vars.get("authorWithTitle"), Some("Kim Min - Engineer <kim@example.com>"));
  }

  #[test]
  fn test_missing_user_falls_back_to_unknown() {
    let ctx = FileContext::new("python", "script.py");
    let vars = resolver().resolve(&ctx, &HeaderConfig::default(), None);
    assert_eq!(vars.get("author"), Some(UNKNOWN_USER));
    assert_eq!(vars.get("lastModifiedUser"), Some(UNKNOWN_USER));
    assert_eq!(vars.get("comment"), Some("#"));
    assert_eq!(vars.get("relativePath"), Some("script.py"));
  }

  #[test]
  fn test_editor_info() {
    let config = HeaderConfig {
      editor_name: "Visual Studio Code".to_string(),
      ..HeaderConfig::default()
    };
    let spaces = resolver().resolve(&context().with_indent(2, true), &config, None);
    assert_eq!(spaces.get("editorInfo"), Some("Visual Studio Code, space size (2)"));

    let tabs = resolver().resolve(&context().with_indent(8, false), &config, None);
    assert_eq!(tabs.get("editorInfo"), Some("Visual Studio Code, tab size (8)"));
  }

  #[test]
  fn test_separator_width() {
    assert_eq!(separator("//", '-', 10), "--------");
    assert_eq!(separator("#", '=', 12).chars().count(), 11);
    assert_eq!(separator("--[[", '-', 2), "");
  }

  #[test]
  fn test_author_with_email_avoids_duplicates() {
    assert_eq!(author_with_email("kim", ""), "kim");
    assert_eq!(author_with_email("kim <kim@x.io>", "kim@x.io"), "kim <kim@x.io>");
    assert_eq!(author_with_email("kim", "kim@x.io"), "kim (kim@x.io)");
  }

  #[test]
  fn test_author_with_title_combinations() {
    assert_eq!(author_with_title("kim", "Lead", "k@x.io"), "kim - Lead <k@x.io>");
    assert_eq!(author_with_title("kim", "Lead", ""), "kim - Lead");
    assert_eq!(author_with_title("kim", " ", "k@x.io"), "kim <k@x.io>");
    assert_eq!(author_with_title("kim", "", ""), "kim");
  }

  #[test]
  fn test_license_text_lookup() {
    assert_eq!(license_text("MIT", None), "Licensed under the MIT License");
    assert_eq!(license_text("Unlicense", Some("ignored")), "Released into the public domain");
    assert_eq!(license_text("Custom", Some("Internal use only")), "Internal use only");
    assert_eq!(license_text("Custom", None), DEFAULT_LICENSE_TEXT);
    assert_eq!(license_text("WTFPL", Some("  ")), DEFAULT_LICENSE_TEXT);
  }

  #[test]
  fn test_with_adds_extension_keys_without_mutating() {
    let vars = resolver().resolve(&context(), &HeaderConfig::default(), None);
    let extended = vars.with("version", "v01p03");
    assert_eq!(extended.get("version"), Some("v01p03"));
    assert_eq!(vars.get("version"), None);
  }
}
