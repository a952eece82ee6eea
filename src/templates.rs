//! # Templates Module
//!
//! This module provides the template catalog: the header body, version-entry
//! and to-do-entry templates for each [`HeaderStyle`].
//!
//! The module includes:
//! - [`HeaderStyle`] naming the three header presets
//! - [`TemplateSet`] holding one complete table of templates
//! - [`TemplateCatalog`] loading a table from a TOML or JSON resource, falling
//!   back to built-in templates, and swapping tables atomically on reload
//!
//! ## Example
//!
//! ```rust
//! use fileheader::templates::{HeaderStyle, TemplateCatalog};
//!
//! let catalog = TemplateCatalog::builtin();
//! let body = catalog.header_body(HeaderStyle::Minimal);
//! assert!(body.iter().all(|line| line.starts_with("${comment}")));
//! ```
//!
//! ## Resource format
//!
//! ```toml
//! [header-body]
//! standard = ["${comment}${separator}", "${comment} ${copyrightNotice}", "${comment}${separator}"]
//!
//! [version-entry]
//! standard = "${comment}      * ${today} : (${version},  ${author}) Description"
//!
//! [todo-entry]
//! standard = "${comment}      * ${today} : (ToDo#${index}, ${author}) Description"
//! ```
//!
//! The same shape is accepted as JSON when the file name ends in `.json`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use clap::ValueEnum;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::verbose_log;

/// Header verbosity preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderStyle {
  /// Copyright, project, author, dates, description, history and to-do list
  #[default]
  Standard,
  /// A compact header without history or to-do sections
  Minimal,
  /// The standard header plus path, team and a structured description
  Detailed,
}

impl HeaderStyle {
  /// Every style, in declaration order.
  pub const ALL: [HeaderStyle; 3] = [HeaderStyle::Standard, HeaderStyle::Minimal, HeaderStyle::Detailed];

  /// The key used for this style in template resources.
  pub const fn as_str(self) -> &'static str {
    match self {
      HeaderStyle::Standard => "standard",
      HeaderStyle::Minimal => "minimal",
      HeaderStyle::Detailed => "detailed",
    }
  }
}

impl fmt::Display for HeaderStyle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Error type for strict template loading.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
  /// The template file could not be read.
  #[error("Failed to read template file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The template file is not valid TOML or JSON for the catalog shape.
  #[error("Failed to parse template file '{path}': {message}")]
  ParseError { path: PathBuf, message: String },

  /// The template file parsed but defines no templates at all.
  #[error("Template file '{path}' defines no templates")]
  Empty { path: PathBuf },
}

/// One complete table of templates, keyed by style name.
///
/// Header bodies are sequences of lines; entries are single lines. Missing
/// style keys are allowed and resolved by [`TemplateCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TemplateSet {
  #[serde(alias = "headerBody", alias = "header_body")]
  pub header_body: BTreeMap<String, Vec<String>>,

  #[serde(alias = "versionEntry", alias = "version_entry")]
  pub version_entry: BTreeMap<String, String>,

  #[serde(alias = "todoEntry", alias = "todo_entry")]
  pub todo_entry: BTreeMap<String, String>,
}

impl TemplateSet {
  /// Whether the table defines no templates for any style.
  pub fn is_empty(&self) -> bool {
    self.header_body.values().all(Vec::is_empty)
      && self.version_entry.values().all(|entry| entry.trim().is_empty())
      && self.todo_entry.values().all(|entry| entry.trim().is_empty())
  }

  /// Parse a table from `content`, choosing JSON or TOML by the extension of
  /// `path`.
  pub fn parse(path: &Path, content: &str) -> Result<Self, TemplateError> {
    let is_json = path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let parsed = if is_json {
      serde_json::from_str::<TemplateSet>(content).map_err(|e| e.to_string())
    } else {
      toml::from_str::<TemplateSet>(content).map_err(|e| e.to_string())
    };

    let mut set = parsed.map_err(|message| TemplateError::ParseError {
      path: path.to_path_buf(),
      message,
    })?;

    // Entry templates are single lines; tolerate a trailing newline.
    for entry in set.version_entry.values_mut().chain(set.todo_entry.values_mut()) {
      let trimmed_len = entry.trim_end_matches(['\r', '\n']).len();
      entry.truncate(trimmed_len);
    }

    if set.is_empty() {
      return Err(TemplateError::Empty {
        path: path.to_path_buf(),
      });
    }

    Ok(set)
  }

  /// Read and parse a table from `path`.
  pub fn read(path: &Path) -> Result<Self, TemplateError> {
    let content = fs::read_to_string(path).map_err(|e| TemplateError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;
    Self::parse(path, &content)
  }
}

const STANDARD_HEADER: &[&str] = &[
  "${comment}${separator}",
  "${comment} ${copyrightNotice}",
  "${comment}",
  "${comment} ${licenseText}",
  "${comment}",
  "${comment} Project Name  : ${projectName}",
  "${comment} File Name     : ${fileName}",
  "${comment} Author        : ${author}",
  "${comment} First Created : ${creationDate}",
  "${comment} Last Updated  : ${lastModifiedDate} (by ${lastModifiedUser})",
  "${comment} Editor        : ${editorInfo}",
  "${comment} Description   :",
  "${comment}",
  "${comment}     ${projectDescription}",
  "${comment}        o",
  "${comment}",
  "${comment}${separator}",
  "${comment} File History :",
  "${comment}      * ${today} : (v01p00,  ${author}) First Release by '${author}'",
  "${comment} To-Do List   :",
  "${comment}      * ${today} : (ToDo#00, ${author}) None",
  "${comment}${separator}",
];

const MINIMAL_HEADER: &[&str] = &[
  "${comment}${separator}",
  "${comment} ${copyrightNotice}",
  "${comment} ${licenseText}",
  "${comment}",
  "${comment} File        : ${fileName}",
  "${comment} Author      : ${author}",
  "${comment} Created     : ${creationDate}",
  "${comment} Updated     : ${lastModifiedDate} (by ${lastModifiedUser})",
  "${comment} Editor      : ${editorInfo}",
  "${comment} Description : ${projectDescription}",
  "${comment}${separator}",
];

const DETAILED_HEADER: &[&str] = &[
  "${comment}${separator}",
  "${comment} ${copyrightNotice}",
  "${comment}",
  "${comment} ${licenseText}",
  "${comment}",
  "${comment} Project Name  : ${projectName}",
  "${comment} File Name     : ${fileName}",
  "${comment} Full Path     : ${fullPath}",
  "${comment} Author        : ${authorWithTitle}",
  "${comment} Team          : ${teamName}",
  "${comment} First Created : ${creationDate}",
  "${comment} Last Updated  : ${lastModifiedDate} (by ${lastModifiedUser})",
  "${comment} Editor        : ${editorInfo}",
  "${comment} Description   :",
  "${comment}",
  "${comment}     ${projectDescription}",
  "${comment}",
  "${comment}     Purpose:",
  "${comment}        o",
  "${comment}",
  "${comment}     Dependencies:",
  "${comment}        o",
  "${comment}",
  "${comment}     Notes:",
  "${comment}        o",
  "${comment}",
  "${comment}${separator}",
  "${comment} File History :",
  "${comment}      * ${today} : (v01p00,  ${author}) First Release by '${author}'",
  "${comment} To-Do List   :",
  "${comment}      * ${today} : (ToDo#00, ${author}) None",
  "${comment}${separator}",
];

const VERSION_ENTRY: &str = "${comment}      * ${today} : (${version},  ${author}) Description";

const TODO_ENTRY: &str = "${comment}      * ${today} : (ToDo#${index}, ${author}) Description";

const fn builtin_header(style: HeaderStyle) -> &'static [&'static str] {
  match style {
    HeaderStyle::Standard => STANDARD_HEADER,
    HeaderStyle::Minimal => MINIMAL_HEADER,
    HeaderStyle::Detailed => DETAILED_HEADER,
  }
}

static BUILTIN_TEMPLATES: LazyLock<Arc<TemplateSet>> = LazyLock::new(|| {
  let mut set = TemplateSet::default();
  for style in HeaderStyle::ALL {
    let key = style.as_str().to_string();
    set
      .header_body
      .insert(key.clone(), builtin_header(style).iter().map(|line| (*line).to_string()).collect());
    set.version_entry.insert(key.clone(), VERSION_ENTRY.to_string());
    set.todo_entry.insert(key, TODO_ENTRY.to_string());
  }
  Arc::new(set)
});

/// Catalog of header and entry templates.
///
/// Constructed once at start-up and passed by reference to whatever renders
/// headers. Readers take a cheap snapshot of the current table; [`reload`]
/// swaps in a complete new table, so a reader never sees a partial update.
///
/// Template selection never fails: a style missing from the loaded table
/// falls back to `standard`, and an empty `standard` falls back to the
/// built-in template for the requested style.
///
/// [`reload`]: TemplateCatalog::reload
#[derive(Debug)]
pub struct TemplateCatalog {
  /// The external resource, if the catalog was loaded from one
  source: Option<PathBuf>,
  templates: RwLock<Arc<TemplateSet>>,
}

impl Default for TemplateCatalog {
  fn default() -> Self {
    Self::builtin()
  }
}

impl TemplateCatalog {
  /// A catalog holding only the built-in templates.
  pub fn builtin() -> Self {
    Self {
      source: None,
      templates: RwLock::new(Arc::clone(&BUILTIN_TEMPLATES)),
    }
  }

  /// A catalog over an in-memory table.
  pub fn from_set(set: TemplateSet) -> Self {
    Self {
      source: None,
      templates: RwLock::new(Arc::new(set)),
    }
  }

  /// Load the catalog from `path`, degrading to built-in templates when the
  /// resource is missing or corrupt. The failure is reported once through
  /// `tracing`.
  pub fn load(path: &Path) -> Self {
    let set = match TemplateSet::read(path) {
      Ok(set) => {
        verbose_log!("Loaded templates from: {}", path.display());
        Arc::new(set)
      }
      Err(e) => {
        warn!("{e}; using built-in templates");
        Arc::clone(&BUILTIN_TEMPLATES)
      }
    };

    Self {
      source: Some(path.to_path_buf()),
      templates: RwLock::new(set),
    }
  }

  /// Load the catalog from `path`, returning the error instead of degrading.
  pub fn try_load(path: &Path) -> Result<Self, TemplateError> {
    let set = TemplateSet::read(path)?;
    verbose_log!("Loaded templates from: {}", path.display());
    Ok(Self {
      source: Some(path.to_path_buf()),
      templates: RwLock::new(Arc::new(set)),
    })
  }

  /// The resource this catalog was loaded from, if any.
  pub fn source(&self) -> Option<&Path> {
    self.source.as_deref()
  }

  /// Re-read the external resource and replace the whole table.
  ///
  /// On failure the current table stays in place and the error is returned.
  /// A catalog without a resource re-installs the built-in templates.
  pub fn reload(&self) -> Result<(), TemplateError> {
    let set = match &self.source {
      Some(path) => Arc::new(TemplateSet::read(path)?),
      None => Arc::clone(&BUILTIN_TEMPLATES),
    };

    *self.templates.write().unwrap_or_else(PoisonError::into_inner) = set;
    debug!(source = ?self.source, "template catalog reloaded");
    Ok(())
  }

  /// The current table.
  pub fn snapshot(&self) -> Arc<TemplateSet> {
    Arc::clone(&self.templates.read().unwrap_or_else(PoisonError::into_inner))
  }

  /// Header body lines for `style`.
  pub fn header_body(&self, style: HeaderStyle) -> Vec<String> {
    let set = self.snapshot();
    let pick = |key: &str| set.header_body.get(key).filter(|lines| !lines.is_empty());

    if let Some(lines) = pick(style.as_str()) {
      return lines.clone();
    }
    if let Some(lines) = pick(HeaderStyle::Standard.as_str()) {
      debug!(%style, "no header template for style, using standard");
      return lines.clone();
    }

    debug!(%style, "no header template loaded, using built-in");
    builtin_header(style).iter().map(|line| (*line).to_string()).collect()
  }

  /// Version-history entry template for `style`.
  pub fn version_entry(&self, style: HeaderStyle) -> String {
    let set = self.snapshot();
    pick_entry(&set.version_entry, style).unwrap_or_else(|| VERSION_ENTRY.to_string())
  }

  /// To-do entry template for `style`.
  pub fn todo_entry(&self, style: HeaderStyle) -> String {
    let set = self.snapshot();
    pick_entry(&set.todo_entry, style).unwrap_or_else(|| TODO_ENTRY.to_string())
  }
}

fn pick_entry(entries: &BTreeMap<String, String>, style: HeaderStyle) -> Option<String> {
  let pick = |key: &str| entries.get(key).filter(|entry| !entry.trim().is_empty()).cloned();
  pick(style.as_str()).or_else(|| pick(HeaderStyle::Standard.as_str()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_styles_are_distinct() {
    let catalog = TemplateCatalog::builtin();
    let standard = catalog.header_body(HeaderStyle::Standard);
    let minimal = catalog.header_body(HeaderStyle::Minimal);
    let detailed = catalog.header_body(HeaderStyle::Detailed);

    assert!(minimal.len() < standard.len());
    assert!(detailed.len() > standard.len());
    assert!(detailed.iter().any(|line| line.contains("${teamName}")));
  }

  #[test]
  fn test_builtin_headers_open_and_close_with_rule() {
    let catalog = TemplateCatalog::builtin();
    for style in HeaderStyle::ALL {
      let body = catalog.header_body(style);
      assert_eq!(body.first().map(String::as_str), Some("${comment}${separator}"));
      assert_eq!(body.last().map(String::as_str), Some("${comment}${separator}"));
    }
  }

  #[test]
  fn test_missing_style_falls_back_to_standard() {
    let mut set = TemplateSet::default();
    set
      .header_body
      .insert("standard".to_string(), vec!["${comment} only standard".to_string()]);
    set.version_entry.insert("standard".to_string(), "${comment} v ${version}".to_string());
    let catalog = TemplateCatalog::from_set(set);

    assert_eq!(catalog.header_body(HeaderStyle::Detailed), vec!["${comment} only standard"]);
    assert_eq!(catalog.version_entry(HeaderStyle::Minimal), "${comment} v ${version}");
    // Nothing loaded for to-do entries at all
    assert_eq!(catalog.todo_entry(HeaderStyle::Minimal), TODO_ENTRY);
  }

  #[test]
  fn test_empty_standard_falls_back_to_builtin_for_requested_style() {
    let mut set = TemplateSet::default();
    set.header_body.insert("standard".to_string(), Vec::new());
    let catalog = TemplateCatalog::from_set(set);

    assert_eq!(catalog.header_body(HeaderStyle::Minimal).len(), MINIMAL_HEADER.len());
  }

  #[test]
  fn test_parse_json_with_camel_case_keys() {
    let content = r#"{
      "headerBody": { "minimal": ["${comment} json"] },
      "versionEntry": { "minimal": "${comment} * (${version})\n" }
    }"#;
    let set = TemplateSet::parse(Path::new("templates.json"), content).expect("json should parse");

    assert_eq!(set.header_body["minimal"], vec!["${comment} json"]);
    assert_eq!(set.version_entry["minimal"], "${comment} * (${version})");
  }

  #[test]
  fn test_parse_empty_resource_is_an_error() {
    let result = TemplateSet::parse(Path::new("templates.toml"), "");
    assert!(matches!(result, Err(TemplateError::Empty { .. })));
  }

  #[test]
  fn test_parse_invalid_resource_is_an_error() {
    let result = TemplateSet::parse(Path::new("templates.toml"), "header-body = 3");
    assert!(matches!(result, Err(TemplateError::ParseError { .. })));
  }

  #[test]
  fn test_style_display_matches_key() {
    assert_eq!(HeaderStyle::Detailed.to_string(), "detailed");
    assert_eq!(HeaderStyle::default(), HeaderStyle::Standard);
  }
}
