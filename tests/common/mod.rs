#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use fileheader::datetime::DateTimeFormatter;
use fileheader::header::HeaderEngine;
use fileheader::templates::TemplateCatalog;
use fileheader::variables::FileContext;

/// 2025-09-08 07:04:52 UTC
pub fn first_instant() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 9, 8, 7, 4, 52).unwrap()
}

/// Two days after [`first_instant`]
pub fn later_instant() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2025, 9, 10, 18, 30, 0).unwrap()
}

/// An engine over the built-in templates with a frozen clock.
pub fn engine_at(instant: DateTime<Utc>) -> HeaderEngine {
  HeaderEngine::with_formatter(Arc::new(TemplateCatalog::builtin()), DateTimeFormatter::fixed(instant))
}

/// A context for a Rust file edited by `alice`.
pub fn rust_context() -> FileContext {
  FileContext::new("rust", "/work/project/src/main.rs")
    .with_relative_path("src/main.rs")
    .with_user_name("alice")
}

/// Writes `content` to `name` under `dir`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
  let path = dir.join(name);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::write(&path, content)?;
  Ok(path)
}

/// The lines of `text` that belong to the labelled section `label`, with the
/// comment token and surrounding whitespace removed.
pub fn section_text(text: &str, comment: &str, label: &str) -> Vec<String> {
  let mut lines = text.lines().map(|line| line.trim().trim_start_matches(comment).trim());
  let mut collected = Vec::new();

  if lines.by_ref().find(|line| line.starts_with(label)).is_none() {
    return collected;
  }
  for line in lines {
    if line.ends_with(':') || (!line.is_empty() && line.chars().all(|c| c == '-')) {
      break;
    }
    if !line.is_empty() && line != "o" {
      collected.push(line.to_string());
    }
  }
  collected
}
