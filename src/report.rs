//! # Report Module
//!
//! Per-file results of a run, the summary computed from them, and the JSON
//! report written by `--report-json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

/// What a run did, or would do, to one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileAction {
  /// A header was inserted
  Added,
  /// An existing header was re-rendered
  Updated,
  /// Volatile fields of the header were rewritten
  Refreshed,
  /// A version or to-do entry was inserted
  EntryAdded,
  /// The file already has a header and nothing changed
  Unchanged,
  /// The file has no header (check) or the operation needs one and found none
  Missing,
  /// The file could not be read or written
  Failed,
}

impl FileAction {
  /// Whether the action changes the file's text.
  pub const fn is_change(self) -> bool {
    matches!(
      self,
      FileAction::Added | FileAction::Updated | FileAction::Refreshed | FileAction::EntryAdded
    )
  }
}

/// The result for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
  #[serde(serialize_with = "serialize_path")]
  pub path: PathBuf,
  pub action: FileAction,
  /// A fallback condition worth telling the user about
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notice: Option<String>,
}

impl FileReport {
  pub const fn new(path: PathBuf, action: FileAction) -> Self {
    Self {
      path,
      action,
      notice: None,
    }
  }

  pub fn with_notice(mut self, notice: Option<String>) -> Self {
    self.notice = notice;
    self
  }
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
  S: serde::Serializer,
{
  serializer.serialize_str(&path.to_string_lossy())
}

/// Counts over all file reports of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessingSummary {
  pub total_files: usize,
  pub changed: usize,
  pub unchanged: usize,
  pub missing: usize,
  pub failed: usize,
  #[serde(skip_serializing)]
  pub processing_time: Duration,
  #[serde(rename = "processing_time_seconds")]
  pub processing_time_secs: f64,
}

impl ProcessingSummary {
  pub fn from_reports(files: &[FileReport], processing_time: Duration) -> Self {
    let mut summary = Self {
      total_files: files.len(),
      processing_time,
      processing_time_secs: processing_time.as_secs_f64(),
      ..Self::default()
    };

    for file in files {
      match file.action {
        action if action.is_change() => summary.changed += 1,
        FileAction::Missing => summary.missing += 1,
        FileAction::Failed => summary.failed += 1,
        _ => summary.unchanged += 1,
      }
    }

    summary
  }
}

#[derive(Serialize)]
struct JsonReport<'a> {
  operation: &'a str,
  summary: &'a ProcessingSummary,
  files: &'a [FileReport],
}

/// Write the JSON report of a run to `output_path`.
pub fn write_json_report(
  output_path: &Path,
  operation: &str,
  files: &[FileReport],
  summary: &ProcessingSummary,
) -> Result<()> {
  let report = JsonReport {
    operation,
    summary,
    files,
  };
  let content = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
  fs::write(output_path, content).with_context(|| format!("Failed to write report to {}", output_path.display()))
}
