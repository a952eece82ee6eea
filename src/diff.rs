//! # Diff Module
//!
//! Renders the change a command would make to a file as a unified diff. Used
//! by `--show-diff` (printed to stderr) and `--save-diff` (appended to a file).

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use similar::TextDiff;

/// Lines of unchanged context around each hunk.
const CONTEXT_RADIUS: usize = 3;

/// Shows and/or saves diffs of proposed header changes.
#[derive(Debug, Default)]
pub struct DiffManager {
  /// Print diffs to stderr
  pub show_diff: bool,

  /// Append diffs to this file
  pub save_diff_path: Option<PathBuf>,
}

impl DiffManager {
  pub const fn new(show_diff: bool, save_diff_path: Option<PathBuf>) -> Self {
    Self {
      show_diff,
      save_diff_path,
    }
  }

  /// Whether this manager does anything with a diff.
  pub const fn is_active(&self) -> bool {
    self.show_diff || self.save_diff_path.is_some()
  }

  /// Truncate the diff file so a run starts from an empty one.
  pub fn init(&self) -> Result<()> {
    if let Some(path) = &self.save_diff_path {
      std::fs::write(path, "").with_context(|| format!("Failed to create diff file: {}", path.display()))?;
    }
    Ok(())
  }

  /// Show and/or save the diff between `original` and `new` for `path`.
  ///
  /// Nothing is emitted when the texts are equal.
  pub fn display_diff(&self, path: &Path, original: &str, new: &str) -> Result<()> {
    if original == new || !self.is_active() {
      return Ok(());
    }

    let diff = unified_diff(path, original, new);

    if self.show_diff {
      for line in diff.lines() {
        match line.chars().next() {
          Some('+') if !line.starts_with("+++") => {
            eprintln!("{}", line.if_supports_color(Stream::Stderr, |l| l.green()))
          }
          Some('-') if !line.starts_with("---") => {
            eprintln!("{}", line.if_supports_color(Stream::Stderr, |l| l.red()))
          }
          Some('@') => eprintln!("{}", line.if_supports_color(Stream::Stderr, |l| l.cyan())),
          _ => eprintln!("{line}"),
        }
      }
    }

    if let Some(diff_path) = &self.save_diff_path {
      let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(diff_path)
        .with_context(|| format!("Failed to open diff file: {}", diff_path.display()))?;
      file
        .write_all(diff.as_bytes())
        .with_context(|| format!("Failed to write diff file: {}", diff_path.display()))?;
    }

    Ok(())
  }
}

/// A unified diff of `original` against `new`, labelled `a/<path>` and
/// `b/<path>`.
pub fn unified_diff(path: &Path, original: &str, new: &str) -> String {
  let label = path.to_string_lossy().replace('\\', "/");
  TextDiff::from_lines(original, new)
    .unified_diff()
    .context_radius(CONTEXT_RADIUS)
    .header(&format!("a/{label}"), &format!("b/{label}"))
    .to_string()
}
