//! # Output Module
//!
//! All user-facing terminal output of the `fileheader` binary: start
//! message, per-category file lists, notices, summary and hints.
//!
//! Quiet mode prints bare paths only, so the output of `check -q` can be
//! piped into other tools.

use std::path::Path;

use owo_colors::{OwoColorize, Stream};

use crate::logging::{is_quiet, is_verbose};
use crate::report::{FileAction, FileReport, ProcessingSummary};

/// Symbols used in output
pub mod symbols {
  /// Success/has header
  pub const SUCCESS: &str = "\u{2713}"; // ✓
  /// Missing header/failure
  pub const FAILURE: &str = "\u{2717}"; // ✗
  /// Header rewritten
  pub const UPDATED: &str = "\u{21bb}"; // ↻
  /// Notice
  pub const NOTICE: &str = "!";
}

/// Maximum number of files to show in the default output before truncating
const DEFAULT_FILE_LIST_LIMIT: usize = 20;

/// Print "Checking N files..." or "Processing N files...".
pub fn print_start_message(file_count: usize, modify_mode: bool) {
  if is_quiet() {
    return;
  }

  let verb = if modify_mode { "Processing" } else { "Checking" };
  println!("{} {} {}...", verb, file_count, plural(file_count));
}

/// Print a blank line for visual separation (respects quiet mode).
pub fn print_blank_line() {
  if !is_quiet() {
    println!();
  }
}

/// Print the files of one category under a colored heading.
///
/// Shows at most [`DEFAULT_FILE_LIST_LIMIT`] files unless verbose. In quiet
/// mode only missing files are printed, as bare paths.
pub fn print_file_list(action: FileAction, files: &[&FileReport], base: Option<&Path>, dry_run: bool) {
  if files.is_empty() {
    return;
  }

  let mut sorted: Vec<&FileReport> = files.to_vec();
  sorted.sort_by(|a, b| a.path.cmp(&b.path));

  if is_quiet() {
    if action == FileAction::Missing {
      for file in &sorted {
        println!("{}", display_path(&file.path, base));
      }
    }
    return;
  }

  let count = sorted.len();
  let would = if dry_run { "Would update" } else { "Updated" };
  let heading = match action {
    FileAction::Added => format!(
      "{} {} {} {}:",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      if dry_run { "Would add header to" } else { "Added header to" },
      count,
      plural(count)
    ),
    FileAction::Updated | FileAction::Refreshed => format!(
      "{} {} header in {} {}:",
      symbols::UPDATED.if_supports_color(Stream::Stdout, |s| s.yellow()),
      would,
      count,
      plural(count)
    ),
    FileAction::EntryAdded => format!(
      "{} {} {} {}:",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      if dry_run { "Would add entry to" } else { "Added entry to" },
      count,
      plural(count)
    ),
    FileAction::Missing => format!(
      "{} {} {} missing headers:",
      symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()),
      count,
      plural(count)
    ),
    FileAction::Failed => format!(
      "{} {} {} failed:",
      symbols::FAILURE.if_supports_color(Stream::Stdout, |s| s.red()),
      count,
      plural(count)
    ),
    FileAction::Unchanged => format!(
      "{} {} {} unchanged:",
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
      count,
      plural(count)
    ),
  };
  println!("{heading}");

  let show_all = is_verbose();
  let limit = if show_all { count } else { DEFAULT_FILE_LIST_LIMIT };

  for file in sorted.iter().take(limit) {
    println!("  {}", display_path(&file.path, base));
  }

  if !show_all && count > limit {
    println!(
      "  {} ... and {} more (use -v to see all)",
      "".if_supports_color(Stream::Stdout, |s| s.dimmed()),
      count - limit
    );
  }
}

/// Print the notices attached to file reports.
pub fn print_notices(files: &[FileReport], base: Option<&Path>) {
  if is_quiet() {
    return;
  }

  for file in files {
    if let Some(notice) = &file.notice {
      println!(
        "{} {}: {}",
        symbols::NOTICE.if_supports_color(Stream::Stdout, |s| s.yellow()),
        display_path(&file.path, base),
        notice
      );
    }
  }
}

/// Print the success message when every file already has a header.
pub fn print_all_files_ok() {
  if is_quiet() {
    return;
  }

  println!(
    "{} All files have headers.",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green())
  );
}

/// Print "Summary: X changed, Y unchanged, Z missing, W failed".
///
/// In verbose mode, also shows timing.
pub fn print_summary(summary: &ProcessingSummary) {
  if is_quiet() {
    return;
  }

  let count = |n: usize, bad: bool| {
    if bad && n > 0 {
      n.if_supports_color(Stream::Stdout, |s| s.red()).to_string()
    } else {
      n.if_supports_color(Stream::Stdout, |s| s.cyan()).to_string()
    }
  };

  let mut line = format!(
    "Summary: {} changed, {} unchanged, {} missing, {} failed",
    count(summary.changed, false),
    count(summary.unchanged, false),
    count(summary.missing, true),
    count(summary.failed, true),
  );

  if is_verbose() {
    line.push_str(&format!(" ({:.2}s)", summary.processing_time.as_secs_f64()));
  }

  println!("{line}");
}

/// Print a hint for the user about what to do next.
pub fn print_hint(message: &str) {
  if is_quiet() {
    return;
  }

  println!("{}", message.if_supports_color(Stream::Stdout, |s| s.yellow()));
}

fn plural(count: usize) -> &'static str {
  if count == 1 { "file" } else { "files" }
}

/// `path` relative to `base` for display, or as given when no relative form
/// exists.
pub fn display_path(path: &Path, base: Option<&Path>) -> String {
  base
    .and_then(|base| pathdiff::diff_paths(path, base))
    .filter(|relative| !relative.as_os_str().is_empty())
    .unwrap_or_else(|| path.to_path_buf())
    .to_string_lossy()
    .replace('\\', "/")
}
