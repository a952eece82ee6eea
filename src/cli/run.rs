//! Running one header operation over a set of files.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info};

use super::RunArgs;
use super::files::{collect_files, host_user_name, language_for};
use crate::comment_syntax::CommentSyntaxTable;
use crate::config::{HeaderConfig, load_config};
use crate::diff::DiffManager;
use crate::document::Document;
use crate::header::{HeaderEngine, HeaderOutcome, Notice};
use crate::info_log;
use crate::logging::{init_tracing, set_quiet, set_verbose};
use crate::output::{
  display_path, print_all_files_ok, print_blank_line, print_file_list, print_hint, print_notices,
  print_start_message, print_summary,
};
use crate::report::{FileAction, FileReport, ProcessingSummary, write_json_report};
use crate::templates::TemplateCatalog;
use crate::variables::FileContext;

/// A header operation applied to each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  Insert,
  Update,
  Refresh,
  Version,
  Todo,
  Check,
}

impl Operation {
  pub const fn as_str(self) -> &'static str {
    match self {
      Operation::Insert => "insert",
      Operation::Update => "update",
      Operation::Refresh => "refresh",
      Operation::Version => "version",
      Operation::Todo => "todo",
      Operation::Check => "check",
    }
  }

  /// Whether the operation ever writes files.
  pub const fn modifies(self) -> bool {
    !matches!(self, Operation::Check)
  }
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Applies one operation to single files.
struct FileRunner {
  operation: Operation,
  engine: HeaderEngine,
  config: HeaderConfig,
  language: Option<String>,
  user_name: String,
  base_dir: PathBuf,
  dry_run: bool,
  diff: DiffManager,
}

impl FileRunner {
  /// Process one file, turning errors into a failed report.
  fn process(&self, path: &Path) -> FileReport {
    match self.try_process(path) {
      Ok(report) => report,
      Err(e) => {
        eprintln!("Error processing {}: {:#}", path.display(), e);
        FileReport::new(path.to_path_buf(), FileAction::Failed)
      }
    }
  }

  fn context_for(&self, path: &Path) -> FileContext {
    let full_path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let relative = pathdiff::diff_paths(&full_path, &self.base_dir).unwrap_or_else(|| path.to_path_buf());

    FileContext::new(
      &language_for(path, self.language.as_deref()),
      &full_path.to_string_lossy(),
    )
    .with_relative_path(&relative.to_string_lossy())
    .with_indent(self.config.tab_size, self.config.insert_spaces)
    .with_user_name(&self.user_name)
  }

  fn try_process(&self, path: &Path) -> Result<FileReport> {
    let original = fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let document = Document::parse(&original);
    let context = self.context_for(path);
    let mut updated = document.clone();

    let (action, notice) = match self.operation {
      Operation::Check => {
        let action = if self.engine.has_header(&document, &context, &self.config) {
          FileAction::Unchanged
        } else {
          FileAction::Missing
        };
        (action, None)
      }
      Operation::Insert | Operation::Update => {
        let outcome = if self.operation == Operation::Insert {
          self.engine.insert_header(&document, &context, &self.config)
        } else {
          self.engine.update_header(&document, &context, &self.config)
        };
        outcome.apply(&mut updated);

        let action = match &outcome {
          HeaderOutcome::Inserted { .. } => FileAction::Added,
          HeaderOutcome::Updated { .. } => FileAction::Updated,
          HeaderOutcome::Skipped(Notice::HeaderNotFound) => FileAction::Missing,
          HeaderOutcome::Skipped(_) => FileAction::Unchanged,
        };
        let notice = outcome.notice().filter(|notice| *notice != Notice::HeaderAlreadyPresent);
        (action, notice)
      }
      Operation::Refresh => match self.engine.refresh(&document, &context, &self.config) {
        Some(changes) => {
          for change in &changes {
            change.apply(&mut updated);
          }
          (FileAction::Refreshed, None)
        }
        None if self.engine.has_header(&document, &context, &self.config) => (FileAction::Unchanged, None),
        None => (FileAction::Missing, Some(Notice::HeaderNotFound)),
      },
      Operation::Version | Operation::Todo => {
        let entry = if self.operation == Operation::Version {
          self.engine.insert_version_entry(&document, &context, &self.config)
        } else {
          self.engine.insert_todo_entry(&document, &context, &self.config)
        };
        entry.apply(&mut updated);
        debug!(path = %path.display(), line = entry.line, text = %entry.text, "entry placed");
        (FileAction::EntryAdded, entry.notice)
      }
    };

    let new_text = updated.to_text();
    let action = if action.is_change() && new_text == original {
      FileAction::Unchanged
    } else {
      action
    };

    if new_text != original {
      self
        .diff
        .display_diff(Path::new(&display_path(path, Some(&self.base_dir))), &original, &new_text)?;
      if !self.dry_run {
        fs::write(path, &new_text).with_context(|| format!("Failed to write file: {}", path.display()))?;
        info!(path = %path.display(), operation = %self.operation, "file written");
      }
    }

    Ok(FileReport::new(path.to_path_buf(), action).with_notice(notice.map(|notice| notice.to_string())))
  }
}

/// Run `operation` over the files named by `args`.
///
/// Exits the process with status 1 when `check` finds files without a header
/// or when any file fails.
pub fn run(operation: Operation, args: RunArgs) -> Result<()> {
  init_tracing(args.quiet, args.verbose);

  if args.verbose > 0 {
    set_verbose();
  } else if args.quiet {
    set_quiet();
  }
  args.colors.apply();

  let base_dir = std::env::current_dir().context("Failed to get current directory")?;
  let mut config = load_config(args.config.as_deref(), &base_dir, args.no_config)?;
  if let Some(style) = args.style {
    config.header_style = style;
  }

  let catalog = match &args.templates {
    Some(path) => TemplateCatalog::load(path),
    None => TemplateCatalog::builtin(),
  };

  let table = CommentSyntaxTable::from_config(&config);
  let files = collect_files(&args.paths, &table)?;

  let dry_run = args.dry_run || !operation.modifies();
  let diff = DiffManager::new(args.show_diff, args.save_diff.clone());
  diff.init()?;

  let runner = FileRunner {
    operation,
    engine: HeaderEngine::new(Arc::new(catalog)),
    config,
    language: args.language.clone(),
    user_name: host_user_name(),
    base_dir,
    dry_run,
    diff,
  };

  print_start_message(files.len(), !dry_run);
  if files.is_empty() {
    return Ok(());
  }

  let start_time = Instant::now();
  let reports: Vec<FileReport> = files.iter().map(|path| runner.process(path)).collect();
  let summary = ProcessingSummary::from_reports(&reports, start_time.elapsed());

  print_blank_line();
  print_results(operation, &reports, &runner.base_dir, dry_run);
  print_notices(&reports, Some(&runner.base_dir));

  print_blank_line();
  print_summary(&summary);

  if operation == Operation::Check && summary.missing > 0 {
    print_blank_line();
    print_hint("Run `fileheader insert` to add missing headers.");
  } else if dry_run && operation.modifies() && summary.changed > 0 {
    print_blank_line();
    print_hint("Run without --dry-run to apply these changes.");
  }

  if let Some(output_path) = &args.report_json {
    write_json_report(output_path, operation.as_str(), &reports, &summary)?;
    info_log!("Generated JSON report at {}", output_path.display());
  }

  if (operation == Operation::Check && summary.missing > 0) || summary.failed > 0 {
    process::exit(1);
  }

  Ok(())
}

fn print_results(operation: Operation, reports: &[FileReport], base_dir: &Path, dry_run: bool) {
  let of = |action: FileAction| -> Vec<&FileReport> { reports.iter().filter(|r| r.action == action).collect() };

  if operation == Operation::Check {
    let missing = of(FileAction::Missing);
    if missing.is_empty() {
      print_all_files_ok();
    } else {
      print_file_list(FileAction::Missing, &missing, Some(base_dir), dry_run);
    }
    return;
  }

  for action in [
    FileAction::Added,
    FileAction::Updated,
    FileAction::Refreshed,
    FileAction::EntryAdded,
    FileAction::Missing,
    FileAction::Failed,
  ] {
    print_file_list(action, &of(action), Some(base_dir), dry_run);
  }

  if crate::logging::is_verbose() {
    print_file_list(FileAction::Unchanged, &of(FileAction::Unchanged), Some(base_dir), dry_run);
  }
}
