//! # CLI Module
//!
//! The command-line host around the header engine. It uses clap for argument
//! parsing, with one subcommand per header operation sharing a common set of
//! arguments.

mod files;
mod run;

use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Args, Parser, Subcommand};
pub use files::{collect_files, host_user_name, language_for};
pub use run::{Operation, run};

use crate::logging::ColorMode;
use crate::templates::HeaderStyle;

const CUSTOM_STYLES: Styles = Styles::styled()
  .header(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .usage(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))).bold())
  .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Blue))).bold())
  .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
  .error(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))).bold())
  .valid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
  .invalid(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))));

/// Top-level CLI arguments
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about,
  styles = CUSTOM_STYLES,
  after_help = "Examples:
  # Report files without a header
  fileheader check src/

  # Insert headers, previewing the change first
  fileheader insert --dry-run --show-diff src/
  fileheader insert src/

  # Re-render headers after changing the configuration
  fileheader update --config .fileheader.toml src/

  # Refresh Last Updated and Editor on a file you just edited
  fileheader refresh src/main.rs

  # Add a version-history or to-do entry
  fileheader version src/main.rs
  fileheader todo src/main.rs
",
  help_template = "{before-help}{name} v{version}
{about-section}
{usage-heading} {usage}

{all-args}{after-help}
"
)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Insert a header into files that have none
  Insert(RunArgs),
  /// Re-render existing headers, keeping description, history and to-do
  /// entries
  Update(RunArgs),
  /// Rewrite the Last Updated and Editor fields of existing headers
  Refresh(RunArgs),
  /// Add a version-history entry numbered after the latest one
  Version(RunArgs),
  /// Add a to-do entry numbered after the latest one
  Todo(RunArgs),
  /// Report files without a header; exits with status 1 if any
  Check(RunArgs),
}

impl Cli {
  /// Parse CLI arguments and return the Cli struct
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

impl Command {
  /// The operation and its arguments.
  pub fn into_parts(self) -> (Operation, RunArgs) {
    match self {
      Command::Insert(args) => (Operation::Insert, args),
      Command::Update(args) => (Operation::Update, args),
      Command::Refresh(args) => (Operation::Refresh, args),
      Command::Version(args) => (Operation::Version, args),
      Command::Todo(args) => (Operation::Todo, args),
      Command::Check(args) => (Operation::Check, args),
    }
  }
}

/// Arguments shared by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
  /// Files or directories to process. Directories are walked recursively and
  /// only files with a known comment syntax are kept.
  #[arg(required = true, value_name = "PATH")]
  pub paths: Vec<PathBuf>,

  /// Path to config file (default: .fileheader.toml in the current directory)
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Ignore config file even if present
  #[arg(long)]
  pub no_config: bool,

  /// Template file (TOML or JSON) replacing the built-in templates
  #[arg(long, value_name = "FILE")]
  pub templates: Option<PathBuf>,

  /// Language id or extension to use for every file instead of the file's
  /// own extension
  #[arg(long, value_name = "ID")]
  pub language: Option<String>,

  /// Header style, overriding the configuration
  #[arg(long, value_enum)]
  pub style: Option<HeaderStyle>,

  /// Show what would change without writing any file
  #[arg(long)]
  pub dry_run: bool,

  /// Print a unified diff of every change to stderr
  #[arg(long)]
  pub show_diff: bool,

  /// Append a unified diff of every change to a file
  #[arg(long, value_name = "FILE")]
  pub save_diff: Option<PathBuf>,

  /// Write a JSON report of the run to a file
  #[arg(long, value_name = "FILE")]
  pub report_json: Option<PathBuf>,

  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Control when to use colored output (auto, never, always)
  #[arg(
    long,
    value_name = "WHEN",
    num_args = 0..=1,
    default_value_t = ColorMode::Auto,
    default_missing_value = "always",
    value_enum
  )]
  pub colors: ColorMode,
}
