//! # fileheader
//!
//! Inserts and maintains structured file headers.

use anyhow::Result;
use fileheader::cli::{Cli, run};

fn main() -> Result<()> {
  let cli = Cli::parse_args();
  let (operation, args) = cli.command.into_parts();
  run(operation, args)
}
