//! File collection and per-file context for the command-line host.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::debug;
use walkdir::WalkDir;

use crate::comment_syntax::CommentSyntaxTable;
use crate::verbose_log;

/// Environment variables consulted for the host user name, in order.
const USER_ENV_VARS: [&str; 2] = ["USER", "USERNAME"];

/// Expand `paths` into the files to process.
///
/// Files named explicitly are always kept. Directories are walked
/// recursively, skipping hidden entries, and keep only files whose extension
/// `table` knows. The result is sorted and free of duplicates.
pub fn collect_files(paths: &[PathBuf], table: &CommentSyntaxTable) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();

  for path in paths {
    if path.is_file() {
      files.push(path.clone());
    } else if path.is_dir() {
      let before = files.len();
      let walker = WalkDir::new(path)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

      for entry in walker {
        let entry = match entry {
          Ok(entry) => entry,
          Err(e) => {
            eprintln!("Error reading directory entry: {e}");
            continue;
          }
        };
        if !entry.file_type().is_file() {
          continue;
        }
        if is_supported(entry.path(), table) {
          files.push(entry.into_path());
        } else {
          verbose_log!("Skipping: {} (unknown comment syntax)", entry.path().display());
        }
      }
      debug!(dir = %path.display(), found = files.len() - before, "walked directory");
    } else {
      bail!("No such file or directory: {}", path.display());
    }
  }

  files.sort();
  files.dedup();
  Ok(files)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
  name.to_string_lossy().starts_with('.')
}

fn is_supported(path: &Path, table: &CommentSyntaxTable) -> bool {
  path
    .extension()
    .map(|ext| table.is_extension_supported(&ext.to_string_lossy()))
    .unwrap_or(false)
}

/// The language id (or dotted extension) used to resolve `path`'s comment
/// token. An explicit `--language` wins; files without an extension fall back
/// to their file name, which resolves to the default token.
pub fn language_for(path: &Path, explicit: Option<&str>) -> String {
  if let Some(language) = explicit.filter(|language| !language.trim().is_empty()) {
    return language.trim().to_string();
  }
  match path.extension() {
    Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
    None => path
      .file_name()
      .map(|name| name.to_string_lossy().to_lowercase())
      .unwrap_or_default(),
  }
}

/// The user name of the current process, or an empty string.
pub fn host_user_name() -> String {
  USER_ENV_VARS
    .iter()
    .filter_map(|var| std::env::var(var).ok())
    .find(|name| !name.trim().is_empty())
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use std::fs;

  use tempfile::tempdir;

  use super::*;

  #[test]
  fn test_collect_files_filters_directories_by_extension() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    fs::create_dir_all(dir.path().join(".git")).unwrap();
    fs::write(dir.path().join("src/main.rs"), "").unwrap();
    fs::write(dir.path().join("src/nested/util.py"), "").unwrap();
    fs::write(dir.path().join("src/data.bin"), "").unwrap();
    fs::write(dir.path().join(".git/config.rs"), "").unwrap();
    fs::write(dir.path().join("notes.bin"), "").unwrap();

    let table = CommentSyntaxTable::builtin();
    let files = collect_files(&[dir.path().to_path_buf(), dir.path().join("notes.bin")], &table).unwrap();

    assert_eq!(
      files,
      vec![
        dir.path().join("notes.bin"),
        dir.path().join("src/main.rs"),
        dir.path().join("src/nested/util.py"),
      ]
    );
  }

  #[test]
  fn test_collect_files_rejects_missing_path() {
    let dir = tempdir().unwrap();
    let result = collect_files(&[dir.path().join("missing")], &CommentSyntaxTable::builtin());
    assert!(result.is_err());
  }

  #[test]
  fn test_language_for() {
    assert_eq!(language_for(Path::new("src/Main.RS"), None), ".rs");
    assert_eq!(language_for(Path::new("Makefile"), None), "makefile");
    assert_eq!(language_for(Path::new("a.rs"), Some("python")), "python");
    assert_eq!(language_for(Path::new("a.rs"), Some("  ")), ".rs");
  }
}
