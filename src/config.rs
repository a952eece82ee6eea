//! # Configuration Module
//!
//! This module holds [`HeaderConfig`], the single configuration snapshot every
//! render reads from. All fields and their defaults are declared here, in one
//! place, so no call site has to invent its own fallback.
//!
//! Configuration can be specified in a `.fileheader.toml` file or via the
//! `FILEHEADER_CONFIG` environment variable. Keys are kebab-case
//! (`project-name`); the camelCase names used by editor settings stores
//! (`projectName`) are accepted as aliases.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::datetime::DateTimeFormatter;
use crate::templates::HeaderStyle;
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".fileheader.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "FILEHEADER_CONFIG";

/// `version-format` value that selects `custom-version-format`.
pub const CUSTOM_VERSION_FORMAT: &str = "custom";

/// Allowed range for `separator-length`.
pub const SEPARATOR_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 10..=200;

const DEFAULT_VERSION_FORMAT: &str = "v{major:02d}p{patch:02d}";

/// Configuration snapshot consumed by variable resolution and header updates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HeaderConfig {
  #[serde(alias = "projectName")]
  pub project_name: String,

  #[serde(alias = "companyName")]
  pub company_name: String,

  /// First copyright year; the current year when unset.
  #[serde(alias = "copyrightStartYears", deserialize_with = "deserialize_year")]
  pub copyright_start_years: Option<String>,

  /// Author display name; the host user name when unset.
  #[serde(alias = "authorFullName")]
  pub author_full_name: Option<String>,

  #[serde(alias = "authorEmail")]
  pub author_email: String,

  #[serde(alias = "authorTitle")]
  pub author_title: String,

  #[serde(alias = "teamName")]
  pub team_name: String,

  /// License id such as `MIT`, or `Custom` for `custom-license-text`.
  #[serde(alias = "licenseType")]
  pub license_type: String,

  #[serde(alias = "customLicenseText")]
  pub custom_license_text: Option<String>,

  #[serde(alias = "licenseUrl")]
  pub license_url: String,

  /// Template over `startYear`, `endYear`, `companyName` and `author`.
  #[serde(alias = "copyrightNotice")]
  pub copyright_notice: String,

  /// Template over `projectName`.
  #[serde(alias = "projectDescription")]
  pub project_description: String,

  #[serde(alias = "headerStyle")]
  pub header_style: HeaderStyle,

  #[serde(alias = "separatorChar")]
  pub separator_char: char,

  /// Total width of a rule line, comment token included.
  #[serde(alias = "separatorLength")]
  pub separator_length: usize,

  /// Version pattern, or `custom` to use `custom-version-format`.
  #[serde(alias = "versionFormat")]
  pub version_format: String,

  #[serde(alias = "customVersionFormat")]
  pub custom_version_format: String,

  #[serde(alias = "autoUpdateLastModified")]
  pub auto_update_last_modified: bool,

  #[serde(alias = "autoUpdateEditor")]
  pub auto_update_editor: bool,

  /// IANA zone name for dates; UTC when unset.
  #[serde(alias = "timeZone")]
  pub time_zone: Option<String>,

  /// Comment tokens keyed by language id, overriding the built-in table.
  #[serde(alias = "commentTokenMap")]
  pub comment_token_map: HashMap<String, String>,

  /// Extension lists keyed by language id, merged over the built-in table.
  #[serde(alias = "languageExtensions")]
  pub language_extensions: HashMap<String, Vec<String>>,

  /// Interpreter paths keyed by language id, written as `#!{path}`.
  #[serde(alias = "shebangPerLanguage")]
  pub shebang_per_language: HashMap<String, String>,

  /// Section lines equal to one of these (after the comment token) are
  /// scaffolding and are not carried over on update.
  #[serde(alias = "extractionSentinels")]
  pub extraction_sentinels: Vec<String>,

  /// Name written into the `Editor :` field.
  #[serde(alias = "editorName")]
  pub editor_name: String,

  #[serde(alias = "tabSize")]
  pub tab_size: u32,

  #[serde(alias = "insertSpaces")]
  pub insert_spaces: bool,
}

impl Default for HeaderConfig {
  fn default() -> Self {
    Self {
      project_name: "Untitled Project".to_string(),
      company_name: "Company".to_string(),
      copyright_start_years: None,
      author_full_name: None,
      author_email: String::new(),
      author_title: String::new(),
      team_name: String::new(),
      license_type: "All Rights Reserved".to_string(),
      custom_license_text: None,
      license_url: String::new(),
      copyright_notice: "(C) Copyright ${startYear}-${endYear} ${companyName}".to_string(),
      project_description: "This module provides core functionality for the ${projectName} application".to_string(),
      header_style: HeaderStyle::Standard,
      separator_char: '-',
      separator_length: 70,
      version_format: DEFAULT_VERSION_FORMAT.to_string(),
      custom_version_format: DEFAULT_VERSION_FORMAT.to_string(),
      auto_update_last_modified: true,
      auto_update_editor: true,
      time_zone: None,
      comment_token_map: HashMap::new(),
      language_extensions: HashMap::new(),
      shebang_per_language: HashMap::new(),
      extraction_sentinels: vec!["<Error>".to_string()],
      editor_name: "fileheader".to_string(),
      tab_size: 4,
      insert_spaces: true,
    }
  }
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A field holds a value outside its allowed shape or range.
  #[error("Invalid value for '{field}': {message}")]
  InvalidField { field: String, message: String },
}

impl ConfigError {
  fn invalid(field: &str, message: &str) -> Self {
    Self::InvalidField {
      field: field.to_string(),
      message: message.to_string(),
    }
  }
}

/// Accept the start year as either a TOML string or integer.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Year {
    Text(String),
    Number(i64),
  }

  Ok(Option::<Year>::deserialize(deserializer)?.map(|year| match year {
    Year::Text(text) => text,
    Year::Number(number) => number.to_string(),
  }))
}

impl HeaderConfig {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read, parsed,
  /// or fails validation.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: HeaderConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;

    verbose_log!(
      "Loaded config: style {}, {} comment token overrides",
      config.header_style,
      config.comment_token_map.len()
    );

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - `separator-length` is within 10..=200
  /// - `copyright-start-years`, when set, is a plausible year
  /// - `author-email` and `license-url`, when set, are well formed
  /// - `copyright-notice` and `project-description` are non-empty
  /// - Every `comment-token-map` entry has a valid id and a non-empty token
  pub fn validate(&self) -> Result<(), ConfigError> {
    validate_separator_length(self.separator_length).map_err(|m| ConfigError::invalid("separator-length", m))?;

    if let Some(year) = &self.copyright_start_years {
      validate_year(year, &DateTimeFormatter::new()).map_err(|m| ConfigError::invalid("copyright-start-years", m))?;
    }

    validate_email(&self.author_email).map_err(|m| ConfigError::invalid("author-email", m))?;
    validate_url(&self.license_url).map_err(|m| ConfigError::invalid("license-url", m))?;
    validate_non_empty(&self.copyright_notice, "Copyright notice cannot be empty")
      .map_err(|m| ConfigError::invalid("copyright-notice", m))?;
    validate_non_empty(&self.project_description, "Project description cannot be empty")
      .map_err(|m| ConfigError::invalid("project-description", m))?;

    for (language, token) in &self.comment_token_map {
      validate_identifier(language).map_err(|m| ConfigError::invalid("comment-token-map", m))?;
      validate_comment_token(token).map_err(|m| ConfigError::InvalidField {
        field: format!("comment-token-map.{language}"),
        message: m.to_string(),
      })?;
    }

    Ok(())
  }

  /// The version pattern in effect, resolving `custom`.
  pub fn effective_version_format(&self) -> &str {
    if self.version_format == CUSTOM_VERSION_FORMAT {
      &self.custom_version_format
    } else {
      &self.version_format
    }
  }
}

static EMAIL_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile"));

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://.+").expect("url regex must compile"));

static IDENTIFIER_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("identifier regex must compile"));

fn validate_non_empty<'a>(value: &str, message: &'a str) -> Result<(), &'a str> {
  if value.trim().is_empty() { Err(message) } else { Ok(()) }
}

/// An empty value is accepted; anything else must look like `a@b.c`.
pub fn validate_email(value: &str) -> Result<(), &'static str> {
  if value.is_empty() || EMAIL_REGEX.is_match(value) {
    Ok(())
  } else {
    Err("Please enter a valid email address")
  }
}

/// An empty value is accepted; anything else must be an http(s) URL.
pub fn validate_url(value: &str) -> Result<(), &'static str> {
  if value.is_empty() || URL_REGEX.is_match(value) {
    Ok(())
  } else {
    Err("Please enter a valid HTTP or HTTPS URL")
  }
}

pub fn validate_separator_length(length: usize) -> Result<(), &'static str> {
  if SEPARATOR_LENGTH_RANGE.contains(&length) {
    Ok(())
  } else {
    Err("Please enter a number between 10 and 200")
  }
}

pub fn validate_year(year: &str, formatter: &DateTimeFormatter) -> Result<(), &'static str> {
  if formatter.is_valid_year(year) {
    Ok(())
  } else {
    Err("Please enter a valid year between 1900 and current year + 10")
  }
}

/// Language ids are letters, digits, hyphens and underscores.
pub fn validate_identifier(value: &str) -> Result<(), &'static str> {
  if value.trim().is_empty() {
    Err("Language ID cannot be empty")
  } else if !IDENTIFIER_REGEX.is_match(value) {
    Err("Language ID should contain only letters, numbers, hyphens, and underscores")
  } else {
    Ok(())
  }
}

pub fn validate_comment_token(value: &str) -> Result<(), &'static str> {
  validate_non_empty(value, "Comment token cannot be empty")
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `FILEHEADER_CONFIG` environment variable
/// 3. `.fileheader.toml` in `search_dir`
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, search_dir: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let local_config = search_dir.join(DEFAULT_CONFIG_FILENAME);
  if local_config.exists() {
    verbose_log!("Using config: {}", local_config.display());
    return Some(local_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path, or fall back to defaults.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `search_dir` - Directory searched for `.fileheader.toml`
/// * `no_config` - If true, skip config file discovery and use defaults
pub fn load_config(explicit_path: Option<&Path>, search_dir: &Path, no_config: bool) -> Result<HeaderConfig> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(HeaderConfig::default());
  }

  match discover_config_path(explicit_path, search_dir) {
    Some(path) => {
      HeaderConfig::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
    }
    None => Ok(HeaderConfig::default()),
  }
}
