//! # Interpolation Module
//!
//! Substitutes `${name}` placeholders in templates, and renders version
//! numbers from the small `{major:02d}` format language.
//!
//! ```rust
//! use fileheader::interpolate::interpolate;
//!
//! assert_eq!(interpolate("${a} and ${b}", &[("a", "x")]), "x and ${b}");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\$\{(\w+)\}").expect("placeholder regex must compile"));

static VERSION_TOKEN_REGEX: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{(major|minor|patch)(:02d)?\}").expect("version token regex must compile"));

/// Anything that can answer "what is the value of this placeholder?".
pub trait VariableSource {
  /// The value for `key`, if one is known.
  fn lookup(&self, key: &str) -> Option<&str>;
}

impl VariableSource for HashMap<String, String> {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.get(key).map(String::as_str)
  }
}

impl VariableSource for BTreeMap<String, String> {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.get(key).map(String::as_str)
  }
}

impl VariableSource for [(&str, &str)] {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.iter().find(|(name, _)| *name == key).map(|(_, value)| *value)
  }
}

impl<const N: usize> VariableSource for [(&str, &str); N] {
  fn lookup(&self, key: &str) -> Option<&str> {
    self.as_slice().lookup(key)
  }
}

/// Replace every `${identifier}` in `template` with its value.
///
/// Unknown placeholders are left verbatim so callers can detect them later.
/// Substituted values are not scanned again.
pub fn interpolate<V>(template: &str, variables: &V) -> String
where
  V: VariableSource + ?Sized,
{
  PLACEHOLDER_REGEX
    .replace_all(template, |caps: &Captures| match variables.lookup(&caps[1]) {
      Some(value) => value.to_string(),
      None => caps[0].to_string(),
    })
    .into_owned()
}

/// Whether `text` still contains a `${...}` placeholder.
pub fn has_placeholder(text: &str) -> bool {
  PLACEHOLDER_REGEX.is_match(text)
}

/// A `(major, minor, patch)` version triple. Ordering is lexicographic,
/// major first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionNumber {
  pub major: u32,
  pub minor: u32,
  pub patch: u32,
}

impl VersionNumber {
  pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
    Self { major, minor, patch }
  }
}

impl VersionNumber {
  /// This version with the fields `fields` does not render set to zero, so
  /// versions compare the way their rendered text reads.
  pub const fn masked(self, fields: VersionFields) -> Self {
    Self {
      major: if fields.major { self.major } else { 0 },
      minor: if fields.minor { self.minor } else { 0 },
      patch: if fields.patch { self.patch } else { 0 },
    }
  }

  /// The next version whose rendering differs: the lowest rendered field is
  /// incremented and the fields below it reset.
  pub const fn bump(self, fields: VersionFields) -> Self {
    if fields.patch {
      Self::new(self.major, self.minor, self.patch.saturating_add(1))
    } else if fields.minor {
      Self::new(self.major, self.minor.saturating_add(1), 0)
    } else {
      Self::new(self.major.saturating_add(1), 0, 0)
    }
  }
}

/// Which of `major`, `minor` and `patch` a version format renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionFields {
  pub major: bool,
  pub minor: bool,
  pub patch: bool,
}

impl VersionFields {
  pub const ALL: Self = Self {
    major: true,
    minor: true,
    patch: true,
  };

  /// The fields rendered by `format`. A format without any version token
  /// renders nothing distinguishable, so it is treated as rendering all.
  pub fn of(format: &str) -> Self {
    let mut fields = Self {
      major: false,
      minor: false,
      patch: false,
    };
    for caps in VERSION_TOKEN_REGEX.captures_iter(format) {
      match &caps[1] {
        "major" => fields.major = true,
        "minor" => fields.minor = true,
        _ => fields.patch = true,
      }
    }
    if fields.major || fields.minor || fields.patch {
      fields
    } else {
      Self::ALL
    }
  }
}

impl Default for VersionNumber {
  fn default() -> Self {
    Self::new(1, 0, 0)
  }
}

/// Render a version with tokens `{major}`, `{minor}`, `{patch}` and their
/// zero-padded `:02d` forms. Anything else in `format` is copied as is.
pub fn format_version(format: &str, version: VersionNumber) -> String {
  VERSION_TOKEN_REGEX
    .replace_all(format, |caps: &Captures| {
      let value = match &caps[1] {
        "major" => version.major,
        "minor" => version.minor,
        _ => version.patch,
      };
      if caps.get(2).is_some() {
        format!("{value:02}")
      } else {
        value.to_string()
      }
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_version_fields_of_format() {
    let default = VersionFields::of("v{major:02d}p{patch:02d}");
    assert!(default.major && !default.minor && default.patch);
    assert_eq!(VersionFields::of("{major}.{minor}.{patch}"), VersionFields::ALL);
    assert_eq!(VersionFields::of("release"), VersionFields::ALL);
  }

  #[test]
  fn test_masked_bump_follows_rendered_fields() {
    let fields = VersionFields::of("v{major:02d}p{patch:02d}");
    let dotted = VersionNumber::new(1, 3, 0);
    assert_eq!(dotted.masked(fields), VersionNumber::new(1, 0, 0));
    assert_eq!(dotted.masked(fields).bump(fields), VersionNumber::new(1, 0, 1));

    let minor_only = VersionFields::of("{major}.{minor}");
    assert_eq!(VersionNumber::new(2, 4, 9).bump(minor_only), VersionNumber::new(2, 5, 0));
  }

  #[test]
  fn test_repeated_placeholder() {
    assert_eq!(interpolate("${name} likes ${name}", &[("name", "Kim")]), "Kim likes Kim");
  }

  #[test]
  fn test_unknown_placeholder_left_verbatim() {
    assert_eq!(interpolate("${a} and ${b}", &[("a", "x")]), "x and ${b}");
  }

  #[test]
  fn test_empty_template() {
    assert_eq!(interpolate("", &[("a", "x")]), "");
  }

  #[test]
  fn test_no_recursive_substitution() {
    assert_eq!(interpolate("${a}", &[("a", "${b}"), ("b", "deep")]), "${b}");
  }

  #[test]
  fn test_empty_value_is_substituted() {
    let mut vars = HashMap::new();
    vars.insert("email".to_string(), String::new());
    assert_eq!(interpolate("<${email}>", &vars), "<>");
  }

  #[test]
  fn test_malformed_placeholders_untouched() {
    assert_eq!(interpolate("${} ${a-b} $a {a}", &[("a", "x")]), "${} ${a-b} $a {a}");
  }

  #[test]
  fn test_has_placeholder() {
    assert!(has_placeholder("// ${comment} x"));
    assert!(!has_placeholder("// plain $ text {x}"));
  }

  #[test]
  fn test_format_version_default_format() {
    assert_eq!(format_version("v{major:02d}p{patch:02d}", VersionNumber::new(1, 0, 3)), "v01p03");
  }

  #[test]
  fn test_format_version_plain_and_unknown_tokens() {
    let version = VersionNumber::new(2, 5, 11);
    assert_eq!(format_version("{major}.{minor}.{patch}", version), "2.5.11");
    assert_eq!(format_version("v{minor:02d}-{build}", version), "v05-{build}");
  }

  #[test]
  fn test_version_ordering_is_major_first() {
    assert!(VersionNumber::new(2, 0, 0) > VersionNumber::new(1, 9, 9));
    assert!(VersionNumber::new(1, 2, 0) > VersionNumber::new(1, 1, 9));
    assert!(VersionNumber::new(1, 1, 3) > VersionNumber::new(1, 1, 2));
  }
}
