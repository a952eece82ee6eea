//! # Date and Time Module
//!
//! Produces the dates and timestamps written into headers. All values are
//! computed in an IANA time zone (UTC by default) through `chrono-tz`, so
//! daylight-saving transitions are honoured rather than approximated by a
//! fixed offset.
//!
//! The current instant comes from a [`Clock`], which lets callers pin time in
//! tests with [`FixedClock`].

use std::sync::{Arc, LazyLock};

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use regex::{Captures, Regex};
use tracing::debug;

/// Time zone used when none (or an unknown one) is configured.
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Source of the current instant.
pub trait Clock: Send + Sync {
  /// The current instant in UTC.
  fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    self.0
  }
}

/// Formats dates for header fields.
#[derive(Clone)]
pub struct DateTimeFormatter {
  clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for DateTimeFormatter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("DateTimeFormatter")
      .field("now", &self.clock.now())
      .finish()
  }
}

impl Default for DateTimeFormatter {
  fn default() -> Self {
    Self::new()
  }
}

impl DateTimeFormatter {
  /// A formatter reading the system clock.
  pub fn new() -> Self {
    Self {
      clock: Arc::new(SystemClock),
    }
  }

  /// A formatter reading the given clock.
  pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
    Self { clock }
  }

  /// A formatter frozen at `instant`.
  pub fn fixed(instant: DateTime<Utc>) -> Self {
    Self::with_clock(Arc::new(FixedClock(instant)))
  }

  /// The current instant according to the clock.
  pub fn now(&self) -> DateTime<Utc> {
    self.clock.now()
  }

  /// Today's date as `YYYY/MM/DD` in `time_zone` (default UTC).
  pub fn today(&self, time_zone: Option<&str>) -> String {
    let local = self.now().with_timezone(&parse_time_zone(time_zone));
    format_pattern(&local, "YYYY/MM/DD")
  }

  /// The current timestamp as `YYYY-MM-DD HH:MM:SS` (24-hour) in `time_zone`.
  pub fn timestamp(&self, time_zone: Option<&str>) -> String {
    let local = self.now().with_timezone(&parse_time_zone(time_zone));
    format_pattern(&local, "YYYY-MM-DD HH:mm:ss")
  }

  /// The current year as four digits.
  pub fn current_year(&self) -> String {
    format!("{:04}", self.now().year())
  }

  /// The current year as four digits in `time_zone`.
  pub fn year_in(&self, time_zone: Option<&str>) -> String {
    let local = self.now().with_timezone(&parse_time_zone(time_zone));
    format_pattern(&local, "YYYY")
  }

  /// Whether `year` is an integer in `1900..=current year + 10`.
  pub fn is_valid_year(&self, year: &str) -> bool {
    match year.trim().parse::<i32>() {
      Ok(value) => (1900..=self.now().year() + 10).contains(&value),
      Err(_) => false,
    }
  }
}

/// Parse an IANA zone name, falling back to UTC for missing or unknown names.
pub fn parse_time_zone(time_zone: Option<&str>) -> Tz {
  let name = time_zone.map(str::trim).filter(|name| !name.is_empty());
  match name {
    Some(name) => name.parse::<Tz>().unwrap_or_else(|_| {
      debug!(time_zone = name, "unknown time zone, using {}", DEFAULT_TIME_ZONE);
      Tz::UTC
    }),
    None => Tz::UTC,
  }
}

/// Replace the tokens `YYYY`, `MM`, `DD`, `HH`, `mm` and `ss` in `pattern`.
///
/// Every occurrence is replaced; the year is four digits and every other
/// component two. No other tokens are recognized.
pub fn format_pattern<T>(date: &DateTime<T>, pattern: &str) -> String
where
  T: TimeZone,
{
  static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"YYYY|MM|DD|HH|mm|ss").expect("date token regex must compile"));

  TOKEN_REGEX
    .replace_all(pattern, |caps: &Captures| match &caps[0] {
      "YYYY" => format!("{:04}", date.year()),
      "MM" => format!("{:02}", date.month()),
      "DD" => format!("{:02}", date.day()),
      "HH" => format!("{:02}", date.hour()),
      "mm" => format!("{:02}", date.minute()),
      _ => format!("{:02}", date.second()),
    })
    .into_owned()
}
