use chrono::{DateTime, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AnalyzeError;

/// Inclusive day window; `since == until` for a single-day query.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct DateWindow {
  pub since: NaiveDate,
  pub until: NaiveDate,
}

impl DateWindow {
  pub fn single(day: NaiveDate) -> Self {
    Self { since: day, until: day }
  }

  /// Bounds handed to `git log --since/--until`, covering whole days in local time.
  pub fn git_bounds(&self) -> (String, String) {
    (
      format!("{} 00:00:00", self.since.format("%Y-%m-%d")),
      format!("{} 23:59:59", self.until.format("%Y-%m-%d")),
    )
  }

  pub fn label(&self) -> String {
    if self.since == self.until {
      self.since.format("%Y-%m-%d").to_string()
    } else {
      format!("{} to {}", self.since.format("%Y-%m-%d"), self.until.format("%Y-%m-%d"))
    }
  }
}

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:[T ]+\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$")
    .expect("date regex compiles")
});

/// Parse one date expression into a calendar date.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD` and `YYYY.MM.DD`, optionally followed by a
/// time of day (and offset), which is discarded.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, AnalyzeError> {
  let invalid = || AnalyzeError::InvalidDate { expression: input.to_string() };
  let caps = DATE_RE.captures(input.trim()).ok_or_else(invalid)?;

  let y: i32 = caps[1].parse().map_err(|_| invalid())?;
  let m: u32 = caps[2].parse().map_err(|_| invalid())?;
  let d: u32 = caps[3].parse().map_err(|_| invalid())?;

  NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)
}

/// Resolve a user date expression into a window.
///
/// - none or blank: today..today, where today comes from `now`
/// - `A..B`: `{since: A, until: B}`; an inverted range is passed through unchanged
/// - anything else: a single-day window
pub fn resolve(expression: Option<&str>, now: DateTime<Local>) -> Result<DateWindow, AnalyzeError> {
  let expr = match expression.map(str::trim) {
    Some(e) if !e.is_empty() => e,
    _ => return Ok(DateWindow::single(now.date_naive())),
  };

  if let Some((left, right)) = expr.split_once("..") {
    return Ok(DateWindow {
      since: parse_calendar_date(left)?,
      until: parse_calendar_date(right)?,
    });
  }

  Ok(DateWindow::single(parse_calendar_date(expr)?))
}

/// Parse a `--now-override` string into a local DateTime.
/// Accepts RFC3339 (e.g. 2025-08-15T12:00:00Z) or a naive local timestamp
/// formatted as `%Y-%m-%dT%H:%M:%S`.
pub fn parse_now_override(s: Option<&str>) -> Option<DateTime<Local>> {
  s.and_then(|raw| {
    DateTime::parse_from_rfc3339(raw)
      .ok()
      .map(|dt| dt.with_timezone(&Local))
      .or_else(|| {
        chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
          .ok()
          .and_then(|ndt| ndt.and_local_timezone(Local).single())
      })
  })
}
