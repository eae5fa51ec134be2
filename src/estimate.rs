//! Plain-text serialization of a commit collection and a heuristic token count for it.
//!
//! The count is an approximation for sizing LLM prompts, not a tokenizer.

use std::collections::HashSet;
use std::fmt::Write as _;

use crate::model::{Advisory, CommitRecord, TokenEstimate};
use crate::util::short_hash;

/// Returned by [`render_plain_text`] for an empty collection.
pub const NO_COMMITS: &str = "No matching commits found";

/// Tunable divisors (characters per token) for each character class.
/// Empirical rules of thumb, not measured tokenizer ratios.
pub const CJK_CHARS_PER_TOKEN: f64 = 1.5;
pub const ALNUM_CHARS_PER_TOKEN: f64 = 4.0;
pub const OTHER_CHARS_PER_TOKEN: f64 = 3.0;

/// Upper bounds (inclusive) of the advisory bands.
pub const QUIET_MAX_TOKENS: u64 = 4_000;
pub const MAINSTREAM_MAX_TOKENS: u64 = 16_000;
pub const LONG_CONTEXT_MAX_TOKENS: u64 = 32_000;

fn is_cjk_ideograph(c: char) -> bool {
  ('\u{4e00}'..='\u{9fff}').contains(&c)
}

/// Estimate tokens as `ceil(cjk/1.5 + alnum/4 + other/3)`.
///
/// Every character lands in exactly one class: CJK unified ideographs, ASCII
/// alphanumerics, or everything else (whitespace, punctuation, other scripts).
pub fn count_tokens(text: &str) -> u64 {
  let (mut cjk, mut alnum, mut other) = (0u64, 0u64, 0u64);
  for c in text.chars() {
    if is_cjk_ideograph(c) {
      cjk += 1;
    } else if c.is_ascii_alphanumeric() {
      alnum += 1;
    } else {
      other += 1;
    }
  }
  let raw = cjk as f64 / CJK_CHARS_PER_TOKEN + alnum as f64 / ALNUM_CHARS_PER_TOKEN + other as f64 / OTHER_CHARS_PER_TOKEN;
  raw.ceil() as u64
}

pub fn advisory_for(tokens: u64) -> Option<Advisory> {
  match tokens {
    0..=QUIET_MAX_TOKENS => None,
    t if t <= MAINSTREAM_MAX_TOKENS => Some(Advisory::MainstreamModels),
    t if t <= LONG_CONTEXT_MAX_TOKENS => Some(Advisory::LongContext),
    _ => Some(Advisory::ExceedsContext),
  }
}

/// Aggregate numbers shown at the end of every report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totals {
  pub commits: usize,
  pub authors: usize,
  pub files: usize,
  pub insertions: u64,
  pub deletions: u64,
}

pub fn totals(records: &[CommitRecord]) -> Totals {
  let authors: HashSet<&str> = records.iter().map(|c| c.author_name.as_str()).collect();
  let files: HashSet<&str> = records.iter().flat_map(|c| c.changed_files.iter().map(String::as_str)).collect();
  Totals {
    commits: records.len(),
    authors: authors.len(),
    files: files.len(),
    insertions: records.iter().map(|c| c.insertions).sum(),
    deletions: records.iter().map(|c| c.deletions).sum(),
  }
}

pub fn format_timestamp(c: &CommitRecord) -> String {
  c.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Deterministic text form of the collection, suitable for pasting into a prompt.
pub fn render_plain_text(records: &[CommitRecord]) -> String {
  if records.is_empty() {
    return NO_COMMITS.to_string();
  }

  let mut out = String::new();
  out.push_str("Git Commit Report\n");
  out.push_str("=================\n\n");

  // writing to a String cannot fail
  for (i, c) in records.iter().enumerate() {
    let _ = writeln!(out, "Commit {}:", i + 1);
    let _ = writeln!(out, "Hash: {}", short_hash(&c.hash));
    let _ = writeln!(out, "Date: {}", format_timestamp(c));
    let _ = writeln!(out, "Author: {} <{}>", c.author_name, c.author_email);
    let _ = writeln!(out, "Branch: {}", c.branch);
    let _ = writeln!(out, "Message: {}", c.subject);
    let _ = writeln!(out, "Changes: +{} -{}", c.insertions, c.deletions);
    if !c.changed_files.is_empty() {
      let _ = writeln!(out, "Files changed ({}):", c.changed_files.len());
      for f in &c.changed_files {
        let _ = writeln!(out, "- {}", f);
      }
    }
    if !c.diff_text.is_empty() {
      out.push_str("Diff:\n");
      out.push_str(&c.diff_text);
      if !c.diff_text.ends_with('\n') {
        out.push('\n');
      }
    }
    out.push('\n');
  }

  let t = totals(records);
  out.push_str("Statistics:\n");
  let _ = writeln!(out, "Total commits: {}", t.commits);
  let _ = writeln!(out, "Authors: {}", t.authors);
  let _ = writeln!(out, "Files changed: {}", t.files);
  let _ = writeln!(out, "Line changes: +{} -{}", t.insertions, t.deletions);
  out
}

pub fn estimate_text(text: &str) -> TokenEstimate {
  let token_count = count_tokens(text);
  TokenEstimate {
    token_count,
    character_count: text.chars().count() as u64,
    advisory: advisory_for(token_count),
  }
}

pub fn estimate(records: &[CommitRecord]) -> TokenEstimate {
  estimate_text(&render_plain_text(records))
}
