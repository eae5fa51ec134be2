// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Present an Analysis as console text, plain text for prompts, a markdown file, or JSON
// role: presentation/renderers
// inputs: Analysis (metadata, commits, skipped branches, token estimate); generation time for markdown
// outputs: Text on any io::Write; markdown file at a caller-chosen path
// side_effects: export_markdown creates or overwrites one file
// invariants:
// - renderers never query git; they only read the Analysis
// - plain mode body is exactly estimate::render_plain_text
// - console diff preview is capped at DIFF_PREVIEW_LINES with a remainder marker
// errors: io errors propagate; markdown write failures map to AnalyzeError::Export
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::analysis::Analysis;
use crate::error::AnalyzeError;
use crate::estimate::{format_timestamp, render_plain_text, totals, NO_COMMITS};
use crate::model::{AnalysisMetadata, CommitRecord, SkippedBranch, TokenEstimate};
use crate::util::short_hash;

/// Diff lines shown per commit in console mode.
pub const DIFF_PREVIEW_LINES: usize = 100;

const BANNER_WIDTH: usize = 60;

fn write_header<W: Write>(w: &mut W, m: &AnalysisMetadata) -> io::Result<()> {
  writeln!(w, "Directory: {}", m.directory)?;
  writeln!(w, "Branch: {}", m.branch_label)?;
  writeln!(w, "Author: {}", m.author_label())?;
  writeln!(w, "Date: {}", m.window.label())
}

fn write_estimate<W: Write>(w: &mut W, est: &TokenEstimate) -> io::Result<()> {
  writeln!(w, "Estimated tokens: {} ({} characters)", est.token_count, est.character_count)?;
  if let Some(advisory) = est.advisory {
    writeln!(w, "Note: {}", advisory.message())?;
  }
  Ok(())
}

fn write_skipped<W: Write>(w: &mut W, skipped: &[SkippedBranch]) -> io::Result<()> {
  if skipped.is_empty() {
    return Ok(());
  }
  writeln!(w)?;
  writeln!(w, "Skipped branches:")?;
  for s in skipped {
    writeln!(w, "  {}: {}", s.branch, s.reason)?;
  }
  Ok(())
}

/// Commit counts per branch, largest first; ties ordered by name.
pub fn branch_counts(commits: &[CommitRecord]) -> Vec<(String, usize)> {
  let mut counts: HashMap<&str, usize> = HashMap::new();
  for c in commits {
    *counts.entry(c.branch.as_str()).or_insert(0) += 1;
  }
  let mut out: Vec<(String, usize)> = counts.into_iter().map(|(b, n)| (b.to_string(), n)).collect();
  out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
  out
}

/// First `max_lines` lines of `diff` and the number of lines left out.
pub fn preview_lines(diff: &str, max_lines: usize) -> (Vec<&str>, usize) {
  let lines: Vec<&str> = diff.lines().collect();
  if lines.len() <= max_lines {
    return (lines, 0);
  }
  let rest = lines.len() - max_lines;
  (lines[..max_lines].to_vec(), rest)
}

pub fn render_console<W: Write>(w: &mut W, a: &Analysis) -> io::Result<()> {
  writeln!(w, "Git commit analysis")?;
  write_header(w, &a.metadata)?;
  writeln!(w)?;

  if a.commits.is_empty() {
    writeln!(w, "{}", NO_COMMITS)?;
    return write_skipped(w, &a.skipped);
  }

  for (i, c) in a.commits.iter().enumerate() {
    writeln!(w, "[{}] {} {}", i + 1, short_hash(&c.hash), c.subject)?;
    writeln!(w, "    Author: {} <{}>", c.author_name, c.author_email)?;
    writeln!(w, "    Date:   {}", format_timestamp(c))?;
    writeln!(w, "    Branch: {}", c.branch)?;
    writeln!(w, "    Changes: +{} -{} in {} file(s)", c.insertions, c.deletions, c.changed_files.len())?;
    for f in &c.changed_files {
      writeln!(w, "      {}", f)?;
    }
    if !c.diff_text.is_empty() {
      let (shown, rest) = preview_lines(&c.diff_text, DIFF_PREVIEW_LINES);
      writeln!(w, "    Diff:")?;
      for line in shown {
        writeln!(w, "      {}", line)?;
      }
      if rest > 0 {
        writeln!(w, "      … {} more lines", rest)?;
      }
    }
    writeln!(w)?;
  }

  if a.branches.len() > 1 {
    writeln!(w, "Commits per branch:")?;
    for (branch, n) in branch_counts(&a.commits) {
      writeln!(w, "  {}: {}", branch, n)?;
    }
    writeln!(w)?;
  }

  let t = totals(&a.commits);
  writeln!(w, "Statistics:")?;
  writeln!(w, "  Total commits: {}", t.commits)?;
  writeln!(w, "  Authors: {}", t.authors)?;
  writeln!(w, "  Files changed: {}", t.files)?;
  writeln!(w, "  Line changes: +{} -{}", t.insertions, t.deletions)?;
  write_estimate(w, &a.estimate)?;
  write_skipped(w, &a.skipped)
}

/// Header, then the prompt-ready text between banner lines, then the estimate.
pub fn render_plain<W: Write>(w: &mut W, a: &Analysis) -> io::Result<()> {
  let banner = "=".repeat(BANNER_WIDTH);
  write_header(w, &a.metadata)?;
  writeln!(w, "{}", banner)?;
  let body = render_plain_text(&a.commits);
  write!(w, "{}", body)?;
  if !body.ends_with('\n') {
    writeln!(w)?;
  }
  writeln!(w, "{}", banner)?;
  write_estimate(w, &a.estimate)?;
  write_skipped(w, &a.skipped)
}

/// Sorted, deduplicated names.
fn distinct<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
  let set: BTreeSet<&str> = names.collect();
  set.into_iter().collect()
}

fn count_with_names(names: &[&str]) -> String {
  if names.is_empty() {
    return "0".to_string();
  }
  format!("{} ({})", names.len(), names.join(", "))
}

/// A backtick fence longer than any backtick run inside `body`.
pub fn fence_for(body: &str) -> String {
  let longest = body.split(|ch: char| ch != '`').map(str::len).max().unwrap_or(0);
  "`".repeat(longest.max(2) + 1)
}

pub fn render_markdown(a: &Analysis, generated_at: DateTime<Local>) -> String {
  use std::fmt::Write as _;

  let m = &a.metadata;
  let mut s = String::new();
  // writing to a String cannot fail
  let _ = writeln!(s, "# Git Commit Report\n");
  let _ = writeln!(s, "## Analysis\n");
  let _ = writeln!(s, "- **Directory**: `{}`", m.directory);
  let _ = writeln!(s, "- **Branch**: {}", m.branch_label);
  let _ = writeln!(s, "- **Author**: {}", m.author_label());
  let _ = writeln!(s, "- **Date**: {}", m.window.label());
  let _ = writeln!(s, "- **Total commits**: {}\n", a.commits.len());

  let t = totals(&a.commits);
  let branches = distinct(a.commits.iter().map(|c| c.branch.as_str()));
  let authors = distinct(a.commits.iter().map(|c| c.author_name.as_str()));
  let _ = writeln!(s, "## Summary\n");
  let _ = writeln!(s, "| Metric | Value |");
  let _ = writeln!(s, "|---|---|");
  let _ = writeln!(s, "| Total commits | {} |", t.commits);
  let _ = writeln!(s, "| Branches | {} |", count_with_names(&branches));
  let _ = writeln!(s, "| Authors | {} |", count_with_names(&authors));
  let _ = writeln!(s, "| Files changed | {} |", t.files);
  let _ = writeln!(s, "| Line changes | +{} -{} |", t.insertions, t.deletions);
  let _ = writeln!(s, "| Estimated tokens | {} |", a.estimate.token_count);
  if let Some(advisory) = a.estimate.advisory {
    let _ = writeln!(s, "\n> {}", advisory.message());
  }
  s.push('\n');

  let _ = writeln!(s, "## Commits\n");
  if a.commits.is_empty() {
    let _ = writeln!(s, "{}\n", NO_COMMITS);
  }
  for (i, c) in a.commits.iter().enumerate() {
    let _ = writeln!(s, "### {}. {}\n", i + 1, c.subject);
    let _ = writeln!(s, "- **Hash**: `{}`", short_hash(&c.hash));
    let _ = writeln!(s, "- **Author**: {} <{}>", c.author_name, c.author_email);
    let _ = writeln!(s, "- **Date**: {}", format_timestamp(c));
    let _ = writeln!(s, "- **Branch**: {}", c.branch);
    let _ = writeln!(s, "- **Changes**: +{} -{}\n", c.insertions, c.deletions);
    if !c.changed_files.is_empty() {
      let _ = writeln!(s, "**Files changed ({})**\n", c.changed_files.len());
      for f in &c.changed_files {
        let _ = writeln!(s, "- `{}`", f);
      }
      s.push('\n');
    }
    if !c.diff_text.is_empty() {
      let fence = fence_for(&c.diff_text);
      let _ = writeln!(s, "{}diff", fence);
      s.push_str(&c.diff_text);
      if !c.diff_text.ends_with('\n') {
        s.push('\n');
      }
      let _ = writeln!(s, "{}\n", fence);
    }
  }

  if !a.skipped.is_empty() {
    let _ = writeln!(s, "## Skipped branches\n");
    for sk in &a.skipped {
      let _ = writeln!(s, "- `{}`: {}", sk.branch, sk.reason);
    }
    s.push('\n');
  }

  let _ = writeln!(s, "---");
  let _ = writeln!(s, "_Generated at {}_", generated_at.format("%Y-%m-%d %H:%M:%S"));
  s
}

/// Write the markdown report to `path`, replacing any existing file.
pub fn export_markdown(path: &Path, a: &Analysis, generated_at: DateTime<Local>) -> Result<(), AnalyzeError> {
  std::fs::write(path, render_markdown(a, generated_at)).map_err(|source| AnalyzeError::Export {
    path: path.display().to_string(),
    source,
  })
}

#[derive(Serialize)]
struct JsonReport<'a> {
  metadata: &'a AnalysisMetadata,
  commits: &'a [CommitRecord],
  estimate: &'a TokenEstimate,
  skipped_branches: &'a [SkippedBranch],
}

pub fn render_json<W: Write>(w: &mut W, a: &Analysis) -> Result<()> {
  let report = JsonReport {
    metadata: &a.metadata,
    commits: &a.commits,
    estimate: &a.estimate,
    skipped_branches: &a.skipped,
  };
  serde_json::to_writer_pretty(&mut *w, &report)?;
  writeln!(w)?;
  Ok(())
}
