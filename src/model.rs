// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Define the data model (commits, log entries, branches, diff summaries, token estimates) shared by aggregation and rendering
// role: model/types
// outputs: Serializable structs with stable field names
// invariants: CommitRecord.hash unique within an aggregation; changed_files never null (empty on failure); counts never negative
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::window::DateWindow;

/// One analyzed commit, fully enriched.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CommitRecord {
  pub hash: String,
  /// Author timestamp with the offset git recorded
  pub timestamp: DateTime<FixedOffset>,
  pub author_name: String,
  pub author_email: String,
  pub subject: String,
  /// Branch the commit was first discovered on, remote prefix stripped
  pub branch: String,
  pub changed_files: Vec<String>,
  pub diff_text: String,
  pub insertions: u64,
  pub deletions: u64,
}

/// A raw entry returned by a branch log query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
  pub hash: String,
  pub date: DateTime<FixedOffset>,
  pub author_name: String,
  pub author_email: String,
  pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
  pub name: String,
  pub is_remote: bool,
}

impl BranchRef {
  pub fn local(name: &str) -> Self {
    Self { name: name.to_string(), is_remote: false }
  }

  pub fn remote(name: &str) -> Self {
    Self { name: name.to_string(), is_remote: true }
  }
}

/// Files and line counts between two revisions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
  pub files: Vec<String>,
  pub insertions: u64,
  pub deletions: u64,
}

impl DiffSummary {
  /// Parse `git --numstat` output (`<adds>\t<dels>\t<path>` per line).
  ///
  /// Binary files report `-` for both counts; they contribute a path but no lines.
  pub fn from_numstat(out: &str) -> Self {
    let mut summary = DiffSummary::default();
    for line in out.lines() {
      let parts: Vec<&str> = line.splitn(3, '\t').collect();
      if parts.len() != 3 {
        continue;
      }
      summary.insertions += parts[0].parse::<u64>().unwrap_or(0);
      summary.deletions += parts[1].parse::<u64>().unwrap_or(0);
      summary.files.push(parts[2].to_string());
    }
    summary
  }
}

/// A branch whose log query failed and was left out of the aggregation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SkippedBranch {
  pub branch: String,
  pub reason: String,
}

/// Size guidance attached to a token estimate.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
  MainstreamModels,
  LongContext,
  ExceedsContext,
}

impl Advisory {
  pub fn message(self) -> &'static str {
    match self {
      Advisory::MainstreamModels => "handled by most mainstream models",
      Advisory::LongContext => "use a long-context model",
      Advisory::ExceedsContext => "likely exceeds context limits; narrow the date range or batch the request",
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenEstimate {
  pub token_count: u64,
  pub character_count: u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub advisory: Option<Advisory>,
}

/// Describes what was analyzed; shown in report headers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AnalysisMetadata {
  pub directory: String,
  pub branch_label: String,
  /// Number of branches queried
  pub branch_count: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  pub window: DateWindow,
}

impl AnalysisMetadata {
  pub fn author_label(&self) -> &str {
    self.author.as_deref().unwrap_or("all authors")
  }
}
