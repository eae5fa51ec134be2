// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Collect commits across branches for a date window; dedup by hash, filter by author, enrich with files/diff/line counts, order newest first
// role: aggregation/engine
// inputs: Vcs adapter, BranchSpec, DateWindow, AggregateOptions (author filter, merge policy, diff cap)
// outputs: Aggregation { commits, skipped branches }
// side_effects: Reads git through the adapter; emits tracing events only
// invariants:
// - dedup by hash happens before author filtering and enrichment; first branch in list order wins
// - a failed branch log is skipped and reported, never fatal
// - enrichment failures fall back to show-based queries, then to empty/zero values
// - output is sorted by timestamp descending; equal timestamps keep discovery order
// errors: None escape; all git query failures are contained here
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashSet;

use anyhow::Result;

use crate::branches::{normalize_branch_name, select_branches};
use crate::gitio::Vcs;
use crate::model::{CommitRecord, DiffSummary, LogEntry, SkippedBranch};
use crate::util::clip_diff;
use crate::window::DateWindow;

/// Which branches to walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSpec {
  Named(String),
  List(Vec<String>),
  /// Enumerate branches through the adapter (see `branches::select_from`)
  Discover,
}

impl BranchSpec {
  pub fn resolve<V: Vcs + ?Sized>(&self, vcs: &V) -> Vec<String> {
    match self {
      BranchSpec::Named(name) => vec![name.clone()],
      BranchSpec::List(names) => names.clone(),
      BranchSpec::Discover => select_branches(vcs),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct AggregateOptions {
  /// Case-sensitive substring matched against the author name
  pub author: Option<String>,
  pub exclude_merges: bool,
  /// Per-commit diff cap in bytes (0 = no limit)
  pub max_diff_bytes: usize,
}

#[derive(Debug, Default)]
pub struct Aggregation {
  pub branches: Vec<String>,
  pub commits: Vec<CommitRecord>,
  pub skipped: Vec<SkippedBranch>,
}

struct Enrichment {
  files: Vec<String>,
  diff: String,
  insertions: u64,
  deletions: u64,
}

/// Run `primary`, then `fallback`, then give up with the default value.
fn with_fallback<T: Default>(
  what: &str,
  hash: &str,
  primary: impl FnOnce() -> Result<T>,
  fallback: impl FnOnce() -> Result<T>,
) -> T {
  match primary() {
    Ok(v) => v,
    Err(err) => {
      tracing::debug!(commit = hash, error = %err, "{} against parent failed; querying commit as root", what);
      fallback().unwrap_or_else(|err| {
        tracing::debug!(commit = hash, error = %err, "{} unavailable", what);
        T::default()
      })
    }
  }
}

fn changed_files<V: Vcs + ?Sized>(vcs: &V, hash: &str, parent: &str) -> Vec<String> {
  with_fallback(
    "file list",
    hash,
    || vcs.diff_summary(parent, hash).map(|s| s.files),
    || {
      let out = vcs.show(hash, &["--pretty=format:", "--name-only"])?;
      Ok(out.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect())
    },
  )
}

fn diff_text<V: Vcs + ?Sized>(vcs: &V, hash: &str, parent: &str) -> String {
  with_fallback(
    "diff",
    hash,
    || vcs.diff(parent, hash),
    || vcs.show(hash, &["--pretty=format:", "--patch", "--no-color"]),
  )
}

fn line_counts<V: Vcs + ?Sized>(vcs: &V, hash: &str, parent: &str) -> (u64, u64) {
  let summary = with_fallback(
    "line counts",
    hash,
    || vcs.diff_summary(parent, hash),
    || Ok(DiffSummary::from_numstat(&vcs.show(hash, &["--pretty=format:", "--numstat"])?)),
  );
  (summary.insertions, summary.deletions)
}

/// The three per-commit queries are independent; only their results are joined.
fn enrich<V: Vcs + ?Sized>(vcs: &V, hash: &str, max_diff_bytes: usize) -> Enrichment {
  let parent = format!("{}^", hash);
  let (files, (diff, (insertions, deletions))) = rayon::join(
    || changed_files(vcs, hash, &parent),
    || rayon::join(|| diff_text(vcs, hash, &parent), || line_counts(vcs, hash, &parent)),
  );
  let (diff, clipped) = clip_diff(diff, max_diff_bytes);
  if clipped {
    tracing::debug!(commit = hash, max_diff_bytes, "diff clipped");
  }
  Enrichment { files, diff, insertions, deletions }
}

fn build_record(entry: LogEntry, branch: &str, e: Enrichment) -> CommitRecord {
  CommitRecord {
    hash: entry.hash,
    timestamp: entry.date,
    author_name: entry.author_name,
    author_email: entry.author_email,
    subject: entry.subject,
    branch: normalize_branch_name(branch).to_string(),
    changed_files: e.files,
    diff_text: e.diff,
    insertions: e.insertions,
    deletions: e.deletions,
  }
}

/// Collect, deduplicate, filter, enrich and order commits from `spec` inside `window`.
pub fn aggregate<V: Vcs + ?Sized>(
  vcs: &V,
  spec: &BranchSpec,
  window: &DateWindow,
  opts: &AggregateOptions,
) -> Aggregation {
  let branches = spec.resolve(vcs);
  let (since, until) = window.git_bounds();

  let mut seen: HashSet<String> = HashSet::new();
  let mut commits: Vec<CommitRecord> = Vec::new();
  let mut skipped: Vec<SkippedBranch> = Vec::new();

  for branch in &branches {
    let entries = match vcs.log(branch, &since, &until, opts.exclude_merges) {
      Ok(entries) => entries,
      Err(err) => {
        tracing::warn!(branch = %branch, error = %err, "skipping branch: log query failed");
        skipped.push(SkippedBranch { branch: branch.clone(), reason: format!("{:#}", err) });
        continue;
      }
    };
    tracing::debug!(branch = %branch, count = entries.len(), "branch log");

    for entry in entries {
      if !seen.insert(entry.hash.clone()) {
        continue;
      }
      if let Some(author) = opts.author.as_deref() {
        if !entry.author_name.contains(author) {
          continue;
        }
      }
      let enrichment = enrich(vcs, &entry.hash, opts.max_diff_bytes);
      commits.push(build_record(entry, branch, enrichment));
    }
  }

  // stable: equal timestamps keep discovery order
  commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

  Aggregation { branches, commits, skipped }
}
