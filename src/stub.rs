//! In-memory `Vcs` for exercising aggregation without a repository.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use chrono::DateTime;

use crate::gitio::Vcs;
use crate::model::{BranchRef, DiffSummary, LogEntry};

#[derive(Clone)]
pub struct StubCommit {
  pub entry: LogEntry,
  pub summary: DiffSummary,
  pub diff: String,
}

/// Build a commit with `files`, each counted as one changed path.
pub fn commit(hash: &str, author: &str, date: &str, files: &[&str], insertions: u64, deletions: u64) -> StubCommit {
  let diff = files
    .iter()
    .map(|f| format!("diff --git a/{f} b/{f}\n+added line\n"))
    .collect::<String>();
  StubCommit {
    entry: LogEntry {
      hash: hash.to_string(),
      date: DateTime::parse_from_rfc3339(date).expect("stub date is RFC3339"),
      author_name: author.to_string(),
      author_email: format!("{}@example.com", hash),
      subject: format!("commit {}", hash),
    },
    summary: DiffSummary {
      files: files.iter().map(|f| f.to_string()).collect(),
      insertions,
      deletions,
    },
    diff,
  }
}

pub struct StubVcs {
  is_repo: bool,
  current_branch: Option<String>,
  user: Option<String>,
  branches: Option<Vec<BranchRef>>,
  logs: HashMap<String, Vec<String>>,
  failing_logs: HashSet<String>,
  commits: HashMap<String, StubCommit>,
  roots: HashSet<String>,
  broken: HashSet<String>,
  diffless: HashSet<String>,
  calls: Mutex<Vec<String>>,
}

impl Default for StubVcs {
  fn default() -> Self {
    Self::new()
  }
}

impl StubVcs {
  pub fn new() -> Self {
    Self {
      is_repo: true,
      current_branch: Some("main".into()),
      user: None,
      branches: Some(Vec::new()),
      logs: HashMap::new(),
      failing_logs: HashSet::new(),
      commits: HashMap::new(),
      roots: HashSet::new(),
      broken: HashSet::new(),
      diffless: HashSet::new(),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn not_a_repository(mut self) -> Self {
    self.is_repo = false;
    self
  }

  pub fn with_current_branch(mut self, name: &str) -> Self {
    self.current_branch = Some(name.into());
    self
  }

  pub fn with_user(mut self, name: &str) -> Self {
    self.user = Some(name.into());
    self
  }

  pub fn with_branches(mut self, branches: Vec<BranchRef>) -> Self {
    self.branches = Some(branches);
    self
  }

  pub fn fail_branch_listing(mut self) -> Self {
    self.branches = None;
    self
  }

  /// Register `c` as returned by the log query of `branch`, in call order.
  pub fn with_commit(mut self, branch: &str, c: StubCommit) -> Self {
    self.logs.entry(branch.to_string()).or_default().push(c.entry.hash.clone());
    self.commits.insert(c.entry.hash.clone(), c);
    self
  }

  pub fn fail_log(mut self, branch: &str) -> Self {
    self.failing_logs.insert(branch.to_string());
    self
  }

  /// Parent-relative queries fail; `show` of the commit itself still works.
  pub fn root(mut self, hash: &str) -> Self {
    self.roots.insert(hash.to_string());
    self
  }

  /// Every query about the commit fails.
  pub fn broken(mut self, hash: &str) -> Self {
    self.broken.insert(hash.to_string());
    self
  }

  /// Only the diff-text queries (primary and fallback) fail for the commit.
  pub fn fail_diff(mut self, hash: &str) -> Self {
    self.diffless.insert(hash.to_string());
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().map(|c| c.clone()).unwrap_or_default()
  }

  fn record(&self, call: String) {
    if let Ok(mut calls) = self.calls.lock() {
      calls.push(call);
    }
  }

  /// Resolve `<hash>^` against `<hash>` for parent-relative queries.
  fn parent_query(&self, from: &str, to: &str) -> Result<&StubCommit> {
    if self.broken.contains(to) || self.roots.contains(to) {
      bail!("bad revision '{}'", from);
    }
    match self.commits.get(to) {
      Some(c) if from == format!("{}^", to) => Ok(c),
      _ => bail!("unknown revision range {}..{}", from, to),
    }
  }
}

impl Vcs for StubVcs {
  fn is_repository(&self) -> bool {
    self.is_repo
  }

  fn current_branch(&self) -> Result<String> {
    match &self.current_branch {
      Some(b) => Ok(b.clone()),
      None => bail!("HEAD is unborn"),
    }
  }

  fn current_user(&self) -> Result<String> {
    match &self.user {
      Some(u) => Ok(u.clone()),
      None => bail!("user.name is not set"),
    }
  }

  fn list_branches(&self) -> Result<Vec<BranchRef>> {
    match &self.branches {
      Some(b) => Ok(b.clone()),
      None => bail!("for-each-ref failed"),
    }
  }

  fn log(&self, branch: &str, since: &str, until: &str, exclude_merges: bool) -> Result<Vec<LogEntry>> {
    self.record(format!("log {} {} {} {}", branch, since, until, exclude_merges));
    if self.failing_logs.contains(branch) {
      bail!("unknown revision '{}'", branch);
    }
    let hashes = self.logs.get(branch).cloned().unwrap_or_default();
    Ok(hashes.iter().filter_map(|h| self.commits.get(h)).map(|c| c.entry.clone()).collect())
  }

  fn diff_summary(&self, from: &str, to: &str) -> Result<DiffSummary> {
    self.record(format!("diff_summary {}", to));
    Ok(self.parent_query(from, to)?.summary.clone())
  }

  fn diff(&self, from: &str, to: &str) -> Result<String> {
    self.record(format!("diff {}", to));
    if self.diffless.contains(to) {
      bail!("diff of {} failed", to);
    }
    Ok(self.parent_query(from, to)?.diff.clone())
  }

  fn show(&self, rev: &str, args: &[&str]) -> Result<String> {
    self.record(format!("show {} {}", rev, args.join(" ")));
    if self.broken.contains(rev) {
      bail!("bad object {}", rev);
    }
    let Some(c) = self.commits.get(rev) else {
      bail!("bad object {}", rev);
    };
    if args.contains(&"--name-only") {
      Ok(c.summary.files.iter().map(|f| format!("{}\n", f)).collect())
    } else if args.contains(&"--numstat") {
      // spread the totals over the first file so the sums match
      let mut out = String::new();
      for (i, f) in c.summary.files.iter().enumerate() {
        let (ins, del) = if i == 0 { (c.summary.insertions, c.summary.deletions) } else { (0, 0) };
        out.push_str(&format!("{}\t{}\t{}\n", ins, del, f));
      }
      Ok(out)
    } else if self.diffless.contains(rev) {
      bail!("patch of {} failed", rev)
    } else {
      Ok(c.diff.clone())
    }
  }
}
