use anyhow::{bail, Context, Result};
use chrono::DateTime;

use crate::model::{BranchRef, DiffSummary, LogEntry};
use crate::util::run_git;

/// Version-control queries the aggregation engine depends on.
///
/// `Sync` so the independent per-commit queries can run in parallel.
pub trait Vcs: Sync {
  fn is_repository(&self) -> bool;
  fn current_branch(&self) -> Result<String>;
  /// Configured `user.name`
  fn current_user(&self) -> Result<String>;
  fn list_branches(&self) -> Result<Vec<BranchRef>>;
  /// Commits reachable from `branch` with a commit date inside `[since, until]`, newest first.
  fn log(&self, branch: &str, since: &str, until: &str, exclude_merges: bool) -> Result<Vec<LogEntry>>;
  fn diff_summary(&self, from: &str, to: &str) -> Result<DiffSummary>;
  /// Unified diff text between two revisions.
  fn diff(&self, from: &str, to: &str) -> Result<String>;
  /// Raw `git show` output for `rev` with extra arguments.
  fn show(&self, rev: &str, args: &[&str]) -> Result<String>;
}

/// Live adapter shelling out to the `git` CLI inside `repo`.
pub struct GitCli {
  repo: String,
}

impl GitCli {
  pub fn new(repo: impl Into<String>) -> Self {
    Self { repo: repo.into() }
  }

  fn git(&self, args: &[&str]) -> Result<String> {
    let owned: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    run_git(&self.repo, &owned)
  }
}

/// Report non-ASCII paths verbatim instead of as quoted octal escapes.
const QUOTE_PATH_OFF: &str = "core.quotePath=false";

/// A revision starting with `-` would be read by git as an option.
pub fn check_revision(rev: &str) -> Result<()> {
  if rev.is_empty() || rev.starts_with('-') {
    bail!("invalid revision {:?}", rev);
  }
  Ok(())
}

const FIELD_SEP: char = '\u{0}';
const RECORD_SEP: char = '\u{1e}';

/// Parse `git log --format=%H%x00%aI%x00%an%x00%ae%x00%s%x1e` output.
pub fn parse_log(out: &str) -> Result<Vec<LogEntry>> {
  let mut entries = Vec::new();
  for record in out.split(RECORD_SEP) {
    let record = record.trim_start_matches(['\n', '\r']);
    if record.trim().is_empty() {
      continue;
    }
    let parts: Vec<&str> = record.split(FIELD_SEP).collect();
    let get = |i: usize| -> String { parts.get(i).unwrap_or(&"").to_string() };
    let date = DateTime::parse_from_rfc3339(parts.get(1).unwrap_or(&"").trim())
      .with_context(|| format!("parsing author date of commit {}", get(0)))?;
    entries.push(LogEntry {
      hash: get(0),
      date,
      author_name: get(2),
      author_email: get(3),
      subject: get(4),
    });
  }
  Ok(entries)
}

/// Map `for-each-ref --format=%(refname)` lines to branch refs.
///
/// Local heads keep their short name; remote-tracking refs are named
/// `remotes/<remote>/<branch>`, which git resolves in revision arguments.
pub fn parse_refs(out: &str) -> Vec<BranchRef> {
  out
    .lines()
    .map(str::trim)
    .filter_map(|line| {
      if let Some(name) = line.strip_prefix("refs/heads/") {
        Some(BranchRef::local(name))
      } else {
        line.strip_prefix("refs/").filter(|n| n.starts_with("remotes/")).map(BranchRef::remote)
      }
    })
    .collect()
}

impl Vcs for GitCli {
  fn is_repository(&self) -> bool {
    self
      .git(&["rev-parse", "--is-inside-work-tree"])
      .map(|out| out.trim() == "true")
      .unwrap_or(false)
  }

  fn current_branch(&self) -> Result<String> {
    let out = self.git(&["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(out.trim().to_string())
  }

  fn current_user(&self) -> Result<String> {
    let out = self.git(&["config", "--get", "user.name"])?;
    Ok(out.trim().to_string())
  }

  fn list_branches(&self) -> Result<Vec<BranchRef>> {
    let out = self.git(&["for-each-ref", "--format=%(refname)", "refs/heads", "refs/remotes"])?;
    Ok(parse_refs(&out))
  }

  fn log(&self, branch: &str, since: &str, until: &str, exclude_merges: bool) -> Result<Vec<LogEntry>> {
    check_revision(branch)?;
    let since_arg = format!("--since={}", since);
    let until_arg = format!("--until={}", until);
    let mut args: Vec<&str> = vec![
      "-c",
      "log.showSignature=false",
      "log",
      since_arg.as_str(),
      until_arg.as_str(),
      "--date-order",
      "--format=%H%x00%aI%x00%an%x00%ae%x00%s%x1e",
    ];
    if exclude_merges {
      args.push("--no-merges");
    }
    args.push(branch);
    args.push("--");
    let out = self.git(&args)?;
    parse_log(&out)
  }

  fn diff_summary(&self, from: &str, to: &str) -> Result<DiffSummary> {
    let out = self.git(&["-c", QUOTE_PATH_OFF, "diff", "--numstat", "--no-color", from, to, "--"])?;
    Ok(DiffSummary::from_numstat(&out))
  }

  fn diff(&self, from: &str, to: &str) -> Result<String> {
    self.git(&["-c", QUOTE_PATH_OFF, "diff", "--no-color", from, to, "--"])
  }

  fn show(&self, rev: &str, args: &[&str]) -> Result<String> {
    check_revision(rev)?;
    let mut full: Vec<&str> = vec!["-c", QUOTE_PATH_OFF, "show"];
    full.extend_from_slice(args);
    full.push(rev);
    full.push("--");
    self.git(&full)
  }
}
