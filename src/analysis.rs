use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Local};

use crate::aggregate::{aggregate, AggregateOptions, BranchSpec};
use crate::branches::normalize_branch_name;
use crate::error::AnalyzeError;
use crate::estimate;
use crate::gitio::Vcs;
use crate::model::{AnalysisMetadata, CommitRecord, SkippedBranch, TokenEstimate};
use crate::window;

/// Whose commits to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorPolicy {
  /// The repository's configured `user.name`, or everyone when it is unset
  CurrentUser,
  All,
  /// Case-sensitive substring of the author name
  Matching(String),
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
  pub directory: String,
  pub date_expression: Option<String>,
  /// Explicit branches; empty means discover them
  pub branches: Vec<String>,
  pub author: AuthorPolicy,
  pub include_merges: bool,
  pub max_diff_bytes: usize,
}

/// Everything a renderer needs.
#[derive(Debug)]
pub struct Analysis {
  pub metadata: AnalysisMetadata,
  pub branches: Vec<String>,
  pub commits: Vec<CommitRecord>,
  pub skipped: Vec<SkippedBranch>,
  pub estimate: TokenEstimate,
}

fn resolve_author<V: Vcs + ?Sized>(vcs: &V, policy: &AuthorPolicy) -> Option<String> {
  match policy {
    AuthorPolicy::All => None,
    AuthorPolicy::Matching(s) => Some(s.clone()),
    AuthorPolicy::CurrentUser => match vcs.current_user() {
      Ok(name) if !name.trim().is_empty() => Some(name.trim().to_string()),
      Ok(_) => None,
      Err(err) => {
        tracing::debug!(error = %err, "no configured user; not filtering by author");
        None
      }
    },
  }
}

pub fn branch_label(explicit: &[String], selected: &[String]) -> String {
  if !explicit.is_empty() {
    return explicit.join(", ");
  }
  match selected {
    [only] => normalize_branch_name(only).to_string(),
    many => format!("all branches ({})", many.len()),
  }
}

/// Validate inputs and run one aggregation.
///
/// The date expression is resolved before the adapter is touched, so a bad
/// date never costs a git call.
pub fn run_analysis<V: Vcs + ?Sized>(vcs: &V, opts: &AnalysisOptions, now: DateTime<Local>) -> Result<Analysis> {
  let window = window::resolve(opts.date_expression.as_deref(), now)?;

  if !Path::new(&opts.directory).is_dir() {
    return Err(AnalyzeError::DirectoryNotFound { path: opts.directory.clone() }.into());
  }
  if !vcs.is_repository() {
    return Err(AnalyzeError::NotAGitRepository { path: opts.directory.clone() }.into());
  }

  let spec = match opts.branches.as_slice() {
    [] => BranchSpec::Discover,
    [one] => BranchSpec::Named(one.clone()),
    many => BranchSpec::List(many.to_vec()),
  };
  let author = resolve_author(vcs, &opts.author);
  tracing::debug!(window = %window.label(), ?spec, ?author, "analyzing");

  let agg_opts = AggregateOptions {
    author: author.clone(),
    exclude_merges: !opts.include_merges,
    max_diff_bytes: opts.max_diff_bytes,
  };
  let agg = aggregate(vcs, &spec, &window, &agg_opts);

  let metadata = AnalysisMetadata {
    directory: opts.directory.clone(),
    branch_label: branch_label(&opts.branches, &agg.branches),
    branch_count: agg.branches.len(),
    author,
    window,
  };
  let estimate = estimate::estimate(&agg.commits);

  Ok(Analysis {
    metadata,
    branches: agg.branches,
    commits: agg.commits,
    skipped: agg.skipped,
    estimate,
  })
}
