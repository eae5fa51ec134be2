use crate::gitio::Vcs;
use crate::model::BranchRef;

const FALLBACK_BRANCH: &str = "main";

/// Strip a remote-tracking prefix (`refs/remotes/<remote>/` or `remotes/<remote>/`)
/// and a `refs/heads/` prefix; other names are returned unchanged.
pub fn normalize_branch_name(name: &str) -> &str {
  if let Some(local) = name.strip_prefix("refs/heads/") {
    return local;
  }
  let remote = name.strip_prefix("refs/remotes/").or_else(|| name.strip_prefix("remotes/"));
  match remote.and_then(|rest| rest.split_once('/')) {
    Some((_remote, branch)) if !branch.is_empty() => branch,
    _ => name,
  }
}

fn is_symbolic_head(branch: &BranchRef) -> bool {
  branch.name.rsplit('/').next() == Some("HEAD")
}

/// Pick branches from an enumeration: remote-tracking branches (minus `HEAD`) when any
/// exist, otherwise all local branches, otherwise `main`.
///
/// Local-only branches are dropped whenever a remote-tracking branch exists; remotes are
/// taken as the canonical state.
pub fn select_from(all: &[BranchRef]) -> Vec<String> {
  let (remote, local): (Vec<&BranchRef>, Vec<&BranchRef>) = all.iter().partition(|b| b.is_remote);
  let remote: Vec<String> = remote
    .into_iter()
    .filter(|b| !is_symbolic_head(b))
    .map(|b| b.name.clone())
    .collect();

  if !remote.is_empty() {
    return remote;
  }
  if !local.is_empty() {
    return local.into_iter().map(|b| b.name.clone()).collect();
  }
  vec![FALLBACK_BRANCH.to_string()]
}

/// Branches to analyze when the caller named none.
///
/// A failed enumeration degrades to the current branch alone.
pub fn select_branches<V: Vcs + ?Sized>(vcs: &V) -> Vec<String> {
  match vcs.list_branches() {
    Ok(all) => select_from(&all),
    Err(err) => {
      tracing::warn!(error = %err, "could not enumerate branches; using the current branch");
      let current = vcs.current_branch().unwrap_or_else(|_| FALLBACK_BRANCH.to_string());
      vec![current]
    }
  }
}
