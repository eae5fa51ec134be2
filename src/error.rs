// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fatal error taxonomy surfaced to the user (bad directory, not a repo, bad date, export failure)
// role: errors
// outputs: AnalyzeError variants with user-facing messages
// invariants: Only these errors terminate a run; git query failures are recovered inside aggregation
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalyzeError {
  /// The target directory does not exist
  #[error("directory does not exist: {path}")]
  DirectoryNotFound { path: String },

  /// The target directory is not inside a git work tree
  #[error("{path} is not a git repository")]
  NotAGitRepository { path: String },

  /// A date expression could not be parsed into a calendar date
  #[error("invalid date expression: {expression:?} (expected YYYY-MM-DD, optionally A..B)")]
  InvalidDate { expression: String },

  /// Writing the markdown report failed
  #[error("failed to export report to {path}")]
  Export {
    path: String,
    #[source]
    source: std::io::Error,
  },
}
