use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::analysis::{AnalysisOptions, AuthorPolicy};
use crate::util;

#[derive(Parser, Debug)]
#[command(
    name = "git-digest",
    version,
    about = "Summarize Git commits over a date range for reports and LLM prompts",
    long_about = None
)]
pub struct Cli {
  /// Log debug events to stderr (RUST_LOG takes precedence)
  #[arg(long, global = true)]
  pub verbose: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  #[command(subcommand)]
  pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Collect commits in a date window and render them with a token estimate
  Analyze(AnalyzeArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
  Console,
  Plain,
  Markdown,
  Json,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
  /// Directory of the Git repository to analyze
  #[arg(long)]
  pub dir: PathBuf,

  /// YYYY-MM-DD (also YYYY/MM/DD, YYYY.MM.DD) or a range A..B; default today
  #[arg(long)]
  pub date: Option<String>,

  /// Analyze only this branch; repeat for several (default: remote-tracking branches, else local ones)
  #[arg(long)]
  pub branch: Vec<String>,

  /// Keep commits whose author name contains this text (case-sensitive); default: git user.name
  #[arg(long, conflicts_with = "all_authors")]
  pub author: Option<String>,

  /// Do not filter by author
  #[arg(long)]
  pub all_authors: bool,

  #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
  pub format: OutputFormat,

  /// Markdown report path (required with --format markdown)
  #[arg(long)]
  pub out: Option<PathBuf>,

  /// Include merge commits
  #[arg(long)]
  pub include_merges: bool,

  /// Per-commit diff cap in bytes (0 = no limit)
  #[arg(long, default_value_t = 0)]
  pub max_diff_bytes: usize,

  /// Override the "now" instant used for the default date (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
  Console,
  Plain,
  Markdown { path: PathBuf },
  Json,
}

#[derive(Debug)]
pub struct EffectiveConfig {
  pub options: AnalysisOptions,
  pub output: OutputMode,
  pub now_override: Option<String>,
}

pub fn normalize(args: AnalyzeArgs) -> Result<EffectiveConfig> {
  let output = match (args.format, args.out) {
    (OutputFormat::Markdown, Some(path)) => OutputMode::Markdown { path },
    (OutputFormat::Markdown, None) => bail!("--format markdown requires --out <PATH>"),
    (_, Some(_)) => bail!("--out is only used with --format markdown"),
    (OutputFormat::Console, None) => OutputMode::Console,
    (OutputFormat::Plain, None) => OutputMode::Plain,
    (OutputFormat::Json, None) => OutputMode::Json,
  };

  let author = match (args.author, args.all_authors) {
    (Some(a), _) => AuthorPolicy::Matching(a),
    (None, true) => AuthorPolicy::All,
    (None, false) => AuthorPolicy::CurrentUser,
  };

  let branches: Vec<String> = args.branch.into_iter().filter(|b| !b.trim().is_empty()).collect();
  if let Some(bad) = branches.iter().find(|b| b.starts_with('-')) {
    bail!("invalid branch name {:?}", bad);
  }

  let options = AnalysisOptions {
    directory: util::canonicalize_lossy(&args.dir),
    date_expression: args.date,
    branches,
    author,
    include_merges: args.include_merges,
    max_diff_bytes: args.max_diff_bytes,
  };

  Ok(EffectiveConfig { options, output, now_override: args.now_override })
}
