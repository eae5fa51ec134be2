// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Utilities for paths, git subprocesses, hash shortening, diff clipping, clock override, and man page rendering
// role: utilities/helpers
// inputs: Various primitives; DateTime; paths; clap CommandFactory
// outputs: Canonicalized paths, git stdout, clipped text, man page text
// side_effects: run_git invokes subprocesses
// invariants:
// - clip_diff never splits UTF-8; indicates clipping accurately
// - short_hash never panics on short input
// errors: run_git surfaces command + stderr
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::CommandFactory;

pub fn canonicalize_lossy<P: AsRef<Path>>(p: P) -> String {
  let p = p.as_ref();
  let pb: PathBuf = match std::fs::canonicalize(p) {
    Ok(x) => x,
    Err(_) => match std::env::current_dir() {
      Ok(cwd) => cwd.join(p),
      Err(_) => PathBuf::from(p),
    },
  };
  pb.to_string_lossy().to_string()
}

pub fn run_git(repo: &str, args: &[String]) -> Result<String> {
  tracing::trace!(repo, ?args, "git");
  let out = Command::new("git")
    .args(args)
    .current_dir(repo)
    .output()
    .with_context(|| format!("spawning git {:?}", args))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("git {:?} failed: {}", args, stderr.trim())
  }
}

/// First 8 characters of a commit hash, as shown in every report.
pub fn short_hash(full: &str) -> &str {
  match full.char_indices().nth(8) {
    Some((idx, _)) => &full[..idx],
    None => full,
  }
}

/// Clips diff text to a maximum number of bytes without splitting a UTF-8 character.
/// Returns the (possibly shortened) text and whether clipping happened. `0` means no limit.
pub fn clip_diff(text: String, max_bytes: usize) -> (String, bool) {
  if max_bytes == 0 || text.len() <= max_bytes {
    return (text, false);
  }

  let mut end = max_bytes;
  while end > 0 && !text.is_char_boundary(end) {
    end -= 1;
  }

  let mut clipped = text;
  clipped.truncate(end);
  (clipped, true)
}

/// The `--now-override` instant if given, else the local clock.
pub fn effective_now(override_now: Option<DateTime<Local>>) -> DateTime<Local> {
  override_now.unwrap_or_else(Local::now)
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
