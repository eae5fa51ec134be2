use assert_cmd::Command;
use predicates::prelude::*;

mod common;

const RANGE: &str = "2025-08-12..2025-08-13";

fn analyze(dir: &std::path::Path) -> Command {
  let mut cmd = Command::cargo_bin("git-digest").unwrap();
  cmd.arg("analyze").arg("--dir").arg(dir);
  cmd
}

#[test]
fn plain_output_covers_all_branches() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", RANGE, "--all-authors", "--format", "plain"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Branch: all branches (2)"))
    .stdout(predicate::str::contains("Total commits: 3"))
    .stdout(predicate::str::contains("Authors: 2"))
    .stdout(predicate::str::contains("src/payment.ts"))
    .stdout(predicate::str::contains("Estimated tokens: "));
}

#[test]
fn root_commit_lists_its_files() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", "2025-08-12", "--branch", "main", "--author", "张三", "--format", "plain"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Total commits: 1"))
    .stdout(predicate::str::contains("Files changed (2):"))
    .stdout(predicate::str::contains("- README.md"));
}

#[test]
fn default_author_is_configured_user() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", RANGE, "--format", "plain"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Author: Fixture Bot"))
    .stdout(predicate::str::contains("No matching commits found"));
}

#[test]
fn author_substring_filter() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", RANGE, "--author", "李", "--format", "plain"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Total commits: 1"))
    .stdout(predicate::str::contains("Author: 李四 <lisi@example.com>"))
    .stdout(predicate::str::contains("张三").not());
}

#[test]
fn non_ascii_paths_are_not_escaped() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", "2025-08-12", "--branch", "main", "--author", "李", "--format", "plain"])
    .assert()
    .success()
    .stdout(predicate::str::contains("- 文档/说明.md"))
    .stdout(predicate::str::contains("diff --git a/文档/说明.md b/文档/说明.md"))
    .stdout(predicate::str::contains("\\346").not());
}

#[test]
fn repeated_branch_flags_walk_each_branch() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", RANGE, "--all-authors", "--format", "plain"])
    .args(["--branch", "main", "--branch", "feature/alpha"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Branch: main, feature/alpha"))
    .stdout(predicate::str::contains("Branch: main\n"))
    .stdout(predicate::str::contains("Total commits: 3"));
}

#[test]
fn option_like_branch_is_refused() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .arg("--branch=--all")
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid branch name"));
}

#[test]
fn single_branch_window() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", "2025-08-13", "--branch", "main", "--all-authors"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No matching commits found"));
}

#[test]
fn console_is_the_default_format() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", RANGE, "--all-authors"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Git commit analysis"))
    .stdout(predicate::str::contains("Commits per branch:"))
    .stdout(predicate::str::contains("Total commits: 3"));
}

#[test]
fn markdown_export_writes_file() {
  let repo = common::init_fixture_repo();
  let out_dir = tempfile::TempDir::new().unwrap();
  let report = out_dir.path().join("report.md");
  analyze(repo.path())
    .args(["--date", RANGE, "--all-authors", "--format", "markdown", "--out"])
    .arg(&report)
    .assert()
    .success()
    .stdout(predicate::str::contains("Report written to"));

  let md = std::fs::read_to_string(&report).unwrap();
  assert!(md.starts_with("# Git Commit Report"));
  assert!(md.contains("| Total commits | 3 |"));
  assert!(md.contains("```diff"));
  assert!(md.contains("_Generated at "));
}

#[test]
fn markdown_export_to_missing_directory_fails() {
  let repo = common::init_fixture_repo();
  let out_dir = tempfile::TempDir::new().unwrap();
  analyze(repo.path())
    .args(["--date", RANGE, "--all-authors", "--format", "markdown", "--out"])
    .arg(out_dir.path().join("nope").join("report.md"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to export report"))
    .stderr(predicate::str::contains("Caused by:"));
}

#[test]
fn markdown_without_out_fails() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--format", "markdown"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("requires --out"));
}

#[test]
fn json_output_is_structured() {
  let repo = common::init_fixture_repo();
  let assert = analyze(repo.path())
    .args(["--date", RANGE, "--all-authors", "--format", "json"])
    .assert()
    .success();
  let v: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
  assert_eq!(v["commits"].as_array().unwrap().len(), 3);
  assert_eq!(v["metadata"]["branch_count"], 2);
  assert_eq!(v["commits"][0]["author_name"], "张三");
  assert_eq!(v["commits"][0]["branch"], "feature/alpha");
}

#[test]
fn default_date_uses_clock_override() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--all-authors", "--format", "plain", "--now-override", "2025-08-13T18:00:00"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Date: 2025-08-13"))
    .stdout(predicate::str::contains("Total commits: 1"));
}

#[test]
fn not_a_repository_fails() {
  let dir = tempfile::TempDir::new().unwrap();
  analyze(dir.path())
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not a git repository"));
}

#[test]
fn missing_directory_fails() {
  let dir = tempfile::TempDir::new().unwrap();
  analyze(&dir.path().join("missing"))
    .assert()
    .failure()
    .stderr(predicate::str::contains("directory does not exist"));
}

#[test]
fn invalid_date_fails() {
  let repo = common::init_fixture_repo();
  analyze(repo.path())
    .args(["--date", "2025-13-45"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("invalid date expression"));
}

#[test]
fn gen_man_emits_troff() {
  Command::cargo_bin("git-digest")
    .unwrap()
    .arg("--gen-man")
    .assert()
    .success()
    .stdout(predicate::str::contains(".TH"));
}
