use std::path::Path;
use std::process::Command;

#[allow(dead_code)]
pub fn run(repo: &Path, args: &[&str]) {
  let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
  assert!(status.success(), "git {:?} failed", args);
}

fn commit_as(repo: &Path, author: &str, email: &str, date: &str, message: &str) {
  let status = Command::new("git")
    .args(["commit", "-q", "-m", message])
    .current_dir(repo)
    .env("GIT_AUTHOR_NAME", author)
    .env("GIT_AUTHOR_EMAIL", email)
    .env("GIT_AUTHOR_DATE", date)
    .env("GIT_COMMITTER_DATE", date)
    .status()
    .unwrap();
  assert!(status.success(), "commit {:?} failed", message);
}

/// Three commits in a throwaway repository:
///
/// - main: 张三 2025-08-12 09:00 (root), 李四 2025-08-12 14:03 (adds `文档/说明.md`)
/// - feature/alpha (from main): 张三 2025-08-13 09:12
///
/// The configured user is "Fixture Bot", who authored none of them.
#[allow(dead_code)]
pub fn init_fixture_repo() -> tempfile::TempDir {
  let dir = tempfile::TempDir::new().unwrap();
  let p = dir.path();

  run(p, &["init", "-q", "-b", "main"]);
  run(p, &["config", "user.name", "Fixture Bot"]);
  run(p, &["config", "user.email", "fixture@example.com"]);
  run(p, &["config", "commit.gpgsign", "false"]);

  std::fs::create_dir_all(p.join("src")).unwrap();
  std::fs::write(p.join("src/login.ts"), "export function login() {}\n").unwrap();
  std::fs::write(p.join("README.md"), "# fixture\n").unwrap();
  run(p, &["add", "."]);
  commit_as(p, "张三", "zhangsan@example.com", "2025-08-12T09:00:00", "feat: 登录页面");

  std::fs::write(p.join("src/login.ts"), "export function login() {\n  return true;\n}\n").unwrap();
  std::fs::create_dir_all(p.join("文档")).unwrap();
  std::fs::write(p.join("文档/说明.md"), "登录说明\n").unwrap();
  run(p, &["add", "."]);
  commit_as(p, "李四", "lisi@example.com", "2025-08-12T14:03:00", "fix: login returns");

  run(p, &["checkout", "-q", "-b", "feature/alpha"]);
  std::fs::write(p.join("src/payment.ts"), "export class Payment {}\n").unwrap();
  run(p, &["add", "."]);
  commit_as(p, "张三", "zhangsan@example.com", "2025-08-13T09:12:00", "feat: payment service");

  run(p, &["checkout", "-q", "main"]);
  dir
}
