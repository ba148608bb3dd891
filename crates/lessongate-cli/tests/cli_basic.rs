//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own home directory and
//! database so runs never share state.

use std::process::Command;

use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// Run a CLI command and return (exit code, stdout, stderr).
    fn run(&self, args: &[&str]) -> (i32, String, String) {
        let output = Command::new(env!("CARGO_BIN_EXE_lessongate"))
            .args(args)
            .env("HOME", self.home.path())
            .env("LESSONGATE_DB", self.home.path().join("test.db"))
            .env_remove("LESSONGATE_ENV")
            .env_remove("LESSONGATE_LOG")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        (output.status.code().unwrap_or(-1), stdout, stderr)
    }

    fn seed_weekly_lessons(&self, weeks: u32) {
        for week in 1..=weeks {
            let id = format!("w{week:02}");
            let week = week.to_string();
            let (code, _, stderr) = self.run(&[
                "lesson", "add", "Weekly", "--id", &id, "--week", &week, "--category", "immersion",
                "--level", "beginner", "--publish",
            ]);
            assert_eq!(code, 0, "lesson add failed: {stderr}");
        }
    }
}

#[test]
fn test_help() {
    let sandbox = Sandbox::new();
    let (code, stdout, _) = sandbox.run(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("view"));
    assert!(stdout.contains("complete"));
}

#[test]
fn test_view_guest_json() {
    let sandbox = Sandbox::new();
    let (code, stdout, stderr) = sandbox.run(&["view", "nobody", "--json"]);
    assert_eq!(code, 0, "view failed: {stderr}");

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["profile_found"], false);
    assert_eq!(parsed["access"]["immersion"], false);
    assert_eq!(parsed["progression"]["status"], "ready");
}

#[test]
fn test_learner_add_and_show() {
    let sandbox = Sandbox::new();
    let (code, _, stderr) = sandbox.run(&[
        "learner", "add", "--id", "ana", "--tier", "bundle", "--status", "active",
    ]);
    assert_eq!(code, 0, "learner add failed: {stderr}");

    let (code, stdout, _) = sandbox.run(&["learner", "show", "ana"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["subscription_tier"], "bundle");
}

#[test]
fn test_learner_show_missing_fails() {
    let sandbox = Sandbox::new();
    let (code, _, stderr) = sandbox.run(&["learner", "show", "ghost"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_complete_flow() {
    let sandbox = Sandbox::new();
    sandbox.seed_weekly_lessons(6);
    let (code, _, _) = sandbox.run(&[
        "learner", "add", "--id", "ana", "--tier", "immersion", "--status", "active", "--joined",
        "2024-03-04T09:00:00Z",
    ]);
    assert_eq!(code, 0);

    let at = "2024-03-06T09:00:00Z";
    let (code, stdout, stderr) =
        sandbox.run(&["complete", "ana", "w01", "--score", "90", "--at", at]);
    assert_eq!(code, 0, "complete failed: {stderr}");
    assert!(stdout.contains("Completed w01 (1 total)"));

    let (code, stdout, _) = sandbox.run(&["complete", "ana", "w01", "--score", "70", "--at", at]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Already completed"));

    // Week 6 is beyond the starter pack on day two.
    let (code, _, stderr) = sandbox.run(&["complete", "ana", "w06", "--score", "90", "--at", at]);
    assert_eq!(code, 1);
    assert!(stderr.contains("locked"));

    let (code, _, _) = sandbox.run(&["complete", "ana", "w01", "--score", "101", "--at", at]);
    assert_eq!(code, 1);

    let (code, stdout, _) = sandbox.run(&["streak", "ana", "--at", at, "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["current_streak"], 1);
    assert_eq!(parsed["this_week_completed_count"], 1);
}

#[test]
fn test_lesson_publish_unknown_fails() {
    let sandbox = Sandbox::new();
    let (code, _, stderr) = sandbox.run(&["lesson", "publish", "missing"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("lesson not found"));
}

#[test]
fn test_config_set_and_get() {
    let sandbox = Sandbox::new();
    let (code, _, _) = sandbox.run(&["config", "set", "unlock.cushion", "4"]);
    assert_eq!(code, 0);

    let (code, stdout, _) = sandbox.run(&["config", "get", "unlock.cushion"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4");

    let (code, _, _) = sandbox.run(&["config", "set", "calendar.release_weekday", "someday"]);
    assert_eq!(code, 1);

    let (code, _, _) = sandbox.run(&["config", "reset"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = sandbox.run(&["config", "get", "unlock.cushion"]);
    assert_eq!(stdout.trim(), "3");
}

#[test]
fn test_completions() {
    let sandbox = Sandbox::new();
    let (code, stdout, _) = sandbox.run(&["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("lessongate"));
}
