// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

#![cfg(feature = "tool")]

//! Integration tests for the `nstable` CLI tool binary.
//!
//! These tests run the actual binary and verify its behavior.

use std::io::Write;
use std::process::{Command, Stdio};

/// Get the path to the nstable binary
fn nstable_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps
    path.push("nstable");
    path
}

/// Run the nstable binary with CLI arguments
fn run_cli(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(nstable_binary())
        .args(args)
        .output()
        .expect("Failed to execute nstable binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run the nstable binary in shell mode with piped input
fn run_shell(flags: &[&str], input: &str) -> (String, String, bool) {
    let mut child = Command::new(nstable_binary())
        .args(flags)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn nstable binary");

    {
        let stdin = child.stdin.as_mut().expect("Failed to open stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write to stdin");
    }

    let output = child.wait_with_output().expect("Failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

// ============================================================================
// CLI Command Tests
// ============================================================================

#[test]
fn test_cli_hash() {
    let (stdout, stderr, success) = run_cli(&["hash", "foo"]);
    assert!(success, "hash failed: {}", stderr);
    assert_eq!("0x6b2a3769", stdout.trim());

    let (stdout, _, success) = run_cli(&["hash", "--seed", "305419896", "foo"]);
    assert!(success);
    assert_eq!("0x791e6111", stdout.trim());
}

#[test]
fn test_cli_hash_empty_returns_seed() {
    let (stdout, _, success) = run_cli(&["hash", "-s", "255", ""]);
    assert!(success);
    assert_eq!("0x000000ff", stdout.trim());
}

#[test]
fn test_cli_bucket() {
    let (stdout, stderr, success) = run_cli(&["-b", "16", "bucket", "foo"]);
    assert!(success, "bucket failed: {}", stderr);
    assert_eq!("9", stdout.trim());

    let (stdout, _, success) = run_cli(&["-b", "16", "bucket", "foo", "-n", "ns1"]);
    assert!(success);
    assert_eq!("6", stdout.trim());
}

#[test]
fn test_cli_zero_buckets_fails() {
    let (_, stderr, success) = run_cli(&["-b", "0", "hash", "x"]);
    assert!(!success);
    assert!(
        stderr.contains("InvalidArgument"),
        "Expected InvalidArgument: {}",
        stderr
    );
}

// ============================================================================
// Shell Tests
// ============================================================================

#[test]
fn test_shell_add_and_get() {
    let (stdout, stderr, success) = run_shell(&[], "add foo bar\nget foo\nexit\n");
    assert!(success, "shell failed: {}", stderr);
    assert!(stdout.contains("OK (add)"), "Expected OK: {}", stdout);
    assert!(stdout.lines().any(|l| l == "bar"), "Expected bar: {}", stdout);
}

#[test]
fn test_shell_namespaces() {
    let input = "\
add foo p1
add foo p2 -n ns1
get foo
get foo --namespace ns1
del foo
get foo
get foo -n ns1
";
    let (stdout, stderr, success) = run_shell(&["-b", "16"], input);
    assert!(success, "shell failed: {}", stderr);

    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(
        vec![
            "OK (add)",
            "OK (add)",
            "p1",
            "p2",
            "OK (removed p1)",
            "(not found)",
            "p2"
        ],
        lines
    );
}

#[test]
fn test_shell_integers() {
    let input = "\
addint n 0
getint n
getint missing
addint big 4294967295
";
    let (stdout, stderr, success) = run_shell(&[], input);
    assert!(success);

    let lines = stdout.lines().collect::<Vec<_>>();
    assert_eq!(vec!["OK (add)", "0", "4294967295"], lines);
    assert!(
        stderr.contains("InvalidArgument"),
        "Expected InvalidArgument: {}",
        stderr
    );
}

#[test]
fn test_shell_list_and_count() {
    let input = "\
add a 1
add b 2
add c 3 -n other
list
ls -n other
count
";
    let (stdout, _, success) = run_shell(&[], input);
    assert!(success);
    assert!(stdout.contains("a = 1"));
    assert!(stdout.contains("b = 2"));
    assert!(stdout.contains("OK (2 items)"));
    assert!(stdout.contains("c = 3"));
    assert!(stdout.contains("OK (1 items)"));
    assert!(stdout.lines().any(|l| l == "3"));
}

#[test]
fn test_shell_clean_and_info() {
    let input = "\
add a 1
addint b 2
clean
count
info
";
    let (stdout, _, success) = run_shell(&["--buckets", "32"], input);
    assert!(success);
    assert!(stdout.contains("OK (cleaned 2 entries)"), "{}", stdout);
    assert!(stdout.lines().any(|l| l == "0"));
    assert!(stdout.contains("Buckets: 32"));
    assert!(stdout.contains("Entries: 0"));
    assert!(stdout.contains("Longest chain: 0"));
}

#[test]
fn test_shell_quoted_arguments() {
    let (stdout, _, success) = run_shell(&[], "add \"two words\" 'a value'\nget \"two words\"\n");
    assert!(success);
    assert!(stdout.lines().any(|l| l == "a value"), "{}", stdout);
}

#[test]
fn test_shell_unclosed_quote() {
    let (_, stderr, success) = run_shell(&[], "add \"oops 1\n");
    assert!(success);
    assert!(stderr.contains("unclosed quote"));
}

#[test]
fn test_shell_unknown_command() {
    let (_, stderr, success) = run_shell(&[], "frobnicate\ncount\n");
    assert!(success);
    assert!(stderr.contains("frobnicate"), "{}", stderr);
}

#[test]
fn test_shell_stops_at_exit() {
    let (stdout, _, success) = run_shell(&[], "add a 1\nexit\nadd b 2\n");
    assert!(success);
    assert_eq!(1, stdout.matches("OK (add)").count());
}

// ============================================================================
// Interactive shell tests using rexpect
// ============================================================================

#[cfg(unix)]
mod tests_rexpect_unix_only {
    use super::nstable_binary;
    use rexpect::session::PtySession;

    /// Spawn an interactive shell session
    fn spawn_shell() -> Result<PtySession, rexpect::error::Error> {
        let binary = nstable_binary();
        let command = format!("sh -c '{} -b 16'", binary.to_str().unwrap());
        rexpect::spawn(&command, Some(5000))
    }

    #[test]
    fn test_interactive_prompt() -> Result<(), rexpect::error::Error> {
        let mut p = spawn_shell().expect("Failed to spawn shell");

        p.exp_string("Welcome to the nstable shell")
            .expect("Failed to see welcome message");
        p.exp_string("Type 'help' for available commands")
            .expect("Failed to see help message");
        p.exp_regex("nstable> ").expect("Failed to see prompt");

        p.send_line("exit")?;
        p.exp_eof()?;

        Ok(())
    }

    #[test]
    fn test_interactive_basic_commands() -> Result<(), rexpect::error::Error> {
        let mut p = spawn_shell().expect("Failed to spawn shell");

        p.exp_regex("nstable> ")?;

        p.send_line("add testkey testvalue -n rules")?;
        p.exp_string("OK (add)")?;
        p.exp_regex("nstable> ")?;

        p.send_line("get testkey -n rules")?;
        p.exp_string("testvalue")?;
        p.exp_regex("nstable> ")?;

        p.send_line("list -n rules")?;
        p.exp_string("testkey = testvalue")?;
        p.exp_string("OK (1 items)")?;
        p.exp_regex("nstable> ")?;

        p.send_line("exit")?;
        p.exp_eof()?;

        Ok(())
    }

    #[test]
    fn test_interactive_ctrl_d() -> Result<(), rexpect::error::Error> {
        let mut p = spawn_shell().expect("Failed to spawn shell");

        p.exp_regex("nstable> ")?;
        p.send_control('d')?;
        p.exp_eof()?;

        Ok(())
    }
}
