// tests/startup_test.rs
// Process-level startup behavior of the binary

use std::fs;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn run_with_config(dir: &TempDir, config: Option<&str>) -> std::process::Output {
    let path = dir.path().join("config.json");
    if let Some(body) = config {
        fs::write(&path, body).unwrap();
    }

    Command::new(env!("CARGO_BIN_EXE_gemini-desk"))
        .arg("--config")
        .arg(&path)
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .unwrap()
}

#[test]
fn valid_config_reaches_the_repl() {
    let dir = TempDir::new().unwrap();
    let output = run_with_config(&dir, Some(r#"{"GOOGLE_API_KEY": "test-key"}"#));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Goodbye!"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("configuration"));
}

#[test]
fn missing_key_exits_with_one_diagnostic() {
    let dir = TempDir::new().unwrap();
    let output = run_with_config(&dir, Some(r#"{"OTHER": "x"}"#));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert_eq!(lines.len(), 1, "stderr was: {}", stderr);
    assert!(lines[0].starts_with("configuration error"));
    assert!(lines[0].contains("GOOGLE_API_KEY"));
    // piped stderr is not a terminal, so no color codes
    assert!(!stderr.contains('\x1b'));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_file_exits_with_one_diagnostic() {
    let dir = TempDir::new().unwrap();
    let output = run_with_config(&dir, None);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.lines().filter(|l| !l.trim().is_empty()).count(), 1);
    assert!(stderr.contains("configuration error"));
}
