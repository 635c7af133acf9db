//! End-to-end tests for `chordlayer config` commands.

use std::fs;

use tempfile::TempDir;

mod fixtures;
use fixtures::*;

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_default() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    let output = isolated_command(&["config", "show"], &config_dir)
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Show config should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Prefix Key: ["), "stdout: {stdout}");
    assert!(stdout.contains("Timeout: 5000 ms"), "stdout: {stdout}");
    assert!(stdout.contains("using defaults"), "stdout: {stdout}");
}

#[test]
fn test_config_show_json_format() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    let output = isolated_command(&["config", "show", "--json"], &config_dir)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let result: serde_json::Value =
        serde_json::from_str(&stdout).expect("Should parse JSON output");

    assert!(result["layer"].is_object(), "Should have layer object");
    assert!(result["feedback"].is_object(), "Should have feedback object");
    assert_eq!(result["layer"]["prefix"], "[");
    assert_eq!(result["layer"]["timeout_ms"], 5000);
    assert_eq!(result["layer"]["rapid_repeat_ms"], 500);
    assert_eq!(result["layer"]["timeout_tone"], false);
    assert_eq!(result["feedback"]["tones"], true);
    assert!(result["config_file"]
        .as_str()
        .is_some_and(|path| path.ends_with("config.toml")));
}

#[test]
fn test_config_show_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();
    fs::write(config_dir.join("config.toml"), "[layer]\nprefix = \"control+x\"\n").unwrap();

    let output = isolated_command(&["config", "show"], &config_dir)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load configuration"), "stderr: {stderr}");
}

// ============================================================================
// Set Command Tests
// ============================================================================

#[test]
fn test_config_set_requires_an_option() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    let output = isolated_command(&["config", "set"], &config_dir)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("At least one configuration option"));
}

#[test]
fn test_config_set_and_show_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    let output = isolated_command(
        &[
            "config",
            "set",
            "--prefix",
            "`",
            "--timeout-ms",
            "3000",
            "--timeout-tone",
            "true",
        ],
        &config_dir,
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(config_dir.join("config.toml").exists());

    let output = isolated_command(&["config", "show", "--json"], &config_dir)
        .output()
        .expect("Failed to execute command");
    let result: serde_json::Value =
        serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();

    assert_eq!(result["layer"]["prefix"], "`");
    assert_eq!(result["layer"]["timeout_ms"], 3000);
    assert_eq!(result["layer"]["rapid_repeat_ms"], 500);
    assert_eq!(result["layer"]["timeout_tone"], true);
}

#[test]
fn test_config_set_rejects_modified_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    let output = isolated_command(&["config", "set", "--prefix", "control+["], &config_dir)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(!config_dir.join("config.toml").exists());
}

#[test]
fn test_config_set_rejects_window_past_timeout() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    let output = isolated_command(
        &["config", "set", "--timeout-ms", "400"],
        &config_dir,
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Rapid-repeat window"), "stderr: {stderr}");
}

#[test]
fn test_config_set_rejects_prefix_bound_to_command() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    for prefix in ["a", "k"] {
        let output = isolated_command(&["config", "set", "--prefix", prefix], &config_dir)
            .output()
            .expect("Failed to execute command");

        assert_eq!(output.status.code(), Some(1), "prefix {prefix}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("conflicts with command"), "stderr: {stderr}");
    }
    assert!(!config_dir.join("config.toml").exists());
}

#[test]
fn test_config_set_rejects_layer_control_prefix() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().to_path_buf();

    for prefix in ["tab", "escape", "enter"] {
        let output = isolated_command(&["config", "set", "--prefix", prefix], &config_dir)
            .output()
            .expect("Failed to execute command");

        assert_eq!(output.status.code(), Some(1), "prefix {prefix}");
    }
    assert!(!config_dir.join("config.toml").exists());
}
