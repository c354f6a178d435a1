//! CLI argument parsing and validation tests — no network I/O.
//!
//! These tests verify that invalid arguments are rejected before any cassette,
//! proxy, or upstream is consulted.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("imagegen").unwrap();
    cmd.env("IMAGEGEN_CONFIG", "/nonexistent/imagegen/config.toml")
        .env_remove("IMAGEGEN_REPLAY")
        .env_remove("IMAGEGEN_REC");
    cmd
}

#[test]
fn missing_subcommand_exits_with_usage() {
    cmd().assert().failure().stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_prompt_exits_with_error() {
    // Neither prompt nor --prompt-file given → resolve_prompt() returns an error
    cmd()
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Provide a prompt string"));
}

#[test]
fn blank_prompt_exits_with_error() {
    cmd()
        .args(["generate", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Prompt is required"));
}

#[test]
fn degenerate_aspect_ratio_exits_with_error() {
    for ratio in ["0/9", "16/0", "wide"] {
        cmd()
            .args(["generate", "--aspect-ratio", ratio, "a cat"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unsupported aspect ratio"));
    }
}

#[test]
fn ratio_resolving_to_zero_side_exits_before_any_request() {
    // No proxy is running; reaching the network would report slot failures instead.
    cmd()
        .args(["generate", "--aspect-ratio", "21/9", "--base-size", "16", "-n", "3", "a cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("resolves to 16x0"))
        .stderr(predicate::str::contains("Slot").not());
}

#[test]
fn invalid_format_exits_with_error() {
    cmd()
        .args(["generate", "--format", "gif", "a cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported format"));
}

#[test]
fn invalid_base_size_exits_with_error() {
    cmd()
        .args(["generate", "--base-size", "0", "a cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported base size"));
}

#[test]
fn serve_without_api_key_fails_fast() {
    cmd()
        .env_remove("GEMINI_API_KEY")
        .args(["serve", "--port", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No API key for Gemini"));
}

#[test]
fn serve_rejects_bad_bind_address() {
    cmd()
        .env("GEMINI_API_KEY", "test-key")
        .args(["serve", "--host", "not a host"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bind address"));
}
