// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI integration tests.
//!
//! These tests run the actual evocodec binary against payloads written by
//! the library.

mod common;

use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

use common::*;

/// Get the path to the built evocodec binary
fn evocodec_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_evocodec"))
}

/// Run evocodec with arguments
fn run(args: &[&str]) -> Output {
    let bin = evocodec_bin();
    Command::new(&bin)
        .args(args)
        .output()
        .unwrap_or_else(|_| panic!("Failed to run {:?}", bin))
}

/// Run evocodec and assert success
fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "Command failed: {:?}\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run evocodec and assert failure
fn run_err(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        !output.status.success(),
        "Command should have failed but succeeded: {:?}",
        args
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Write a polygon payload to a uniquely named temp file.
fn polygon_payload(tag: &str) -> TempGuard {
    let factory = factory_with(vec![point_shape(), polygon_shape()]);
    let bytes = factory
        .encode(&Polygon {
            name: "kite".to_string(),
            points: vec![Point { x: 0, y: 2 }, Point { x: 1, y: 0 }],
            centre: None,
        })
        .unwrap();

    let path = std::env::temp_dir().join(format!(
        "evocodec_cli_{tag}_{}.bin",
        std::process::id()
    ));
    std::fs::write(&path, bytes).unwrap();
    TempGuard(path)
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run_ok(&["--help"]);
    assert!(output.contains("Inspect self-describing evocodec payloads"));
    assert!(output.contains("inspect"));
}

#[test]
fn test_cli_version() {
    let output = run_ok(&["--version"]);
    assert!(output.contains("evocodec"));
}

#[test]
fn test_cli_invalid_subcommand() {
    let stderr = run_err(&["nonexistent"]);
    assert!(stderr.contains("unrecognized") || stderr.contains("unknown"));
}

// ============================================================================
// Inspect Tests
// ============================================================================

#[test]
fn test_inspect_info() {
    let payload = polygon_payload("info");
    let output = run_ok(&["inspect", "info", payload.path_str()]);
    assert!(output.contains("Root type: demo.Polygon"));
    assert!(output.contains("Types: 2"));
    assert!(output.contains("Size:"));
}

#[test]
fn test_inspect_schema() {
    let payload = polygon_payload("schema");
    let output = run_ok(&["inspect", "schema", payload.path_str()]);
    assert!(output.contains("composite demo.Polygon"));
    assert!(output.contains("composite demo.Point"));
    assert!(output.contains("points: list<demo.Point>"));
    assert!(output.contains("centre: demo.Point?"));
}

#[test]
fn test_inspect_schema_json() {
    let payload = polygon_payload("schema_json");
    let output = run_ok(&["inspect", "schema", "--json", payload.path_str()]);

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    let types = json["types"].as_array().unwrap();
    assert_eq!(types.len(), 2);
    assert_eq!(types[0]["kind"], "composite");
    assert_eq!(types[0]["name"], "demo.Polygon");
}

#[test]
fn test_inspect_body() {
    let payload = polygon_payload("body");
    let output = run_ok(&["inspect", "body", payload.path_str()]);

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    let fields = json["value"].as_array().unwrap();
    assert_eq!(fields[0], "kite");
    assert_eq!(fields[1].as_array().unwrap().len(), 2);
    assert!(fields[2].is_null());
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_missing_required_arg() {
    let stderr = run_err(&["inspect", "info"]);
    assert!(stderr.contains("required") || stderr.contains("missing") || stderr.contains("Usage"));
}

#[test]
fn test_inspect_nonexistent_file() {
    let stderr = run_err(&["inspect", "info", "/nonexistent/payload.bin"]);
    assert!(stderr.contains("Error"));
    assert!(stderr.contains("failed to read"));
}

#[test]
fn test_invalid_payload() {
    let path = std::env::temp_dir().join(format!(
        "evocodec_cli_invalid_{}.bin",
        std::process::id()
    ));
    std::fs::write(&path, b"invalid magic bytes").unwrap();
    let guard = TempGuard(path);

    let stderr = run_err(&["inspect", "schema", guard.path_str()]);
    assert!(stderr.contains("is not an evocodec payload"));
}

// ============================================================================
// Cleanup Guard
// ============================================================================

struct TempGuard(PathBuf);

impl TempGuard {
    fn path_str(&self) -> &str {
        self.0.to_str().unwrap()
    }
}

impl Drop for TempGuard {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(Path::new(&self.0));
    }
}
