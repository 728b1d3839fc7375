use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const LO_ID: &str = "staticmesh.collision.simple";
const EVIDENCE_FILE: &str = "Source/Engine/BodySetup.cpp";
const SYMBOL: &str = "CT_UseSimpleAsComplex";

const BODY_SETUP: &str = "\
// Copyright Epic Games, Inc. All Rights Reserved.

#include \"PhysicsEngine/BodySetup.h\"

UENUM()
enum ECollisionTraceFlag
{
    /** Use project physics settings. */
    CTF_UseDefault,
    /** Keep simple and complex separate. */
    CTF_UseSimpleAndComplex,
    /** Use simple collision for complex queries. */
    CT_UseSimpleAsComplex,
    /** Use complex collision as simple. */
    CTF_UseComplexAsSimple,
};
";

fn uke_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("uke");
    path
}

fn run_uke(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = uke_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .arg("--progress")
        .arg("off")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run uke binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Workspace with an initialized config, one engine file and the
/// `staticmesh.collision.simple` LO whose hash is captured via `uke hash`.
struct Workspace {
    _tmp: TempDir,
    root: PathBuf,
    config_path: PathBuf,
    engine: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().to_path_buf();
        let config_path = root.join("uke.toml");
        let engine = root.join("engine");

        let (stdout, stderr, success) = run_uke(&config_path, &["init"]);
        assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);

        let ws = Workspace {
            _tmp: tmp,
            root,
            config_path,
            engine,
        };
        ws.write_engine(BODY_SETUP);

        let (hash, stderr, success) = ws.run(&[
            "hash",
            "--source-root",
            ws.engine_str(),
            EVIDENCE_FILE,
            SYMBOL,
        ]);
        assert!(success, "hash failed: {}", stderr);
        ws.write_lo(hash.trim());
        ws
    }

    fn run(&self, args: &[&str]) -> (String, String, bool) {
        run_uke(&self.config_path, args)
    }

    fn engine_str(&self) -> &str {
        self.engine.to_str().unwrap()
    }

    fn write_engine(&self, content: &str) {
        let path = self.engine.join(EVIDENCE_FILE);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_lo(&self, snippet_hash: &str) {
        let dir = self.root.join("knowledge/learning_objects/staticmesh");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("collision_simple.yml"),
            format!(
                r#"id: {}
type: concept
title: Use Simple Collision as Complex
description: Complex traces use the simple collision shapes.
prerequisites:
  - staticmesh.basics
evidence:
  - file: {}
    symbol: {}
    symbol_id: "ECollisionTraceFlag::{}"
    snippet_hash: "{}"
roles: [technical_artist]
skill_level: intermediate
"#,
                LO_ID, EVIDENCE_FILE, SYMBOL, SYMBOL, snippet_hash
            ),
        )
        .unwrap();
    }

    fn read_json(&self, rel: &str) -> serde_json::Value {
        let content = fs::read_to_string(self.root.join(rel)).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    fn audit_entries(&self) -> Vec<serde_json::Value> {
        let mut entries: Vec<serde_json::Value> = fs::read_dir(self.root.join("out/audit"))
            .unwrap()
            .map(|e| {
                let content = fs::read_to_string(e.unwrap().path()).unwrap();
                serde_json::from_str(&content).unwrap()
            })
            .collect();
        entries.sort_by(|a, b| {
            a["timestamp"]
                .as_str()
                .unwrap()
                .cmp(b["timestamp"].as_str().unwrap())
        });
        entries
    }
}

#[test]
fn test_init_idempotent() {
    let ws = Workspace::new();
    let (stdout, _, success) = ws.run(&["init"]);
    assert!(success);
    assert!(stdout.contains("exists"));
    assert!(!stdout.contains("created"));
}

#[test]
fn test_gate_verified_with_engine() {
    let ws = Workspace::new();

    let (stdout, stderr, success) = ws.run(&["gate", "--source-root", ws.engine_str()]);
    assert!(success, "gate failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Status: 1/1 LOs verified."));

    let status = ws.read_json("out/status.json");
    assert_eq!(status[LO_ID], "verified");
    let report = ws.read_json("out/gate_report.json");
    assert_eq!(report[LO_ID]["errors"], serde_json::json!([]));
}

#[test]
fn test_gate_missing_evidence_file_is_invalid_but_succeeds() {
    let ws = Workspace::new();
    fs::remove_file(ws.engine.join(EVIDENCE_FILE)).unwrap();

    let (stdout, _, success) = ws.run(&["gate", "--engine", ws.engine_str()]);
    assert!(success, "classification results must not fail the process");
    assert!(stdout.contains("Status: 0/1 LOs verified."));

    let report = ws.read_json("out/gate_report.json");
    assert_eq!(report[LO_ID]["status"], "invalid");
    assert_eq!(
        report[LO_ID]["errors"][0],
        format!("Evidence file not found: {}", EVIDENCE_FILE)
    );
}

#[test]
fn test_gate_no_capture_alias_skips_evidence() {
    let ws = Workspace::new();
    fs::remove_file(ws.engine.join(EVIDENCE_FILE)).unwrap();

    let (stdout, _, success) = ws.run(&["gate", "--engine", ws.engine_str(), "--no-capture"]);
    assert!(success);
    assert!(stdout.contains("Status: 1/1 LOs verified."));
}

#[test]
fn test_heal_unchanged_tree_verifies() {
    let ws = Workspace::new();

    let (stdout, stderr, success) = ws.run(&[
        "heal",
        "--source-root",
        ws.engine_str(),
        "--from-sha",
        "1111111",
        "--to-sha",
        "2222222",
    ]);
    assert!(success, "heal failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Heal complete. Checked 1 LOs. Flagged 0 for review."));

    let entries = ws.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "VERIFIED");
    assert_eq!(entries[0]["old_hash"], entries[0]["new_hash"]);
    assert_eq!(entries[0]["from_rev"], "1111111");
    assert_eq!(entries[0]["lo_id"], LO_ID);
    assert_eq!(ws.read_json("out/status.json")[LO_ID], "verified");
}

#[test]
fn test_heal_ignores_comment_and_whitespace_edits() {
    let ws = Workspace::new();
    ws.write_engine(
        &BODY_SETUP
            .replace("/** Use simple collision for complex queries. */", "// reworded")
            .replace("    CT_UseSimpleAsComplex,", "\t\tCT_UseSimpleAsComplex ,"),
    );

    let (stdout, _, success) = ws.run(&[
        "heal", "--engine", ws.engine_str(), "--from-sha", "a", "--to-sha", "b",
    ]);
    assert!(success);
    assert!(stdout.contains("Flagged 0 for review."));
}

#[test]
fn test_heal_flags_semantic_edit() {
    let ws = Workspace::new();
    ws.write_engine(&BODY_SETUP.replace("CTF_UseComplexAsSimple", "CTF_UseComplexAsSimpleV2"));

    let (stdout, _, success) = ws.run(&[
        "heal", "--engine", ws.engine_str(), "--from-sha", "a", "--to-sha", "b",
    ]);
    assert!(success);
    assert!(stdout.contains("Flagged 1 for review."));

    let entries = ws.audit_entries();
    assert_eq!(entries[0]["action"], "FLAGGED");
    assert_ne!(entries[0]["old_hash"], entries[0]["new_hash"]);
    assert_eq!(ws.read_json("out/status.json")[LO_ID], "needs_review");
}

#[test]
fn test_heal_renamed_symbol_errors_without_aborting() {
    let ws = Workspace::new();
    ws.write_engine(&BODY_SETUP.replace(SYMBOL, "CTF_UseSimpleAsComplexRenamed"));

    let (stdout, stderr, success) = ws.run(&[
        "heal", "--engine", ws.engine_str(), "--from-sha", "a", "--to-sha", "b",
    ]);
    assert!(success, "heal failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("1 errors"));

    let entries = ws.audit_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "ERROR");
    assert!(entries[0]["new_hash"].is_null());
    assert!(entries[0]["reason"]
        .as_str()
        .unwrap()
        .contains("not found"));
}

#[test]
fn test_heal_appends_audit_across_runs() {
    let ws = Workspace::new();
    for _ in 0..3 {
        let (_, _, success) = ws.run(&[
            "heal", "--engine", ws.engine_str(), "--from-sha", "a", "--to-sha", "b",
        ]);
        assert!(success);
    }
    assert_eq!(ws.audit_entries().len(), 3);
}

#[test]
fn test_heal_requires_source_root() {
    let ws = Workspace::new();
    let (_, stderr, success) = ws.run(&["heal", "--from-sha", "a", "--to-sha", "b"]);
    assert!(!success);
    assert!(stderr.contains("source root"));
}

#[test]
fn test_gate_without_config_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, success) = run_uke(&tmp.path().join("missing.toml"), &["gate"]);
    assert!(!success);
    assert!(stderr.contains("uke init"));
}
