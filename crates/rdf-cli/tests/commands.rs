//! # Subcommand Tests
//!
//! Runs the subcommand handlers against documents written to a temporary
//! directory and checks exit codes and rendered output.

use std::path::{Path, PathBuf};

use rdf_cli::changelog::{run_changelog, ChangelogArgs};
use rdf_cli::update::{run_update, UpdateArgs};
use rdf_cli::validate::{run_validate, OutputFormat, ValidateArgs};
use rdf_core::RawDocument;
use rdf_engine::Engine;

const MODEL_0_3_0: &str = include_str!("../../../fixtures/model-0.3.0.yaml");
const MODEL_0_5_3: &str = include_str!("../../../fixtures/model-0.5.3.yaml");

fn engine() -> Engine {
    rdf_cli::build_engine(None).unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn validate(path: PathBuf, format: OutputFormat, check_files: bool) -> (u8, String) {
    let args = ValidateArgs {
        path,
        format,
        check_files,
    };
    let mut out = Vec::new();
    let code = run_validate(&args, &engine(), &mut out).unwrap();
    (code, String::from_utf8(out).unwrap())
}

// ─── validate ───────────────────────────────────────────────────────

#[test]
fn valid_document_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "rdf.yaml", MODEL_0_5_3);
    let (code, text) = validate(path, OutputFormat::Text, false);
    assert_eq!(code, 0, "{text}");
    assert!(text.contains("model 0.5.3"));
    assert!(text.contains("passed"));
}

#[test]
fn legacy_document_reports_its_upgrade() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "rdf.yaml", MODEL_0_3_0);
    let (code, text) = validate(path, OutputFormat::Text, false);
    assert_eq!(code, 0, "{text}");
    assert!(text.contains("upgraded with 21 migration steps"));
    assert!(text.contains("valid with warnings"));
}

#[test]
fn errors_exit_one_and_render_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let broken = MODEL_0_5_3.replace("documentation: README.md", "documentation: README.txt");
    let path = write(dir.path(), "rdf.yaml", &broken);
    let (code, text) = validate(path, OutputFormat::Json, false);
    assert_eq!(code, 1);

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["type"], "model");
    assert_eq!(json["summary"]["status"], "failed");
    assert_eq!(json["summary"]["errors"], 1);
    assert_eq!(json["summary"]["entries"][0]["loc"], "documentation");
}

#[test]
fn load_errors_are_a_single_top_level_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "rdf.yaml", "format_version: 0.5.3\ntype: plugin\nname: x\n");

    let (code, text) = validate(path.clone(), OutputFormat::Text, false);
    assert_eq!(code, 1);
    assert_eq!(text.lines().count(), 1);
    assert!(text.contains("error: unknown resource type: plugin"));

    let (code, text) = validate(path, OutputFormat::Json, false);
    assert_eq!(code, 1);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["stage"], "discriminate");
}

#[test]
fn check_files_reports_missing_and_mismatched_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "rdf.yaml", MODEL_0_5_3);
    for name in [
        "README.md",
        "cover.png",
        "test_input.npy",
        "test_output.npy",
        "unet2d.py",
        "weights.pt",
    ] {
        write(dir.path(), name, name);
    }

    let (code, text) = validate(path, OutputFormat::Json, true);
    assert_eq!(code, 1);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let locs: Vec<&str> = json["summary"]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["severity"] == "error")
        .filter_map(|e| e["loc"].as_str())
        .collect();
    assert_eq!(locs.len(), 2, "{text}");
    assert!(locs.contains(&"weights.pytorch_state_dict.source"));
    assert!(locs.contains(&"weights.torchscript.source"));
}

#[test]
fn unreadable_document_is_an_operational_error() {
    let dir = tempfile::tempdir().unwrap();
    let args = ValidateArgs {
        path: dir.path().join("absent.yaml"),
        format: OutputFormat::Text,
        check_files: false,
    };
    let mut out = Vec::new();
    assert!(run_validate(&args, &engine(), &mut out).is_err());
    assert!(out.is_empty());
}

// ─── update-format ──────────────────────────────────────────────────

#[test]
fn update_format_writes_the_latest_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "rdf.yaml", MODEL_0_3_0);
    let output = dir.path().join("rdf.latest.yaml");
    let args = UpdateArgs {
        path,
        output: Some(output.clone()),
    };
    let mut out = Vec::new();
    assert_eq!(run_update(&args, &engine(), &mut out).unwrap(), 0);
    assert!(String::from_utf8(out).unwrap().contains("21 steps, 2 notes"));

    let upgraded = RawDocument::from_yaml_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(upgraded.get_str("format_version"), Some("0.5.3"));

    // The written document is already current.
    let (code, text) = validate(output, OutputFormat::Text, false);
    assert_eq!(code, 0, "{text}");
    assert!(!text.contains("upgraded"));
}

#[test]
fn update_format_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "rdf.yaml", MODEL_0_5_3);
    let args = UpdateArgs { path, output: None };
    let mut out = Vec::new();
    assert_eq!(run_update(&args, &engine(), &mut out).unwrap(), 0);
    let printed = RawDocument::from_yaml_str(&String::from_utf8(out).unwrap()).unwrap();
    assert_eq!(printed, RawDocument::from_yaml_str(MODEL_0_5_3).unwrap());
}

// ─── changelog ──────────────────────────────────────────────────────

#[test]
fn changelog_lists_model_steps() {
    let args = ChangelogArgs {
        resource_type: "model".to_string(),
        breaking: false,
    };
    let mut out = Vec::new();
    assert_eq!(run_changelog(&args, &engine(), &mut out).unwrap(), 0);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 21);
    assert!(text.lines().next().unwrap().starts_with("model 0.3.0 -> 0.3.1"));
}

#[test]
fn changelog_breaking_only() {
    let args = ChangelogArgs {
        resource_type: "model".to_string(),
        breaking: true,
    };
    let mut out = Vec::new();
    run_changelog(&args, &engine(), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.contains("(breaking)")));
}

#[test]
fn changelog_rejects_unknown_types() {
    let args = ChangelogArgs {
        resource_type: "plugin".to_string(),
        breaking: false,
    };
    let mut out = Vec::new();
    assert!(run_changelog(&args, &engine(), &mut out).is_err());
}
