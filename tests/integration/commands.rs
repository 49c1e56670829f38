use predicates::prelude::*;

use pipeline_structure::test_utils::SampleProject;

use crate::common::{pstruct, run_pstruct};

fn project_args(sample: &SampleProject) -> Vec<String> {
    vec!["--project".to_string(), sample.path_str()]
}

fn run_in_project(sample: &SampleProject, args: &[&str]) -> crate::common::CommandOutput {
    let mut all: Vec<String> = project_args(sample);
    all.extend(args.iter().map(|s| (*s).to_string()));
    let refs: Vec<&str> = all.iter().map(String::as_str).collect();
    run_pstruct(sample.path(), &refs)
}

#[test]
fn test_resolve_key() {
    let sample = SampleProject::demo().unwrap();
    let output = run_in_project(&sample, &["resolve", "assets", "--set", "asset_path=char/hero"]);
    output.assert_success();
    assert_eq!(output.stdout.trim(), format!("{}/Assets/char/hero", sample.path_str()));
}

#[test]
fn test_resolve_discovers_project_from_subdirectory() {
    let sample = SampleProject::demo().unwrap();
    let nested = sample.mkdir("Assets/char").unwrap();

    let output = run_pstruct(&nested, &["resolve", "assets", "--set", "asset_path=char/hero"]);
    output.assert_success().assert_stdout_contains("/Assets/char/hero");
}

#[test]
fn test_resolve_pattern_json_with_context_file() {
    let sample = SampleProject::demo().unwrap();
    let context_file = sample.write("ctx.json", r#"{"sequence": "sq010", "shot": 10}"#).unwrap();

    let output = run_in_project(
        &sample,
        &[
            "resolve",
            "@entity_path@/@missing@",
            "--context",
            context_file.to_str().unwrap(),
            "--fallback",
            "x",
            "--format",
            "json",
        ],
    );
    output.assert_success();

    let json = output.json();
    assert_eq!(json["target"], "@entity_path@/@missing@");
    assert_eq!(json["paths"][0], format!("{}/03_Production/Shots/sq010/sh_10/x", sample.path_str()));
}

#[test]
fn test_resolve_all_candidates() {
    let sample = SampleProject::new().unwrap();
    sample
        .write_config(
            r#"{"folder_structure": {"aovs": {"value": "[expression,template = ['@renderversion_path@/a', '@renderversion_path@/b']]"}}}"#,
        )
        .unwrap();

    let first = run_in_project(&sample, &["resolve", "aovs", "--fallback", "_"]);
    first.assert_success();
    assert_eq!(first.stdout.lines().count(), 1);

    let all = run_in_project(&sample, &["resolve", "aovs", "--all"]);
    all.assert_success();
    let lines: Vec<&str> = all.stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("/a"));
    assert!(lines[1].ends_with("/b"));
}

#[test]
fn test_resolve_unknown_key_suggests() {
    let sample = SampleProject::demo().unwrap();
    let output = run_in_project(&sample, &["resolve", "asets"]);
    output
        .assert_failure()
        .assert_stderr_contains("Unknown template key: 'asets'")
        .assert_stderr_contains("Did you mean: assets?");
}

#[test]
fn test_extract_key() {
    let sample = SampleProject::demo().unwrap();
    let path = format!("{}/Assets/char/hero", sample.path_str());

    let output = run_in_project(&sample, &["extract", &path, "assets", "--format", "json"]);
    output.assert_success();

    let json = output.json();
    assert_eq!(json["asset_path"], "char/hero");
    assert_eq!(json["path"], path.as_str());
    assert!(json.get("project_path").is_none());
}

#[test]
fn test_extract_no_match() {
    let sample = SampleProject::demo().unwrap();
    let output = run_in_project(&sample, &["extract", "/nowhere/file.txt", "assets"]);
    output.assert_success().assert_stdout_contains("does not match");
}

#[test]
fn test_matches_lists_existing_files() {
    let sample = SampleProject::demo().unwrap();
    sample.touch("Assets/char/hero/Export/charGEO/v0001/hero_charGEO_v0001.abc").unwrap();
    sample.touch("Assets/char/hero/Export/charGEO/v0002/hero_charGEO_v0002.abc").unwrap();
    sample.touch("Assets/char/hero/Export/charGEO/v0002/hero_charGEO_v0002.1001.abc").unwrap();

    let output = run_in_project(
        &sample,
        &[
            "matches",
            "productFilesAssets",
            "--set",
            "asset_path=char/hero",
            "--set",
            "asset=hero",
            "--set",
            "product=charGEO",
            "--format",
            "json",
        ],
    );
    output.assert_success();

    let json = output.json();
    let found = json.as_array().unwrap();
    assert_eq!(found.len(), 3);
    let frames: Vec<&str> = found.iter().map(|t| t["frame"].as_str().unwrap()).collect();
    assert_eq!(frames, vec!["", "1001", ""]);
    assert!(found.iter().all(|t| t["extension"] == ".abc"));
}

#[test]
fn test_validate_default_project() {
    let sample = SampleProject::demo().unwrap();
    let output = run_in_project(&sample, &["validate"]);
    output.assert_success().assert_stdout_contains("✓").assert_stdout_contains("valid");
}

#[test]
fn test_validate_reports_every_problem() {
    let sample = SampleProject::new().unwrap();
    sample
        .write_config(
            r#"{"folder_structure": {
                "assets": {"value": "@asset_path@/@project_path@"},
                "tasks": {"value": "@department_path@/@task"}
            }}"#,
        )
        .unwrap();

    let output = run_in_project(&sample, &["validate"]);
    output
        .assert_failure()
        .assert_stdout_contains("✗ assets")
        .assert_stdout_contains("the required keys are not in the correct order")
        .assert_stdout_contains("✗ tasks")
        .assert_stdout_contains("uneven number of \"@\" characters")
        .assert_stderr_contains("2 of 24 templates failed validation");

    let json = run_in_project(&sample, &["validate", "--format", "json"]);
    json.assert_failure();
    let json = json.json();
    assert_eq!(json["valid"], false);
    assert_eq!(json["errors"].as_array().unwrap().len(), 2);
}

#[test]
fn test_list_presets() {
    let empty = tempfile::tempdir().unwrap();

    pstruct(empty.path())
        .args(["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("assets Assets @entity_path@"))
        .stdout(predicate::str::contains("@project_path@/03_Production/Assets/@asset_path@"));

    pstruct(empty.path())
        .args(["--preset", "legacy", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@project_path@/03_Workflow/Assets/@asset_path@"));
}

#[test]
fn test_preview_without_project() {
    let empty = tempfile::tempdir().unwrap();

    pstruct(empty.path())
        .args(["preview", "assets"])
        .assert()
        .success()
        .stdout("/projects/myProject/03_Production/Assets/character/alien\n");

    pstruct(empty.path())
        .args(["preview", "shotScenefiles", "--entity", "shot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/Shots/seq01/0010/Scenefiles/modeling/body/seq01-0010_body_v0001.hip"));
}

#[test]
fn test_verbose_and_quiet_conflict() {
    let empty = tempfile::tempdir().unwrap();
    pstruct(empty.path()).args(["--verbose", "--quiet", "list"]).assert().failure();
}
