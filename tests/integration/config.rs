use pipeline_structure::config::{
    CONFIG_NAME_ENV, CONFIG_PATH_ENV, ConfigLocation, PIPELINE_FOLDER_ENV, Project, ProjectConfig,
};
use pipeline_structure::structure::StructurePreset;
use pipeline_structure::test_utils::SampleProject;
use pipeline_structure::validation::validate_structure;

use crate::common::{pstruct, run_pstruct};

fn listed_value(json: &serde_json::Value, name: &str) -> String {
    json.as_array()
        .unwrap()
        .iter()
        .find(|item| item["name"] == name)
        .and_then(|item| item["value"].as_str())
        .unwrap()
        .to_string()
}

#[test]
fn test_demo_project_overrides() {
    let sample = SampleProject::demo().unwrap();
    let project = Project::load_with(sample.path(), StructurePreset::Default, &ConfigLocation::default()).unwrap();

    assert_eq!(project.name(), "demo");
    assert_eq!(project.context().get("project_name"), Some("demo"));
    assert!(validate_structure(project.table()).is_ok());

    let context = project.context().with("sequence", "sq010").with("shot", "0010");
    let shot = project.resolver().resolve_one("shots", &context, None).unwrap();
    assert_eq!(shot, format!("{}/03_Production/Shots/sq010/sh_0010", sample.path_str()));
}

#[test]
fn test_config_round_trips_through_serde() {
    let sample = SampleProject::demo().unwrap();
    let config_file = sample.path().join("00_Pipeline/pipeline.json");
    let config: ProjectConfig = pipeline_structure::config::parse_config(&config_file).unwrap();

    let yaml = serde_yaml::to_string(&config).unwrap();
    sample.write("00_Pipeline/pipeline.yml", &yaml).unwrap();
    let reparsed: ProjectConfig =
        pipeline_structure::config::parse_config(&sample.path().join("00_Pipeline/pipeline.yml")).unwrap();
    assert_eq!(reparsed, config);
    assert_eq!(reparsed.folder_structure.keys().collect::<Vec<_>>(), vec!["assets", "shots"]);
}

#[test]
fn test_env_pipeline_folder_and_config_name() {
    let sample = SampleProject::new().unwrap();
    sample
        .write("setup/project.yml", "folder_structure:\n  textures:\n    value: \"@project_path@/tex\"\n")
        .unwrap();

    let output = pstruct(sample.path())
        .env(PIPELINE_FOLDER_ENV, "setup")
        .env(CONFIG_NAME_ENV, "project.yml")
        .args(["list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed_value(&json, "textures"), "@project_path@/tex");
}

#[test]
fn test_env_config_path() {
    let sample = SampleProject::new().unwrap();
    sample
        .write("etc/structure.toml", "[folder_structure.pipeline]\nvalue = \"@project_path@/pipe\"\n")
        .unwrap();

    let output = pstruct(sample.path())
        .env(CONFIG_PATH_ENV, "etc/structure.toml")
        .args(["--project", ".", "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listed_value(&json, "pipeline"), "@project_path@/pipe");
}

#[test]
fn test_config_flag_derives_project_root() {
    let sample = SampleProject::demo().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let config = sample.path().join("00_Pipeline/pipeline.json");

    let output = run_pstruct(
        elsewhere.path(),
        &["--config", config.to_str().unwrap(), "resolve", "assets", "--set", "asset_path=char/hero"],
    );
    output.assert_success();
    assert_eq!(output.stdout.trim(), format!("{}/Assets/char/hero", sample.path_str()));
}

#[test]
fn test_missing_config_is_reported() {
    let sample = SampleProject::new().unwrap();
    let output = run_pstruct(sample.path(), &["--project", sample.path().to_str().unwrap(), "list"]);
    output.assert_failure().assert_stderr_contains("Project configuration not found");
    assert_eq!(output.code, Some(1));
}

#[test]
fn test_broken_config_is_reported() {
    let sample = SampleProject::new().unwrap();
    sample.write_config("{\"folder_structure\": ").unwrap();

    let output = run_pstruct(sample.path(), &["validate"]);
    output.assert_failure().assert_stderr_contains("Invalid project configuration");
}
