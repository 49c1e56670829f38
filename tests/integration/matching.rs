use pipeline_structure::context::Context;
use pipeline_structure::pattern::{TemplateMatcher, find_matching_paths};
use pipeline_structure::resolver::resolve_template_key;
use pipeline_structure::structure::TemplateTable;
use pipeline_structure::test_utils::SampleProject;

const SCENE_DIR: &str = "03_Production/Assets/char/hero/Scenefiles/mod/main";

fn hero_context(project: &SampleProject) -> Context {
    project.context().with("asset_path", "char/hero").with("asset", "hero")
}

#[test]
fn test_find_scenefile_versions() {
    let project = SampleProject::new().unwrap();
    project.touch(&format!("{SCENE_DIR}/hero_main_v0002.hip")).unwrap();
    project.touch(&format!("{SCENE_DIR}/hero_main_v0001.hip")).unwrap();
    project.touch(&format!("{SCENE_DIR}/notes.txt")).unwrap();
    project.touch(&format!("{SCENE_DIR}/hero_main.hip")).unwrap();

    let table = TemplateTable::default_structure();
    let pattern = resolve_template_key("assetScenefiles", &hero_context(&project), &table, None)
        .unwrap()
        .remove(0);
    assert!(pattern.ends_with("/Scenefiles/@department@/@task@/hero_@task@_@version@@extension@"));

    let found = find_matching_paths(&pattern).unwrap();
    assert_eq!(found.len(), 2);

    let versions: Vec<&str> = found.iter().filter_map(|t| t.get("version")).collect();
    assert_eq!(versions, vec!["v0001", "v0002"]);
    for tokens in &found {
        assert_eq!(tokens.get("department"), Some("mod"));
        assert_eq!(tokens.get("task"), Some("main"));
        assert_eq!(tokens.extension(), Some(".hip"));
        assert!(tokens.path().unwrap().ends_with(".hip"));
    }
}

#[test]
fn test_one_entry_per_directory() {
    let project = SampleProject::new().unwrap();
    for shot in ["sh0010", "sh0020", "sh0030"] {
        project.mkdir(&format!("03_Production/Shots/sq010/{shot}")).unwrap();
    }
    project.touch("03_Production/Shots/sq010/readme").unwrap();
    project.mkdir("03_Production/Shots/sq020/sh0010").unwrap();

    let table = TemplateTable::default_structure();
    let context = project.context().with("sequence", "sq010");
    let pattern = resolve_template_key("shots", &context, &table, None).unwrap().remove(0);

    let found = find_matching_paths(&pattern).unwrap();
    let shots: Vec<&str> = found.iter().filter_map(|t| t.get("shot")).collect();
    // `readme` fits the glob as well; directories are not told apart from files
    assert_eq!(shots, vec!["readme", "sh0010", "sh0020", "sh0030"]);
}

#[test]
fn test_glob_pattern_for_adjacent_placeholders() {
    let matcher = TemplateMatcher::new("/lib/[v]/@name@@.(frame)@@extension@").unwrap();
    assert_eq!(matcher.glob_pattern(), "/lib/[[]v[]]/*");
}

#[test]
fn test_no_matches_in_empty_project() {
    let project = SampleProject::new().unwrap();
    let pattern = format!("{}/03_Production/Assets/@asset_path@", project.path_str());
    assert!(find_matching_paths(&pattern).unwrap().is_empty());
}
