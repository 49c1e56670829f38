use pipeline_structure::context::Context;
use pipeline_structure::core::StructureError;
use pipeline_structure::pattern::{extract_tokens, extract_tokens_for_key};
use pipeline_structure::resolver::{ResolveOptions, resolve_one, resolve_pattern};
use pipeline_structure::structure::{TemplateEntry, TemplateTable};

fn custom_assets() -> TemplateTable {
    TemplateTable::new().with_entry(
        "assets",
        TemplateEntry::new("@project_path@/Assets/@asset_path@").with_key("@entity_path@"),
    )
}

#[test]
fn test_extract_asset_path() {
    let table = custom_assets();
    let context = Context::new().with("project_path", "/proj");

    let tokens = extract_tokens_for_key("/proj/Assets/Char/Hero", "assets", &context, &table).unwrap();
    let entries: Vec<(&str, &str)> = tokens.iter().collect();
    assert_eq!(entries, vec![("asset_path", "Char/Hero"), ("path", "/proj/Assets/Char/Hero")]);
}

#[test]
fn test_extract_value_containing_template_literal() {
    let table = TemplateTable::new();
    let pattern = "@project_path@/Assets/@asset_path@";
    let full = Context::new().with("project_path", "/proj").with("asset_path", "Env/Assets/Tree");

    let path = resolve_pattern(pattern, &full, &table, ResolveOptions::default()).unwrap().remove(0);
    assert_eq!(path, "/proj/Assets/Env/Assets/Tree");

    let known = Context::new().with("project_path", "/proj");
    let tokens = extract_tokens(&path, pattern, &known, &table).unwrap();
    let entries: Vec<(&str, &str)> = tokens.iter().collect();
    assert_eq!(entries, vec![("asset_path", "Env/Assets/Tree"), ("path", "/proj/Assets/Env/Assets/Tree")]);
}

#[test]
fn test_shot_scenefile_round_trip() {
    let table = TemplateTable::default_structure();
    let full = Context::new()
        .with("project_path", "/proj")
        .with("sequence", "sq010")
        .with("shot", "sh0010")
        .with("department", "lighting")
        .with("task", "main")
        .with("version", "v0003")
        .with("extension", ".hip");

    let path = resolve_one("shotScenefiles", &full, &table, None).unwrap();
    assert_eq!(path, "/proj/03_Production/Shots/sq010/sh0010/Scenefiles/lighting/main/sq010-sh0010_main_v0003.hip");

    let known = Context::new().with("project_path", "/proj");
    let tokens = extract_tokens_for_key(&path, "shotScenefiles", &known, &table).unwrap();

    let mut recovered = tokens.into_context();
    recovered.insert("project_path", "/proj");
    assert_eq!(recovered, full);
}

#[test]
fn test_optional_frame_and_compound_extension() {
    let table = TemplateTable::new();
    let pattern = "@root@/@name@@.(frame)@@extension@";

    let framed = extract_tokens("/out/cache.1001.bgeo.sc", pattern, &Context::new(), &table).unwrap();
    assert_eq!(framed.get("root"), Some("/out"));
    assert_eq!(framed.get("name"), Some("cache"));
    assert_eq!(framed.get("frame"), Some("1001"));
    assert_eq!(framed.extension(), Some(".bgeo.sc"));

    let single = extract_tokens("/out/cache.bgeo.sc", pattern, &Context::new(), &table).unwrap();
    assert_eq!(single.get("name"), Some("cache"));
    assert_eq!(single.get("frame"), Some(""));
    assert_eq!(single.extension(), Some(".bgeo.sc"));
}

#[test]
fn test_repeated_token_keeps_first_occurrence() {
    let tokens =
        extract_tokens("/p/sh01/sh02_v3", "@root@/@shot@/@shot@_v@version@", &Context::new(), &TemplateTable::new())
            .unwrap();
    assert_eq!(tokens.get("shot"), Some("sh01"));
    assert_eq!(tokens.get("version"), Some("3"));
    assert!(tokens.iter().all(|(k, _)| !k.starts_with("__")));
}

#[test]
fn test_non_matching_paths_are_empty() {
    let table = custom_assets();
    let context = Context::new().with("project_path", "/proj");

    let unrelated = extract_tokens_for_key("/elsewhere/readme.txt", "assets", &context, &table).unwrap();
    assert!(unrelated.is_empty());

    // The path fits the template, but not the project the context names
    let other_project = extract_tokens_for_key("/other/Assets/Char/Hero", "assets", &context, &table).unwrap();
    assert!(other_project.is_empty());
}

#[test]
fn test_matching_ignores_case() {
    let table = custom_assets();
    let context = Context::new().with("project_path", "/proj");

    let tokens = extract_tokens_for_key("/PROJ/assets/Char/Hero", "assets", &context, &table).unwrap();
    assert_eq!(tokens.get("asset_path"), Some("Char/Hero"));
}

#[test]
fn test_malformed_pattern_fails() {
    let result = extract_tokens("/a/b", "@root@/@name", &Context::new(), &TemplateTable::new());
    assert!(matches!(result, Err(StructureError::TemplateSyntax { .. })));
}
