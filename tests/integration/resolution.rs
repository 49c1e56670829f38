use pipeline_structure::context::Context;
use pipeline_structure::core::StructureError;
use pipeline_structure::resolver::{
    PathResolver, ResolveOptions, resolve_one, resolve_pattern, resolve_template_key,
};
use pipeline_structure::structure::{StructurePreset, TemplateEntry, TemplateTable};
use pipeline_structure::test_utils::init_test_logging;

fn render_context(media_type: &str) -> Context {
    Context::new()
        .with("project_path", "/proj")
        .with("sequence", "sq010")
        .with("shot", "sh0010")
        .with("identifier", "main")
        .with("version", "v0001")
        .with("aov", "beauty")
        .with("frame", "1001")
        .with("extension", ".exr")
        .with("mediaType", media_type)
}

#[test]
fn test_custom_table_asset_path() {
    init_test_logging(None);
    let table = TemplateTable::new().with_entry(
        "assets",
        TemplateEntry::new("@project_path@/Assets/@asset_path@").with_key("@entity_path@"),
    );
    let context = Context::new().with("project_path", "/proj").with("asset_path", "Char/Hero");

    let paths = resolve_template_key("assets", &context, &table, None).unwrap();
    assert_eq!(paths, vec!["/proj/Assets/Char/Hero"]);
}

#[test]
fn test_3d_render_file_chain() {
    let table = TemplateTable::default_structure();
    let path = resolve_one("renderFilesShots", &render_context("3drenders"), &table, None).unwrap();
    assert_eq!(
        path,
        "/proj/03_Production/Shots/sq010/sh0010/Renders/3dRender/main/v0001/beauty/sq010-sh0010_main_v0001_beauty.1001.exr"
    );
}

#[test]
fn test_2d_render_file_chain_skips_aov() {
    let table = TemplateTable::default_structure();
    let path = resolve_one("renderFilesShots", &render_context("2drenders"), &table, None).unwrap();
    assert_eq!(
        path,
        "/proj/03_Production/Shots/sq010/sh0010/Renders/2dRender/main/v0001/sq010-sh0010_main_v0001.1001.exr"
    );
}

#[test]
fn test_asset_and_shot_scenefiles_pick_their_entity() {
    let table = TemplateTable::default_structure();
    // Both entity tokens present: the key decides
    let context = Context::new()
        .with("project_path", "/proj")
        .with("asset_path", "char/hero")
        .with("asset", "hero")
        .with("sequence", "sq010")
        .with("shot", "sh0010")
        .with("department", "modeling")
        .with("task", "body")
        .with("version", "v0002")
        .with("extension", ".hip");

    let asset = resolve_one("assetScenefiles", &context, &table, None).unwrap();
    assert_eq!(asset, "/proj/03_Production/Assets/char/hero/Scenefiles/modeling/body/hero_body_v0002.hip");

    let shot = resolve_one("shotScenefiles", &context, &table, None).unwrap();
    assert_eq!(
        shot,
        "/proj/03_Production/Shots/sq010/sh0010/Scenefiles/modeling/body/sq010-sh0010_body_v0002.hip"
    );
}

#[test]
fn test_legacy_preset_layout() {
    let table = StructurePreset::Legacy.table();
    let context = Context::new().with("project_path", "/proj").with("sequence", "sq010").with("shot", "sh0010");

    let shot = resolve_one("shots", &context, &table, None).unwrap();
    assert_eq!(shot, "/proj/03_Workflow/Shots/sq010-sh0010");
}

#[test]
fn test_optional_wedge_decoration() {
    let table = TemplateTable::default_structure();
    let context = Context::new()
        .with("project_path", "/proj")
        .with("asset_path", "char/hero")
        .with("asset", "hero")
        .with("product", "charGEO")
        .with("version", "v0003");

    let plain = resolve_one("productVersions", &context.clone().with("wedge", ""), &table, None).unwrap();
    assert_eq!(plain, "/proj/03_Production/Assets/char/hero/Export/charGEO/v0003");

    let wedged = resolve_one("productVersions", &context.with("wedge", "w2"), &table, None).unwrap();
    assert_eq!(wedged, "/proj/03_Production/Assets/char/hero/Export/charGEO/v0003_w2");
}

#[test]
fn test_expression_fan_out_and_order() {
    let table = TemplateTable::new()
        .with_entry("sides", TemplateEntry::new("[expression,template = ['L', 'R']]").with_key("@side@"))
        .with_entry("levels", TemplateEntry::new("[expression,template = ['hi', 'lo']]").with_key("@level@"));
    let context = Context::new().with("root", "/lib");

    let two = resolve_pattern("[expression,template = ['@root@/a', '@root@/b']]", &context, &table, ResolveOptions::default())
        .unwrap();
    assert_eq!(two, vec!["/lib/a", "/lib/b"]);

    // The leftmost placeholder varies slowest
    let product = resolve_pattern("@root@/@side@_@level@", &context, &table, ResolveOptions::default()).unwrap();
    assert_eq!(product, vec!["/lib/L_hi", "/lib/L_lo", "/lib/R_hi", "/lib/R_lo"]);
}

#[test]
fn test_unresolved_tokens_and_fallback() {
    let table = TemplateTable::default_structure();
    let resolver = PathResolver::new(&table);
    let context = Context::new().with("project_path", "/proj");

    let kept = resolver.resolve_template_key("products", &context, None).unwrap();
    assert_eq!(kept, vec!["/proj/03_Production/Assets/@asset_path@/Export/@product@"]);

    let filled = resolver.resolve_template_key("sequences", &context, Some("*")).unwrap();
    assert_eq!(filled, vec!["/proj/03_Production/Shots/*"]);
}

#[test]
fn test_failures() {
    let table = TemplateTable::default_structure()
        .with_entry("loop", TemplateEntry::new("@project_path@/@loop_path@").with_key("@loop_path@"));
    let context = Context::new();

    assert!(matches!(
        resolve_pattern("@project_path@/@asset", &context, &table, ResolveOptions::default()),
        Err(StructureError::TemplateSyntax { .. })
    ));

    match resolve_template_key("loop", &context, &table, None) {
        Err(StructureError::CircularReference {
            chain,
        }) => assert_eq!(chain, "loop -> loop"),
        other => panic!("expected CircularReference, got {other:?}"),
    }

    match resolve_template_key("asset", &context, &table, None) {
        Err(StructureError::UnknownTemplateKey {
            suggestions,
            ..
        }) => assert_eq!(suggestions.first().map(String::as_str), Some("assets")),
        other => panic!("expected UnknownTemplateKey, got {other:?}"),
    }
}
