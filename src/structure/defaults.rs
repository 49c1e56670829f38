//! Built-in project layouts.

use super::{TemplateEntry, TemplateTable};

const RENDER_AOVS: &str = "[expression,#  available variables:\n#  \"context\" - dict\n\n\
if context.get(\"mediaType\") == \"2drenders\":\n\
\ttemplate = \"@renderversion_path@\"\n\
else:\n\
\ttemplate = \"@renderversion_path@/@aov@\"]";

const RENDER_FILES_ASSETS: &str = "[expression,#  available variables:\n#  \"context\" - dict\n\n\
if context.get(\"mediaType\") == \"2drenders\":\n\
\ttemplate = \"@aov_path@/@asset@_@identifier@_@version@@.(frame)@@extension@\"\n\
else:\n\
\ttemplate = \"@aov_path@/@asset@_@identifier@_@version@_@aov@@.(frame)@@extension@\"]";

const RENDER_FILES_SHOTS: &str = "[expression,#  available variables:\n#  \"context\" - dict\n\n\
if context.get(\"mediaType\") == \"2drenders\":\n\
\ttemplate = \"@aov_path@/@sequence@-@shot@_@identifier@_@version@@.(frame)@@extension@\"\n\
else:\n\
\ttemplate = \"@aov_path@/@sequence@-@shot@_@identifier@_@version@_@aov@@.(frame)@@extension@\"]";

const LEGACY_RENDER_VERSIONS: &str = "[expression,if context.get(\"mediaType\") == \"2drenders\":\n\
\x20   template=\"@render_path@/@version@\"\n\
else:\n\
\x20   template=\"@render_path@/@version@_@comment@\"]";

const LEGACY_AOVS: &str = "[expression,if context.get(\"mediaType\") == \"2drenders\":\n\
\x20   template=\"@renderversion_path@\"\n\
else:\n\
\x20   template=\"@renderversion_path@/@aov@\"]";

fn entry(label: &str, key: &str, value: &str) -> TemplateEntry {
    TemplateEntry::new(value).with_label(label).with_key(key)
}

/// The production layout.
pub(super) fn default_table() -> TemplateTable {
    TemplateTable::new()
        .with_entry(
            "pipeline",
            entry("Pipeline", "@pipeline_path@", "@project_path@/00_Pipeline")
                .with_requires(["project_path"]),
        )
        .with_entry(
            "assets",
            entry("Assets", "@entity_path@", "@project_path@/03_Production/Assets/@asset_path@")
                .with_requires(["project_path", "asset_path"]),
        )
        .with_entry(
            "sequences",
            entry("Sequences", "@sequence_path@", "@project_path@/03_Production/Shots/@sequence@")
                .with_requires(["project_path", "sequence"]),
        )
        .with_entry(
            "shots",
            entry("Shots", "@entity_path@", "@sequence_path@/@shot@").with_requires([
                super::Requirement::from(["sequence_path", "sequence"]),
                super::Requirement::from("shot"),
            ]),
        )
        .with_entry(
            "textures",
            entry("Textures", "@entity_path@", "@project_path@/04_Resources/Textures")
                .with_requires(["project_path"]),
        )
        .with_entry(
            "departments",
            entry("Departments", "@department_path@", "@entity_path@/Scenefiles/@department@")
                .with_requires(["entity_path", "department"]),
        )
        .with_entry(
            "tasks",
            entry("Tasks", "@task_path@", "@department_path@/@task@")
                .with_requires(["department_path", "task"]),
        )
        .with_entry(
            "assetScenefiles",
            entry(
                "Asset Scenefiles",
                "@scenefile_path@",
                "@task_path@/@asset@_@task@_@version@@extension@",
            )
            .with_requires(["task_path", "version"]),
        )
        .with_entry(
            "shotScenefiles",
            entry(
                "Shot Scenefiles",
                "@scenefile_path@",
                "@task_path@/@sequence@-@shot@_@task@_@version@@extension@",
            )
            .with_requires(["task_path", "version"]),
        )
        .with_entry(
            "products",
            entry("Products", "@product_path@", "@entity_path@/Export/@product@")
                .with_requires(["entity_path", "product"]),
        )
        .with_entry(
            "productVersions",
            entry("Productversions", "@productversion_path@", "@product_path@/@version@@_(wedge)@")
                .with_requires(["product_path", "version"]),
        )
        .with_entry(
            "productFilesAssets",
            entry(
                "Asset Productfiles",
                "@productfile_path@",
                "@productversion_path@/@asset@_@product@_@version@@.(frame)@@extension@",
            )
            .with_requires(["productversion_path"]),
        )
        .with_entry(
            "productFilesShots",
            entry(
                "Shot Productfiles",
                "@productfile_path@",
                "@productversion_path@/@sequence@-@shot@_@product@_@version@@.(frame)@@extension@",
            )
            .with_requires(["productversion_path"]),
        )
        .with_entry(
            "3drenders",
            entry("3D Renders", "@render_path@", "@entity_path@/Renders/3dRender/@identifier@")
                .with_requires(["entity_path", "identifier"]),
        )
        .with_entry(
            "2drenders",
            entry("2D Renders", "@render_path@", "@entity_path@/Renders/2dRender/@identifier@")
                .with_requires(["entity_path", "identifier"]),
        )
        .with_entry(
            "externalMedia",
            entry("External Media", "@render_path@", "@entity_path@/Renders/external/@identifier@")
                .with_requires(["entity_path", "identifier"]),
        )
        .with_entry(
            "renderVersions",
            entry("Renderversions", "@renderversion_path@", "@render_path@/@version@")
                .with_requires(["render_path", "version"]),
        )
        .with_entry(
            "aovs",
            entry("AOVs", "@aov_path@", RENDER_AOVS).with_requires(["renderversion_path", "aov"]),
        )
        .with_entry(
            "renderFilesAssets",
            entry("Asset Renderfiles", "@renderfile_path@", RENDER_FILES_ASSETS)
                .with_requires(["aov_path"]),
        )
        .with_entry(
            "renderFilesShots",
            entry("Shot Renderfiles", "@renderfile_path@", RENDER_FILES_SHOTS)
                .with_requires(["aov_path"]),
        )
        .with_entry(
            "playblasts",
            entry("Playblasts", "@playblast_path@", "@entity_path@/Playblasts/@identifier@")
                .with_requires(["entity_path", "identifier"]),
        )
        .with_entry(
            "playblastVersions",
            entry("Playblastsversions", "@playblastversion_path@", "@playblast_path@/@version@")
                .with_requires(["playblast_path", "version"]),
        )
        .with_entry(
            "playblastFilesAssets",
            entry(
                "Asset Playblastsfiles",
                "@playblastfile_path@",
                "@playblastversion_path@/@asset@_@identifier@_@version@@.(frame)@@extension@",
            )
            .with_requires(["playblastversion_path"]),
        )
        .with_entry(
            "playblastFilesShots",
            entry(
                "Shot Playblastsfiles",
                "@playblastfile_path@",
                "@playblastversion_path@/@sequence@-@shot@_@identifier@_@version@@.(frame)@@extension@",
            )
            .with_requires(["playblastversion_path"]),
        )
}

/// Values of the older layout, overlaid on [`default_table`].
pub(super) fn legacy_overrides() -> TemplateTable {
    [
        ("pipeline", "@project_path@/00_Pipeline"),
        ("assets", "@project_path@/03_Workflow/Assets/@asset_path@"),
        ("sequences", "@project_path@/03_Workflow/Shots/@sequence@"),
        ("shots", "@project_path@/03_Workflow/Shots/@sequence@-@shot@"),
        ("textures", "@project_path@/04_Assets/Textures"),
        ("departments", "@entity_path@/Scenefiles/@department@"),
        ("tasks", "@department_path@/@task@"),
        (
            "assetScenefiles",
            "@task_path@/@asset@_@department@_@task@_@version@_@comment@_@user@_@extension@",
        ),
        (
            "shotScenefiles",
            "@task_path@/shot_@sequence@-@shot@_@department@_@task@_@version@_@comment@_@user@_@extension@",
        ),
        ("products", "@entity_path@/Export/@product@"),
        ("productVersions", "@product_path@/@version@_@comment@_@user@"),
        (
            "productFilesAssets",
            "@productversion_path@/@unit@/@asset@_@product@_@version@@.(frame)@@extension@",
        ),
        (
            "productFilesShots",
            "@productversion_path@/@unit@/shot_@sequence@-@shot@_@product@_@version@@.(frame)@@extension@",
        ),
        ("3drenders", "@entity_path@/Rendering/3dRender/@identifier@"),
        ("2drenders", "@entity_path@/Rendering/2dRender/@identifier@"),
        ("externalMedia", "@entity_path@/Rendering/external/@identifier@"),
        ("renderVersions", LEGACY_RENDER_VERSIONS),
        ("aovs", LEGACY_AOVS),
        ("renderFilesAssets", "@aov_path@/@asset@_@identifier@_@version@_@aov@@.(frame)@@extension@"),
        (
            "renderFilesShots",
            "@aov_path@/shot_@sequence@-@shot@_@identifier@_@version@_@aov@@.(frame)@@extension@",
        ),
        ("playblasts", "@entity_path@/Playblasts/@identifier@"),
        ("playblastVersions", "@playblast_path@/@version@_@comment@"),
        (
            "playblastFilesAssets",
            "@playblastversion_path@/@asset@_@identifier@_@version@@.(frame)@@extension@",
        ),
        (
            "playblastFilesShots",
            "@playblastversion_path@/shot_@sequence@-@shot@_@identifier@_@version@@.(frame)@@extension@",
        ),
    ]
    .into_iter()
    .map(|(key, value)| (key, TemplateEntry::new(value)))
    .collect()
}
