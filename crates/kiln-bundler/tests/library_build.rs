//! End-to-end library builds against temporary projects.

use std::fs;
use std::path::Path;

use kiln_bundler::{ArtifactKind, Error, LibraryBuilder};
use kiln_config::{
    BuildConfiguration, BuildConfigurator, LibraryFormat, LintWarning, PackageType, TransformPlugin,
};
use tempfile::TempDir;

const VUE_MARKER: &str = "VUE_RUNTIME_INTERNALS";
const VUETIFY_MARKER: &str = "VUETIFY_COMPONENT_INTERNALS";

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// A project whose entry imports both peer dependencies, with fake copies
/// of them installed so inlining would be observable.
fn shared_ui_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    write(
        root,
        "src/index.ts",
        r#"import { createApp } from 'vue';
import { VBtn } from 'vuetify/components';
import { clamp } from './util/math';

export const version: string = '1.0.0';

export function mount(selector: string): unknown {
  return createApp({}).mount(selector);
}

export const Button: unknown = VBtn;

export function bounded(value: number): number {
  return clamp(value, 0, 10);
}
"#,
    );
    write(
        root,
        "src/util/math.ts",
        "export function clamp(value: number, min: number, max: number): number {\n  return Math.min(Math.max(value, min), max);\n}\n",
    );
    write(
        root,
        "node_modules/vue/package.json",
        r#"{ "name": "vue", "main": "index.js" }"#,
    );
    write(
        root,
        "node_modules/vue/index.js",
        &format!("export const createApp = () => '{VUE_MARKER}';\n"),
    );
    write(
        root,
        "node_modules/vuetify/package.json",
        r#"{ "name": "vuetify", "exports": { "./components": "./components.js" } }"#,
    );
    write(
        root,
        "node_modules/vuetify/components.js",
        &format!("export const VBtn = '{VUETIFY_MARKER}';\n"),
    );

    dir
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shared_ui_keeps_peer_dependencies_external() {
    let project = shared_ui_project();
    let config = BuildConfigurator::shared_ui(project.path()).produce_configuration();

    let build = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap();

    let es = build.bundle(LibraryFormat::Es).expect("es bundle");
    assert_eq!(es.file_name, "xrd-shared-ui.mjs");
    let es_code = es.text();
    assert!(es_code.contains("\"vue\""));
    assert!(es_code.contains("\"vuetify/components\""));
    assert!(es_code.contains("Math.min"));

    let umd = build.bundle(LibraryFormat::Umd).expect("umd bundle");
    assert_eq!(umd.file_name, "xrd-shared-ui.umd.js");
    let umd_code = umd.text();
    assert!(umd_code.contains("XrdSharedUI"));
    assert!(umd_code.contains("Vue"));

    for bundle in build.bundles() {
        let code = bundle.text();
        assert!(!code.contains(VUE_MARKER), "{} inlined vue", bundle.file_name);
        assert!(
            !code.contains(VUETIFY_MARKER),
            "{} inlined vuetify",
            bundle.file_name
        );
    }

    assert_eq!(
        build.warnings,
        vec![LintWarning::MissingGlobal {
            dependency: "vuetify".into(),
            format: LibraryFormat::Umd,
        }]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn declarations_are_emitted_once() {
    let project = shared_ui_project();
    let config = BuildConfigurator::shared_ui(project.path()).produce_configuration();

    let build = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap();

    let entry = build.get("xrd-shared-ui.d.ts").expect("entry declarations");
    assert_eq!(entry.kind, ArtifactKind::Declaration);
    assert!(entry.text().contains("mount"));
    assert!(build.get("util/math.d.ts").is_some());

    let names: Vec<_> = build.declarations().map(|a| a.file_name.clone()).collect();
    let mut unique = names.clone();
    unique.dedup();
    assert_eq!(names, unique);
    assert_eq!(names.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn removing_declarations_leaves_bundles_unchanged() {
    let project = shared_ui_project();
    let with_dts = BuildConfigurator::shared_ui(project.path()).produce_configuration();
    let mut without_dts = with_dts.clone();
    without_dts
        .transform_plugins
        .retain(|plugin| !plugin.emits_declarations());

    let first = LibraryBuilder::new(with_dts)
        .cwd(project.path())
        .build()
        .await
        .unwrap();
    let second = LibraryBuilder::new(without_dts)
        .cwd(project.path())
        .build()
        .await
        .unwrap();

    assert_eq!(second.declarations().count(), 0);
    for bundle in first.bundles() {
        let other = second.get(&bundle.file_name).expect("same bundle set");
        assert_eq!(bundle.contents, other.contents);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn package_type_module_names_cjs_bundles() {
    let project = shared_ui_project();
    let mut config = BuildConfiguration::new("src/index.ts", "widgets")
        .with_external("vue")
        .with_external("vuetify")
        .with_formats([LibraryFormat::Es, LibraryFormat::Cjs]);
    config.package_type = PackageType::Module;

    let build = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap();

    let names: Vec<_> = build.bundles().map(|a| a.file_name.as_str()).collect();
    assert_eq!(names, vec!["widgets.js", "widgets.cjs"]);
    assert!(build.bundle(LibraryFormat::Cjs).unwrap().text().contains("require("));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sourcemaps_are_written_next_to_bundles() {
    let project = shared_ui_project();
    let mut config = BuildConfiguration::new("src/index.ts", "widgets").with_external("vue");
    config.external_dependencies.insert("vuetify".into());
    config.sourcemap = true;

    let build = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap();

    let map = build.get("widgets.mjs.map").expect("source map artifact");
    assert!(map.text().contains("\"mappings\""));
    assert!(
        build
            .bundle(LibraryFormat::Es)
            .unwrap()
            .text()
            .trim_end()
            .ends_with("//# sourceMappingURL=widgets.mjs.map")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_entry_is_reported_before_bundling() {
    let project = TempDir::new().unwrap();
    let config = BuildConfigurator::shared_ui(project.path()).produce_configuration();

    let err = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap_err();

    match err {
        Error::EntryNotFound(path) => assert!(path.ends_with("src/index.ts")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn schema_errors_stop_the_build() {
    let project = shared_ui_project();
    let config = BuildConfiguration::new("src/index.ts", "widgets")
        .with_formats([LibraryFormat::Iife]);

    let err = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn write_to_places_every_artifact() {
    let project = shared_ui_project();
    let config = BuildConfigurator::shared_ui(project.path()).produce_configuration();
    let out = project.path().join("dist");

    let build = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap();
    let written = build.write_to(&out, false).unwrap();

    assert_eq!(written.len(), build.artifacts.len());
    assert!(out.join("xrd-shared-ui.mjs").is_file());
    assert!(out.join("xrd-shared-ui.umd.js").is_file());
    assert!(out.join("xrd-shared-ui.d.ts").is_file());
    assert!(matches!(
        build.write_to(&out, false),
        Err(Error::OutputExists(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn plugin_free_configuration_still_builds() {
    let project = shared_ui_project();
    let config = BuildConfiguration::new("src/util/math.ts", "math");
    assert!(config.transform_plugins.iter().all(|p| *p != TransformPlugin::Vue));

    let build = LibraryBuilder::new(config)
        .cwd(project.path())
        .build()
        .await
        .unwrap();
    assert_eq!(build.artifacts.len(), 1);
    assert_eq!(build.artifacts[0].file_name, "math.mjs");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn undeclarable_entry_fails_the_build() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/index.ts",
        r#"export const plugin = { install(app: unknown) { return app; } };

export function ok(): number {
  return 1;
}
"#,
    );
    let config = BuildConfiguration::new("src/index.ts", "lib").with_plugin(TransformPlugin::dts());

    let err = LibraryBuilder::new(config)
        .cwd(dir.path())
        .build()
        .await
        .unwrap_err();

    let Error::Bundler(diagnostics) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(diagnostics[0].plugin.as_deref(), Some("kiln:dts"));
    assert!(
        diagnostics[0]
            .file
            .as_deref()
            .is_some_and(|f| f.ends_with("index.ts"))
    );
    let message = err.to_string();
    assert!(message.contains("failed to generate declarations for entry"), "{message}");
    assert!(message.contains("index.ts"), "{message}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn undeclarable_helpers_are_skipped() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/index.ts",
        "import { helper } from './helper';\n\nexport const value: number = helper();\n",
    );
    write(
        dir.path(),
        "src/helper.ts",
        "export const helper = () => 1;\nexport const settings = { retries: helper() };\n",
    );
    let config = BuildConfiguration::new("src/index.ts", "lib").with_plugin(TransformPlugin::dts());

    let build = LibraryBuilder::new(config)
        .cwd(dir.path())
        .build()
        .await
        .unwrap();

    assert!(build.get("lib.d.ts").is_some());
    assert!(build.get("helper.d.ts").is_none());
    assert!(build.get("lib.mjs").is_some());
}
