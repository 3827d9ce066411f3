//! CLI integration tests for bpgen.
//!
//! These tests run the binary against a small project laid out on disk: a
//! `Bpgen.toml`, a resolved graph, cached artifacts and the hand-maintained
//! `Android.bp`.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get the bpgen binary command.
fn bpgen() -> Command {
    Command::cargo_bin("bpgen").unwrap()
}

const CONFIG: &str = r#"
[project]
name = "myapp"
target_sdk = 34
graph = "build/resolved.toml"
output_dir = "third_party/maven"

[platform]
provided = ["androidx.annotation:*"]
"#;

const GRAPH: &str = r#"
version = 1
first_level = ["com.example:lib:1.0", "com.example:widgets:2.0"]

[[module]]
group = "com.example"
name = "lib"
version = "1.0"
dependencies = ["com.example:core:1.0", "androidx.annotation:annotation:1.7.0"]

[module.artifact]
file = "cache/lib-1.0.jar"
license = "Apache License 2.0"

[[module]]
group = "com.example"
name = "core"
version = "1.0"
packaging = "pom"

[[module]]
group = "com.example"
name = "widgets"
version = "2.0"
packaging = "aar"

[module.artifact]
file = "cache/widgets-2.0.aar"
min_sdk = 21

[[module]]
group = "androidx.annotation"
name = "annotation"
version = "1.7.0"

[module.artifact]
file = "cache/annotation-1.7.0.jar"
"#;

const APP_BP: &str = r#"android_app {
    name: "MyApp",
    srcs: ["src/**/*.java"],
    target_sdk_version: "33",
    static_libs: [
        // bpgen: dependencies
    ],
}
"#;

fn write_aar(path: &Path) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("AndroidManifest.xml", options).unwrap();
    zip.write_all(b"<manifest package=\"com.example.widgets\"/>").unwrap();
    zip.start_file("classes.jar", options).unwrap();
    zip.write_all(b"classes").unwrap();
    zip.finish().unwrap();
}

/// Create a project directory with every input bpgen reads.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();

    fs::create_dir_all(root.join("build/cache")).unwrap();
    fs::write(root.join("Bpgen.toml"), CONFIG).unwrap();
    fs::write(root.join("build/resolved.toml"), GRAPH).unwrap();
    fs::write(root.join("build/cache/lib-1.0.jar"), "lib").unwrap();
    fs::write(root.join("build/cache/annotation-1.7.0.jar"), "annotation").unwrap();
    write_aar(&root.join("build/cache/widgets-2.0.aar"));
    fs::write(root.join("Android.bp"), APP_BP).unwrap();

    tmp
}

// ============================================================================
// bpgen generate
// ============================================================================

#[test]
fn test_generate_writes_tree_and_patches_build_file() {
    let tmp = project();
    let out = tmp.path().join("third_party/maven");

    bpgen()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .success();

    assert!(out.join("Android.bp").exists());
    assert!(out.join("myapp_com.example_lib/lib-1.0.jar").exists());
    assert!(out.join("myapp_com.example_lib/lib-1.0.jar.license").exists());
    assert!(out.join("myapp_com.example_widgets/widgets-2.0.aar").exists());
    assert!(out.join("myapp_com.example_widgets/AndroidManifest.xml").exists());
    assert!(!out.join("myapp_androidx.annotation_annotation").exists());

    let generated = fs::read_to_string(out.join("Android.bp")).unwrap();
    assert!(generated.starts_with("// This file is automatically generated by bpgen."));
    assert!(generated.contains("name: \"myapp_com.example_lib-nodeps\""));
    assert!(generated.contains("min_sdk_version: \"21\""));
    assert!(generated.contains("        \"androidx.annotation_annotation\",\n"));

    let app = fs::read_to_string(tmp.path().join("Android.bp")).unwrap();
    assert!(app.contains("target_sdk_version: \"34\""));
    assert!(app.contains(
        "        // bpgen: dependencies\n        \"myapp_com.example_lib\",\n        \"myapp_com.example_widgets\",\n    ],"
    ));
}

#[test]
fn test_generate_is_idempotent() {
    let tmp = project();
    let generated = tmp.path().join("third_party/maven/Android.bp");

    bpgen().arg("generate").current_dir(tmp.path()).assert().success();
    let first_generated = fs::read_to_string(&generated).unwrap();
    let first_app = fs::read_to_string(tmp.path().join("Android.bp")).unwrap();

    bpgen().arg("generate").current_dir(tmp.path()).assert().success();
    assert_eq!(fs::read_to_string(&generated).unwrap(), first_generated);
    assert_eq!(
        fs::read_to_string(tmp.path().join("Android.bp")).unwrap(),
        first_app
    );
}

#[test]
fn test_generate_cli_overrides_config() {
    let tmp = project();

    bpgen()
        .args(["generate", "--project-name", "other", "--target-sdk", "35"])
        .current_dir(tmp.path())
        .assert()
        .success();

    let app = fs::read_to_string(tmp.path().join("Android.bp")).unwrap();
    assert!(app.contains("\"other_com.example_lib\""));
    assert!(app.contains("target_sdk_version: \"35\""));
}

#[test]
fn test_generate_missing_marker_fails_without_touching_disk() {
    let tmp = project();
    let out = tmp.path().join("third_party/maven");
    fs::create_dir_all(&out).unwrap();
    fs::write(out.join("previous.txt"), "kept").unwrap();

    let broken = APP_BP.replace("// bpgen: dependencies", "");
    fs::write(tmp.path().join("Android.bp"), &broken).unwrap();

    bpgen()
        .args(["generate", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("dependency marker not found"));

    assert!(out.join("previous.txt").exists());
    assert_eq!(
        fs::read_to_string(tmp.path().join("Android.bp")).unwrap(),
        broken
    );
}

#[test]
fn test_generate_reports_missing_module() {
    let tmp = project();
    let graph = GRAPH.replace(
        "dependencies = [\"com.example:core:1.0\"",
        "dependencies = [\"com.example:ghost:1.0\"",
    );
    fs::write(tmp.path().join("build/resolved.toml"), graph).unwrap();

    bpgen()
        .args(["generate", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("com.example:ghost:1.0"));
}

#[test]
fn test_generate_warns_when_nothing_spliced() {
    let tmp = project();
    let graph = GRAPH.replace(
        "first_level = [\"com.example:lib:1.0\", \"com.example:widgets:2.0\"]",
        "first_level = []",
    );
    fs::write(tmp.path().join("build/resolved.toml"), graph).unwrap();

    bpgen()
        .args(["generate", "--no-color"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "warning: no dependencies were spliced into the build file",
        ))
        .stderr(predicate::str::contains("  --> "))
        .stderr(predicate::str::contains("help: consider:"));

    assert!(!tmp.path().join("third_party/maven/Android.bp").exists());
}

#[test]
fn test_generate_without_project_name_fails() {
    let tmp = project();
    fs::write(
        tmp.path().join("Bpgen.toml"),
        CONFIG.replace("name = \"myapp\"\n", ""),
    )
    .unwrap();

    bpgen()
        .arg("generate")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project name configured"));
}

// ============================================================================
// bpgen list / explain / name
// ============================================================================

#[test]
fn test_list_shows_closure() {
    let tmp = project();

    bpgen()
        .arg("list")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example:core:1.0"))
        .stdout(predicate::str::contains("platform"))
        .stdout(predicate::str::contains("androidx.annotation_annotation"));
}

#[test]
fn test_list_vendored_only() {
    let tmp = project();

    bpgen()
        .args(["list", "--vendored"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("myapp_com.example_widgets"))
        .stdout(predicate::str::contains("androidx.annotation").not());
}

#[test]
fn test_explain_shows_chain() {
    let tmp = project();

    bpgen()
        .args(["explain", "com.example:core"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("com.example:lib:1.0"))
        .stdout(predicate::str::contains("name: myapp_com.example_core"));
}

#[test]
fn test_explain_unknown_module() {
    let tmp = project();

    bpgen()
        .args(["explain", "com.example:nope"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in dependency graph"));
}

#[test]
fn test_name_platform_and_vendored() {
    let tmp = project();

    bpgen()
        .args(["name", "androidx.annotation:annotation"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("androidx.annotation_annotation (platform)\n");

    bpgen()
        .args(["name", "com.example:lib:1.0"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout("myapp_com.example_lib (vendored)\n");
}

// ============================================================================
// bpgen completions
// ============================================================================

#[test]
fn test_completions_bash() {
    bpgen()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bpgen"));
}
