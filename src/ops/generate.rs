//! Implementation of `bpgen generate`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::builder::{format_dependency_names, SynthesisReport, Synthesizer};
use crate::core::{Canonicalizer, NameTable, ProvidedPatterns};
use crate::ops::patch::BuildFilePatch;
use crate::resolver::{load_graph, FlattenedGraph, Flattener};
use crate::util::config::Config;
use crate::util::fs::{is_inside, remove_dir_all_if_exists};
use crate::util::GlobalContext;

/// Options for the generate command.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Prefix of vendored module names
    pub project_name: String,

    /// Target platform version written to every rule
    pub target_sdk: u32,

    /// Resolved graph document
    pub graph: PathBuf,

    /// Hand-maintained build file to patch
    pub build_file: PathBuf,

    /// Directory wiped and regenerated
    pub output_dir: PathBuf,
}

impl GenerateOptions {
    pub fn from_context(ctx: &GlobalContext) -> Result<Self> {
        let project = &ctx.config().project;

        Ok(GenerateOptions {
            project_name: ctx.project_name()?.to_string(),
            target_sdk: project.target_sdk,
            graph: project.graph.clone(),
            build_file: project.build_file.clone(),
            output_dir: project.output_dir.clone(),
        })
    }
}

/// What a generate run did.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    /// Modules in the flattened closure
    pub closure: usize,

    /// Closure modules left to the platform
    pub platform_provided: usize,

    /// Synthesis counters
    pub report: SynthesisReport,

    /// Names spliced into the hand-maintained build file
    pub dependencies: Vec<String>,

    /// Whether the hand-maintained build file was rewritten
    pub build_file_changed: bool,
}

/// Build the canonicalizer for a run: built-in name table plus config
/// overrides, and the configured platform patterns.
pub fn canonicalizer(config: &Config, project_name: &str) -> Result<Canonicalizer> {
    for coordinate in config.names.keys() {
        if coordinate.split(':').count() != 2 {
            tracing::warn!(
                "Name override `{}` is not a `group:name` coordinate and will never match",
                coordinate
            );
        }
    }

    let table = NameTable::builtin()?.with_overrides(&config.names);
    let provided = ProvidedPatterns::new(&config.platform.provided)?;

    tracing::debug!(
        "{} name overrides, {} platform patterns",
        table.len(),
        provided.len()
    );

    Ok(Canonicalizer::new(project_name, table, Arc::new(provided)))
}

/// Load and flatten the resolved graph.
pub fn flatten_graph(
    graph: &Path,
    canonicalizer: &Canonicalizer,
    target_sdk: u32,
) -> Result<FlattenedGraph> {
    let resolved = load_graph(graph)?;
    Ok(Flattener::new(canonicalizer, target_sdk).flatten(&resolved)?)
}

/// Regenerate the output directory and patch the hand-maintained build file.
///
/// The patch is computed before anything is deleted, so a build file that
/// lacks the marker or version field fails the run with the output directory
/// untouched.
pub fn generate(opts: &GenerateOptions, canonicalizer: &Canonicalizer) -> Result<GenerateSummary> {
    guard_output_dir(&opts.output_dir, &opts.build_file, "build file")?;
    guard_output_dir(&opts.output_dir, &opts.graph, "resolved graph")?;

    let flat = flatten_graph(&opts.graph, canonicalizer, opts.target_sdk)?;
    for artifact in flat.closure().filter_map(|m| m.artifact()) {
        guard_output_dir(&opts.output_dir, &artifact.file, "artifact")?;
    }

    let dependencies = format_dependency_names(flat.with_archives(), canonicalizer, None);
    let patch = BuildFilePatch::prepare(&opts.build_file, &dependencies, opts.target_sdk)?;

    tracing::info!("Regenerating {}", opts.output_dir.display());
    remove_dir_all_if_exists(&opts.output_dir)?;

    let report = Synthesizer::new(canonicalizer, &opts.output_dir).synthesize(&flat)?;

    let build_file_changed = patch.apply()?;
    if build_file_changed {
        tracing::info!("Updated {}", patch.path().display());
    } else {
        tracing::debug!("{} already up to date", patch.path().display());
    }

    let platform_provided = flat.closure().filter(|m| m.is_platform_provided()).count();

    Ok(GenerateSummary {
        closure: flat.len(),
        platform_provided,
        report,
        dependencies,
        build_file_changed,
    })
}

/// Refuse to wipe an output directory that holds one of the run's inputs.
fn guard_output_dir(output_dir: &Path, input: &Path, what: &str) -> Result<()> {
    if is_inside(input, output_dir) {
        bail!(
            "output directory {} contains the {} {}\n\
             help: choose an output directory that is only used for generated files",
            output_dir.display(),
            what,
            input.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::patch::{PatchError, DEPENDENCY_MARKER};
    use crate::util::fs::list_files;
    use tempfile::TempDir;

    const APP_BP: &str = r#"android_app {
    name: "MyApp",
    target_sdk_version: "30",
    static_libs: [
        // bpgen: dependencies
    ],
}
"#;

    const GRAPH: &str = r#"
version = 1
first_level = ["com.example:lib:1.0", "org.jetbrains.kotlin:kotlin-bom:1.9.0"]

[[module]]
group = "com.example"
name = "lib"
version = "1.0"
dependencies = ["com.example:core:1.0", "com.google.code.gson:gson:2.10"]

[module.artifact]
file = "cache/lib-1.0.jar"
license = "Apache License 2.0"

[[module]]
group = "com.example"
name = "core"
version = "1.0"
packaging = "pom"

[[module]]
group = "com.google.code.gson"
name = "gson"
version = "2.10"

[module.artifact]
file = "cache/gson-2.10.jar"

[[module]]
group = "org.jetbrains.kotlin"
name = "kotlin-bom"
version = "1.9.0"
packaging = "pom"
"#;

    /// Lay out a project with the sample graph and build file.
    fn write_project(root: &Path) {
        std::fs::create_dir_all(root.join("cache")).unwrap();
        std::fs::write(root.join("cache/lib-1.0.jar"), "lib").unwrap();
        std::fs::write(root.join("cache/gson-2.10.jar"), "gson").unwrap();
        std::fs::write(root.join("resolved.toml"), GRAPH).unwrap();
        std::fs::write(root.join("Android.bp"), APP_BP).unwrap();
    }

    fn options(root: &Path) -> GenerateOptions {
        GenerateOptions {
            project_name: "myapp".to_string(),
            target_sdk: 34,
            graph: root.join("resolved.toml"),
            build_file: root.join("Android.bp"),
            output_dir: root.join("third_party"),
        }
    }

    fn canon(provided: &[&str]) -> Canonicalizer {
        let mut config = Config::default();
        config.platform.provided = provided.iter().map(|p| p.to_string()).collect();
        canonicalizer(&config, "myapp").unwrap()
    }

    #[test]
    fn test_generate_end_to_end() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());

        let summary = generate(&options(tmp.path()), &canon(&[])).unwrap();

        assert_eq!(summary.closure, 3);
        assert_eq!(summary.report.modules, 3);
        assert_eq!(summary.report.artifacts, 2);
        assert!(summary.build_file_changed);
        assert_eq!(summary.dependencies, vec!["myapp_com.example_lib"]);

        let patched = std::fs::read_to_string(tmp.path().join("Android.bp")).unwrap();
        assert!(patched.contains("target_sdk_version: \"34\""));
        assert!(patched.contains(&format!(
            "        {}\n        \"myapp_com.example_lib\",\n    ],",
            DEPENDENCY_MARKER
        )));

        let generated = std::fs::read_to_string(tmp.path().join("third_party/Android.bp")).unwrap();
        assert!(generated.contains(
            "    static_libs: [\n        \"myapp_com.example_lib-nodeps\",\n        \"myapp_com.example_core\",\n        \"myapp_com.google.code.gson_gson\",\n    ],"
        ));
        assert!(!generated.contains("kotlin-bom"));
    }

    #[test]
    fn test_generate_platform_provided_dependency() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());

        let summary =
            generate(&options(tmp.path()), &canon(&["com.google.code.gson:*"])).unwrap();

        assert_eq!(summary.platform_provided, 1);
        assert_eq!(summary.report.modules, 2);

        let files = list_files(&tmp.path().join("third_party")).unwrap();
        assert!(!files.iter().any(|f| f.to_string_lossy().contains("gson")));

        let generated = std::fs::read_to_string(tmp.path().join("third_party/Android.bp")).unwrap();
        assert!(generated.contains("        \"gson\",\n"));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let opts = options(tmp.path());
        let canon = canon(&[]);

        generate(&opts, &canon).unwrap();
        let first = std::fs::read_to_string(opts.output_dir.join("Android.bp")).unwrap();
        let first_files = list_files(&opts.output_dir).unwrap();

        let summary = generate(&opts, &canon).unwrap();
        assert!(!summary.build_file_changed);
        assert_eq!(
            std::fs::read_to_string(opts.output_dir.join("Android.bp")).unwrap(),
            first
        );
        assert_eq!(list_files(&opts.output_dir).unwrap(), first_files);
    }

    #[test]
    fn test_generate_wipes_stale_output() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let opts = options(tmp.path());

        std::fs::create_dir_all(opts.output_dir.join("old_module")).unwrap();
        std::fs::write(opts.output_dir.join("old_module/old.jar"), "stale").unwrap();

        generate(&opts, &canon(&[])).unwrap();
        assert!(!opts.output_dir.join("old_module").exists());
    }

    #[test]
    fn test_generate_bad_build_file_leaves_output() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let opts = options(tmp.path());

        std::fs::create_dir_all(&opts.output_dir).unwrap();
        std::fs::write(opts.output_dir.join("keep.txt"), "previous run").unwrap();
        std::fs::write(&opts.build_file, "android_app {\n}\n").unwrap();

        let err = generate(&opts, &canon(&[])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PatchError>(),
            Some(PatchError::MissingMarker { .. })
        ));
        assert!(opts.output_dir.join("keep.txt").exists());
    }

    #[test]
    fn test_generate_refuses_output_dir_containing_build_file() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let mut opts = options(tmp.path());
        opts.output_dir = tmp.path().to_path_buf();

        let err = generate(&opts, &canon(&[])).unwrap_err();
        assert!(err.to_string().contains("contains the build file"));
        assert!(tmp.path().join("resolved.toml").exists());
    }

    #[test]
    fn test_generate_refuses_output_dir_with_parent_component() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        std::fs::create_dir_all(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("precious.txt"), "keep").unwrap();
        let mut opts = options(tmp.path());
        opts.output_dir = tmp.path().join("sub/..");

        let err = generate(&opts, &canon(&[])).unwrap_err();
        assert!(err.to_string().contains("contains the build file"));
        assert!(tmp.path().join("precious.txt").exists());
        assert!(tmp.path().join("resolved.toml").exists());
        assert!(tmp.path().join("cache/lib-1.0.jar").exists());
    }

    #[test]
    fn test_generate_refuses_output_dir_containing_graph() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        std::fs::create_dir_all(tmp.path().join("build")).unwrap();
        std::fs::rename(tmp.path().join("resolved.toml"), tmp.path().join("build/resolved.toml"))
            .unwrap();
        let mut opts = options(tmp.path());
        opts.graph = tmp.path().join("build/resolved.toml");
        opts.output_dir = tmp.path().join("build");

        let err = generate(&opts, &canon(&[])).unwrap_err();
        assert!(err.to_string().contains("contains the resolved graph"));
        assert!(tmp.path().join("build/resolved.toml").exists());
    }

    #[test]
    fn test_generate_refuses_output_dir_containing_artifacts() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let mut opts = options(tmp.path());
        opts.output_dir = tmp.path().join("cache");

        let err = generate(&opts, &canon(&[])).unwrap_err();
        assert!(err.to_string().contains("contains the artifact"));
        assert!(tmp.path().join("cache/lib-1.0.jar").exists());
        assert!(tmp.path().join("cache/gson-2.10.jar").exists());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("Android.bp")).unwrap(),
            APP_BP
        );
    }
}
