//! Project configuration (`Bpgen.toml`).
//!
//! ```toml
//! [project]
//! name = "myapp"
//! target_sdk = 34
//! graph = "build/resolved.toml"
//! build_file = "Android.bp"
//! output_dir = "third_party/maven"
//!
//! [platform]
//! provided = ["androidx.*:*"]
//!
//! [names]
//! "com.example:widgets" = "example-widgets"
//! ```
//!
//! Relative paths are resolved against the directory holding the file.
//! Command-line overrides take precedence over file values.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration file name.
pub const CONFIG_NAME: &str = "Bpgen.toml";

/// Default target platform version.
pub const DEFAULT_TARGET_SDK: u32 = 34;

/// bpgen configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project settings
    pub project: ProjectConfig,

    /// Platform availability settings
    pub platform: PlatformConfig,

    /// Extra name overrides, `"group:name" = "module"`
    pub names: BTreeMap<String, String>,
}

/// Project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Prefix of vendored module names
    pub name: Option<String>,

    /// Target platform version
    pub target_sdk: u32,

    /// Resolved graph exported by the resolver
    pub graph: PathBuf,

    /// Hand-maintained build file to patch
    pub build_file: PathBuf,

    /// Directory wiped and regenerated on every run
    pub output_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            name: None,
            target_sdk: DEFAULT_TARGET_SDK,
            graph: PathBuf::from("resolved.toml"),
            build_file: PathBuf::from("Android.bp"),
            output_dir: PathBuf::from("third_party"),
        }
    }
}

/// Platform availability settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// `group:name` glob patterns of platform-provided modules
    pub provided: Vec<String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub project_name: Option<String>,
    pub target_sdk: Option<u32>,
    pub graph: Option<PathBuf>,
    pub build_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Apply command-line overrides (overrides take precedence).
    pub fn merge(&mut self, overrides: &Overrides) {
        if let Some(name) = &overrides.project_name {
            self.project.name = Some(name.clone());
        }
        if let Some(sdk) = overrides.target_sdk {
            self.project.target_sdk = sdk;
        }
        if let Some(graph) = &overrides.graph {
            self.project.graph = graph.clone();
        }
        if let Some(build_file) = &overrides.build_file {
            self.project.build_file = build_file.clone();
        }
        if let Some(output_dir) = &overrides.output_dir {
            self.project.output_dir = output_dir.clone();
        }
    }

    /// Make every configured path absolute against `root`.
    pub fn resolve_paths(&mut self, root: &Path) {
        self.project.graph = root.join(&self.project.graph);
        self.project.build_file = root.join(&self.project.build_file);
        self.project.output_dir = root.join(&self.project.output_dir);
    }

    /// The project name used in vendored module names.
    pub fn project_name(&self) -> Result<&str> {
        match self.project.name.as_deref() {
            Some(name) if is_valid_project_name(name) => Ok(name),
            Some(name) => bail!(
                "invalid project name `{}`\n\
                 help: use letters, digits, `_`, `-` or `.`",
                name
            ),
            None => bail!(
                "no project name configured\n\
                 help: set `name` under [project] in {} or pass --project-name",
                CONFIG_NAME
            ),
        }
    }
}

fn is_valid_project_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
