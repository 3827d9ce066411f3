//! Resolved graph document encoding and decoding.
//!
//! The resolver exports its result as TOML (or JSON, picked by file
//! extension). Artifact paths are relative to the document's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{Artifact, FileType, ModuleId, Packaging};
use crate::resolver::errors::GraphError;
use crate::resolver::graph::{ResolvedGraph, ResolvedNode};
use crate::util::diagnostic::suggestions;

/// Current resolved graph format version.
pub const DOCUMENT_VERSION: u32 = 1;

/// Resolved graph representation for serialization.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ResolvedDocument {
    /// Document format version
    pub version: u32,

    /// Direct dependencies of the project
    #[serde(default)]
    pub first_level: Vec<ModuleId>,

    /// Every resolved module
    #[serde(rename = "module", default)]
    pub modules: Vec<ResolvedEntry>,
}

/// A resolved module entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub group: String,
    pub name: String,
    pub version: String,

    /// Declared POM packaging
    #[serde(default)]
    pub packaging: Packaging,

    /// Direct dependencies (`group:name:version`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<ModuleId>,

    /// Downloaded artifact, absent for POM-only modules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactEntry>,
}

/// A downloaded artifact entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Archive path
    pub file: PathBuf,

    /// `jar` or `aar`; inferred from the extension when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sdk: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sdk: Option<u32>,

    #[serde(default)]
    pub native_code: bool,

    /// License text for the sidecar file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

impl ResolvedEntry {
    pub fn id(&self) -> ModuleId {
        ModuleId::new(&self.group, &self.name, &self.version)
    }

    fn to_node(&self, base_dir: &Path) -> Result<ResolvedNode, GraphError> {
        let id = self.id();
        let mut node = ResolvedNode::new(id.clone()).with_packaging(self.packaging);

        if let Some(entry) = &self.artifact {
            let file_type = entry
                .file_type
                .or_else(|| FileType::from_path(&entry.file))
                .ok_or_else(|| GraphError::UnknownArtifactType {
                    module: id.to_string(),
                    file: entry.file.display().to_string(),
                })?;

            let mut artifact = Artifact::new(base_dir.join(&entry.file), file_type);
            artifact.min_sdk_version = entry.min_sdk;
            artifact.target_sdk_version = entry.target_sdk;
            artifact.has_native_code = entry.native_code;
            artifact.license_text = entry.license.clone().unwrap_or_default();
            node = node.with_artifact(artifact);
        }

        Ok(node)
    }
}

impl ResolvedDocument {
    /// Parse a document from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse resolved graph")
    }

    /// Parse a document from JSON text.
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).context("failed to parse resolved graph")
    }

    /// Load a document; `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| {
                format!(
                    "failed to read resolved graph: {}\n{}",
                    path.display(),
                    suggestions::NO_GRAPH
                )
            })?;

        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        let doc = if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_toml(&contents)
        };

        doc.with_context(|| format!("in {}", path.display()))
    }

    /// Build the graph. Relative artifact paths are resolved against
    /// `base_dir`.
    pub fn to_graph(&self, base_dir: &Path) -> Result<ResolvedGraph, GraphError> {
        if self.version != DOCUMENT_VERSION {
            return Err(GraphError::UnsupportedVersion {
                found: self.version,
            });
        }

        let mut graph = ResolvedGraph::new();

        // First pass: add all modules
        for entry in &self.modules {
            graph.add_module(entry.to_node(base_dir)?)?;
        }

        // Second pass: add dependency edges
        for entry in &self.modules {
            let from = entry.id();
            for dep in &entry.dependencies {
                graph.add_edge(&from, dep)?;
            }
        }

        for id in &self.first_level {
            graph.add_first_level(id)?;
        }

        Ok(graph)
    }
}

/// Load a resolved graph from disk.
pub fn load_graph(path: &Path) -> Result<ResolvedGraph> {
    let doc = ResolvedDocument::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let graph = doc
        .to_graph(base_dir)
        .with_context(|| format!("invalid resolved graph: {}", path.display()))?;

    tracing::debug!(
        "Loaded {} modules ({} first-level) from {}",
        graph.len(),
        graph.first_level().len(),
        path.display()
    );

    Ok(graph)
}
