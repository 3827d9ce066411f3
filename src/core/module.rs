//! Module identification and the resolved module model.
//!
//! A `ModuleId` names one resolved coordinate (group + name + version).
//! A `Module` is the immutable, annotated view of that coordinate that the
//! synthesizer consumes.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::resolver::errors::GraphError;

/// A unique identifier for a resolved module.
///
/// Ordering is lexicographic by group, then name, then version. Generated
/// output iterates modules in this order, so it must stay total and stable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    group: String,
    name: String,
    version: String,
}

impl ModuleId {
    /// Create a new module ID.
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ModuleId {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Get the group (Maven `groupId`).
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Get the module name (Maven `artifactId`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the resolved version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the version-less `group:name` coordinate.
    pub fn coordinate(&self) -> String {
        format!("{}:{}", self.group, self.name)
    }

    /// Check whether this module matches a `group:name` coordinate.
    pub fn matches(&self, coordinate: &str) -> bool {
        coordinate
            .split_once(':')
            .is_some_and(|(group, name)| group == self.group && name == self.name)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

impl FromStr for ModuleId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group, name, version]
                if !group.is_empty() && !name.is_empty() && !version.is_empty() =>
            {
                Ok(ModuleId::new(*group, *name, *version))
            }
            _ => Err(GraphError::InvalidCoordinate {
                coordinate: s.to_string(),
            }),
        }
    }
}

impl Serialize for ModuleId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModuleId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Declared packaging of a module's POM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Packaging {
    #[default]
    Jar,
    Aar,
    Pom,
    /// OSGi bundle; resolves to a plain jar.
    Bundle,
}

/// Packaging kind of a downloaded artifact file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    /// Android library archive carrying an `AndroidManifest.xml`.
    #[serde(rename = "aar")]
    ArchiveWithManifest,
    /// Plain Java archive.
    #[serde(rename = "jar")]
    PlainArchive,
}

impl FileType {
    /// Guess the file type from an artifact path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("aar") => Some(FileType::ArchiveWithManifest),
            Some("jar") => Some(FileType::PlainArchive),
            _ => None,
        }
    }
}

/// The packaged file backing a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Path to the downloaded archive
    pub file: PathBuf,

    /// Packaging kind; selects the declaration template
    pub file_type: FileType,

    /// `minSdkVersion` declared by the archive, if any
    pub min_sdk_version: Option<u32>,

    /// `targetSdkVersion` declared by the archive, if any
    pub target_sdk_version: Option<u32>,

    /// Whether the archive embeds native libraries (aar only)
    pub has_native_code: bool,

    /// License text for the sidecar file (possibly empty)
    pub license_text: String,
}

impl Artifact {
    /// Create an artifact with no SDK bounds, native code or license text.
    pub fn new(file: impl Into<PathBuf>, file_type: FileType) -> Self {
        Artifact {
            file: file.into(),
            file_type,
            min_sdk_version: None,
            target_sdk_version: None,
            has_native_code: false,
            license_text: String::new(),
        }
    }

    /// Native code only matters for manifest-bearing archives.
    pub fn extracts_native_code(&self) -> bool {
        self.file_type == FileType::ArchiveWithManifest && self.has_native_code
    }

    /// File name of the artifact as it is copied into the output tree.
    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// One canonical, deduplicated dependency node.
///
/// Modules are built once per unique coordinate by the flattener and are
/// read-only afterwards.
#[derive(Debug, Clone)]
pub struct Module {
    id: ModuleId,
    target_sdk: u32,
    packaging: Packaging,
    dependencies: BTreeSet<ModuleId>,
    artifact: Option<Artifact>,
    platform_provided: bool,
    canonical_name: String,
}

impl Module {
    /// Create a new module. Classification and naming are supplied by the
    /// caller so every module in a run shares the same collaborators.
    pub fn new(
        id: ModuleId,
        target_sdk: u32,
        packaging: Packaging,
        dependencies: BTreeSet<ModuleId>,
        artifact: Option<Artifact>,
        platform_provided: bool,
        canonical_name: String,
    ) -> Self {
        Module {
            id,
            target_sdk,
            packaging,
            dependencies,
            artifact,
            platform_provided,
            canonical_name,
        }
    }

    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    pub fn target_sdk(&self) -> u32 {
        self.target_sdk
    }

    pub fn packaging(&self) -> Packaging {
        self.packaging
    }

    /// Direct dependency edges.
    pub fn dependencies(&self) -> &BTreeSet<ModuleId> {
        &self.dependencies
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    /// Whether the target platform already ships this module.
    pub fn is_platform_provided(&self) -> bool {
        self.platform_provided
    }

    /// Soong module name.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Directory name for this module's vendored files.
    pub fn module_path(&self) -> String {
        self.canonical_name.replace(&['/', '\\', ':'][..], "_")
    }

    /// A bundle-packaged module resolved to a plain jar.
    pub fn is_archive_bundle(&self) -> bool {
        self.packaging == Packaging::Bundle
            && self
                .artifact
                .as_ref()
                .is_some_and(|a| a.file_type == FileType::PlainArchive)
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Module {}

impl PartialOrd for Module {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Module {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
