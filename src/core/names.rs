//! Maven coordinate to Soong module name canonicalization.
//!
//! Platform-provided modules are named after the platform's own module,
//! either through the override table or the `group_name` fallback.
//! Vendored modules get a project-scoped name that can never collide with a
//! platform module.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::core::platform::SharedAvailability;
use crate::core::ModuleId;

/// Built-in overrides, keyed by `group:name`.
const BUILTIN_NAMES: &str = include_str!("names.toml");

/// Immutable mapping from `group:name` to a literal Soong module name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    entries: BTreeMap<String, String>,
}

impl NameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        NameTable::default()
    }

    /// Load the table shipped with bpgen.
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_NAMES).context("failed to parse built-in name table")
    }

    /// Parse a TOML table of `"group:name" = "module"` entries.
    pub fn parse(contents: &str) -> Result<Self> {
        let entries: BTreeMap<String, String> = toml::from_str(contents)?;
        Ok(NameTable { entries })
    }

    /// Return a table extended with `extra`; entries in `extra` win.
    pub fn with_overrides(mut self, extra: &BTreeMap<String, String>) -> Self {
        for (coordinate, name) in extra {
            self.entries.insert(coordinate.clone(), name.clone());
        }
        self
    }

    /// Look up an override.
    pub fn get(&self, coordinate: &str) -> Option<&str> {
        self.entries.get(coordinate).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonical Soong name for a `(group, name)` pair.
    pub fn canonical_name(&self, project: &str, group: &str, name: &str, eligible: bool) -> String {
        if !eligible {
            return format!("{}_{}_{}", project, group, name);
        }

        let coordinate = format!("{}:{}", group, name);
        match self.get(&coordinate) {
            Some(mapped) => mapped.to_string(),
            None => coordinate.replace(':', "_"),
        }
    }
}

/// Binds the project prefix, the override table and the availability
/// predicate for one run.
#[derive(Clone)]
pub struct Canonicalizer {
    project: String,
    table: NameTable,
    availability: SharedAvailability,
}

impl Canonicalizer {
    pub fn new(project: impl Into<String>, table: NameTable, availability: SharedAvailability) -> Self {
        Canonicalizer {
            project: project.into(),
            table,
            availability,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Whether the run's predicate classifies this module as platform-provided.
    pub fn is_platform_provided(&self, id: &ModuleId) -> bool {
        self.availability.is_provided(id)
    }

    /// Canonical Soong name for a module.
    pub fn name_of(&self, id: &ModuleId) -> String {
        self.table.canonical_name(
            &self.project,
            id.group(),
            id.name(),
            self.is_platform_provided(id),
        )
    }
}

impl std::fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("project", &self.project)
            .field("table", &self.table.len())
            .finish()
    }
}
