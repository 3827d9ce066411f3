//! Read-only queries over the flattened graph (`bpgen list`, `bpgen explain`).

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use anyhow::{bail, Result};

use crate::core::platform::is_excluded;
use crate::core::{Module, ModuleId};
use crate::resolver::FlattenedGraph;
use crate::util::diagnostic::suggestions;

/// How a closure module is treated by generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// Gets a declaration group and vendored files
    Vendored,
    /// Left to the platform, referenced by its platform name
    PlatformProvided,
    /// Bootstrap module that is never referenced
    Excluded,
}

impl ModuleStatus {
    pub fn of(module: &Module) -> Self {
        if is_excluded(module.id()) {
            ModuleStatus::Excluded
        } else if module.is_platform_provided() {
            ModuleStatus::PlatformProvided
        } else {
            ModuleStatus::Vendored
        }
    }
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModuleStatus::Vendored => "vendored",
            ModuleStatus::PlatformProvided => "platform",
            ModuleStatus::Excluded => "excluded",
        };
        f.pad(s)
    }
}

/// One row of `bpgen list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleListing {
    pub id: ModuleId,
    pub name: String,
    pub status: ModuleStatus,
    pub first_level: bool,
}

/// Every closure module in `(group, name, version)` order.
pub fn list_modules(flat: &FlattenedGraph) -> Vec<ModuleListing> {
    flat.closure()
        .map(|module| ModuleListing {
            id: module.id().clone(),
            name: module.canonical_name().to_string(),
            status: ModuleStatus::of(module),
            first_level: flat.first_level().contains(module.id()),
        })
        .collect()
}

/// Why a module is part of the closure.
#[derive(Debug, Clone)]
pub struct Explanation {
    pub module: Module,
    pub status: ModuleStatus,

    /// Closure modules that depend on it directly
    pub required_by: BTreeSet<ModuleId>,

    /// Shortest path from a first-level dependency down to the module
    pub chain: Vec<ModuleId>,
}

/// Explain the module with the given `group:name` coordinate.
pub fn explain(flat: &FlattenedGraph, coordinate: &str) -> Result<Explanation> {
    let Some(module) = flat.closure().find(|m| m.id().matches(coordinate)) else {
        bail!(
            "module `{}` not found in dependency graph\n{}",
            coordinate,
            suggestions::MODULE_NOT_FOUND
        );
    };

    let required_by = flat
        .closure()
        .filter(|m| m.dependencies().contains(module.id()))
        .map(|m| m.id().clone())
        .collect();

    Ok(Explanation {
        module: module.clone(),
        status: ModuleStatus::of(module),
        required_by,
        chain: shortest_chain(flat, module.id()),
    })
}

/// Breadth-first search from the first-level set. First-level modules are
/// visited in order, so ties resolve to the smallest coordinates.
fn shortest_chain(flat: &FlattenedGraph, target: &ModuleId) -> Vec<ModuleId> {
    let mut parent: HashMap<&ModuleId, Option<&ModuleId>> = HashMap::new();
    let mut queue = VecDeque::new();

    for id in flat.first_level() {
        parent.insert(id, None);
        queue.push_back(id);
    }

    while let Some(id) = queue.pop_front() {
        if id == target {
            let mut chain = vec![id.clone()];
            let mut cursor = id;
            while let Some(Some(prev)) = parent.get(cursor) {
                chain.push((*prev).clone());
                cursor = *prev;
            }
            chain.reverse();
            return chain;
        }

        let Some(module) = flat.get(id) else {
            continue;
        };
        for dep in module.dependencies() {
            if !parent.contains_key(dep) {
                parent.insert(dep, Some(id));
                queue.push_back(dep);
            }
        }
    }

    Vec::new()
}
