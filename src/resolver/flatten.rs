//! Graph flattening.
//!
//! Collapses the resolved graph into the deduplicated, sorted module sets the
//! synthesizer and patcher work from. Modules are created only after the
//! reachable node set is fixed, so a coordinate reached along several paths
//! becomes exactly one `Module`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::core::names::Canonicalizer;
use crate::core::platform::is_excluded;
use crate::core::{Module, ModuleId};
use crate::resolver::errors::GraphError;
use crate::resolver::graph::ResolvedGraph;

/// The flattened view of a resolved graph.
#[derive(Debug, Clone, Default)]
pub struct FlattenedGraph {
    first_level: BTreeSet<ModuleId>,
    closure: BTreeMap<ModuleId, Module>,
    with_archives: BTreeSet<ModuleId>,
}

impl FlattenedGraph {
    /// Direct dependencies, minus excluded bootstrap modules.
    pub fn first_level(&self) -> &BTreeSet<ModuleId> {
        &self.first_level
    }

    /// Every reachable module in `(group, name, version)` order.
    pub fn closure(&self) -> impl Iterator<Item = &Module> {
        self.closure.values()
    }

    /// First-level dependencies plus bundle-packaged jars from the closure.
    pub fn with_archives(&self) -> &BTreeSet<ModuleId> {
        &self.with_archives
    }

    /// Modules that need a generated declaration.
    pub fn vendored(&self) -> impl Iterator<Item = &Module> {
        self.closure()
            .filter(|m| !m.is_platform_provided() && !is_excluded(m.id()))
    }

    pub fn get(&self, id: &ModuleId) -> Option<&Module> {
        self.closure.get(id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.closure.contains_key(id)
    }

    /// Number of modules in the closure.
    pub fn len(&self) -> usize {
        self.closure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closure.is_empty()
    }
}

/// Turns a `ResolvedGraph` into a `FlattenedGraph`.
pub struct Flattener<'a> {
    canonicalizer: &'a Canonicalizer,
    target_sdk: u32,
}

impl<'a> Flattener<'a> {
    pub fn new(canonicalizer: &'a Canonicalizer, target_sdk: u32) -> Self {
        Flattener {
            canonicalizer,
            target_sdk,
        }
    }

    /// Flatten the graph.
    pub fn flatten(&self, graph: &ResolvedGraph) -> Result<FlattenedGraph, GraphError> {
        let first_level: BTreeSet<ModuleId> = graph
            .first_level()
            .iter()
            .filter(|id| !is_excluded(id))
            .cloned()
            .collect();

        let reachable = first_level
            .iter()
            .fold(BTreeSet::new(), |mut acc, id| {
                acc.extend(graph.reachable_from(id));
                acc
            });

        // Modules no first-level dependency reaches never matter
        graph.check_acyclic(&reachable)?;

        let mut closure = BTreeMap::new();
        for id in reachable {
            let module = self.to_module(graph, &id)?;
            closure.insert(id, module);
        }

        check_name_collisions(&closure)?;

        let with_archives = first_level
            .iter()
            .cloned()
            .chain(
                closure
                    .values()
                    .filter(|m| m.is_archive_bundle())
                    .map(|m| m.id().clone()),
            )
            .filter(|id| !is_excluded(id))
            .collect();

        tracing::debug!(
            "Flattened {} first-level dependencies into {} modules",
            first_level.len(),
            closure.len()
        );

        Ok(FlattenedGraph {
            first_level,
            closure,
            with_archives,
        })
    }

    fn to_module(&self, graph: &ResolvedGraph, id: &ModuleId) -> Result<Module, GraphError> {
        let node = graph.node(id).ok_or_else(|| GraphError::MissingModule {
            module: id.to_string(),
            required_by: None,
        })?;

        Ok(Module::new(
            id.clone(),
            self.target_sdk,
            node.packaging,
            graph.deps(id),
            node.artifact.clone(),
            self.canonicalizer.is_platform_provided(id),
            self.canonicalizer.name_of(id),
        ))
    }
}

/// Two vendored modules must never produce the same declaration name.
fn check_name_collisions(closure: &BTreeMap<ModuleId, Module>) -> Result<(), GraphError> {
    let mut seen: HashMap<&str, &ModuleId> = HashMap::new();

    for module in closure.values() {
        if module.is_platform_provided() || is_excluded(module.id()) {
            continue;
        }

        if let Some(first) = seen.insert(module.canonical_name(), module.id()) {
            return Err(GraphError::NameCollision {
                name: module.canonical_name().to_string(),
                first: first.to_string(),
                second: module.id().to_string(),
            });
        }
    }

    Ok(())
}
