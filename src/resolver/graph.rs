//! ResolvedGraph - the dependency graph handed over by the resolver.
//!
//! bpgen never resolves versions itself. The graph is built once from the
//! resolver's export and only read afterwards.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::NodeFiltered;

use crate::core::{Artifact, ModuleId, Packaging};
use crate::resolver::errors::GraphError;

/// One resolved node as reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNode {
    pub id: ModuleId,
    pub packaging: Packaging,
    pub artifact: Option<Artifact>,
}

impl ResolvedNode {
    /// A node with default packaging and no artifact.
    pub fn new(id: ModuleId) -> Self {
        ResolvedNode {
            id,
            packaging: Packaging::default(),
            artifact: None,
        }
    }

    pub fn with_packaging(mut self, packaging: Packaging) -> Self {
        self.packaging = packaging;
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifact = Some(artifact);
        self
    }
}

/// The resolved dependency graph.
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    /// Module graph; an edge a -> b means "a depends on b"
    graph: DiGraph<ModuleId, ()>,

    /// Map from ModuleId to node index
    id_to_node: HashMap<ModuleId, NodeIndex>,

    /// Node payloads
    nodes: HashMap<ModuleId, ResolvedNode>,

    /// Direct dependencies of the project, in declaration order
    first_level: Vec<ModuleId>,
}

impl ResolvedGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        ResolvedGraph::default()
    }

    /// Add a module. Re-adding an identical node is a no-op; re-adding the
    /// same coordinate with different contents is an inconsistency.
    pub fn add_module(&mut self, node: ResolvedNode) -> Result<(), GraphError> {
        if let Some(existing) = self.nodes.get(&node.id) {
            if *existing != node {
                return Err(GraphError::ConflictingDefinition {
                    module: node.id.to_string(),
                });
            }
            return Ok(());
        }

        let index = self.graph.add_node(node.id.clone());
        self.id_to_node.insert(node.id.clone(), index);
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add a dependency edge between two known modules.
    pub fn add_edge(&mut self, from: &ModuleId, to: &ModuleId) -> Result<(), GraphError> {
        let from_node = self.node_index(from, None)?;
        let to_node = self.node_index(to, Some(from))?;

        if !self.graph.contains_edge(from_node, to_node) {
            self.graph.add_edge(from_node, to_node, ());
        }
        Ok(())
    }

    /// Mark a known module as a first-level (direct) dependency.
    pub fn add_first_level(&mut self, id: &ModuleId) -> Result<(), GraphError> {
        self.node_index(id, None)?;
        if !self.first_level.contains(id) {
            self.first_level.push(id.clone());
        }
        Ok(())
    }

    fn node_index(&self, id: &ModuleId, required_by: Option<&ModuleId>) -> Result<NodeIndex, GraphError> {
        self.id_to_node
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::MissingModule {
                module: id.to_string(),
                required_by: required_by.map(ToString::to_string),
            })
    }

    /// Get a node by ID.
    pub fn node(&self, id: &ModuleId) -> Option<&ResolvedNode> {
        self.nodes.get(id)
    }

    /// First-level dependencies in declaration order.
    pub fn first_level(&self) -> &[ModuleId] {
        &self.first_level
    }

    /// Iterate over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &ResolvedNode> {
        self.nodes.values()
    }

    /// Get the number of modules.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get direct dependencies of a module, sorted.
    pub fn deps(&self, id: &ModuleId) -> BTreeSet<ModuleId> {
        match self.id_to_node.get(id) {
            Some(&node) => self
                .graph
                .neighbors(node)
                .map(|n| self.graph[n].clone())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Get modules that depend directly on the given module, sorted.
    pub fn dependents(&self, id: &ModuleId) -> BTreeSet<ModuleId> {
        match self.id_to_node.get(id) {
            Some(&node) => self
                .graph
                .neighbors_directed(node, petgraph::Direction::Incoming)
                .map(|n| self.graph[n].clone())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Get a module and everything reachable from it.
    ///
    /// Relies on `check_acyclic` having passed; the visited set still keeps
    /// the walk bounded if it has not.
    pub fn reachable_from(&self, id: &ModuleId) -> BTreeSet<ModuleId> {
        let mut visited = BTreeSet::new();
        let mut stack = vec![id.clone()];

        while let Some(current) = stack.pop() {
            if visited.insert(current.clone()) {
                stack.extend(self.deps(&current));
            }
        }

        visited
    }

    /// Fail with the members of a cycle if the subgraph induced by
    /// `within` is not a DAG. Nodes outside `within` are ignored.
    pub fn check_acyclic(&self, within: &BTreeSet<ModuleId>) -> Result<(), GraphError> {
        let subgraph =
            NodeFiltered::from_fn(&self.graph, |n: NodeIndex| within.contains(&self.graph[n]));

        if toposort(&subgraph, None).is_ok() {
            return Ok(());
        }

        // Report the first strongly connected component that is a real cycle.
        for component in kosaraju_scc(&subgraph) {
            let is_cycle = component.len() > 1
                || component
                    .first()
                    .is_some_and(|&n| self.graph.contains_edge(n, n));

            if is_cycle {
                let mut modules: Vec<String> =
                    component.iter().map(|&n| self.graph[n].to_string()).collect();
                modules.sort();
                return Err(GraphError::Cycle { modules });
            }
        }

        Ok(())
    }
}
