//! Resolved dependency graph handling.
//!
//! bpgen consumes the output of an external resolver; it never picks
//! versions. This module loads that output, validates its shape and
//! flattens it into the module sets used for generation.

pub mod encode;
pub mod errors;
pub mod flatten;
pub mod graph;

pub use encode::{load_graph, ResolvedDocument};
pub use errors::GraphError;
pub use flatten::{FlattenedGraph, Flattener};
pub use graph::{ResolvedGraph, ResolvedNode};
