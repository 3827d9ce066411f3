//! bpgen - Soong build-module synthesis for resolved Maven dependency graphs
//!
//! This crate provides the core library functionality for bpgen:
//! loading a resolved dependency graph, flattening it, classifying modules
//! against the platform, and writing `Android.bp` declarations.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod util;

pub use self::core::{Artifact, Canonicalizer, FileType, Module, ModuleId, NameTable, Packaging};

pub use resolver::{FlattenedGraph, GraphError, ResolvedGraph};
pub use util::context::GlobalContext;
