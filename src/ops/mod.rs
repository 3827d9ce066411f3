//! High-level operations.
//!
//! This module contains the implementation of bpgen commands.

pub mod generate;
pub mod patch;
pub mod query;

pub use generate::{
    canonicalizer, flatten_graph, generate, GenerateOptions, GenerateSummary,
};
pub use patch::{patch_build_file, BuildFilePatch, PatchError, DEPENDENCY_MARKER};
pub use query::{explain, list_modules, Explanation, ModuleListing, ModuleStatus};
