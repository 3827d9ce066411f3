//! Core data structures for bpgen.
//!
//! This module contains the foundational types used throughout bpgen:
//! - Module identity and the annotated module model
//! - Coordinate to Soong name canonicalization
//! - Platform availability classification

pub mod module;
pub mod names;
pub mod platform;

pub use module::{Artifact, FileType, Module, ModuleId, Packaging};
pub use names::{Canonicalizer, NameTable};
pub use platform::{
    is_excluded, NothingProvided, PlatformAvailability, ProvidedPatterns, SharedAvailability,
};
