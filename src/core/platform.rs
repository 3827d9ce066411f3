//! Platform availability classification.
//!
//! Whether a module is already shipped by the target platform is decided by
//! the caller. Every component in a run shares one `PlatformAvailability`
//! instance so classification stays consistent.

use std::sync::Arc;

use anyhow::{Context, Result};
use glob::Pattern;

use crate::core::ModuleId;

/// Coordinates that never appear in generated output, whatever the
/// availability predicate says.
pub const EXCLUDED_COORDINATES: &[&str] = &[
    // Kotlin bill of materials; only pins versions for the resolver.
    "org.jetbrains.kotlin:kotlin-bom",
    // Multiplatform shim with no classes of its own on the JVM.
    "org.jetbrains.kotlin:kotlin-stdlib-common",
];

/// Check if a module is structurally excluded from generated output.
pub fn is_excluded(id: &ModuleId) -> bool {
    EXCLUDED_COORDINATES.iter().any(|c| id.matches(c))
}

/// Predicate deciding whether a module is provided by the target platform.
pub trait PlatformAvailability {
    /// Returns true if the platform already ships this module.
    fn is_provided(&self, id: &ModuleId) -> bool;
}

impl<F> PlatformAvailability for F
where
    F: Fn(&ModuleId) -> bool,
{
    fn is_provided(&self, id: &ModuleId) -> bool {
        self(id)
    }
}

/// Shared handle to the run's availability predicate.
pub type SharedAvailability = Arc<dyn PlatformAvailability>;

/// Classifies every module as vendored.
#[derive(Debug, Clone, Copy, Default)]
pub struct NothingProvided;

impl PlatformAvailability for NothingProvided {
    fn is_provided(&self, _id: &ModuleId) -> bool {
        false
    }
}

/// Classifies modules by glob patterns over `group:name`.
///
/// `androidx.*:*` marks every AndroidX module as platform-provided.
#[derive(Debug, Clone, Default)]
pub struct ProvidedPatterns {
    patterns: Vec<Pattern>,
}

impl ProvidedPatterns {
    /// Compile a list of `group:name` glob patterns.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p).with_context(|| format!("invalid platform pattern: {}", p))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ProvidedPatterns { patterns })
    }

    /// Number of configured patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl PlatformAvailability for ProvidedPatterns {
    fn is_provided(&self, id: &ModuleId) -> bool {
        let coordinate = id.coordinate();
        self.patterns.iter().any(|p| p.matches(&coordinate))
    }
}
