//! Graph inconsistency errors and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// The resolved graph handed to bpgen does not have the expected shape.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid module coordinate `{coordinate}`")]
    InvalidCoordinate { coordinate: String },

    #[error("resolved graph version {found} is not supported")]
    UnsupportedVersion { found: u32 },

    #[error("module `{module}` is not defined in the resolved graph")]
    MissingModule {
        module: String,
        required_by: Option<String>,
    },

    #[error("module `{module}` is defined more than once with different contents")]
    ConflictingDefinition { module: String },

    #[error("cycle detected in dependency graph")]
    Cycle { modules: Vec<String> },

    #[error("modules `{first}` and `{second}` both generate `{name}`")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("artifact for `{module}` has unknown type: {file}")]
    UnknownArtifactType { module: String, file: String },
}

impl GraphError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GraphError::InvalidCoordinate { coordinate } => {
                Diagnostic::error(format!("invalid module coordinate `{}`", coordinate))
                    .with_context("coordinates have the form `group:name:version`")
            }

            GraphError::UnsupportedVersion { found } => Diagnostic::error(format!(
                "resolved graph version {} is not supported",
                found
            ))
            .with_suggestion("Regenerate the resolved graph with a matching exporter"),

            GraphError::MissingModule {
                module,
                required_by,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "module `{}` is not defined in the resolved graph",
                    module
                ));

                if let Some(parent) = required_by {
                    diag = diag.with_context(format!("required by `{}`", parent));
                }

                diag.with_suggestion("Regenerate the resolved graph; the export is incomplete")
            }

            GraphError::ConflictingDefinition { module } => Diagnostic::error(format!(
                "module `{}` resolves inconsistently",
                module
            ))
            .with_context("the same coordinate is listed twice with different artifacts or edges")
            .with_suggestion("Regenerate the resolved graph from a single configuration"),

            GraphError::Cycle { modules } => Diagnostic::error("cycle detected in dependency graph")
                .with_context(format!("cycle: {}", modules.join(" -> ")))
                .with_suggestion("Check the resolver output; resolved graphs must be acyclic"),

            GraphError::NameCollision {
                name,
                first,
                second,
            } => Diagnostic::error(format!("two modules generate `{}`", name))
                .with_context(format!("`{}` and `{}`", first, second))
                .with_suggestion("Align both dependencies on a single version"),

            GraphError::UnknownArtifactType { module, file } => Diagnostic::error(format!(
                "cannot tell the packaging of `{}`",
                module
            ))
            .with_context(format!("artifact: {}", file))
            .with_suggestion("Set `type = \"jar\"` or `type = \"aar\"` on the artifact"),
        }
    }
}
