//! Patching of the hand-maintained build file.
//!
//! Only two regions are ever touched: the dependency list following the
//! `// bpgen: dependencies` marker, and the `target_sdk_version` field.
//! Everything else in the file is left byte-for-byte as it was.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use regex::Regex;
use thiserror::Error;

use crate::builder::blueprint::quote;
use crate::util::fs::{read_to_string, write_string};

/// Sentinel line opening the generated dependency list.
pub const DEPENDENCY_MARKER: &str = "// bpgen: dependencies";

/// Closes the dependency list.
const LIST_TERMINATOR: char = ']';

static VERSION_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(target_sdk_version:\s*)"\d+""#).expect("valid regex"));

/// The hand-maintained build file has drifted from the expected shape.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum PatchError {
    #[error("dependency marker not found in {name}")]
    #[diagnostic(
        code(bpgen::patch::missing_marker),
        help("Add a `// bpgen: dependencies` line inside the `static_libs` list")
    )]
    MissingMarker { name: String },

    #[error("dependency list in {name} is never closed")]
    #[diagnostic(
        code(bpgen::patch::unterminated_list),
        help("Close the list containing the marker with `]`")
    )]
    UnterminatedList {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("list starts here")]
        span: SourceSpan,
    },

    #[error("no `target_sdk_version: \"<digits>\"` field in {name}")]
    #[diagnostic(
        code(bpgen::patch::missing_version_field),
        help("Add `target_sdk_version: \"<sdk>\"` to the module that lists the dependencies")
    )]
    MissingVersionField { name: String },
}

/// Apply both substitutions to `text`.
///
/// `name` is only used for error messages. Either both regions are found and
/// the patched text is returned, or nothing is.
pub fn patch_build_file(
    name: &str,
    text: &str,
    deps: &[String],
    target_sdk: u32,
) -> Result<String, PatchError> {
    let marker = text
        .find(DEPENDENCY_MARKER)
        .ok_or_else(|| PatchError::MissingMarker {
            name: name.to_string(),
        })?;

    let line_start = text[..marker].rfind('\n').map_or(0, |i| i + 1);
    let indent: String = text[line_start..marker]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();

    let unterminated = || PatchError::UnterminatedList {
        name: name.to_string(),
        src: NamedSource::new(name, text.to_string()),
        span: (marker, DEPENDENCY_MARKER.len()).into(),
    };

    let region_start = text[marker..]
        .find('\n')
        .map(|i| marker + i + 1)
        .ok_or_else(unterminated)?;
    let region_end = text[region_start..]
        .find(LIST_TERMINATOR)
        .map(|i| region_start + i)
        .ok_or_else(unterminated)?;

    if !VERSION_FIELD.is_match(text) {
        return Err(PatchError::MissingVersionField {
            name: name.to_string(),
        });
    }

    let mut replacement: String = deps
        .iter()
        .map(|dep| format!("{}{},\n", indent, quote(dep)))
        .collect();
    replacement.push_str(&closing_indent(&text[region_start..region_end], &indent));

    let spliced = format!(
        "{}{}{}",
        &text[..region_start],
        replacement,
        &text[region_end..]
    );

    let version = format!("${{1}}\"{}\"", target_sdk);
    Ok(VERSION_FIELD.replace(&spliced, version.as_str()).into_owned())
}

/// Indentation to keep in front of the list terminator.
fn closing_indent(region: &str, indent: &str) -> String {
    let last_line = region.rfind('\n').map_or(region, |i| &region[i + 1..]);
    if last_line.chars().all(char::is_whitespace) {
        last_line.to_string()
    } else {
        indent.strip_suffix("    ").unwrap_or(indent).to_string()
    }
}

/// A computed, not yet written, patch of the hand-maintained build file.
#[derive(Debug, Clone)]
pub struct BuildFilePatch {
    path: PathBuf,
    original: String,
    patched: String,
}

impl BuildFilePatch {
    /// Read `path` and compute its patched contents.
    pub fn prepare(path: &Path, deps: &[String], target_sdk: u32) -> Result<Self> {
        let original = read_to_string(path)?;
        let name = path.display().to_string();
        let patched = patch_build_file(&name, &original, deps, target_sdk)?;

        Ok(BuildFilePatch {
            path: path.to_path_buf(),
            original,
            patched,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.original != self.patched
    }

    pub fn patched(&self) -> &str {
        &self.patched
    }

    /// Write the patched contents if they differ. Returns whether the file
    /// was written.
    pub fn apply(&self) -> Result<bool> {
        if !self.is_changed() {
            return Ok(false);
        }
        write_string(&self.path, &self.patched)?;
        Ok(true)
    }
}
