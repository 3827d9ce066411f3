//! Build-file synthesis.
//!
//! Walks the vendored part of a `FlattenedGraph` in closure order, copies
//! each module's files into the output tree and appends its declaration
//! group to the generated `Android.bp`.

pub mod blueprint;
pub mod vendor;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{Canonicalizer, FileType, Module};
use crate::resolver::FlattenedGraph;
use crate::util::fs::{append_string, ensure_dir, write_string};

pub use blueprint::{format_dependency_names, GENERATED_HEADER, NODEPS_SUFFIX};

/// Name of the generated build file inside the output directory.
pub const GENERATED_FILE_NAME: &str = "Android.bp";

/// The generated build file. The header is written the first time the file
/// is touched; later writes append.
#[derive(Debug)]
pub struct GeneratedFile {
    path: PathBuf,
    touched: bool,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GeneratedFile {
            path: path.into(),
            touched: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a declaration group, separated from the previous one by a
    /// blank line.
    pub fn append(&mut self, text: &str) -> Result<()> {
        if !self.touched {
            write_string(&self.path, GENERATED_HEADER)?;
            self.touched = true;
        }
        append_string(&self.path, &format!("\n{}", text))
    }
}

/// Counters reported after synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Modules that got a declaration group
    pub modules: usize,
    /// Individual rule declarations written
    pub declarations: usize,
    /// Artifacts copied into the output tree
    pub artifacts: usize,
}

/// Renders and vendors every module that the platform does not provide.
pub struct Synthesizer<'a> {
    canonicalizer: &'a Canonicalizer,
    output_dir: PathBuf,
}

impl<'a> Synthesizer<'a> {
    pub fn new(canonicalizer: &'a Canonicalizer, output_dir: impl Into<PathBuf>) -> Self {
        Synthesizer {
            canonicalizer,
            output_dir: output_dir.into(),
        }
    }

    /// Path of the generated build file.
    pub fn generated_file(&self) -> PathBuf {
        self.output_dir.join(GENERATED_FILE_NAME)
    }

    /// Vendor every module and write the generated build file.
    ///
    /// The output directory is expected to be empty.
    pub fn synthesize(&self, graph: &FlattenedGraph) -> Result<SynthesisReport> {
        let mut file = GeneratedFile::new(self.generated_file());
        let mut report = SynthesisReport::default();

        for module in graph.vendored() {
            tracing::debug!("Generating {} for {}", module.canonical_name(), module.id());

            if self.vendor(module)? {
                report.artifacts += 1;
            }

            let decls = blueprint::declarations(module, self.canonicalizer);
            file.append(&blueprint::render_group(&decls))?;

            report.modules += 1;
            report.declarations += decls.len();
        }

        Ok(report)
    }

    /// Copy a module's files into its directory. Returns whether an
    /// artifact was copied.
    fn vendor(&self, module: &Module) -> Result<bool> {
        let Some(artifact) = module.artifact() else {
            return Ok(false);
        };

        let dir = self.output_dir.join(module.module_path());
        ensure_dir(&dir)?;

        let copied = vendor::copy_artifact(&module.id().to_string(), &artifact.file, &dir)?;
        vendor::write_license(&copied, &artifact.license_text)?;

        if artifact.file_type == FileType::ArchiveWithManifest {
            let manifest = vendor::extract_manifest(&copied, &dir)?;
            vendor::write_license(&manifest, &artifact.license_text)?;
        }

        Ok(true)
    }
}
