//! Vendoring side effects: artifact copies, manifest extraction and
//! license sidecars.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::builder::blueprint::MANIFEST_NAME;
use crate::util::fs::{append_string, copy_into};

/// Suffix of license sidecar files.
pub const LICENSE_SUFFIX: &str = ".license";

/// Error while vendoring an artifact.
#[derive(Debug, Error)]
pub enum VendorError {
    #[error("artifact for `{module}` not found: {}", .file.display())]
    MissingArtifact { module: String, file: PathBuf },

    #[error("expected exactly one AndroidManifest.xml in {}, found {count}", .archive.display())]
    ManifestEntries { archive: PathBuf, count: usize },
}

/// Copy an artifact into `dir`, returning the copied path.
pub fn copy_artifact(module: &str, file: &Path, dir: &Path) -> Result<PathBuf> {
    if !file.is_file() {
        return Err(VendorError::MissingArtifact {
            module: module.to_string(),
            file: file.to_path_buf(),
        }
        .into());
    }

    copy_into(file, dir)
}

/// Path of the license sidecar for `file`.
pub fn license_path(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(LICENSE_SUFFIX);
    PathBuf::from(name)
}

/// Write (or append to) the license sidecar next to `file`.
///
/// Returns the sidecar path, or `None` when there is no license text.
pub fn write_license(file: &Path, text: &str) -> Result<Option<PathBuf>> {
    if text.is_empty() {
        return Ok(None);
    }

    let sidecar = license_path(file);
    let mut contents = text.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }

    append_string(&sidecar, &contents)?;
    Ok(Some(sidecar))
}

/// Extract the single `AndroidManifest.xml` entry of an `.aar` into `dir`.
pub fn extract_manifest(archive: &Path, dir: &Path) -> Result<PathBuf> {
    let file = File::open(archive)
        .with_context(|| format!("failed to open archive: {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read archive: {}", archive.display()))?;

    let mut matches = Vec::new();
    for i in 0..zip.len() {
        let entry = zip
            .by_index(i)
            .with_context(|| format!("failed to read archive: {}", archive.display()))?;
        if entry.name() == MANIFEST_NAME {
            matches.push(i);
        }
    }

    let index = match matches.as_slice() {
        [index] => *index,
        _ => {
            return Err(VendorError::ManifestEntries {
                archive: archive.to_path_buf(),
                count: matches.len(),
            }
            .into())
        }
    };

    let mut entry = zip
        .by_index(index)
        .with_context(|| format!("failed to read {} from {}", MANIFEST_NAME, archive.display()))?;

    let dst = dir.join(MANIFEST_NAME);
    let mut out = File::create(&dst)
        .with_context(|| format!("failed to create file: {}", dst.display()))?;
    io::copy(&mut entry, &mut out)
        .with_context(|| format!("failed to extract manifest to {}", dst.display()))?;

    Ok(dst)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    /// Build a zip archive holding the given entries.
    pub(crate) fn write_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (name, contents) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_extract_manifest() {
        let tmp = TempDir::new().unwrap();
        let aar = tmp.path().join("lib.aar");
        write_archive(
            &aar,
            &[("AndroidManifest.xml", "<manifest/>"), ("classes.jar", "jar")],
        );

        let out = tmp.path().join("out");
        std::fs::create_dir_all(&out).unwrap();

        let manifest = extract_manifest(&aar, &out).unwrap();
        assert_eq!(manifest, out.join("AndroidManifest.xml"));
        assert_eq!(std::fs::read_to_string(manifest).unwrap(), "<manifest/>");
    }

    #[test]
    fn test_extract_manifest_missing_entry() {
        let tmp = TempDir::new().unwrap();
        let aar = tmp.path().join("lib.aar");
        write_archive(&aar, &[("classes.jar", "jar"), ("res/AndroidManifest.xml", "x")]);

        let err = extract_manifest(&aar, tmp.path()).unwrap_err();
        match err.downcast_ref::<VendorError>() {
            Some(VendorError::ManifestEntries { count, .. }) => assert_eq!(*count, 0),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_license_sidecar_appends() {
        let tmp = TempDir::new().unwrap();
        let jar = tmp.path().join("lib.jar");

        assert!(write_license(&jar, "").unwrap().is_none());

        let sidecar = write_license(&jar, "MIT").unwrap().unwrap();
        assert_eq!(sidecar, tmp.path().join("lib.jar.license"));
        write_license(&jar, "Apache-2.0\n").unwrap();

        assert_eq!(std::fs::read_to_string(sidecar).unwrap(), "MIT\nApache-2.0\n");
    }

    #[test]
    fn test_copy_missing_artifact() {
        let tmp = TempDir::new().unwrap();
        let err = copy_artifact("g:a:1", &tmp.path().join("a.jar"), tmp.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VendorError>(),
            Some(VendorError::MissingArtifact { .. })
        ));
    }
}
