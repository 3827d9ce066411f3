//! Global context for bpgen operations.
//!
//! Locates `Bpgen.toml`, loads it and resolves every configured path
//! against the project root.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::{Config, Overrides, CONFIG_NAME};
use crate::util::diagnostic::suggestions;

/// Find `Bpgen.toml` in `start` or any parent directory.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_NAME))
        .find(|candidate| candidate.is_file())
}

/// Global context: working directory, project root and merged config.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    config: Config,
}

impl GlobalContext {
    /// Create a context for the current working directory.
    pub fn new(overrides: &Overrides) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::with_cwd(cwd, overrides)
    }

    /// Create a context with a specific working directory.
    ///
    /// Without a `Bpgen.toml` the working directory is the project root and
    /// every value comes from defaults and overrides.
    pub fn with_cwd(cwd: PathBuf, overrides: &Overrides) -> Result<Self> {
        let config_path = find_config(&cwd);

        let (project_root, mut config) = match &config_path {
            Some(path) => {
                let root = path.parent().unwrap_or(&cwd).to_path_buf();
                (root, Config::load(path)?)
            }
            None => {
                tracing::debug!("No {} found, using defaults", CONFIG_NAME);
                (cwd.clone(), Config::default())
            }
        };

        config.merge(overrides);
        config.resolve_paths(&project_root);

        Ok(GlobalContext {
            cwd,
            project_root,
            config_path,
            config,
        })
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The project name, with a hint about where to set it.
    pub fn project_name(&self) -> Result<&str> {
        self.config.project_name().with_context(|| {
            if self.config_path.is_none() {
                format!("no {} found\n{}", CONFIG_NAME, suggestions::NO_CONFIG)
            } else {
                "invalid project configuration".to_string()
            }
        })
    }
}
