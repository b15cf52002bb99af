//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use grocer_sdk::{Storefront, StorefrontConfig};

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    pub config: StorefrontConfig,
    /// File the config was read from, if any.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    pub cwd: PathBuf,
}

impl Context {
    /// Load the config from `config_path`, or search the directory tree,
    /// then apply environment overrides.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config_path, mut config) = match config_path {
            Some(path) => {
                let path = PathBuf::from(path);
                let config = StorefrontConfig::load(&path)
                    .with_context(|| format!("Failed to load config: {}", path.display()))?;
                (Some(path), config)
            }
            None => match StorefrontConfig::find(&cwd) {
                Some((path, config)) => (Some(path), config),
                None => (None, StorefrontConfig::default()),
            },
        };
        config.apply_env();

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Build and start a storefront session whose notices go to the terminal.
    pub async fn storefront(&self) -> Result<Storefront> {
        let storefront = Storefront::builder(self.config.clone())
            .notifier(Arc::new(self.output.clone()))
            .build()
            .context("Failed to set up the storefront")?;
        storefront.start().await;
        Ok(storefront)
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
