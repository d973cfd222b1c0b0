//! Application configuration management.
//!
//! Settings are layered, later sources winning:
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the platform config directory, or the file given with `--config`
//! 3. `DUPEFIND_`-prefixed environment variables (e.g. `DUPEFIND_THREADS=4`)
//! 4. Command-line flags

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};
use crate::duplicates::compare::DEFAULT_MMAP_THRESHOLD;
use crate::duplicates::{DiskProbe, FinderConfig};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Follow symbolic links to directories.
    pub follow_symlinks: bool,
    /// Comparison threads (0 = available parallelism).
    pub threads: usize,
    /// Fail the scan if any size bucket fails.
    pub strict: bool,
    /// Report format.
    pub output: OutputFormat,
    /// Compare large files through memory maps.
    pub mmap: bool,
    /// Smallest file compared through memory maps, in bytes.
    pub mmap_threshold: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            threads: 0,
            strict: false,
            output: OutputFormat::Text,
            mmap: true,
            mmap_threshold: DEFAULT_MMAP_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from defaults, a config file and the environment.
    ///
    /// With `path` unset, the platform default file is used if it exists.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `path` does not exist, or if any source holds
    /// a malformed or mistyped value.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path(),
        };

        let config: Self = Self::figment(file.as_deref())
            .extract()
            .context("Invalid configuration")?;

        log::debug!(
            "Loaded configuration (file: {}): {:?}",
            file.as_deref()
                .map_or_else(|| "none".to_string(), |p| p.display().to_string()),
            config
        );
        Ok(config)
    }

    /// The provider stack behind [`load`](Self::load).
    ///
    /// A missing `file` contributes nothing.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed("DUPEFIND_").ignore(&["config"]))
    }

    /// Platform-specific default configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupefind", "dupefind")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides on top of the loaded settings.
    ///
    /// Boolean flags can only switch a behaviour on (or, for `--no-mmap`, off).
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if let Some(threads) = cli.threads {
            self.threads = threads;
        }
        if cli.strict {
            self.strict = true;
        }
        if let Some(output) = cli.output {
            self.output = output;
        }
        if cli.no_mmap {
            self.mmap = false;
        }
        if let Some(threshold) = cli.mmap_threshold {
            self.mmap_threshold = threshold;
        }
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_follow_symlinks(self.follow_symlinks)
            .with_threads(self.threads)
            .with_strict(self.strict)
    }

    /// Disk probe configured from this configuration.
    #[must_use]
    pub fn probe(&self) -> DiskProbe {
        DiskProbe::new()
            .with_mmap(self.mmap)
            .with_mmap_threshold(self.mmap_threshold)
    }
}
