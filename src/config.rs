use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::spec::{StyleSpec, parse_spec};

pub const OUTPUT_ROOT_VAR: &str = "STYLEGEN_OUTPUT_ROOT";
pub const STYLE_SPEC_VAR: &str = "STYLEGEN_STYLE_SPEC";
pub const SHADER_DIR_VAR: &str = "STYLEGEN_SHADER_DIR";
pub const DRY_RUN_VAR: &str = "DRY_RUN";

/// Settings of one generation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the artifact paths are relative to
    pub output_root: PathBuf,
    /// Style spec to load instead of the embedded one
    pub style_spec: Option<PathBuf>,
    /// Shader programs to check against the generated bindings
    pub shader_dir: Option<PathBuf>,
    pub dry_run: bool,
}

impl Config {
    /// Create Config from CLI arguments and environment variables
    ///
    /// Priority: CLI args → ENV var (STYLEGEN_OUTPUT_ROOT) → current dir
    pub fn from_env_and_cli(cli_root: Option<PathBuf>) -> Self {
        Self::resolve(cli_root, |name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env_and_cli`] with an explicit environment lookup.
    pub fn resolve(cli_root: Option<PathBuf>, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| env(name).filter(|v| !v.is_empty());

        let output_root = cli_root
            .or_else(|| non_empty(OUTPUT_ROOT_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));

        let dry_run = non_empty(DRY_RUN_VAR)
            .is_some_and(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false"));

        Self {
            output_root,
            style_spec: non_empty(STYLE_SPEC_VAR).map(PathBuf::from),
            shader_dir: non_empty(SHADER_DIR_VAR).map(PathBuf::from),
            dry_run,
        }
    }

    /// Load the configured style spec, or the embedded one.
    pub fn load_spec(&self) -> Result<StyleSpec> {
        match &self.style_spec {
            Some(path) => {
                log::info!("Loading style spec from {}", path.display());
                parse_spec(path).with_context(|| format!("Failed to load style spec: {}", path.display()))
            }
            None => StyleSpec::embedded().context("Failed to load embedded style spec"),
        }
    }
}
