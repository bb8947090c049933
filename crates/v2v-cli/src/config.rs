//! Configuration loading for the V2V CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use v2v_rl::AgentConfig;

/// Configuration for the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub agent: AgentConfig,
    pub simulation: SimulationConfig,
    pub logging: LoggingConfig,
    /// File the settings were read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Episodes per `train` or `compare` run
    pub episodes: u32,
    /// Seed for the scenario generator and agent RNGs
    pub seed: u64,
    /// Default model path for `train --output`
    pub model_path: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            seed: 42,
            model_path: PathBuf::from("v2v_model.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the highest-precedence config file present and the environment
    pub fn load() -> Result<Self> {
        let source = config_candidates().into_iter().find(|path| path.is_file());
        Self::load_from(source.as_deref())
    }

    /// Load configuration from `path` (if any) layered under `V2V__*` variables
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = ConfigBuilder::<config::builder::DefaultState>::default();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix("V2V")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: Self = builder
            .build()?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config
            .agent
            .validate()
            .context("Invalid agent configuration")?;

        config.source = path.filter(|p| p.is_file()).map(Path::to_path_buf);
        Ok(config)
    }
}

/// Config file locations, highest precedence first: `$V2V_CONFIG`, `./v2v.toml`,
/// `~/.config/v2v/v2v.toml`
fn config_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::env::var_os("V2V_CONFIG")
        .map(PathBuf::from)
        .into_iter()
        .collect();
    candidates.push(PathBuf::from("v2v.toml"));
    candidates.extend(
        dirs::home_dir().map(|home| home.join(".config").join("v2v").join("v2v.toml")),
    );
    candidates
}
