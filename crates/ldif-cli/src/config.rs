use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use ldif_model::{EncodingRules, FormatParameters};

/// Settings read from the `--config` TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub format: FormatParameters,
    pub encoding: EncodingRules,
}

impl Config {
    /// Parse and validate a TOML document; missing tables take defaults.
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(input).context("failed to parse configuration TOML")?;
        config.format.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        Self::from_toml_str(&contents).with_context(|| format!("invalid configuration {}", path.display()))
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        toml::to_string(self).context("failed to render configuration")
    }
}
