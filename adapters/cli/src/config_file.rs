use std::{fs, path::Path};

use anyhow::{Context, Result};
use pipeflow_core::GameConfig;

/// Loads the session configuration, falling back to defaults without a path.
pub(crate) fn load(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

fn parse(contents: &str) -> Result<GameConfig> {
    let config: GameConfig =
        toml::from_str(contents).context("failed to parse config toml contents")?;
    config.validate()?;
    Ok(config)
}
