//! Configuration management
//!
//! Loads the YAML pad configuration. A default layout is compiled into the
//! binary so the tool runs without any file present.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::mapping::PadMapping;

/// Default pad layout, embedded at compile time
const DEFAULT_MAPPINGS: &str = include_str!("../assets/default-mappings.yaml");

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiSettings,
    pub pads: Vec<PadMapping>,
}

/// MIDI input settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MidiSettings {
    /// Port name pattern or numeric index; prompts interactively when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config: {}", path))?;

        Ok(config)
    }

    /// Built-in default pad layout (banks A-D, notes 36-99)
    pub fn default_embedded() -> Result<Self> {
        serde_yaml::from_str(DEFAULT_MAPPINGS).context("Failed to parse embedded default mappings")
    }
}
