// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tibberlox.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tibberlox_types::{Destination, SnapshotConfig};
use tracing::info;

/// Contents of the credentials file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tibber API token
    #[serde(default)]
    pub token: String,

    /// Index of the home in the account's home list
    #[serde(default)]
    pub home_id: usize,

    #[serde(default)]
    pub destinations: Vec<Destination>,

    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl AppConfig {
    /// Load the file at `path`, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: Self = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        };

        config.apply_env();
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("TIBBER_TOKEN")
            && !token.trim().is_empty()
        {
            self.token = token;
        }
    }

    /// Checks needed before talking to the API.
    pub fn validate_credentials(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            anyhow::bail!("token cannot be empty (set it in the config file or TIBBER_TOKEN)");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;

        if self.destinations.is_empty() {
            anyhow::bail!("Configuration must include at least one destination");
        }
        for (idx, destination) in self.destinations.iter().enumerate() {
            if destination.ip.trim().is_empty() {
                anyhow::bail!("Destination {} has empty ip", idx);
            }
            if destination.port == 0 {
                anyhow::bail!("Destination '{}' has port 0", destination.ip);
            }
        }

        self.snapshot.validate()
    }
}
