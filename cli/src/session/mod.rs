use anyhow::{Context, Result};
use nessus_core::{ClientConfig, Nessus};
use std::path::Path;

/// Builds a client from the config file (if any) and `NESSUS_*` variables.
pub fn connect(config: Option<&Path>) -> Result<Nessus> {
    let config = ClientConfig::load(config).context("Failed to load Nessus configuration")?;
    if !config.verify {
        tracing::warn!(url = %config.url, "TLS certificate verification is disabled");
    }
    Ok(Nessus::new(config)?)
}
