mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Smallest accepted status poll interval.
const MIN_POLL_INTERVAL_MS: u64 = 100;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./cliploop.toml",
        "~/.config/cliploop/config.toml",
        "/etc/cliploop/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let url = config.backend.url.trim();
    if url.is_empty() {
        anyhow::bail!("Backend URL cannot be empty");
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("Backend URL must start with http:// or https://, got '{}'", url);
    }
    if config.backend.request_timeout_secs == 0 {
        anyhow::bail!("Backend request timeout cannot be 0");
    }

    if config.playback.queue_capacity == 0 {
        anyhow::bail!("Queue capacity must be at least 1");
    }
    if config.playback.preferred_duration_secs == Some(0) {
        anyhow::bail!("Preferred clip duration cannot be 0");
    }

    if config.status.poll_interval_ms < MIN_POLL_INTERVAL_MS {
        anyhow::bail!(
            "Status poll interval must be at least {}ms, got {}ms",
            MIN_POLL_INTERVAL_MS,
            config.status.poll_interval_ms
        );
    }

    Ok(())
}
