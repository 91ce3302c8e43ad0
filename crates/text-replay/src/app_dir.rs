use std::path::{Path, PathBuf};

use anyhow::Context;
use text_replay_core::SessionConfig;

const APP_NAME: &str = "text-replay";

const CONFIG_FILE: &str = "config.json";

/// Returns:
/// - macOS: ~/Library/Application Support/text-replay
/// - Windows: %APPDATA%\text-replay
/// - Linux: ~/.config/text-replay
pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|path| path.join(APP_NAME))
}

/// Read session settings.
///
/// An explicit `path` must exist. Without one, `config.json` in the config
/// directory is used when present, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SessionConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match get_config_path().map(|dir| dir.join(CONFIG_FILE)) {
            Some(p) if p.is_file() => p,
            _ => return Ok(SessionConfig::default()),
        },
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    tracing::info!("loaded config from {}", path.display());
    Ok(config)
}
