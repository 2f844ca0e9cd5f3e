use anyhow::Result;
use directories::ProjectDirs;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use super::AppConfig;

const APP_NAME: &str = "WorkshopCleaner";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-specific configuration directory for the application.
pub fn get_config_directory() -> Option<PathBuf> {
    ProjectDirs::from("com", "workshopcleaner", APP_NAME)
        .map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
}

fn resolve_directory(dir_override: Option<&Path>) -> Result<PathBuf> {
    match dir_override {
        Some(dir) => Ok(dir.to_path_buf()),
        None => get_config_directory()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory")),
    }
}

/// Loads the configuration from `dir_override` or the platform directory.
///
/// A missing file is replaced by a freshly written default. A file that does
/// not parse is migrated field by field where possible and otherwise replaced
/// by defaults in memory, leaving the broken file on disk untouched.
pub fn load_config(dir_override: Option<&Path>) -> Result<AppConfig> {
    let config_path = resolve_directory(dir_override)?.join(CONFIG_FILE);

    if !config_path.exists() {
        tracing::info!(
            "Config file not found, creating default config at {:?}",
            config_path
        );
        let default_config = AppConfig::default();
        save_config(&default_config, dir_override)?;
        return Ok(default_config);
    }

    let config_content = fs::read_to_string(&config_path)?;

    match serde_json::from_str::<AppConfig>(&config_content) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", config_path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse config file at {:?}: {}. Falling back to default config.",
                config_path,
                e
            );
            migrate_partial_config(&config_content).or_else(|_| Ok(AppConfig::default()))
        }
    }
}

/// Fills in every field that is missing or `null` in an older config file.
fn migrate_partial_config(config_content: &str) -> Result<AppConfig> {
    let mut value: Value = serde_json::from_str(config_content)?;
    let obj = value
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Config is not a JSON object"))?;

    let defaults = serde_json::to_value(AppConfig::default())?;
    let Value::Object(defaults) = defaults else {
        anyhow::bail!("Default config did not serialize to an object");
    };

    for (key, default_val) in defaults {
        if obj.get(&key).map_or(true, Value::is_null) && key != "last_directory" {
            obj.insert(key, default_val);
        }
    }

    let migrated_config: AppConfig = serde_json::from_value(Value::Object(obj.clone()))?;
    tracing::info!("Successfully migrated partial config");
    Ok(migrated_config)
}

/// Saves the configuration to `dir_override` or the platform directory.
pub fn save_config(config: &AppConfig, dir_override: Option<&Path>) -> Result<()> {
    let config_dir = resolve_directory(dir_override)?;

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
        tracing::info!("Created config directory: {:?}", config_dir);
    }

    let config_path = config_dir.join(CONFIG_FILE);
    let config_json = serde_json::to_string_pretty(config)?;

    fs::write(&config_path, config_json)?;
    tracing::info!("Saved config to {:?}", config_path);

    Ok(())
}
