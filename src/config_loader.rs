use crate::config::LogConfig;
use crate::errors::{LogError, LogResult};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "spud.toml";
pub const ENV_PREFIX: &str = "SPUD_";

/// Where to look for a TOML file when none is given explicitly:
/// the working directory first, then the user config directory.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("spud").join(CONFIG_FILE_NAME));
    }
    paths
}

/// First existing file among `search_paths`
pub fn find_config_file(search_paths: &[PathBuf]) -> Option<PathBuf> {
    search_paths.iter().find(|path| path.is_file()).cloned()
}

/// Defaults, then the TOML file, then `SPUD_*` environment variables
pub fn load_config(explicit: Option<&Path>) -> LogResult<LogConfig> {
    load_config_from(explicit, &default_search_paths(), ENV_PREFIX)
}

pub fn load_config_from(
    explicit: Option<&Path>,
    search_paths: &[PathBuf],
    env_prefix: &str,
) -> LogResult<LogConfig> {
    let file = match explicit {
        Some(path) if !path.is_file() => {
            return Err(LogError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(search_paths),
    };

    let mut figment = Figment::from(Serialized::defaults(LogConfig::default()));
    if let Some(path) = &file {
        tracing::debug!("loading config from {}", path.display());
        figment = figment.merge(Toml::file(path));
    }
    figment = figment.merge(Env::prefixed(env_prefix));

    let config: LogConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}
