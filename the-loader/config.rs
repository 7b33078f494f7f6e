use std::{
  io,
  path::{
    Path,
    PathBuf,
  },
};

use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("default-config.toml");

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read '{}': {source}", .path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },
  #[error("bad config '{}': {source}", .path.display())]
  Parse {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// Built-in config.
pub fn default_config() -> toml::Value {
  // The embedded file is checked by the tests below.
  toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| toml::Value::Table(Default::default()))
}

/// The user's config file, or `None` when there isn't one.
pub fn read_config_file(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
  let text = match std::fs::read_to_string(path) {
    Ok(text) => text,
    Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
    Err(source) => {
      return Err(ConfigError::Read {
        path: path.to_path_buf(),
        source,
      });
    },
  };
  toml::from_str(&text)
    .map(Some)
    .map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
}

/// Defaults with the user's config at `path` merged on top.
pub fn load_config_from(path: &Path) -> Result<toml::Value, ConfigError> {
  let config = match read_config_file(path)? {
    Some(user) => {
      log::info!("loaded config from '{}'", path.display());
      crate::merge_toml_values(default_config(), user, 3)
    },
    None => default_config(),
  };
  Ok(config)
}
