use std::{
  fmt,
  path::Path,
};

use log::LevelFilter;
use serde::Deserialize;
use the_ai::ModelSettings;
use the_lib::highlight::DEFAULT_MAX_BYTES;
use the_loader::config::ConfigError;
use toml::de::Error as TomlError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
  pub ai:     ModelSettings,
  pub editor: EditorConfig,
  pub log:    LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct EditorConfig {
  /// Language named in AI requests.
  pub language:            String,
  pub tab_width:           usize,
  /// Buffers larger than this are shown without colors.
  pub highlight_max_bytes: usize,
}

impl Default for EditorConfig {
  fn default() -> Self {
    Self {
      language:            "Python".to_string(),
      tab_width:           4,
      highlight_max_bytes: DEFAULT_MAX_BYTES,
    }
  }
}

impl EditorConfig {
  /// Cells a tab takes on screen, and spaces Tab inserts.
  pub fn tab_width(&self) -> usize {
    self.tab_width.clamp(1, 16)
  }

  pub fn indent(&self) -> String {
    " ".repeat(self.tab_width())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
  pub level: String,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
    }
  }
}

impl LogConfig {
  /// Unknown level names fall back to `info`.
  pub fn level_filter(&self) -> LevelFilter {
    self.level.parse().unwrap_or(LevelFilter::Info)
  }
}

#[derive(Debug)]
pub enum ConfigLoadError {
  BadConfig(TomlError),
  Error(ConfigError),
}

impl fmt::Display for ConfigLoadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BadConfig(err) => write!(f, "bad config: {err}"),
      Self::Error(err) => write!(f, "{err}"),
    }
  }
}

impl std::error::Error for ConfigLoadError {}

impl Config {
  pub fn from_value(value: toml::Value) -> Result<Self, ConfigLoadError> {
    value.try_into().map_err(ConfigLoadError::BadConfig)
  }

  /// Defaults merged with the file at `path`.
  pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
    let value = the_loader::config::load_config_from(path).map_err(ConfigLoadError::Error)?;
    Self::from_value(value)
  }

  /// Defaults merged with the user's `config.toml`.
  pub fn load_default() -> Result<Self, ConfigLoadError> {
    Self::load_from(&the_loader::config_file())
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  fn load(text: &str) -> Result<Config, ConfigLoadError> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    Config::load_from(file.path())
  }

  #[test]
  fn empty_file_gives_defaults() {
    let config = load("").unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.ai.model, "gemini-2.0-flash-exp");
    assert_eq!(config.editor.language, "Python");
    assert_eq!(config.log.level_filter(), LevelFilter::Info);
  }

  #[test]
  fn built_in_defaults_match_the_typed_defaults() {
    let config = Config::from_value(the_loader::config::default_config()).unwrap();
    assert_eq!(config, Config::default());
  }

  #[test]
  fn partial_sections_keep_other_defaults() {
    let config = load("[ai]\ntimeout-secs = 5\n\n[editor]\nlanguage = \"Rust\"\n").unwrap();
    assert_eq!(config.ai.timeout_secs, 5);
    assert_eq!(config.ai.model, "gemini-2.0-flash-exp");
    assert_eq!(config.editor.language, "Rust");
    assert_eq!(config.editor.tab_width, 4);
  }

  #[test]
  fn unknown_keys_are_rejected() {
    assert!(matches!(
      load("[editor]\nfont = \"Consolas\"\n"),
      Err(ConfigLoadError::BadConfig(_))
    ));
    assert!(matches!(
      load("[theme]\nname = \"dark\"\n"),
      Err(ConfigLoadError::BadConfig(_))
    ));
  }

  #[test]
  fn log_level_parsing() {
    let log = LogConfig {
      level: "DEBUG".into(),
    };
    assert_eq!(log.level_filter(), LevelFilter::Debug);
    let log = LogConfig {
      level: "chatty".into(),
    };
    assert_eq!(log.level_filter(), LevelFilter::Info);
  }
}
