use std::{
  fmt,
  time::Duration,
};

use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  AiError,
  Result,
};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// An API key. Lives in memory only and never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
  /// Trims surrounding whitespace; an empty key is [`AiError::MissingKey`].
  pub fn new(key: impl AsRef<str>) -> Result<Self> {
    let key = key.as_ref().trim();
    if key.is_empty() {
      return Err(AiError::MissingKey);
    }
    Ok(Self(key.to_string()))
  }

  pub fn expose(&self) -> &str {
    &self.0
  }
}

impl fmt::Debug for ApiKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("ApiKey(****)")
  }
}

/// Which model to talk to and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ModelSettings {
  pub model:        String,
  pub endpoint:     String,
  pub timeout_secs: u64,
}

impl Default for ModelSettings {
  fn default() -> Self {
    Self {
      model:        DEFAULT_MODEL.to_string(),
      endpoint:     DEFAULT_ENDPOINT.to_string(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
    }
  }
}

impl ModelSettings {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs.max(1))
  }
}

/// A configured connection: the key plus the settings it was accepted with.
#[derive(Debug, Clone)]
pub struct Session {
  key:      ApiKey,
  settings: ModelSettings,
}

impl Session {
  pub fn new(key: ApiKey, settings: ModelSettings) -> Self {
    Self { key, settings }
  }

  pub fn key(&self) -> &ApiKey {
    &self.key
  }

  pub fn settings(&self) -> &ModelSettings {
    &self.settings
  }
}
