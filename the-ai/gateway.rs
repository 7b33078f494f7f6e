use std::sync::Arc;

use async_trait::async_trait;

use crate::{
  AiError,
  ApiKey,
  GeminiProvider,
  ModelSettings,
  Result,
  Session,
};

/// A model that turns a prompt into text. This is the gateway's only remote
/// operation.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
  fn name(&self) -> &str;

  async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Builds a [`GenerativeModel`] for a session, rejecting keys it cannot use.
pub trait ModelProvider: Send + Sync {
  fn connect(&self, session: &Session) -> Result<Arc<dyn GenerativeModel>>;
}

/// Owns the session and the model handle built from it.
pub struct AiGateway {
  provider: Arc<dyn ModelProvider>,
  settings: ModelSettings,
  session:  Option<Session>,
  model:    Option<Arc<dyn GenerativeModel>>,
}

impl AiGateway {
  pub fn new(provider: Arc<dyn ModelProvider>, settings: ModelSettings) -> Self {
    Self {
      provider,
      settings,
      session: None,
      model: None,
    }
  }

  /// A gateway backed by the Gemini REST API.
  pub fn gemini(settings: ModelSettings) -> Self {
    Self::new(Arc::new(GeminiProvider), settings)
  }

  pub fn settings(&self) -> &ModelSettings {
    &self.settings
  }

  pub fn session(&self) -> Option<&Session> {
    self.session.as_ref()
  }

  /// Whether a key has been accepted and requests can be made.
  pub fn is_ready(&self) -> bool {
    self.model.is_some()
  }

  /// Accept `key` and build a model for it. On failure the previous session
  /// (if any) stays in place.
  pub fn configure(&mut self, key: &str) -> Result<()> {
    let session = Session::new(ApiKey::new(key)?, self.settings.clone());
    let model = self.provider.connect(&session)?;
    log::info!(
      "ai session configured for model '{}'",
      session.settings().model
    );
    self.session = Some(session);
    self.model = Some(model);
    Ok(())
  }

  /// The model handle, cloned so it can move onto a worker task.
  pub fn model(&self) -> Result<Arc<dyn GenerativeModel>> {
    self.model.clone().ok_or(AiError::NotConfigured)
  }
}
