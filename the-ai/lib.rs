//! Gateway to the remote code model.
//!
//! [`AiGateway`] owns the session (API key plus model settings) and hands out
//! a [`GenerativeModel`] once the session is ready. [`AiRuntime`] runs
//! `generate` calls off the interaction thread and reports each completion
//! over a channel that the UI drains on its own schedule.

pub mod gateway;
pub mod gemini;
pub mod runtime;
pub mod session;

use thiserror::Error;

pub use crate::{
  gateway::{
    AiGateway,
    GenerativeModel,
    ModelProvider,
  },
  gemini::GeminiProvider,
  runtime::{
    AiEvent,
    AiRuntime,
    AiRuntimeError,
    RequestId,
  },
  session::{
    ApiKey,
    ModelSettings,
    Session,
  },
};

/// Everything that can go wrong configuring or calling the model.
///
/// The shell reports every variant the same way; the split exists for
/// messages and logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AiError {
  #[error("API key is empty")]
  MissingKey,
  #[error("no API key configured")]
  NotConfigured,
  #[error("API key rejected: {0}")]
  Auth(String),
  #[error("network error: {0}")]
  Network(String),
  #[error("quota exceeded: {0}")]
  Quota(String),
  #[error("service error: {0}")]
  Service(String),
}

pub type Result<T> = std::result::Result<T, AiError>;
