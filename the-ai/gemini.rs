//! Gemini `generateContent` over REST.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
  Client,
  StatusCode,
};
use serde::{
  Deserialize,
  Serialize,
};

use crate::{
  AiError,
  GenerativeModel,
  ModelProvider,
  Result,
  Session,
};

const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct GeminiProvider;

impl ModelProvider for GeminiProvider {
  fn connect(&self, session: &Session) -> Result<Arc<dyn GenerativeModel>> {
    let key = session.key().expose();
    if !key.chars().all(|ch| ch.is_ascii_graphic()) {
      return Err(AiError::Auth(
        "API key contains invalid characters".to_string(),
      ));
    }

    let settings = session.settings();
    let client = Client::builder()
      .timeout(settings.timeout())
      .build()
      .map_err(|err| AiError::Network(err.to_string()))?;

    Ok(Arc::new(GeminiModel {
      client,
      url: generate_url(&settings.endpoint, &settings.model),
      model: settings.model.clone(),
      key: key.to_string(),
    }))
  }
}

pub struct GeminiModel {
  client: Client,
  url:    String,
  model:  String,
  key:    String,
}

#[async_trait]
impl GenerativeModel for GeminiModel {
  fn name(&self) -> &str {
    &self.model
  }

  async fn generate(&self, prompt: &str) -> Result<String> {
    log::debug!("gemini request: model={} bytes={}", self.model, prompt.len());
    let response = self
      .client
      .post(&self.url)
      .header(API_KEY_HEADER, &self.key)
      .json(&GenerateRequest::new(prompt))
      .send()
      .await
      .map_err(|err| AiError::Network(err.without_url().to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|err| AiError::Network(err.without_url().to_string()))?;

    if !status.is_success() {
      let err = classify_status(status, &body);
      log::warn!("gemini request failed: {err}");
      return Err(err);
    }

    parse_response(&body)
  }
}

pub fn generate_url(endpoint: &str, model: &str) -> String {
  format!(
    "{}/models/{}:generateContent",
    endpoint.trim_end_matches('/'),
    model
  )
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
}

impl<'a> GenerateRequest<'a> {
  fn new(prompt: &'a str) -> Self {
    Self {
      contents: [Content {
        parts: [Part { text: prompt }],
      }],
    }
  }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
  parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateResponse {
  candidates:      Vec<Candidate>,
  prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Candidate {
  content:       Option<CandidateContent>,
  finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
  parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidatePart {
  text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
  block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
  error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
  message: String,
  status:  String,
}

/// Text of the first candidate, with its parts joined.
pub fn parse_response(body: &str) -> Result<String> {
  let response: GenerateResponse = serde_json::from_str(body)
    .map_err(|err| AiError::Service(format!("malformed response: {err}")))?;

  if let Some(reason) = response
    .prompt_feedback
    .and_then(|feedback| feedback.block_reason)
  {
    return Err(AiError::Service(format!("prompt blocked: {reason}")));
  }

  let Some(candidate) = response.candidates.into_iter().next() else {
    return Err(AiError::Service("empty response".to_string()));
  };

  let text: String = candidate
    .content
    .map(|content| {
      content
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect()
    })
    .unwrap_or_default();

  if text.is_empty() {
    let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
    return Err(AiError::Service(format!(
      "empty response (finish reason: {reason})"
    )));
  }

  Ok(text)
}

/// Maps a non-success HTTP status (and its body) to an [`AiError`].
pub fn classify_status(status: StatusCode, body: &str) -> AiError {
  let error = serde_json::from_str::<ErrorEnvelope>(body)
    .map(|envelope| envelope.error)
    .unwrap_or_default();
  let message = if error.message.is_empty() {
    status
      .canonical_reason()
      .unwrap_or("request failed")
      .to_string()
  } else {
    error.message
  };

  match status {
    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AiError::Auth(message),
    StatusCode::BAD_REQUEST
      if error.status == "INVALID_ARGUMENT" && message.contains("API key") =>
    {
      AiError::Auth(message)
    },
    StatusCode::TOO_MANY_REQUESTS => AiError::Quota(message),
    _ => AiError::Service(format!("HTTP {}: {message}", status.as_u16())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    ApiKey,
    ModelSettings,
  };

  #[test]
  fn url_joins_endpoint_and_model() {
    assert_eq!(
      generate_url("https://host/v1beta/", "gemini-x"),
      "https://host/v1beta/models/gemini-x:generateContent"
    );
  }

  #[test]
  fn request_body_shape() {
    let body = serde_json::to_value(GenerateRequest::new("hello")).unwrap();
    assert_eq!(
      body,
      serde_json::json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
    );
  }

  #[test]
  fn parts_are_joined() {
    let body = r#"{
      "candidates": [{
        "content": { "role": "model", "parts": [{ "text": "```python\n" }, { "text": "print(1)\n```" }] },
        "finishReason": "STOP"
      }]
    }"#;
    assert_eq!(parse_response(body).unwrap(), "```python\nprint(1)\n```");
  }

  #[test]
  fn blocked_and_empty_responses_are_service_errors() {
    let blocked = r#"{ "promptFeedback": { "blockReason": "SAFETY" } }"#;
    assert_eq!(
      parse_response(blocked),
      Err(AiError::Service("prompt blocked: SAFETY".into()))
    );
    assert!(matches!(parse_response("{}"), Err(AiError::Service(_))));
    assert!(matches!(
      parse_response(r#"{ "candidates": [{ "finishReason": "MAX_TOKENS" }] }"#),
      Err(AiError::Service(msg)) if msg.contains("MAX_TOKENS")
    ));
    assert!(matches!(parse_response("not json"), Err(AiError::Service(_))));
  }

  #[test]
  fn statuses_are_classified() {
    let bad_key = r#"{ "error": { "code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT" } }"#;
    assert!(matches!(
      classify_status(StatusCode::BAD_REQUEST, bad_key),
      AiError::Auth(_)
    ));
    assert!(matches!(
      classify_status(StatusCode::FORBIDDEN, ""),
      AiError::Auth(msg) if msg == "Forbidden"
    ));
    assert!(matches!(
      classify_status(StatusCode::TOO_MANY_REQUESTS, "{}"),
      AiError::Quota(_)
    ));
    assert_eq!(
      classify_status(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{ "error": { "message": "backend down", "status": "INTERNAL" } }"#
      ),
      AiError::Service("HTTP 500: backend down".into())
    );
  }

  #[test]
  fn provider_rejects_unprintable_keys() {
    let session = Session::new(ApiKey::new("abc def").unwrap(), ModelSettings::default());
    assert!(matches!(
      GeminiProvider.connect(&session).err(),
      Some(AiError::Auth(_))
    ));

    let session = Session::new(ApiKey::new("abc-def").unwrap(), ModelSettings::default());
    let model = GeminiProvider.connect(&session).unwrap();
    assert_eq!(model.name(), "gemini-2.0-flash-exp");
  }
}
