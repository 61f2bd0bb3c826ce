//! Minimal Gemini client for our use-case.
//!
//! We only call `models/{model}:generateContent` and ask for a JSON reply
//! constrained by a response schema. Calls are instrumented and log the model,
//! latency and token usage (not contents).
//!
//! NOTE: We never log the API key and keep payload previews short.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::error::GenerationError;
use crate::generator::{GenerationRequest, GenerationService};
use crate::util::trunc_for_log;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Build the client from env. The key is not validated here: a missing key
  /// surfaces later as an ordinary generation failure.
  pub fn from_env() -> Result<Self, reqwest::Error> {
    let api_key = std::env::var("GEMINI_API_KEY")
      .or_else(|_| std::env::var("API_KEY"))
      .unwrap_or_default();
    if api_key.is_empty() {
      warn!(target: "mates_backend", "No GEMINI_API_KEY/API_KEY set; generation requests will be rejected upstream.");
    }
    let base_url = std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

    let mut builder = reqwest::Client::builder();
    if let Some(secs) = std::env::var("GEMINI_TIMEOUT_SECS").ok().and_then(|s| s.parse::<u64>().ok()) {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build()?;

    Ok(Self { client, api_key, base_url, model })
  }

  fn endpoint(&self) -> String {
    format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
  }
}

#[async_trait]
impl GenerationService for Gemini {
  #[instrument(level = "info", skip(self, request), fields(model = %self.model))]
  async fn generate_json(&self, request: &GenerationRequest) -> Result<Option<String>, GenerationError> {
    let body = build_request_body(request);
    let start = Instant::now();

    let res = self.client.post(self.endpoint())
      .header("x-goog-api-key", &self.api_key)
      .json(&body)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_gemini_error(&body).unwrap_or(body);
      error!(elapsed = ?start.elapsed(), %status, "Gemini call failed");
      return Err(GenerationError::Service { status: status.as_u16(), message });
    }

    let reply: GenerateContentResponse = res.json().await?;
    if let Some(usage) = &reply.usage_metadata {
      info!(
        elapsed = ?start.elapsed(),
        prompt_tokens = ?usage.prompt_token_count,
        candidates_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }

    let text = reply.text();
    match &text {
      Some(t) => debug!(preview = %trunc_for_log(t, 120), "Gemini reply received"),
      None => warn!(finish_reason = ?reply.finish_reason(), "Gemini reply had no text"),
    }
    Ok(text)
  }
}

fn build_request_body(request: &GenerationRequest) -> GenerateContentRequest {
  GenerateContentRequest {
    system_instruction: Content { role: None, parts: vec![Part { text: Some(request.system_instruction.clone()) }] },
    contents: vec![Content {
      role: Some("user".into()),
      parts: vec![Part { text: Some(request.user_instruction.clone()) }],
    }],
    generation_config: GenerationConfig {
      response_mime_type: "application/json".into(),
      response_schema: request.response_schema.clone(),
    },
  }
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  system_instruction: Content,
  contents: Vec<Content>,
  generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
  response_mime_type: String,
  response_schema: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct Content {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
  #[serde(default)]
  content: Option<Content>,
  #[serde(default)]
  finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)] prompt_token_count: Option<u32>,
  #[serde(default)] candidates_token_count: Option<u32>,
  #[serde(default)] total_token_count: Option<u32>,
}

impl GenerateContentResponse {
  /// Concatenated text of the first candidate's parts; `None` when there is
  /// nothing to read.
  fn text(&self) -> Option<String> {
    let parts = &self.candidates.first()?.content.as_ref()?.parts;
    let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
    if text.is_empty() { None } else { Some(text) }
  }

  fn finish_reason(&self) -> Option<&str> {
    self.candidates.first()?.finish_reason.as_deref()
  }
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn parse(v: serde_json::Value) -> GenerateContentResponse {
    serde_json::from_value(v).expect("response")
  }

  #[test]
  fn request_body_shape() {
    let req = GenerationRequest {
      system_instruction: "sys".into(),
      user_instruction: "usr".into(),
      response_schema: json!({ "type": "OBJECT" }),
    };
    let v = serde_json::to_value(build_request_body(&req)).unwrap();
    assert_eq!(v["systemInstruction"], json!({ "parts": [{ "text": "sys" }] }));
    assert_eq!(v["contents"], json!([{ "role": "user", "parts": [{ "text": "usr" }] }]));
    assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(v["generationConfig"]["responseSchema"], json!({ "type": "OBJECT" }));
  }

  #[test]
  fn text_joins_parts_of_first_candidate() {
    let r = parse(json!({
      "candidates": [
        { "content": { "role": "model", "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] }, "finishReason": "STOP" },
        { "content": { "parts": [{ "text": "ignored" }] } }
      ],
      "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15 }
    }));
    assert_eq!(r.text().as_deref(), Some("{\"a\":1}"));
    assert_eq!(r.finish_reason(), Some("STOP"));
  }

  #[test]
  fn missing_candidates_or_parts_mean_no_text() {
    assert_eq!(parse(json!({})).text(), None);
    assert_eq!(parse(json!({ "candidates": [{ "finishReason": "SAFETY" }] })).text(), None);
    assert_eq!(parse(json!({ "candidates": [{ "content": { "parts": [] } }] })).text(), None);
    assert_eq!(parse(json!({ "candidates": [{ "content": { "parts": [{ "text": "" }] } }] })).text(), None);
  }

  #[test]
  fn error_message_extraction() {
    let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
    assert_eq!(extract_gemini_error(body).as_deref(), Some("API key not valid. Please pass a valid API key."));
    assert_eq!(extract_gemini_error("<html>bad gateway</html>"), None);
  }

  #[test]
  fn endpoint_tolerates_trailing_slash() {
    let g = Gemini {
      client: reqwest::Client::new(),
      api_key: String::new(),
      base_url: "http://localhost:9000/v1beta/".into(),
      model: "gemini-2.5-flash".into(),
    };
    assert_eq!(g.endpoint(), "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent");
  }
}
