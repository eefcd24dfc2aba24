//! [`GeminiClient`]: a [`TextCompleter`] over the Generative Language
//! `generateContent` REST endpoint.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{DEFAULT_CANDIDATES, Error, Result, TextCompleter};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection settings for the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeminiConfig {
  pub api_key:      String,
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Candidate models, tried in order.
  #[serde(default = "default_models")]
  pub models:       Vec<String>,
  #[serde(default = "default_timeout")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }

fn default_models() -> Vec<String> { DEFAULT_CANDIDATES.iter().map(|m| m.to_string()).collect() }

fn default_timeout() -> u64 { 30 }

impl GeminiConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:      api_key.into(),
      base_url:     default_base_url(),
      models:       default_models(),
      timeout_secs: default_timeout(),
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
  contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
  parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
  text: &'a str,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GenerateResponse {
  candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Candidate {
  content: CandidateContent,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidateContent {
  parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CandidatePart {
  text: Option<String>,
}

impl GenerateResponse {
  /// Text of the first part of the first candidate.
  fn into_text(self) -> Option<String> {
    self
      .candidates
      .into_iter()
      .next()?
      .content
      .parts
      .into_iter()
      .next()?
      .text
      .filter(|t| !t.trim().is_empty())
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct GeminiClient {
  client:   Client,
  base_url: String,
  api_key:  String,
}

impl GeminiClient {
  pub fn new(config: &GeminiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self {
      client,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      api_key: config.api_key.clone(),
    })
  }

  fn url(&self, model: &str) -> String {
    format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
  }
}

impl TextCompleter for GeminiClient {
  type Error = Error;

  async fn complete<'a>(&'a self, model: &'a str, prompt: &'a str) -> Result<String> {
    debug!(%model, prompt_len = prompt.len(), "requesting completion");
    let body = GenerateRequest { contents: [Content { parts: [Part { text: prompt }] }] };

    let resp = self
      .client
      .post(self.url(model))
      .header("x-goog-api-key", &self.api_key)
      .json(&body)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { model: model.to_string(), status: status.as_u16(), body });
    }

    let parsed: GenerateResponse = resp.json().await?;
    parsed
      .into_text()
      .ok_or_else(|| Error::EmptyResponse { model: model.to_string() })
  }
}
