//! Minimal OpenAI client for the challenge/validation gateway.
//!
//! We only call chat.completions and always request a strict JSON schema response,
//! so the model is told the exact shape (`subjectA`/`subjectB`, `isCorrect`/`message`/`alternativeAnswer`)
//! and the reply is parsed strictly on our side too.
//! Calls are instrumented and log model names, latencies, and response sizes (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short to avoid PII leaks.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use crate::config::{GameSettings, Prompts};
use crate::domain::{Challenge, DifficultyTier, ValidationResult};
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::util::{fill_template, trunc_for_log};

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
  pub strong_model: String,
  pub prompts: Prompts,
  pub challenge_temperature: f32,
  pub validation_temperature: f32,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  pub fn from_env(prompts: Prompts, settings: &GameSettings) -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let fast_model =
      std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
    let strong_model =
      std::env::var("OPENAI_STRONG_MODEL").unwrap_or_else(|_| "gpt-4o".into());

    match Self::new(api_key, base_url, fast_model, strong_model, prompts, settings) {
      Ok(oa) => Some(oa),
      Err(e) => {
        error!(target: "gateway", error = %e, "Failed to build HTTP client; OpenAI disabled");
        None
      }
    }
  }

  pub fn new(
    api_key: String,
    base_url: String,
    fast_model: String,
    strong_model: String,
    prompts: Prompts,
    settings: &GameSettings,
  ) -> Result<Self, GatewayError> {
    let client = reqwest::Client::builder()
      .timeout(settings.request_timeout())
      .build()?;
    Ok(Self {
      client,
      api_key,
      base_url: base_url.trim_end_matches('/').to_string(),
      fast_model,
      strong_model,
      prompts,
      challenge_temperature: settings.challenge_temperature,
      validation_temperature: settings.validation_temperature,
    })
  }

  /// JSON-schema chat completion. Generic over the target type T.
  #[instrument(level = "info", skip(self, system, user, schema), fields(model = %model, schema = %schema.name))]
  async fn chat_json<T: DeserializeOwned>(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
    schema: JsonSchema,
  ) -> Result<T, GatewayError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      response_format: ResponseFormat { r#type: "json_schema".into(), json_schema: schema },
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, "career-link-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      return Err(GatewayError::Upstream { status: status.as_u16(), message });
    }

    let raw = res.text().await?;
    let elapsed: Duration = start.elapsed();
    let body: ChatCompletionResponse = serde_json::from_str(&raw)
      .map_err(|e| GatewayError::Schema(format!("completion envelope: {e}")))?;
    if let Some(usage) = &body.usage {
      info!(?elapsed, prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
      return Err(GatewayError::EmptyResponse);
    }
    info!(?elapsed, response_len = text.len(), "Model response received");

    serde_json::from_str::<T>(text).map_err(|e| GatewayError::Schema(format!("{e}; content: {}", trunc_for_log(text, 120))))
  }
}

#[async_trait]
impl Gateway for OpenAI {
  fn name(&self) -> &'static str {
    "openai"
  }

  #[instrument(level = "info", skip(self, avoid), fields(model = %self.strong_model, avoid_len = avoid.len()))]
  async fn request_challenge(&self, level: u32, avoid: &[String]) -> Result<Challenge, GatewayError> {
    let tier = DifficultyTier::for_level(level);
    let level_s = level.to_string();
    let avoid_s = if avoid.is_empty() { "none".to_string() } else { avoid.join(", ") };
    let user = fill_template(
      &self.prompts.challenge_user_template,
      &[("level", level_s.as_str()), ("tier", tier.describe()), ("avoid", avoid_s.as_str())],
    );

    let c: Challenge = self
      .chat_json(&self.strong_model, &self.prompts.challenge_system, &user, self.challenge_temperature, challenge_schema())
      .await?;

    let (a, b) = (c.subject_a.trim(), c.subject_b.trim());
    if a.is_empty() || b.is_empty() {
      return Err(GatewayError::Schema("challenge has an empty club name".into()));
    }
    if a.eq_ignore_ascii_case(b) {
      return Err(GatewayError::Schema(format!("challenge repeats the same club twice: {a}")));
    }
    info!(target: "gateway", %level, subject_a = %a, subject_b = %b, "Challenge generated");
    Ok(Challenge::new(a, b))
  }

  #[instrument(level = "info", skip(self, answer), fields(model = %self.fast_model, answer_len = answer.len()))]
  async fn validate_answer(&self, subject_a: &str, subject_b: &str, answer: &str) -> Result<ValidationResult, GatewayError> {
    let user = fill_template(
      &self.prompts.validation_user_template,
      &[("subject_a", subject_a), ("subject_b", subject_b), ("answer", answer)],
    );
    let mut v: ValidationResult = self
      .chat_json(&self.fast_model, &self.prompts.validation_system, &user, self.validation_temperature, validation_schema())
      .await?;
    if v.is_correct {
      v.alternative_answer = None;
    }
    v.alternative_answer = v.alternative_answer.filter(|a| !a.trim().is_empty());
    info!(target: "gateway", correct = v.is_correct, "Answer validated");
    Ok(v)
  }
}

fn challenge_schema() -> JsonSchema {
  JsonSchema {
    name: "career_link_challenge".into(),
    strict: true,
    schema: json!({
      "type": "object",
      "properties": {
        "subjectA": { "type": "string", "description": "Name of the first football club" },
        "subjectB": { "type": "string", "description": "Name of the second football club" }
      },
      "required": ["subjectA", "subjectB"],
      "additionalProperties": false
    }),
  }
}

fn validation_schema() -> JsonSchema {
  JsonSchema {
    name: "career_link_verdict".into(),
    strict: true,
    schema: json!({
      "type": "object",
      "properties": {
        "isCorrect": { "type": "boolean" },
        "message": { "type": "string", "description": "Feedback shown to the player" },
        "alternativeAnswer": {
          "type": ["string", "null"],
          "description": "A player who did play for both clubs, when the answer is wrong"
        }
      },
      "required": ["isCorrect", "message", "alternativeAnswer"],
      "additionalProperties": false
    }),
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  response_format: ResponseFormat,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }
#[derive(Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")] r#type: String,
  json_schema: JsonSchema,
}
#[derive(Serialize)]
struct JsonSchema { name: String, strict: bool, schema: Value }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
