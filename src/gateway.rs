//! Challenge/validation gateway: the boundary to whatever produces challenges and judges answers.
//!
//! Implementations:
//!   - `OpenAI` (remote model, strict JSON schema)
//!   - `LocalBank` (offline, configured + built-in challenges with known answers)
//!
//! `FallbackGateway` wraps either one and turns every failure into a safe default, so a run
//! never stalls. In strict mode the bare gateway is used and failures reach the session.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::bank::LocalBank;
use crate::config::{GameConfig, GatewayMode};
use crate::domain::{Challenge, ValidationResult};
use crate::error::GatewayError;
use crate::openai::OpenAI;

#[async_trait]
pub trait Gateway: Send + Sync {
  /// Short name for logs and health output.
  fn name(&self) -> &'static str;

  /// Two distinct clubs for `level`, avoiding `avoid` where possible.
  async fn request_challenge(&self, level: u32, avoid: &[String]) -> Result<Challenge, GatewayError>;

  /// Judge whether `answer` played for both clubs.
  async fn validate_answer(&self, subject_a: &str, subject_b: &str, answer: &str) -> Result<ValidationResult, GatewayError>;
}

#[async_trait]
impl<G: Gateway + ?Sized> Gateway for Arc<G> {
  fn name(&self) -> &'static str {
    (**self).name()
  }

  async fn request_challenge(&self, level: u32, avoid: &[String]) -> Result<Challenge, GatewayError> {
    (**self).request_challenge(level, avoid).await
  }

  async fn validate_answer(&self, subject_a: &str, subject_b: &str, answer: &str) -> Result<ValidationResult, GatewayError> {
    (**self).validate_answer(subject_a, subject_b, answer).await
  }
}

/// Served when challenge generation fails in fallback mode.
pub fn fallback_challenge() -> Challenge {
  Challenge::new("Real Madrid", "Manchester United")
}

/// Served when validation fails in fallback mode. Indistinguishable from a wrong answer.
pub fn fallback_verdict() -> ValidationResult {
  ValidationResult {
    is_correct: false,
    message: "There was an error verifying your answer. Please try again.".into(),
    alternative_answer: None,
  }
}

/// Demo-friendly wrapper: never returns an error.
pub struct FallbackGateway<G> {
  inner: G,
}

impl<G: Gateway> FallbackGateway<G> {
  pub fn new(inner: G) -> Self {
    Self { inner }
  }
}

#[async_trait]
impl<G: Gateway> Gateway for FallbackGateway<G> {
  fn name(&self) -> &'static str {
    self.inner.name()
  }

  #[instrument(level = "info", skip(self, avoid), fields(gateway = self.inner.name(), avoid_len = avoid.len()))]
  async fn request_challenge(&self, level: u32, avoid: &[String]) -> Result<Challenge, GatewayError> {
    match self.inner.request_challenge(level, avoid).await {
      Ok(c) => Ok(c),
      Err(e) => {
        error!(target: "gateway", %level, error = %e, "Challenge generation failed; serving fixed fallback challenge");
        Ok(fallback_challenge())
      }
    }
  }

  #[instrument(level = "info", skip(self, answer), fields(gateway = self.inner.name(), answer_len = answer.len()))]
  async fn validate_answer(&self, subject_a: &str, subject_b: &str, answer: &str) -> Result<ValidationResult, GatewayError> {
    match self.inner.validate_answer(subject_a, subject_b, answer).await {
      Ok(v) => Ok(v),
      Err(e) => {
        error!(target: "gateway", %subject_a, %subject_b, error = %e, "Answer validation failed; serving negative fallback verdict");
        Ok(fallback_verdict())
      }
    }
  }
}

/// Pick the gateway from configuration: OpenAI when an API key is present, otherwise the
/// offline bank; wrapped in `FallbackGateway` unless strict mode is configured.
pub fn build_gateway(cfg: &GameConfig) -> Arc<dyn Gateway> {
  let openai = OpenAI::from_env(cfg.prompts.clone(), &cfg.game);
  let base: Arc<dyn Gateway> = match openai {
    Some(oa) => {
      info!(target: "career_link", base_url = %oa.base_url, fast_model = %oa.fast_model, strong_model = %oa.strong_model, "OpenAI enabled.");
      Arc::new(oa)
    }
    None => {
      let bank = LocalBank::from_config(&cfg.challenges);
      info!(target: "career_link", challenges = bank.len(), "OpenAI disabled (no OPENAI_API_KEY). Using the offline challenge bank.");
      Arc::new(bank)
    }
  };
  wrap_for_mode(base, cfg.game.gateway_mode)
}

pub fn wrap_for_mode(base: Arc<dyn Gateway>, mode: GatewayMode) -> Arc<dyn Gateway> {
  match mode {
    GatewayMode::Fallback => Arc::new(FallbackGateway::new(base)),
    GatewayMode::Strict => base,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Down;

  #[async_trait]
  impl Gateway for Down {
    fn name(&self) -> &'static str {
      "down"
    }

    async fn request_challenge(&self, _level: u32, _avoid: &[String]) -> Result<Challenge, GatewayError> {
      Err(GatewayError::Transport("connection refused".into()))
    }

    async fn validate_answer(&self, _a: &str, _b: &str, _answer: &str) -> Result<ValidationResult, GatewayError> {
      Err(GatewayError::EmptyResponse)
    }
  }

  #[tokio::test]
  async fn fallback_mode_masks_failures() {
    let gw = wrap_for_mode(Arc::new(Down), GatewayMode::Fallback);
    let c = gw.request_challenge(4, &[]).await.unwrap();
    assert_eq!(c, fallback_challenge());
    let v = gw.validate_answer("Real Madrid", "Manchester United", "Kaká").await.unwrap();
    assert!(!v.is_correct);
    assert_eq!(v, fallback_verdict());
  }

  #[tokio::test]
  async fn strict_mode_surfaces_failures() {
    let gw = wrap_for_mode(Arc::new(Down), GatewayMode::Strict);
    assert!(matches!(gw.request_challenge(1, &[]).await, Err(GatewayError::Transport(_))));
    assert!(matches!(gw.validate_answer("a", "b", "c").await, Err(GatewayError::EmptyResponse)));
  }
}
