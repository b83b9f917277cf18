//! Game configuration: gameplay settings, prompts and an optional challenge bank, loaded from TOML.
//!
//! Example (`GAME_CONFIG_PATH=career_link.toml`):
//!
//! ```toml
//! [game]
//! gateway_mode = "strict"
//! feedback_pause_ms = 4000
//!
//! [[challenges]]
//! level = 9
//! subject_a = "Hull City"
//! subject_b = "Liverpool"
//! answers = ["Andy Robertson"]
//! ```
//!
//! Environment variables override the file: `GATEWAY_MODE`, `FEEDBACK_PAUSE_MS`, `SESSION_IDLE_TTL_SECS`.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub game: GameSettings,
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

/// How gateway failures reach the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
  /// Errors become safe defaults (fixed challenge, negative verdict); gameplay never stalls.
  #[default]
  Fallback,
  /// Errors are surfaced to the session as failures the player can retry.
  Strict,
}

impl GatewayMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      GatewayMode::Fallback => "fallback",
      GatewayMode::Strict => "strict",
    }
  }
}

impl FromStr for GatewayMode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "fallback" | "demo" => Ok(GatewayMode::Fallback),
      "strict" => Ok(GatewayMode::Strict),
      other => Err(format!("unknown gateway mode '{other}' (expected 'fallback' or 'strict')")),
    }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameSettings {
  pub gateway_mode: GatewayMode,
  /// Pause between a correct answer and the next level.
  pub feedback_pause_ms: u64,
  pub request_timeout_secs: u64,
  pub challenge_temperature: f32,
  pub validation_temperature: f32,
  /// HTTP sessions untouched for this long are dropped from the registry.
  pub session_idle_ttl_secs: u64,
}

impl Default for GameSettings {
  fn default() -> Self {
    Self {
      gateway_mode: GatewayMode::Fallback,
      feedback_pause_ms: 4000,
      request_timeout_secs: 20,
      challenge_temperature: 0.7,
      validation_temperature: 0.2,
      session_idle_ttl_secs: 1800,
    }
  }
}

impl GameSettings {
  pub fn feedback_pause(&self) -> Duration {
    Duration::from_millis(self.feedback_pause_ms)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn session_idle_ttl(&self) -> Duration {
    Duration::from_secs(self.session_idle_ttl_secs)
  }
}

/// Challenge bank entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  pub level: u32,
  pub subject_a: String,
  pub subject_b: String,
  /// Players known to link both clubs; used for offline validation.
  #[serde(default)]
  pub answers: Vec<String>,
}

/// Prompts used by the OpenAI gateway.
/// Templates accept `{level}`, `{tier}`, `{avoid}` (challenge) and `{subject_a}`, `{subject_b}`, `{answer}` (validation).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub challenge_system: String,
  pub challenge_user_template: String,
  pub validation_system: String,
  pub validation_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      challenge_system: concat!(
        "You run a football trivia game called Career Link. The player sees two clubs and must name ",
        "one player who appeared for both at senior professional level. There are 10 levels.\n",
        "Difficulty curve:\n",
        "- Levels 1-2: global giants (Real Madrid, Barcelona, Manchester United, Bayern Munich).\n",
        "- Levels 3-4: top-tier big-five league clubs (Arsenal, Borussia Dortmund, Roma).\n",
        "- Levels 5-6: major clubs outside the big five or mid-table big-five clubs (Benfica, Ajax, Everton).\n",
        "- Levels 7-8: lower-table big-five clubs or leading clubs of smaller leagues (Getafe, Celtic).\n",
        "- Levels 9-10: lower-division or obscure clubs (Hull City, Luton Town).\n",
        "Rules: return two different clubs; at least one well-documented player must have played for both; ",
        "avoid clubs listed by the user when possible. Respond ONLY with strict JSON."
      ).into(),
      challenge_user_template: "Generate the challenge for level {level} ({tier}).\nClubs already used, avoid them if possible: {avoid}.\nReturn JSON {\"subjectA\": string, \"subjectB\": string}.".into(),
      validation_system: "You are a football statistician verifying career paths. Be strict about facts but forgiving about spelling. Respond ONLY with strict JSON.".into(),
      validation_user_template: "Club A: {subject_a}\nClub B: {subject_b}\nPlayer answer: {answer}\n\nDid this player play for both clubs at senior professional level?\nIf yes: isCorrect=true and a short message confirming the spells (years).\nIf no: isCorrect=false, a message explaining why (e.g. played for A but never for B) and alternativeAnswer naming a player who did play for both.\nReturn JSON {\"isCorrect\": boolean, \"message\": string, \"alternativeAnswer\": string|null}.".into(),
    }
  }
}

impl GameConfig {
  /// Load the TOML file (if any) and apply environment overrides.
  pub fn from_env() -> Self {
    let mut cfg = load_game_config_from_env().unwrap_or_default();
    cfg.apply_env_overrides();
    cfg
  }

  fn apply_env_overrides(&mut self) {
    if let Ok(raw) = std::env::var("GATEWAY_MODE") {
      match raw.parse::<GatewayMode>() {
        Ok(mode) => self.game.gateway_mode = mode,
        Err(e) => warn!(target: "career_link", error = %e, "Ignoring GATEWAY_MODE"),
      }
    }
    if let Ok(raw) = std::env::var("FEEDBACK_PAUSE_MS") {
      match raw.parse::<u64>() {
        Ok(ms) => self.game.feedback_pause_ms = ms,
        Err(e) => warn!(target: "career_link", value = %raw, error = %e, "Ignoring FEEDBACK_PAUSE_MS"),
      }
    }
    if let Ok(raw) = std::env::var("SESSION_IDLE_TTL_SECS") {
      match raw.parse::<u64>() {
        Ok(secs) => self.game.session_idle_ttl_secs = secs,
        Err(e) => warn!(target: "career_link", value = %raw, error = %e, "Ignoring SESSION_IDLE_TTL_SECS"),
      }
    }
  }
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GameConfig>(&s) {
      Ok(cfg) => {
        info!(target: "career_link", %path, challenges = cfg.challenges.len(), "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "career_link", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "career_link", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
