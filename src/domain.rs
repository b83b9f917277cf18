//! Domain models: challenges, verdicts, round history, session status and the difficulty curve.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Highest level of a run. A correct answer here ends the run in victory.
pub const MAX_LEVEL: u32 = 10;

/// Points awarded per correct round.
pub const POINTS_PER_ROUND: u32 = 10;

/// Two clubs the player must link with a single player who played for both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
  pub subject_a: String,
  pub subject_b: String,
}

impl Challenge {
  pub fn new(subject_a: impl Into<String>, subject_b: impl Into<String>) -> Self {
    Self { subject_a: subject_a.into(), subject_b: subject_b.into() }
  }
}

/// Verdict for a submitted answer.
/// `alternative_answer` only carries a value when the answer was wrong.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
  pub is_correct: bool,
  pub message: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub alternative_answer: Option<String>,
}

/// One completed round. Appended once, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
  pub level: u32,
  pub score_after: u32,
  pub subject_a: String,
  pub subject_b: String,
  pub player_answer: String,
  pub is_correct: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  #[default]
  Start,
  LoadingChallenge,
  /// Challenge fetch failed in strict gateway mode; waiting for retry or restart.
  LoadingError,
  Playing,
  Validating,
  RoundFeedback,
  GameOver,
  Victory,
}

impl Status {
  pub fn as_str(&self) -> &'static str {
    match self {
      Status::Start => "START",
      Status::LoadingChallenge => "LOADING_CHALLENGE",
      Status::LoadingError => "LOADING_ERROR",
      Status::Playing => "PLAYING",
      Status::Validating => "VALIDATING",
      Status::RoundFeedback => "ROUND_FEEDBACK",
      Status::GameOver => "GAME_OVER",
      Status::Victory => "VICTORY",
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Status::GameOver | Status::Victory)
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Difficulty curve. Each tier spans two levels; higher tiers ask for obscurer clubs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyTier {
  GlobalGiants,
  TopTier,
  Middle,
  Hard,
  Obscure,
}

impl DifficultyTier {
  /// Levels outside 1..=MAX_LEVEL are clamped onto the curve.
  pub fn for_level(level: u32) -> Self {
    match level.clamp(1, MAX_LEVEL) {
      1 | 2 => DifficultyTier::GlobalGiants,
      3 | 4 => DifficultyTier::TopTier,
      5 | 6 => DifficultyTier::Middle,
      7 | 8 => DifficultyTier::Hard,
      _ => DifficultyTier::Obscure,
    }
  }

  /// Human-readable description injected into generation prompts.
  pub fn describe(&self) -> &'static str {
    match self {
      DifficultyTier::GlobalGiants => "global giants (Real Madrid, Barcelona, Manchester United, Bayern Munich)",
      DifficultyTier::TopTier => "top-tier big-five league clubs (Arsenal, Borussia Dortmund, Roma)",
      DifficultyTier::Middle => "major clubs outside the big five or mid-table big-five clubs (Benfica, Ajax, Everton)",
      DifficultyTier::Hard => "lower-table big-five clubs or leading clubs of smaller leagues (Getafe, Celtic)",
      DifficultyTier::Obscure => "lower-division or obscure clubs (Hull City, Luton Town)",
    }
  }
}
