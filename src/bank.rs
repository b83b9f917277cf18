//! Offline gateway: a local bank of challenges with known linking players.
//!
//! Used when no OpenAI key is configured. Entries come from TOML `[[challenges]]` first,
//! then the built-in seeds. Selection is random within the level's difficulty tier,
//! preferring entries whose clubs have not been used yet in the run.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::{debug, instrument, warn};

use crate::config::ChallengeCfg;
use crate::domain::{Challenge, DifficultyTier, ValidationResult};
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::seeds::seed_challenges;
use crate::util::normalize_name;

#[derive(Clone, Debug)]
pub struct BankEntry {
  pub level: u32,
  pub challenge: Challenge,
  pub answers: Vec<String>,
}

impl BankEntry {
  pub fn new(level: u32, subject_a: &str, subject_b: &str, answers: &[&str]) -> Self {
    Self {
      level,
      challenge: Challenge::new(subject_a, subject_b),
      answers: answers.iter().map(|a| a.to_string()).collect(),
    }
  }

  pub fn tier(&self) -> DifficultyTier {
    DifficultyTier::for_level(self.level)
  }

  fn links(&self, subject_a: &str, subject_b: &str) -> bool {
    let (a, b) = (normalize_name(subject_a), normalize_name(subject_b));
    let (x, y) = (normalize_name(&self.challenge.subject_a), normalize_name(&self.challenge.subject_b));
    (a == x && b == y) || (a == y && b == x)
  }

  /// Full name or surname match, ignoring case, accents and punctuation.
  fn accepts(&self, answer: &str) -> Option<&str> {
    let given = normalize_name(answer);
    if given.is_empty() {
      return None;
    }
    self
      .answers
      .iter()
      .find(|known| {
        let known = normalize_name(known);
        known == given || known.rsplit(' ').next() == Some(given.as_str())
      })
      .map(String::as_str)
  }
}

#[derive(Clone, Debug, Default)]
pub struct LocalBank {
  entries: Vec<BankEntry>,
}

impl LocalBank {
  pub fn new(entries: Vec<BankEntry>) -> Self {
    Self { entries }
  }

  /// Configured entries followed by the built-in seeds (seeds already configured are skipped).
  pub fn from_config(challenges: &[ChallengeCfg]) -> Self {
    let mut entries: Vec<BankEntry> = Vec::new();
    for cc in challenges {
      if cc.subject_a.trim().is_empty() || cc.subject_b.trim().is_empty() {
        warn!(target: "gateway", level = cc.level, "Skipping bank item: missing club name.");
        continue;
      }
      entries.push(BankEntry {
        level: cc.level,
        challenge: Challenge::new(cc.subject_a.trim(), cc.subject_b.trim()),
        answers: cc.answers.clone(),
      });
    }
    for seed in seed_challenges() {
      let known = entries
        .iter()
        .any(|e| e.links(&seed.challenge.subject_a, &seed.challenge.subject_b));
      if !known {
        entries.push(seed);
      }
    }
    Self { entries }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn find(&self, subject_a: &str, subject_b: &str) -> Option<&BankEntry> {
    self.entries.iter().find(|e| e.links(subject_a, subject_b))
  }
}

#[async_trait]
impl Gateway for LocalBank {
  fn name(&self) -> &'static str {
    "local_bank"
  }

  #[instrument(level = "info", skip(self, avoid), fields(avoid_len = avoid.len()))]
  async fn request_challenge(&self, level: u32, avoid: &[String]) -> Result<Challenge, GatewayError> {
    let tier = DifficultyTier::for_level(level);
    let avoid: Vec<String> = avoid.iter().map(|s| normalize_name(s)).collect();
    let in_tier: Vec<&BankEntry> = self.entries.iter().filter(|e| e.tier() == tier).collect();
    let fresh: Vec<&BankEntry> = in_tier
      .iter()
      .copied()
      .filter(|e| {
        !avoid.contains(&normalize_name(&e.challenge.subject_a)) && !avoid.contains(&normalize_name(&e.challenge.subject_b))
      })
      .collect();
    let pool = if fresh.is_empty() { &in_tier } else { &fresh };

    let chosen = pool
      .choose(&mut rand::thread_rng())
      .ok_or(GatewayError::Exhausted { level })?;
    debug!(target: "gateway", %level, ?tier, pool = pool.len(), subject_a = %chosen.challenge.subject_a, subject_b = %chosen.challenge.subject_b, "Bank challenge chosen");
    Ok(chosen.challenge.clone())
  }

  #[instrument(level = "info", skip(self, answer), fields(answer_len = answer.len()))]
  async fn validate_answer(&self, subject_a: &str, subject_b: &str, answer: &str) -> Result<ValidationResult, GatewayError> {
    let entry = self.find(subject_a, subject_b).ok_or_else(|| GatewayError::Unverifiable {
      subject_a: subject_a.to_string(),
      subject_b: subject_b.to_string(),
    })?;

    let verdict = match entry.accepts(answer) {
      Some(known) => ValidationResult {
        is_correct: true,
        message: format!("Correct! {known} played for both {subject_a} and {subject_b}."),
        alternative_answer: None,
      },
      None => ValidationResult {
        is_correct: false,
        message: format!("'{}' is not a known link between {subject_a} and {subject_b}.", answer.trim()),
        alternative_answer: entry.answers.first().cloned(),
      },
    };
    Ok(verdict)
  }
}
