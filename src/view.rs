//! Presentation: renders a `Session` into the view model clients draw.
//! Purely derived; no decisions about gameplay are made here.

use serde::Serialize;

use crate::chart::{score_series, ChartPoint};
use crate::domain::{Challenge, HistoryEntry, Status, MAX_LEVEL};
use crate::session::Session;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
  Start,
  Loading,
  Round,
  Summary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
  Success,
  Failure,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
  pub tone: Tone,
  pub title: String,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alternative_answer: Option<String>,
  /// Secondary line, e.g. "Next level loading...".
  #[serde(skip_serializing_if = "Option::is_none")]
  pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
  pub screen: Screen,
  pub status: Status,
  pub level: u32,
  pub max_level: u32,
  pub score: u32,
  pub headline: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub challenge: Option<Challenge>,
  /// Whether the answer box accepts input.
  pub input_enabled: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub feedback: Option<FeedbackView>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  pub history: Vec<HistoryEntry>,
  /// Only on the summary screen.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chart: Option<Vec<ChartPoint>>,
}

pub fn render(session: &Session) -> SessionView {
  let screen = match session.status {
    Status::Start => Screen::Start,
    Status::LoadingChallenge | Status::LoadingError => Screen::Loading,
    Status::Playing | Status::Validating | Status::RoundFeedback => Screen::Round,
    Status::GameOver | Status::Victory => Screen::Summary,
  };

  let headline = match session.status {
    Status::Start => "Career Link: link two clubs with one player. 10 levels of increasing difficulty.".to_string(),
    Status::LoadingChallenge => format!("Scouting clubs for Level {}...", session.level),
    Status::LoadingError => format!("Level {} could not be loaded.", session.level),
    Status::Playing | Status::Validating | Status::RoundFeedback => {
      format!("Level {}/{} · Current Score: {}", session.level, MAX_LEVEL, session.score)
    }
    Status::GameOver => format!("Game Over · Final Score: {}", session.score),
    Status::Victory => format!("Legendary Status! · Final Score: {}", session.score),
  };

  let feedback = session.last_feedback.as_ref().map(|fb| {
    if fb.is_correct {
      FeedbackView {
        tone: Tone::Success,
        title: "Excellent!".into(),
        message: fb.message.clone(),
        alternative_answer: None,
        note: (session.status == Status::RoundFeedback).then(|| "Next level loading...".to_string()),
      }
    } else {
      FeedbackView {
        tone: Tone::Failure,
        title: "Incorrect Link".into(),
        message: fb.message.clone(),
        alternative_answer: fb.alternative_answer.clone().filter(|a| !a.trim().is_empty()),
        note: None,
      }
    }
  });

  SessionView {
    screen,
    status: session.status,
    level: session.level,
    max_level: MAX_LEVEL,
    score: session.score,
    headline,
    challenge: session.current_challenge.clone(),
    input_enabled: session.status == Status::Playing,
    feedback,
    error: session.error.clone(),
    history: session.history.clone(),
    chart: (screen == Screen::Summary).then(|| score_series(&session.history)),
  }
}
