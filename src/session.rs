//! Game session state machine.
//!
//! `apply` is a pure transition function: it takes the current `Session` and an `Event`
//! and returns the next `Session` plus the side effects the runner must perform.
//! Nothing here does I/O; the runner (`crate::runner`) executes effects and feeds
//! their results back as events.
//!
//! Every effect carries a fresh `RequestTag`. Result events are only accepted when
//! their tag matches the one the session is waiting on, so late responses from an
//! earlier round (or an earlier run, since the counter survives restarts) are dropped.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{Challenge, HistoryEntry, Status, ValidationResult, MAX_LEVEL, POINTS_PER_ROUND};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestTag(pub u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
  pub status: Status,
  pub level: u32,
  pub score: u32,
  pub current_challenge: Option<Challenge>,
  pub history: Vec<HistoryEntry>,
  pub last_feedback: Option<ValidationResult>,
  /// User-visible, dismissible error banner.
  pub error: Option<String>,
  /// Answer under validation; set only while VALIDATING.
  pending_answer: Option<String>,
  /// Tag of the fetch, validation or pause the session is waiting on.
  awaiting: Option<RequestTag>,
  last_tag: RequestTag,
}

impl Session {
  /// A session on the start screen.
  pub fn new() -> Self {
    Self { level: 1, ..Default::default() }
  }

  /// Fresh run at level 1, continuing the tag counter of the session it replaces.
  fn fresh_run(last_tag: RequestTag) -> Self {
    Self { status: Status::LoadingChallenge, level: 1, last_tag, ..Default::default() }
  }

  fn issue_tag(&mut self) -> RequestTag {
    self.last_tag = RequestTag(self.last_tag.0 + 1);
    self.awaiting = Some(self.last_tag);
    self.last_tag
  }

  /// Tag of the outstanding effect, if any.
  pub fn awaiting(&self) -> Option<RequestTag> {
    self.awaiting
  }

  pub fn pending_answer(&self) -> Option<&str> {
    self.pending_answer.as_deref()
  }

  /// All subjects seen in completed rounds, both sides, first occurrence order.
  pub fn used_subjects(&self) -> Vec<String> {
    let mut seen = HashSet::new();
    self
      .history
      .iter()
      .flat_map(|h| [h.subject_a.clone(), h.subject_b.clone()])
      .filter(|s| seen.insert(s.clone()))
      .collect()
  }

  pub fn correct_rounds(&self) -> usize {
    self.history.iter().filter(|h| h.is_correct).count()
  }

  fn fetch_effect(&mut self) -> Effect {
    let tag = self.issue_tag();
    Effect::FetchChallenge { tag, level: self.level, avoid: self.used_subjects() }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
  /// Start a run; also used to restart from a terminal or error state.
  Start,
  ChallengeLoaded { tag: RequestTag, challenge: Challenge },
  ChallengeFailed { tag: RequestTag, error: String },
  Submit { answer: String },
  Validated { tag: RequestTag, result: ValidationResult },
  ValidationFailed { tag: RequestTag, error: String },
  PauseElapsed { tag: RequestTag },
  Retry,
  DismissError,
}

impl Event {
  pub fn kind(&self) -> &'static str {
    match self {
      Event::Start => "start",
      Event::ChallengeLoaded { .. } => "challenge_loaded",
      Event::ChallengeFailed { .. } => "challenge_failed",
      Event::Submit { .. } => "submit",
      Event::Validated { .. } => "validated",
      Event::ValidationFailed { .. } => "validation_failed",
      Event::PauseElapsed { .. } => "pause_elapsed",
      Event::Retry => "retry",
      Event::DismissError => "dismiss_error",
    }
  }
}

/// Side effects requested by a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
  FetchChallenge { tag: RequestTag, level: u32, avoid: Vec<String> },
  ValidateAnswer { tag: RequestTag, challenge: Challenge, answer: String },
  /// Start the post-correct-answer pause; report `PauseElapsed` when it fires.
  SchedulePause { tag: RequestTag },
  CancelPause,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
  #[error("'{event}' is not accepted while {status}")]
  WrongStatus { event: &'static str, status: Status },
  #[error("answer is empty")]
  EmptyAnswer,
  #[error("stale '{event}' response ignored")]
  Stale { event: &'static str },
  #[error("no error to dismiss")]
  NothingToDismiss,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
  Applied,
  Ignored(Rejection),
}

impl Outcome {
  pub fn is_applied(&self) -> bool {
    matches!(self, Outcome::Applied)
  }
}

#[derive(Clone, Debug)]
pub struct Transition {
  pub session: Session,
  pub effects: Vec<Effect>,
  pub outcome: Outcome,
}

impl Transition {
  fn applied(session: Session, effects: Vec<Effect>) -> Self {
    Self { session, effects, outcome: Outcome::Applied }
  }

  fn ignored(session: Session, reason: Rejection) -> Self {
    Self { session, effects: Vec::new(), outcome: Outcome::Ignored(reason) }
  }
}

/// Apply one event. Total: every (status, event) pair has a defined result.
pub fn apply(session: Session, event: Event) -> Transition {
  let kind = event.kind();
  match event {
    Event::Start => start(session),
    Event::ChallengeLoaded { tag, challenge } => {
      guarded(session, kind, Status::LoadingChallenge, tag, |mut s| {
        s.current_challenge = Some(challenge);
        s.last_feedback = None;
        s.error = None;
        s.status = Status::Playing;
        Transition::applied(s, Vec::new())
      })
    }
    Event::ChallengeFailed { tag, .. } => guarded(session, kind, Status::LoadingChallenge, tag, |mut s| {
      s.error = Some(format!("Failed to load level {}. Please try again.", s.level));
      s.status = Status::LoadingError;
      Transition::applied(s, Vec::new())
    }),
    Event::Submit { answer } => submit(session, answer),
    Event::Validated { tag, result } => guarded(session, kind, Status::Validating, tag, |s| resolve_round(s, result)),
    Event::ValidationFailed { tag, .. } => guarded(session, kind, Status::Validating, tag, |mut s| {
      s.pending_answer = None;
      s.error = Some("Could not verify your answer. Please submit it again.".into());
      s.status = Status::Playing;
      Transition::applied(s, Vec::new())
    }),
    Event::PauseElapsed { tag } => guarded(session, kind, Status::RoundFeedback, tag, advance_level),
    Event::Retry => {
      if session.status != Status::LoadingError {
        let status = session.status;
        return Transition::ignored(session, Rejection::WrongStatus { event: kind, status });
      }
      let mut s = session;
      s.error = None;
      s.status = Status::LoadingChallenge;
      let fetch = s.fetch_effect();
      Transition::applied(s, vec![fetch])
    }
    Event::DismissError => {
      if session.error.is_none() {
        return Transition::ignored(session, Rejection::NothingToDismiss);
      }
      let mut s = session;
      s.error = None;
      Transition::applied(s, Vec::new())
    }
  }
}

fn start(session: Session) -> Transition {
  match session.status {
    status if status.is_terminal() || matches!(status, Status::Start | Status::LoadingError) => {
      let mut next = Session::fresh_run(session.last_tag);
      let fetch = next.fetch_effect();
      Transition::applied(next, vec![Effect::CancelPause, fetch])
    }
    status => Transition::ignored(session, Rejection::WrongStatus { event: "start", status }),
  }
}

fn submit(session: Session, answer: String) -> Transition {
  if session.status != Status::Playing {
    let status = session.status;
    return Transition::ignored(session, Rejection::WrongStatus { event: "submit", status });
  }
  let answer = answer.trim();
  if answer.is_empty() {
    return Transition::ignored(session, Rejection::EmptyAnswer);
  }
  let Some(challenge) = session.current_challenge.clone() else {
    return Transition::ignored(session, Rejection::WrongStatus { event: "submit", status: Status::Playing });
  };

  let mut s = session;
  s.status = Status::Validating;
  s.error = None;
  s.pending_answer = Some(answer.to_string());
  let tag = s.issue_tag();
  Transition::applied(s, vec![Effect::ValidateAnswer { tag, challenge, answer: answer.to_string() }])
}

/// Accept a result event only in `expected` status and only for the awaited tag.
fn guarded(
  session: Session,
  event: &'static str,
  expected: Status,
  tag: RequestTag,
  f: impl FnOnce(Session) -> Transition,
) -> Transition {
  if session.awaiting != Some(tag) {
    return Transition::ignored(session, Rejection::Stale { event });
  }
  if session.status != expected {
    let status = session.status;
    return Transition::ignored(session, Rejection::WrongStatus { event, status });
  }
  let mut s = session;
  s.awaiting = None;
  f(s)
}

fn resolve_round(mut s: Session, mut result: ValidationResult) -> Transition {
  let challenge = s.current_challenge.clone().unwrap_or_else(|| Challenge::new("", ""));
  let answer = s.pending_answer.take().unwrap_or_default();

  if result.is_correct {
    s.score += POINTS_PER_ROUND;
    result.alternative_answer = None;
  }
  s.history.push(HistoryEntry {
    level: s.level,
    score_after: s.score,
    subject_a: challenge.subject_a,
    subject_b: challenge.subject_b,
    player_answer: answer,
    is_correct: result.is_correct,
  });

  if result.is_correct {
    s.last_feedback = Some(result);
    s.status = Status::RoundFeedback;
    let tag = s.issue_tag();
    Transition::applied(s, vec![Effect::SchedulePause { tag }])
  } else {
    s.last_feedback = Some(result);
    s.current_challenge = None;
    s.status = Status::GameOver;
    Transition::applied(s, Vec::new())
  }
}

fn advance_level(mut s: Session) -> Transition {
  s.current_challenge = None;
  s.last_feedback = None;
  if s.level >= MAX_LEVEL {
    s.status = Status::Victory;
    return Transition::applied(s, Vec::new());
  }
  s.level += 1;
  s.status = Status::LoadingChallenge;
  let fetch = s.fetch_effect();
  Transition::applied(s, vec![fetch])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn correct(msg: &str) -> ValidationResult {
    ValidationResult { is_correct: true, message: msg.into(), alternative_answer: None }
  }

  fn wrong(alt: &str) -> ValidationResult {
    ValidationResult { is_correct: false, message: "Never played for both.".into(), alternative_answer: Some(alt.into()) }
  }

  fn step(s: Session, e: Event) -> (Session, Vec<Effect>) {
    let t = apply(s, e);
    assert!(t.outcome.is_applied(), "expected applied, got {:?}", t.outcome);
    (t.session, t.effects)
  }

  fn check_invariants(s: &Session) {
    assert_eq!(s.score as usize, POINTS_PER_ROUND as usize * s.correct_rounds());
    assert!(s.level >= 1 && s.level <= MAX_LEVEL);
    if matches!(s.status, Status::Playing | Status::Validating | Status::LoadingChallenge) {
      assert_eq!(s.history.len(), s.level as usize - 1);
    }
    let has_challenge = matches!(s.status, Status::Playing | Status::Validating | Status::RoundFeedback);
    assert_eq!(s.current_challenge.is_some(), has_challenge, "challenge in {}", s.status);
    let has_feedback = matches!(s.status, Status::RoundFeedback | Status::GameOver);
    assert_eq!(s.last_feedback.is_some(), has_feedback, "feedback in {}", s.status);
  }

  fn fetch_tag(effects: &[Effect]) -> RequestTag {
    effects
      .iter()
      .find_map(|e| match e {
        Effect::FetchChallenge { tag, .. } => Some(*tag),
        _ => None,
      })
      .expect("fetch effect")
  }

  fn only_tag(effects: &[Effect]) -> RequestTag {
    match effects {
      [Effect::ValidateAnswer { tag, .. }] | [Effect::SchedulePause { tag }] | [Effect::FetchChallenge { tag, .. }] => *tag,
      other => panic!("unexpected effects {other:?}"),
    }
  }

  /// Start a run and load the first challenge.
  fn playing(a: &str, b: &str) -> Session {
    let (s, fx) = step(Session::new(), Event::Start);
    let tag = fetch_tag(&fx);
    let (s, _) = step(s, Event::ChallengeLoaded { tag, challenge: Challenge::new(a, b) });
    s
  }

  /// Play one correct round from PLAYING; returns the session after the pause (LOADING_CHALLENGE or VICTORY).
  fn win_round(s: Session) -> (Session, Vec<Effect>) {
    let (s, fx) = step(s, Event::Submit { answer: "Someone".into() });
    check_invariants(&s);
    let (s, fx) = step(s, Event::Validated { tag: only_tag(&fx), result: correct("Yes.") });
    check_invariants(&s);
    let (s, fx) = step(s, Event::PauseElapsed { tag: only_tag(&fx) });
    check_invariants(&s);
    (s, fx)
  }

  #[test]
  fn start_resets_and_fetches_level_one() {
    let t = apply(Session::new(), Event::Start);
    assert!(t.outcome.is_applied());
    assert_eq!(t.session.status, Status::LoadingChallenge);
    assert_eq!(t.session.level, 1);
    assert_eq!(t.session.score, 0);
    assert!(t.session.history.is_empty());
    assert_eq!(t.effects[0], Effect::CancelPause);
    match &t.effects[1] {
      Effect::FetchChallenge { level, avoid, .. } => {
        assert_eq!(*level, 1);
        assert!(avoid.is_empty());
      }
      other => panic!("unexpected effect {other:?}"),
    }
    check_invariants(&t.session);
  }

  #[test]
  fn correct_round_scores_and_advances_after_pause() {
    let s = playing("Real Madrid", "Manchester United");
    assert_eq!(s.status, Status::Playing);
    check_invariants(&s);

    let (s, fx) = step(s, Event::Submit { answer: "  Cristiano Ronaldo ".into() });
    assert_eq!(s.status, Status::Validating);
    match &fx[..] {
      [Effect::ValidateAnswer { challenge, answer, .. }] => {
        assert_eq!(challenge.subject_a, "Real Madrid");
        assert_eq!(answer, "Cristiano Ronaldo");
      }
      other => panic!("unexpected effects {other:?}"),
    }

    let (s, fx) = step(s, Event::Validated { tag: only_tag(&fx), result: correct("2003-2009 at United, 2009-2018 at Madrid.") });
    assert_eq!(s.status, Status::RoundFeedback);
    assert_eq!(s.score, 10);
    assert_eq!(s.history.len(), 1);
    assert!(s.history[0].is_correct);
    assert_eq!(s.history[0].player_answer, "Cristiano Ronaldo");
    assert_eq!(s.history[0].score_after, 10);
    assert_eq!(s.level, 1);
    check_invariants(&s);

    let (s, fx) = step(s, Event::PauseElapsed { tag: only_tag(&fx) });
    assert_eq!(s.status, Status::LoadingChallenge);
    assert_eq!(s.level, 2);
    match &fx[..] {
      [Effect::FetchChallenge { level, avoid, .. }] => {
        assert_eq!(*level, 2);
        assert_eq!(avoid, &vec!["Real Madrid".to_string(), "Manchester United".to_string()]);
      }
      other => panic!("unexpected effects {other:?}"),
    }

    let (s, _) = step(s, Event::ChallengeLoaded { tag: only_tag(&fx), challenge: Challenge::new("Barcelona", "Bayern Munich") });
    assert_eq!(s.status, Status::Playing);
    check_invariants(&s);
  }

  #[test]
  fn wrong_answer_ends_the_run() {
    let s = playing("Real Madrid", "Manchester United");
    let (s, fx) = step(s, Event::Submit { answer: "Lionel Messi".into() });
    let (s, fx) = step(s, Event::Validated { tag: only_tag(&fx), result: wrong("Cristiano Ronaldo") });
    assert!(fx.is_empty());
    assert_eq!(s.status, Status::GameOver);
    assert_eq!(s.score, 0);
    assert_eq!(s.history.len(), 1);
    assert!(!s.history.last().unwrap().is_correct);
    assert_eq!(s.last_feedback.as_ref().unwrap().alternative_answer.as_deref(), Some("Cristiano Ronaldo"));
    check_invariants(&s);
  }

  #[test]
  fn n_correct_rounds_accumulate_score_and_history() {
    for n in 1..=MAX_LEVEL {
      let mut s = playing("A0", "B0");
      for i in 1..=n {
        let (next, fx) = win_round(s);
        s = next;
        if i < MAX_LEVEL {
          let tag = only_tag(&fx);
          let (next, _) = step(s, Event::ChallengeLoaded { tag, challenge: Challenge::new(format!("A{i}"), format!("B{i}")) });
          s = next;
        }
      }
      assert_eq!(s.score, 10 * n);
      assert_eq!(s.history.len(), n as usize);
      assert!(s.history.iter().all(|h| h.is_correct));
      check_invariants(&s);
    }
  }

  #[test]
  fn correct_answer_at_level_ten_is_victory() {
    let mut s = playing("A0", "B0");
    for i in 1..MAX_LEVEL {
      let (next, fx) = win_round(s);
      let (next, _) = step(next, Event::ChallengeLoaded { tag: only_tag(&fx), challenge: Challenge::new(format!("A{i}"), format!("B{i}")) });
      s = next;
    }
    assert_eq!(s.level, MAX_LEVEL);
    let (s, fx) = win_round(s);
    assert!(fx.is_empty());
    assert_eq!(s.status, Status::Victory);
    assert_eq!(s.level, MAX_LEVEL);
    assert_eq!(s.score, 100);
  }

  #[test]
  fn wrong_answer_at_later_level_still_ends_the_run() {
    let s = playing("A0", "B0");
    let (s, fx) = win_round(s);
    let (s, _) = step(s, Event::ChallengeLoaded { tag: only_tag(&fx), challenge: Challenge::new("A1", "B1") });
    let (s, fx) = step(s, Event::Submit { answer: "Nobody".into() });
    let (s, _) = step(s, Event::Validated { tag: only_tag(&fx), result: wrong("Somebody") });
    assert_eq!(s.status, Status::GameOver);
    assert_eq!(s.score, 10);
    assert_eq!(s.history.len(), 2);
    assert!(!s.history[1].is_correct);
    assert_eq!(s.history[1].score_after, 10);
  }

  #[test]
  fn restart_from_terminal_states_resets_everything() {
    let s = playing("Real Madrid", "Manchester United");
    let (s, fx) = step(s, Event::Submit { answer: "Lionel Messi".into() });
    let (over, _) = step(s, Event::Validated { tag: only_tag(&fx), result: wrong("Cristiano Ronaldo") });

    let t = apply(over.clone(), Event::Start);
    assert!(t.outcome.is_applied());
    assert_eq!(t.session.status, Status::LoadingChallenge);
    assert_eq!(t.session.score, 0);
    assert_eq!(t.session.level, 1);
    assert!(t.session.history.is_empty());
    assert!(t.session.last_feedback.is_none());
    assert!(t.session.awaiting().unwrap() > over.last_tag);
    assert!(matches!(t.effects.last(), Some(Effect::FetchChallenge { level: 1, .. })));
  }

  #[test]
  fn restart_from_victory_resets_everything() {
    let mut s = playing("A0", "B0");
    for i in 1..MAX_LEVEL {
      let (next, fx) = win_round(s);
      let (next, _) = step(next, Event::ChallengeLoaded { tag: only_tag(&fx), challenge: Challenge::new(format!("A{i}"), format!("B{i}")) });
      s = next;
    }
    let (won, _) = win_round(s);
    assert_eq!(won.status, Status::Victory);
    assert_eq!(won.score, 100);

    let t = apply(won.clone(), Event::Start);
    assert!(t.outcome.is_applied());
    assert_eq!(t.session.status, Status::LoadingChallenge);
    assert_eq!(t.session.score, 0);
    assert_eq!(t.session.level, 1);
    assert!(t.session.history.is_empty());
    assert!(t.session.current_challenge.is_none());
    match &t.effects[..] {
      [Effect::CancelPause, Effect::FetchChallenge { level: 1, avoid, tag }] => {
        assert!(avoid.is_empty());
        assert!(*tag > won.last_tag);
      }
      other => panic!("unexpected effects {other:?}"),
    }
    check_invariants(&t.session);
  }

  #[test]
  fn submit_outside_playing_has_no_effect() {
    let (loading, _) = step(Session::new(), Event::Start);
    let t = apply(loading.clone(), Event::Submit { answer: "Kaká".into() });
    assert_eq!(t.outcome, Outcome::Ignored(Rejection::WrongStatus { event: "submit", status: Status::LoadingChallenge }));
    assert_eq!(t.session, loading);
    assert!(t.effects.is_empty());

    let s = playing("A", "B");
    let (validating, fx) = step(s, Event::Submit { answer: "X".into() });
    let t = apply(validating.clone(), Event::Submit { answer: "Y".into() });
    assert!(!t.outcome.is_applied());
    assert_eq!(t.session, validating);

    let (feedback, _) = step(validating, Event::Validated { tag: only_tag(&fx), result: correct("ok") });
    let t = apply(feedback.clone(), Event::Submit { answer: "Z".into() });
    assert!(!t.outcome.is_applied());
    assert_eq!(t.session, feedback);
  }

  #[test]
  fn blank_answer_is_rejected() {
    let s = playing("A", "B");
    let t = apply(s.clone(), Event::Submit { answer: "   ".into() });
    assert_eq!(t.outcome, Outcome::Ignored(Rejection::EmptyAnswer));
    assert_eq!(t.session, s);
  }

  #[test]
  fn stale_responses_are_ignored() {
    let (s, fx) = step(Session::new(), Event::Start);
    let old = fetch_tag(&fx);
    let (s, _) = step(s, Event::ChallengeLoaded { tag: old, challenge: Challenge::new("A", "B") });

    // Duplicate delivery of the same response.
    let t = apply(s.clone(), Event::ChallengeLoaded { tag: old, challenge: Challenge::new("C", "D") });
    assert_eq!(t.outcome, Outcome::Ignored(Rejection::Stale { event: "challenge_loaded" }));
    assert_eq!(t.session, s);

    // A verdict from a previous run arriving after a restart.
    let (s, fx) = step(s, Event::Submit { answer: "X".into() });
    let validation_tag = only_tag(&fx);
    let (over, _) = step(s, Event::Validated { tag: validation_tag, result: wrong("Y") });
    let (restarted, _) = step(over, Event::Start);
    let t = apply(restarted.clone(), Event::Validated { tag: validation_tag, result: correct("late") });
    assert!(!t.outcome.is_applied());
    assert_eq!(t.session, restarted);
  }

  #[test]
  fn stale_pause_cannot_advance_a_restarted_run() {
    let s = playing("A", "B");
    let (s, fx) = step(s, Event::Submit { answer: "X".into() });
    let (s, fx) = step(s, Event::Validated { tag: only_tag(&fx), result: correct("ok") });
    let pause = only_tag(&fx);
    let (s, _) = step(s, Event::PauseElapsed { tag: pause });
    let t = apply(s.clone(), Event::PauseElapsed { tag: pause });
    assert!(!t.outcome.is_applied());
    assert_eq!(t.session.level, 2);
  }

  #[test]
  fn fetch_failure_surfaces_error_and_retry_refetches_same_level() {
    let mut s = playing("A0", "B0");
    let mut fx = Vec::new();
    for i in 1..=2 {
      let (next, f) = win_round(s);
      s = next;
      fx = f;
      if i < 2 {
        let (next, _) = step(s, Event::ChallengeLoaded { tag: only_tag(&fx), challenge: Challenge::new("A1", "B1") });
        s = next;
      }
    }
    assert_eq!(s.level, 3);
    let before = (s.level, s.score, s.history.clone());

    let (s, none) = step(s, Event::ChallengeFailed { tag: only_tag(&fx), error: "timeout".into() });
    assert!(none.is_empty());
    assert_eq!(s.status, Status::LoadingError);
    assert_eq!(s.error.as_deref(), Some("Failed to load level 3. Please try again."));
    assert_eq!((s.level, s.score, s.history.clone()), before);
    check_invariants(&s);

    let (s, fx) = step(s, Event::Retry);
    assert_eq!(s.status, Status::LoadingChallenge);
    assert!(s.error.is_none());
    match &fx[..] {
      [Effect::FetchChallenge { level: 3, avoid, .. }] => assert_eq!(avoid.len(), 4),
      other => panic!("unexpected effects {other:?}"),
    }
  }

  #[test]
  fn validation_failure_returns_to_playing_without_resolving() {
    let s = playing("A", "B");
    let (s, fx) = step(s, Event::Submit { answer: "X".into() });
    let (s, none) = step(s, Event::ValidationFailed { tag: only_tag(&fx), error: "HTTP 503".into() });
    assert!(none.is_empty());
    assert_eq!(s.status, Status::Playing);
    assert!(s.history.is_empty());
    assert!(s.error.is_some());
    assert!(s.pending_answer().is_none());
    check_invariants(&s);

    let (s, _) = step(s, Event::DismissError);
    assert!(s.error.is_none());
    let t = apply(s, Event::DismissError);
    assert_eq!(t.outcome, Outcome::Ignored(Rejection::NothingToDismiss));
  }

  #[test]
  fn resubmitting_after_validation_failure_clears_the_banner() {
    let s = playing("Real Madrid", "Manchester United");
    let (s, fx) = step(s, Event::Submit { answer: "Kaká".into() });
    let (s, _) = step(s, Event::ValidationFailed { tag: only_tag(&fx), error: "timeout".into() });
    assert!(s.error.is_some());

    let (s, fx) = step(s, Event::Submit { answer: "Lionel Messi".into() });
    assert_eq!(s.status, Status::Validating);
    assert!(s.error.is_none());

    let (s, _) = step(s, Event::Validated { tag: only_tag(&fx), result: wrong("Cristiano Ronaldo") });
    assert_eq!(s.status, Status::GameOver);
    assert!(s.error.is_none());
    assert_eq!(s.history.len(), 1);
  }

  #[test]
  fn correct_verdict_drops_alternative_answer() {
    let s = playing("A", "B");
    let (s, fx) = step(s, Event::Submit { answer: "X".into() });
    let verdict = ValidationResult { is_correct: true, message: "yes".into(), alternative_answer: Some("Y".into()) };
    let (s, _) = step(s, Event::Validated { tag: only_tag(&fx), result: verdict });
    assert_eq!(s.last_feedback.unwrap().alternative_answer, None);
  }

  #[test]
  fn start_is_ignored_mid_run() {
    let s = playing("A", "B");
    let t = apply(s.clone(), Event::Start);
    assert!(!t.outcome.is_applied());
    assert_eq!(t.session, s);
  }

  #[test]
  fn used_subjects_are_deduplicated_in_order() {
    let mut s = Session::new();
    for (a, b) in [("Ajax", "Everton"), ("Everton", "Benfica")] {
      s.history.push(HistoryEntry {
        level: 1,
        score_after: 0,
        subject_a: a.into(),
        subject_b: b.into(),
        player_answer: "x".into(),
        is_correct: true,
      });
    }
    assert_eq!(s.used_subjects(), vec!["Ajax", "Everton", "Benfica"]);
  }
}
