//! Effect runner: owns one `Session`, executes the effects its transitions request,
//! and feeds the results back as events.
//!
//! One tokio task per session. Player intents arrive over a command channel and are
//! answered with the post-transition view; gateway results and the pause timer come
//! back over an internal channel. Views are published on a `watch` channel.
//!
//! The runner stops once every `SessionHandle` is dropped, aborting any in-flight
//! gateway call and the pending pause.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::error::SessionClosed;
use crate::gateway::Gateway;
use crate::session::{self, Effect, Event, Outcome, Session, Transition};
use crate::view::{render, SessionView};

/// What a player (or UI) can ask for. Everything else is driven by the runner.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
  /// Start a run, or restart from game over / victory / load error.
  Start,
  Submit { answer: String },
  Retry,
  DismissError,
}

impl From<Intent> for Event {
  fn from(intent: Intent) -> Self {
    match intent {
      Intent::Start => Event::Start,
      Intent::Submit { answer } => Event::Submit { answer },
      Intent::Retry => Event::Retry,
      Intent::DismissError => Event::DismissError,
    }
  }
}

/// Result of dispatching an intent.
#[derive(Clone, Debug)]
pub struct Dispatched {
  pub outcome: Outcome,
  pub view: SessionView,
}

struct Command {
  intent: Intent,
  reply: oneshot::Sender<Dispatched>,
}

/// Cheap, cloneable handle to a running session.
#[derive(Clone)]
pub struct SessionHandle {
  id: Uuid,
  commands: mpsc::UnboundedSender<Command>,
  views: watch::Receiver<SessionView>,
}

impl SessionHandle {
  /// Create a session on the start screen and spawn its runner.
  pub fn spawn(gateway: Arc<dyn Gateway>, pause: Duration) -> Self {
    let id = Uuid::new_v4();
    let session = Session::new();
    let (views_tx, views_rx) = watch::channel(render(&session));
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (results_tx, results_rx) = mpsc::unbounded_channel();

    let runner = Runner {
      id,
      session,
      gateway,
      pause,
      results: results_tx,
      views: views_tx,
      in_flight: None,
      pause_task: None,
    };
    tokio::spawn(runner.run(cmd_rx, results_rx));
    info!(target: "session", session_id = %id, "Session created");

    Self { id, commands: cmd_tx, views: views_rx }
  }

  pub fn id(&self) -> Uuid {
    self.id
  }

  /// Latest published view.
  pub fn view(&self) -> SessionView {
    self.views.borrow().clone()
  }

  /// Receiver notified on every applied transition.
  pub fn subscribe(&self) -> watch::Receiver<SessionView> {
    self.views.clone()
  }

  /// Apply an intent and wait for the resulting view.
  pub async fn dispatch(&self, intent: Intent) -> Result<Dispatched, SessionClosed> {
    let (reply, rx) = oneshot::channel();
    self
      .commands
      .send(Command { intent, reply })
      .map_err(|_| SessionClosed(self.id))?;
    rx.await.map_err(|_| SessionClosed(self.id))
  }
}

struct Runner {
  id: Uuid,
  session: Session,
  gateway: Arc<dyn Gateway>,
  pause: Duration,
  results: mpsc::UnboundedSender<Event>,
  views: watch::Sender<SessionView>,
  in_flight: Option<JoinHandle<()>>,
  pause_task: Option<JoinHandle<()>>,
}

impl Runner {
  #[instrument(level = "info", skip_all, fields(session_id = %self.id))]
  async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>, mut results: mpsc::UnboundedReceiver<Event>) {
    loop {
      tokio::select! {
        cmd = commands.recv() => match cmd {
          Some(Command { intent, reply }) => {
            let outcome = self.handle(intent.into());
            let _ = reply.send(Dispatched { outcome, view: self.views.borrow().clone() });
          }
          None => break,
        },
        Some(event) = results.recv() => {
          self.handle(event);
        }
      }
    }
    self.shutdown();
  }

  fn handle(&mut self, event: Event) -> Outcome {
    let kind = event.kind();
    let from = self.session.status;
    let Transition { session: next, effects, outcome } = session::apply(std::mem::take(&mut self.session), event);
    self.session = next;

    match &outcome {
      Outcome::Applied => {
        info!(target: "session", session_id = %self.id, event = kind, %from, to = %self.session.status, level = self.session.level, score = self.session.score, "Transition applied");
        for effect in effects {
          self.run_effect(effect);
        }
        self.views.send_replace(render(&self.session));
      }
      Outcome::Ignored(reason) => {
        debug!(target: "session", session_id = %self.id, event = kind, status = %from, %reason, "Event ignored");
      }
    }
    outcome
  }

  fn run_effect(&mut self, effect: Effect) {
    match effect {
      Effect::FetchChallenge { tag, level, avoid } => {
        let gateway = self.gateway.clone();
        let results = self.results.clone();
        let id = self.id;
        self.replace_in_flight(tokio::spawn(async move {
          let event = match gateway.request_challenge(level, &avoid).await {
            Ok(challenge) => Event::ChallengeLoaded { tag, challenge },
            Err(e) => {
              warn!(target: "session", session_id = %id, %level, error = %e, "Challenge fetch failed");
              Event::ChallengeFailed { tag, error: e.to_string() }
            }
          };
          let _ = results.send(event);
        }));
      }
      Effect::ValidateAnswer { tag, challenge, answer } => {
        let gateway = self.gateway.clone();
        let results = self.results.clone();
        let id = self.id;
        self.replace_in_flight(tokio::spawn(async move {
          let event = match gateway.validate_answer(&challenge.subject_a, &challenge.subject_b, &answer).await {
            Ok(result) => Event::Validated { tag, result },
            Err(e) => {
              warn!(target: "session", session_id = %id, error = %e, "Answer validation failed");
              Event::ValidationFailed { tag, error: e.to_string() }
            }
          };
          let _ = results.send(event);
        }));
      }
      Effect::SchedulePause { tag } => {
        let results = self.results.clone();
        let pause = self.pause;
        self.cancel_pause();
        self.pause_task = Some(tokio::spawn(async move {
          tokio::time::sleep(pause).await;
          let _ = results.send(Event::PauseElapsed { tag });
        }));
      }
      Effect::CancelPause => self.cancel_pause(),
    }
  }

  /// Only one request is ever outstanding; a finished or superseded one is simply dropped.
  fn replace_in_flight(&mut self, task: JoinHandle<()>) {
    if let Some(prev) = self.in_flight.replace(task) {
      prev.abort();
    }
  }

  fn cancel_pause(&mut self) {
    if let Some(task) = self.pause_task.take() {
      task.abort();
    }
  }

  fn shutdown(&mut self) {
    self.cancel_pause();
    if let Some(task) = self.in_flight.take() {
      task.abort();
    }
    info!(target: "session", session_id = %self.id, status = %self.session.status, score = self.session.score, "Session closed");
  }
}
