//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::ChartPoint;
use crate::runner::{Dispatched, Intent};
use crate::session::Outcome;
use crate::view::SessionView;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    Start,
    Restart,
    SubmitAnswer { answer: String },
    Retry,
    DismissError,
}

impl ClientWsMessage {
    /// Wire name of the message type, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientWsMessage::Ping => "ping",
            ClientWsMessage::Start => "start",
            ClientWsMessage::Restart => "restart",
            ClientWsMessage::SubmitAnswer { .. } => "submit_answer",
            ClientWsMessage::Retry => "retry",
            ClientWsMessage::DismissError => "dismiss_error",
        }
    }

    /// Length of the carried answer, if any. Answer text itself is never logged.
    pub fn answer_len(&self) -> Option<usize> {
        match self {
            ClientWsMessage::SubmitAnswer { answer } => Some(answer.len()),
            _ => None,
        }
    }

    /// Game intent carried by this message, if any.
    pub fn intent(self) -> Option<Intent> {
        match self {
            ClientWsMessage::Ping => None,
            ClientWsMessage::Start | ClientWsMessage::Restart => Some(Intent::Start),
            ClientWsMessage::SubmitAnswer { answer } => Some(Intent::Submit { answer }),
            ClientWsMessage::Retry => Some(Intent::Retry),
            ClientWsMessage::DismissError => Some(Intent::DismissError),
        }
    }
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    State { view: SessionView },
    Rejected { reason: String },
    Error { message: String },
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct SessionOut {
    pub id: Uuid,
    pub view: SessionView,
}

#[derive(Deserialize)]
pub struct AnswerIn {
    pub answer: String,
}

/// Response to any command endpoint.
#[derive(Serialize)]
pub struct CommandOut {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
    pub view: SessionView,
}

impl From<Dispatched> for CommandOut {
    fn from(d: Dispatched) -> Self {
        let rejection = match &d.outcome {
            Outcome::Applied => None,
            Outcome::Ignored(reason) => Some(reason.to_string()),
        };
        Self { accepted: d.outcome.is_applied(), rejection, view: d.view }
    }
}

#[derive(Serialize)]
pub struct ChartOut {
    pub points: Vec<ChartPoint>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub gateway: &'static str,
    pub mode: &'static str,
    pub sessions: usize,
}
