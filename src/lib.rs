//! Career Link · football trivia backend.
//!
//! The player is shown two clubs and must name a player who played for both. A remote
//! model (or the offline bank) generates challenges and judges answers; this crate owns
//! the session state machine, the effect runner around it, and the HTTP/WebSocket surface.

pub mod bank;
pub mod chart;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod openai;
pub mod protocol;
pub mod routes;
pub mod runner;
pub mod seeds;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod util;
pub mod view;
