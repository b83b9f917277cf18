#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use career_link::bank::{BankEntry, LocalBank};
use career_link::config::{GameSettings, GatewayMode};
use career_link::gateway::{wrap_for_mode, Gateway};
use career_link::routes::build_router;
use career_link::state::AppState;

pub fn test_bank() -> LocalBank {
    LocalBank::new(vec![
        BankEntry::new(1, "Real Madrid", "Manchester United", &["Cristiano Ronaldo", "David Beckham"]),
        BankEntry::new(3, "Arsenal", "Borussia Dortmund", &["Pierre-Emerick Aubameyang"]),
    ])
}

pub fn settings(mode: GatewayMode, pause_ms: u64) -> GameSettings {
    GameSettings { gateway_mode: mode, feedback_pause_ms: pause_ms, ..GameSettings::default() }
}

pub fn create_test_app_with(gateway: Arc<dyn Gateway>, mode: GatewayMode, pause_ms: u64) -> Router {
    let gateway = wrap_for_mode(gateway, mode);
    let state = Arc::new(AppState::with_gateway(settings(mode, pause_ms), gateway));
    build_router(state)
}

pub fn create_test_app(pause_ms: u64) -> Router {
    create_test_app_with(Arc::new(test_bank()), GatewayMode::Fallback, pause_ms)
}

pub async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))
    };
    (status, json)
}

pub async fn create_session(app: &Router) -> String {
    let (status, json) = call(app, "POST", "/api/v1/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

/// Poll the session until its status matches, or panic after a few seconds.
pub async fn wait_for_status(app: &Router, id: &str, status: &str) -> Value {
    let uri = format!("/api/v1/sessions/{id}");
    for _ in 0..500 {
        let (_, json) = call(app, "GET", &uri, None).await;
        if json["view"]["status"] == status {
            return json["view"].clone();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("session {id} never reached {status}");
}
