//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - A simulated embedded application

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use corti_embedded::transport::{LocalFrame, LocalWindow, PostedMessage};

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self {
            debug: args.iter().any(|a| a == "--debug"),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "corti_embedded=trace"
    } else {
        "corti_embedded=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Plays the embedded application behind `frame`.
///
/// Signals `ready`, then answers each command with a canned payload and
/// emits the event a real application would follow it with.
pub fn simulate_assistant(
    window: Arc<LocalWindow>,
    frame: Arc<LocalFrame>,
    mut outbox: mpsc::UnboundedReceiver<PostedMessage>,
) {
    window.dispatch(frame.message(json!({
        "type": "CORTI_EMBEDDED_EVENT",
        "version": "v1",
        "event": "ready"
    })));

    tokio::spawn(async move {
        while let Some(posted) = outbox.recv().await {
            let action = posted.message["action"].as_str().unwrap_or_default().to_string();
            let (payload, event) = reply_for(&action, &posted.message["payload"]);

            window.dispatch(frame.message(json!({
                "type": "CORTI_EMBEDDED_RESPONSE",
                "version": "v1",
                "action": action,
                "requestId": posted.message["requestId"],
                "success": true,
                "payload": payload
            })));

            if let Some((name, payload)) = event {
                window.dispatch(frame.message(json!({
                    "type": "CORTI_EMBEDDED_EVENT",
                    "version": "v1",
                    "event": name,
                    "payload": payload
                })));
            }
        }
    });
}

fn reply_for(action: &str, request: &Value) -> (Value, Option<(&'static str, Value)>) {
    match action {
        "auth" => (
            json!({ "user": { "id": "user-1", "email": "clinician@example.com" } }),
            Some(("authChanged", json!({ "user": { "id": "user-1" } }))),
        ),
        "navigate" => (
            Value::Null,
            Some(("navigationChanged", json!({ "path": request["path"] }))),
        ),
        "startRecording" => (Value::Null, Some(("recordingStarted", Value::Null))),
        "stopRecording" => (Value::Null, Some(("recordingStopped", Value::Null))),
        "getStatus" => (
            json!({
                "auth": { "isAuthenticated": true },
                "currentUrl": "https://assistant.eu.corti.app/session/demo",
                "interaction": null
            }),
            None,
        ),
        _ => (Value::Null, None),
    }
}
