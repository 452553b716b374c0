//! Bridge command round trips.
//!
//! Demonstrates:
//! - Creating a bridge over the in-process transport
//! - Waiting for readiness
//! - Typed commands and event subscriptions
//!
//! Usage:
//!   cargo run --example 001_bridge_round_trip
//!   cargo run --example 001_bridge_round_trip -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use futures_util::StreamExt;

use common::Args;
use corti_embedded::transport::{LocalFrame, LocalWindow};
use corti_embedded::{AuthMode, AuthPayload, Bridge, event_callback};

// ============================================================================
// Constants
// ============================================================================

const EMBED_ADDRESS: &str = "https://assistant.eu.corti.app/embedded";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    println!("=== 001: Bridge Round Trip ===\n");

    // ========================================================================
    // Setup
    // ========================================================================

    println!("[Setup] Creating bridge...");

    let window = Arc::new(LocalWindow::new());
    let (frame, outbox) = LocalFrame::new(EMBED_ADDRESS);
    let bridge = Bridge::new(frame.clone(), window.clone());

    bridge.on(
        "navigationChanged",
        event_callback(|payload| println!("    → navigationChanged {payload:?}")),
    );
    let mut recording = bridge.subscribe("recordingStarted");

    common::simulate_assistant(window, frame, outbox);
    bridge.wait_for_ready().await?;
    println!("        ✓ Ready\n");

    // ========================================================================
    // Authenticate
    // ========================================================================

    println!("[1] Authenticate...");
    let user = bridge
        .authenticate(AuthPayload::bearer("demo-token", AuthMode::Stateless))
        .await?;
    println!("    ✓ Signed in as {}", user.email);
    println!("    Ready after auth: {}\n", bridge.is_ready());

    // ========================================================================
    // Commands
    // ========================================================================

    println!("[2] Navigate and record...");
    bridge.navigate_to("/session/demo").await?;
    bridge.start_recording().await?;
    recording.next().await;
    println!("    ✓ Recording started");

    let status = bridge.get_status().await?;
    println!("    Current URL: {}\n", status.current_url);

    bridge.destroy();
    println!("=== Done ===");
    Ok(())
}
