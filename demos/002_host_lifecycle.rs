//! Host lifecycle.
//!
//! Demonstrates:
//! - Base address validation and error reports
//! - Genuine-load detection and the double-setup guard
//! - Re-published public events
//!
//! Usage:
//!   cargo run --example 002_host_lifecycle
//!   cargo run --example 002_host_lifecycle -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use common::Args;
use corti_embedded::transport::{FrameElement, LocalFrame, LocalWindow};
use corti_embedded::{EmbedHost, event_callback};

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
    println!("=== 002: Host Lifecycle ===\n");

    let window = Arc::new(LocalWindow::new());
    let host = EmbedHost::builder()
        .base_address("https://assistant.eu.corti.app")
        .ready_timeout(Duration::from_secs(5))
        .on_ready(|| println!("    → ready"))
        .on_error(|report| println!("    → error: {report}"))
        .build(window.clone())?;

    host.on(
        "recording-started",
        event_callback(|_| println!("    → recording-started")),
    );

    // ========================================================================
    // Frame load
    // ========================================================================

    println!("[1] Attach frame...");
    let (frame, outbox) = LocalFrame::new("about:blank");
    host.attach_frame(frame.clone());
    println!("    src: {:?}", frame.src());

    let created = host.handle_frame_load(frame.clone())?;
    let repeated = host.handle_frame_load(frame.clone())?;
    println!("    ✓ Bridge created: {created}, second load: {repeated}\n");

    common::simulate_assistant(window, frame.clone(), outbox);

    // ========================================================================
    // Commands
    // ========================================================================

    println!("[2] Start recording...");
    host.start_recording().await?;
    tokio::task::yield_now().await;
    println!("    ✓ Done\n");

    // ========================================================================
    // Invalid base address
    // ========================================================================

    println!("[3] Switch to an untrusted address...");
    if host.set_base_address("https://example.com").is_err() {
        println!("    src: {:?}", frame.src());
        println!("    status: {:?}\n", host.status());
    }

    host.destroy();
    println!("=== Done ===");
    Ok(())
}
