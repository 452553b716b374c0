//! Correlation benchmark suite.
//!
//! Measures the command path over the in-process transport:
//! - Single round trip (send, echo, resolve)
//! - Concurrent round trips: 10, 100 in flight
//! - Inbound classification and base address validation
//!
//! Run with: cargo bench --bench correlation
//! Results saved to: target/criterion/

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use futures_util::future::join_all;
use serde_json::json;
use tokio::runtime::Runtime;

use corti_embedded::origin::TrustedOrigin;
use corti_embedded::protocol::InboundEnvelope;
use corti_embedded::transport::{LocalFrame, LocalWindow};
use corti_embedded::{Bridge, Command};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const EMBED_ADDRESS: &str = "https://assistant.eu.corti.app/embedded";
const IN_FLIGHT: &[usize] = &[10, 100];

// ============================================================================
// Setup
// ============================================================================

/// Creates a ready bridge whose frame echoes every command as a success.
fn ready_bridge(rt: &Runtime) -> Bridge {
    rt.block_on(async {
        let window = Arc::new(LocalWindow::new());
        let (frame, mut outbox) = LocalFrame::new(EMBED_ADDRESS);
        let bridge = Bridge::new(frame.clone(), window.clone());

        let remote_window = Arc::clone(&window);
        let remote_frame = Arc::clone(&frame);
        tokio::spawn(async move {
            while let Some(posted) = outbox.recv().await {
                remote_window.dispatch(remote_frame.message(json!({
                    "type": "CORTI_EMBEDDED_RESPONSE",
                    "version": "v1",
                    "action": posted.message["action"],
                    "requestId": posted.message["requestId"],
                    "success": true,
                    "payload": { "ok": true }
                })));
            }
        });

        window.dispatch(frame.message(json!({ "type": "CORTI_EMBEDDED_EVENT", "event": "ready" })));
        bridge.wait_for_ready().await.expect("bridge ready");
        bridge
    })
}

// ============================================================================
// Benchmark: Round Trip
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let bridge = ready_bridge(&rt);

    c.bench_function("round_trip", |b| {
        b.to_async(&rt).iter(|| async {
            bridge.send(Command::GetStatus {}).await.unwrap();
        });
    });

    let mut group = c.benchmark_group("concurrent_round_trips");
    for &count in IN_FLIGHT {
        group.bench_with_input(BenchmarkId::new("in_flight", count), &count, |b, &n| {
            b.to_async(&rt).iter(|| async {
                let calls = (0..n).map(|_| bridge.send(Command::StartRecording {}));
                for result in join_all(calls).await {
                    result.unwrap();
                }
            });
        });
    }
    group.finish();

    bridge.destroy();
}

// ============================================================================
// Benchmark: Message Handling
// ============================================================================

fn bench_message_handling(c: &mut Criterion) {
    let response = json!({
        "type": "CORTI_EMBEDDED_RESPONSE",
        "requestId": "req_0123456789abcdef",
        "success": true,
        "payload": { "auth": { "isAuthenticated": true }, "currentUrl": EMBED_ADDRESS }
    });
    let event = json!({
        "type": "CORTI_EMBEDDED_EVENT",
        "event": "documentUpdated",
        "payload": { "document": { "id": "doc-1" } }
    });

    c.bench_function("classify_response", |b| {
        b.iter(|| InboundEnvelope::parse(std::hint::black_box(&response)));
    });
    c.bench_function("classify_event", |b| {
        b.iter(|| InboundEnvelope::parse(std::hint::black_box(&event)));
    });
    c.bench_function("validate_base_address", |b| {
        b.iter(|| TrustedOrigin::validate(std::hint::black_box("https://assistant.us.corti.app/")));
    });
}

criterion_group!(benches, bench_round_trip, bench_message_handling);
criterion_main!(benches);
