//! Request/response correlation and readiness gate.
//!
//! # Listener
//!
//! Each bridge owns one transport subscription drained by one spawned
//! task, so inbound messages are handled strictly in delivery order.
//! Every message must come from the trusted origin AND from the frame's
//! own content window; anything else is dropped without a trace above
//! `trace` level.
//!
//! # Correlation
//!
//! A command registers a oneshot sender under its request ID before it is
//! posted. Whoever removes that entry first (the matching response or the
//! caller's timeout) decides the outcome; the other side finds nothing.
//!
//! A successful `auth` response clears readiness on the listener, before
//! the caller is woken, so a `ready` that follows it in delivery order is
//! never lost.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, RequestId};
use crate::origin::resolve_origin;
use crate::protocol::{ActionName, Command, CommandEnvelope, CommandResponse, InboundEnvelope};
use crate::transport::{ContentWindow, FrameElement, MessageEvent, MessageTarget};

use super::dispatcher::{EventCallback, EventDispatcher, EventForwarder, EventStream};
use super::options::BridgeOptions;

// ============================================================================
// Types
// ============================================================================

/// A command awaiting its response.
struct PendingCommand {
    action: ActionName,
    tx: oneshot::Sender<Result<CommandResponse>>,
}

/// Map of request IDs to outstanding commands.
type CorrelationMap = FxHashMap<RequestId, PendingCommand>;

/// Mutable bookkeeping, touched by the listener and by API calls.
#[derive(Default)]
struct BridgeState {
    /// Active transport subscription; `None` once torn down.
    subscription: Option<ListenerId>,
    /// Outstanding commands.
    pending: CorrelationMap,
    /// Listener task.
    listener: Option<JoinHandle<()>>,
}

/// Shared bridge internals.
struct BridgeInner {
    frame: Arc<dyn FrameElement>,
    target: Arc<dyn MessageTarget>,
    options: BridgeOptions,
    state: Mutex<BridgeState>,
    ready: watch::Sender<bool>,
    events: EventDispatcher,
}

// ============================================================================
// Bridge
// ============================================================================

/// Typed command channel to one embedded frame.
///
/// Cheap to clone; all clones share one subscription. Tear down with
/// [`Bridge::destroy`], or let the last clone drop.
///
/// # Example
///
/// ```ignore
/// let bridge = Bridge::new(frame, window);
/// bridge.wait_for_ready().await?;
/// let status = bridge.get_status().await?;
/// bridge.destroy();
/// ```
#[derive(Clone)]
pub struct Bridge {
    inner: Arc<BridgeInner>,
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Bridge")
            .field("active", &state.subscription.is_some())
            .field("pending", &state.pending.len())
            .field("ready", &*self.inner.ready.borrow())
            .finish_non_exhaustive()
    }
}

impl Bridge {
    /// Creates a bridge with default timeouts.
    ///
    /// Subscribes to `target` immediately and spawns the listener task, so
    /// it must be called inside a tokio runtime.
    #[must_use]
    pub fn new(frame: Arc<dyn FrameElement>, target: Arc<dyn MessageTarget>) -> Self {
        Self::with_options(frame, target, BridgeOptions::default())
    }

    /// Creates a bridge with custom timeouts.
    #[must_use]
    pub fn with_options(
        frame: Arc<dyn FrameElement>,
        target: Arc<dyn MessageTarget>,
        options: BridgeOptions,
    ) -> Self {
        let (listener_id, inbound) = target.add_listener();
        let (ready, _) = watch::channel(false);

        let inner = Arc::new(BridgeInner {
            frame,
            target,
            options,
            state: Mutex::new(BridgeState {
                subscription: Some(listener_id),
                ..Default::default()
            }),
            ready,
            events: EventDispatcher::new(),
        });

        let task = tokio::spawn(Self::run_listener(Arc::downgrade(&inner), inbound));
        inner.state.lock().listener = Some(task);

        debug!(%listener_id, "Bridge subscribed");

        Self { inner }
    }

    /// Drains the subscription until it closes or the bridge is gone.
    async fn run_listener(
        inner: Weak<BridgeInner>,
        mut inbound: mpsc::UnboundedReceiver<MessageEvent>,
    ) {
        while let Some(message) = inbound.recv().await {
            let Some(inner) = inner.upgrade() else {
                break;
            };
            inner.handle_incoming(message);
        }

        trace!("Bridge listener terminated");
    }
}

// ============================================================================
// Bridge - Commands
// ============================================================================

impl Bridge {
    /// Sends a command with the default response timeout.
    ///
    /// # Errors
    ///
    /// See [`Bridge::send_with_timeout`].
    pub async fn send(&self, command: Command) -> Result<CommandResponse> {
        self.send_with_timeout(command, self.inner.options.request_timeout)
            .await
    }

    /// Sends a command and waits for its response.
    ///
    /// Waits for readiness first; the command never reaches the frame
    /// before the frame has signaled it is ready.
    ///
    /// # Errors
    ///
    /// - [`Error::NotReady`] if the bridge is torn down or the frame has no
    ///   content window
    /// - [`Error::ReadyTimeout`] if readiness is not observed in time
    /// - [`Error::OriginUnresolvable`] if the frame `src` yields no origin
    /// - [`Error::Transport`] if the host refuses the message
    /// - [`Error::RequestTimeout`] if no response arrives in time
    /// - [`Error::RemoteFailure`] if the embedded side reports failure
    pub async fn send_with_timeout(
        &self,
        command: Command,
        request_timeout: Duration,
    ) -> Result<CommandResponse> {
        self.inner.live_window()?;

        self.wait_for_ready_with_timeout(self.inner.options.ready_timeout)
            .await?;

        let window = self.inner.live_window()?;
        let envelope = CommandEnvelope::new(command);
        let request_id = envelope.request_id.clone();
        let action = envelope.action();

        let (response_tx, response_rx) = oneshot::channel();
        let deadline = Instant::now().checked_add(request_timeout);
        {
            let mut state = self.inner.state.lock();
            if state.subscription.is_none() {
                return Err(Error::NotReady);
            }
            state.pending.insert(
                request_id.clone(),
                PendingCommand {
                    action,
                    tx: response_tx,
                },
            );
        }

        if let Err(e) = self.inner.post(window.as_ref(), &envelope) {
            self.inner.forget(&request_id);
            return Err(e);
        }

        trace!(%request_id, %action, "Command sent");

        // A cleared entry (teardown) leaves the caller on its own deadline.
        let wait = async {
            match response_rx.await {
                Ok(result) => result,
                Err(_) => future::pending().await,
            }
        };
        let response = match deadline {
            Some(deadline) => timeout_at(deadline, wait).await,
            None => Ok(wait.await),
        };

        match response {
            Ok(result) => result,
            Err(_) => {
                self.inner.forget(&request_id);
                debug!(%request_id, %action, "Command timed out");
                Err(Error::request_timeout(
                    request_id,
                    request_timeout.as_millis() as u64,
                ))
            }
        }
    }

    /// Returns the number of commands awaiting a response.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }
}

// ============================================================================
// Bridge - Readiness
// ============================================================================

impl Bridge {
    /// Waits for readiness with the configured timeout.
    ///
    /// # Errors
    ///
    /// See [`Bridge::wait_for_ready_with_timeout`].
    pub async fn wait_for_ready(&self) -> Result<()> {
        self.wait_for_ready_with_timeout(self.inner.options.ready_timeout)
            .await
    }

    /// Resolves once the frame has signaled `ready` (or `loaded`).
    ///
    /// Returns immediately if it already has.
    ///
    /// # Errors
    ///
    /// - [`Error::NotReady`] if the bridge is torn down
    /// - [`Error::ReadyTimeout`] if readiness is not observed in time
    pub async fn wait_for_ready_with_timeout(&self, ready_timeout: Duration) -> Result<()> {
        if !self.is_active() {
            return Err(Error::NotReady);
        }

        let mut ready = self.inner.ready.subscribe();
        match timeout(ready_timeout, ready.wait_for(|ready| *ready)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(Error::NotReady),
            Err(_) => Err(Error::ready_timeout(ready_timeout.as_millis() as u64)),
        }
    }

    /// Returns `true` if the frame has signaled readiness.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.borrow()
    }
}

// ============================================================================
// Bridge - Events
// ============================================================================

impl Bridge {
    /// Registers a callback for an event name.
    pub fn on(&self, event: &str, callback: EventCallback) {
        self.inner.events.on(event, callback);
    }

    /// Removes a callback; unknown callbacks are ignored.
    pub fn off(&self, event: &str, callback: &EventCallback) {
        self.inner.events.off(event, callback);
    }

    /// Returns a stream of payloads for an event name.
    #[must_use]
    pub fn subscribe(&self, event: &str) -> EventStream {
        self.inner.events.subscribe(event)
    }

    /// Sets the forwarder invoked for every inbound event.
    pub fn set_event_forwarder(&self, forwarder: EventForwarder) {
        self.inner.events.set_forwarder(forwarder);
    }

    /// Clears the event forwarder.
    pub fn clear_event_forwarder(&self) {
        self.inner.events.clear_forwarder();
    }
}

// ============================================================================
// Bridge - Lifecycle
// ============================================================================

impl Bridge {
    /// Returns `true` until the bridge is torn down.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().subscription.is_some()
    }

    /// Unsubscribes and clears all bookkeeping.
    ///
    /// Outstanding commands are not rejected here; they run into their own
    /// timeouts. Safe to call more than once.
    pub fn destroy(&self) {
        self.inner.teardown();
    }
}

// ============================================================================
// BridgeInner
// ============================================================================

impl BridgeInner {
    /// Returns the frame's content window while the bridge is active.
    fn live_window(&self) -> Result<Arc<dyn ContentWindow>> {
        if self.state.lock().subscription.is_none() {
            return Err(Error::NotReady);
        }
        self.frame.content_window().ok_or(Error::NotReady)
    }

    /// Origin the frame currently points at.
    fn trusted_origin(&self) -> Option<String> {
        self.frame.src().as_deref().and_then(resolve_origin)
    }

    /// Posts an envelope, scoped to the trusted origin.
    fn post(&self, window: &dyn ContentWindow, envelope: &CommandEnvelope) -> Result<()> {
        let origin = self.trusted_origin().ok_or(Error::OriginUnresolvable)?;
        let message = serde_json::to_value(envelope)?;

        window.post_message(&message, &origin).inspect_err(|e| {
            warn!(error = %e, request_id = %envelope.request_id, "Failed to post command");
        })
    }

    /// Marks the frame as not ready until its next `ready`.
    fn reset_ready(&self) {
        if self.ready.send_replace(false) {
            debug!("Readiness reset");
        }
    }

    /// Drops a pending entry without resolving it.
    fn forget(&self, request_id: &RequestId) {
        self.state.lock().pending.remove(request_id);
    }

    /// Handles one message from the transport subscription.
    fn handle_incoming(&self, message: MessageEvent) {
        let Some(origin) = self.trusted_origin() else {
            trace!("Dropped message: no trusted origin");
            return;
        };
        if message.origin != origin {
            trace!(origin = %message.origin, "Dropped message: untrusted origin");
            return;
        }

        let expected_source = self.frame.content_window().map(|w| w.id());
        if expected_source.is_none() || message.source != expected_source {
            trace!(source = ?message.source, "Dropped message: foreign source");
            return;
        }

        if self.state.lock().subscription.is_none() {
            return;
        }

        match InboundEnvelope::parse(&message.data) {
            Some(InboundEnvelope::Event(event)) => {
                if event.is_ready_equivalent() && !self.ready.send_replace(true) {
                    debug!(event = event.name(), "Frame ready");
                }
                self.events.dispatch(&event);
            }

            Some(InboundEnvelope::Response(response)) => {
                let request_id = response.request_id.clone();
                let entry = self.state.lock().pending.remove(&request_id);

                match entry {
                    Some(entry) => {
                        trace!(%request_id, success = response.is_success(), "Response received");
                        let result = response.into_result();
                        // The frame reloads its session after auth.
                        if entry.action == ActionName::Auth && result.is_ok() {
                            self.reset_ready();
                        }
                        let _ = entry.tx.send(result);
                    }
                    None => trace!(%request_id, "Response for unknown request"),
                }
            }

            None => trace!("Ignored unrecognized message"),
        }
    }

    /// Unsubscribes, stops the listener and clears bookkeeping.
    fn teardown(&self) {
        let (subscription, listener, pending) = {
            let mut state = self.state.lock();
            let pending = state.pending.len();
            state.pending.clear();
            (state.subscription.take(), state.listener.take(), pending)
        };

        if let Some(listener) = listener {
            listener.abort();
        }
        self.ready.send_replace(false);

        if let Some(id) = subscription {
            self.target.remove_listener(id);
            self.events.clear();
            debug!(%id, pending, "Bridge destroyed");
        }
    }
}

impl Drop for BridgeInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use futures_util::StreamExt;
    use serde_json::{Value, json};

    use crate::bridge::dispatcher::event_callback;
    use crate::protocol::{AuthMode, AuthPayload, LegacyEvent};
    use crate::transport::{LocalFrame, LocalWindow, PostedMessage};

    const ORIGIN: &str = "https://assistant.eu.corti.app";

    struct Harness {
        window: Arc<LocalWindow>,
        frame: Arc<LocalFrame>,
        outbox: mpsc::UnboundedReceiver<PostedMessage>,
        bridge: Bridge,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_options(BridgeOptions::default())
        }

        fn with_options(options: BridgeOptions) -> Self {
            let window = Arc::new(LocalWindow::new());
            let (frame, outbox) = LocalFrame::new(format!("{ORIGIN}/embedded"));
            let bridge = Bridge::with_options(frame.clone(), window.clone(), options);
            Self {
                window,
                frame,
                outbox,
                bridge,
            }
        }

        fn from_frame(&self, data: Value) {
            self.window.dispatch(self.frame.message(data));
        }

        fn ready(&self) {
            self.from_frame(json!({ "type": "CORTI_EMBEDDED_EVENT", "version": "v1", "event": "ready" }));
        }

        async fn ready_and_settle(&self) {
            self.ready();
            self.bridge.wait_for_ready().await.unwrap();
        }

        async fn next_request_id(&mut self) -> RequestId {
            let posted = self.outbox.recv().await.unwrap();
            RequestId::from(posted.message["requestId"].as_str().unwrap())
        }

        fn respond(&self, request_id: &RequestId, body: Value) {
            let mut data = json!({
                "type": "CORTI_EMBEDDED_RESPONSE",
                "version": "v1",
                "action": "navigate",
                "requestId": request_id.as_str(),
            });
            if let (Some(data), Some(body)) = (data.as_object_mut(), body.as_object()) {
                data.extend(body.clone());
            }
            self.from_frame(data);
        }
    }

    #[tokio::test]
    async fn test_ready_event_sets_ready() {
        let h = Harness::new();
        assert!(!h.bridge.is_ready());
        h.ready_and_settle().await;
        assert!(h.bridge.is_ready());
    }

    #[tokio::test]
    async fn test_loaded_event_sets_ready() {
        let h = Harness::new();
        h.from_frame(json!({ "type": "CORTI_EMBEDDED_EVENT", "event": "loaded", "deprecated": true }));
        h.bridge.wait_for_ready().await.unwrap();
        assert!(h.bridge.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_ready_times_out() {
        let h = Harness::new();
        let err = h
            .bridge
            .wait_for_ready_with_timeout(Duration::from_millis(500))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReadyTimeout { timeout_ms: 500 }));
    }

    #[tokio::test]
    async fn test_send_resolves_on_matching_response() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move { bridge.send(Command::navigate("/foo")).await });

        let request_id = h.next_request_id().await;
        assert_eq!(h.bridge.pending_count(), 1);

        h.respond(&request_id, json!({ "success": true, "payload": { "ok": true } }));
        let response = call.await.unwrap().unwrap();

        assert_eq!(response.payload, Some(json!({ "ok": true })));
        assert_eq!(response.action, Some(ActionName::Navigate));
        assert_eq!(h.bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_targets_exact_origin() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        tokio::spawn(async move { bridge.send(Command::StartRecording {}).await });

        let posted = h.outbox.recv().await.unwrap();
        assert_eq!(posted.target_origin, ORIGIN);
        assert_eq!(posted.message["type"], "CORTI_EMBEDDED");
        assert_eq!(posted.message["version"], "v1");
        assert_eq!(posted.message["action"], "startRecording");
        assert_eq!(posted.message["payload"], json!({}));
    }

    #[tokio::test]
    async fn test_late_duplicate_response_is_noop() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move { bridge.send(Command::navigate("/a")).await });
        let request_id = h.next_request_id().await;

        h.respond(&request_id, json!({ "success": true, "payload": { "n": 1 } }));
        h.respond(&request_id, json!({ "success": false, "error": "late" }));

        let response = call.await.unwrap().unwrap();
        assert_eq!(response.payload, Some(json!({ "n": 1 })));
        assert_eq!(h.bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_response_rejects_with_message() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move { bridge.send(Command::navigate("/foo")).await });
        let request_id = h.next_request_id().await;

        h.respond(
            &request_id,
            json!({ "success": false, "error": "Bad request", "errorCode": "400" }),
        );

        let err = call.await.unwrap().unwrap_err();
        assert!(err.to_string().contains("Bad request"));
        assert_eq!(err.code(), Some("400"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_waits_for_ready_and_never_posts_on_ready_timeout() {
        let mut h = Harness::with_options(
            BridgeOptions::new().with_ready_timeout(Duration::from_millis(200)),
        );

        let err = h.bridge.send(Command::GetStatus {}).await.unwrap_err();

        assert!(matches!(err, Error::ReadyTimeout { .. }));
        assert!(h.outbox.try_recv().is_err());
        assert_eq!(h.bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_send_is_held_until_ready() {
        let mut h = Harness::new();

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move { bridge.send(Command::GetStatus {}).await });

        tokio::task::yield_now().await;
        assert!(h.outbox.try_recv().is_err());

        h.ready();
        let request_id = h.next_request_id().await;
        h.respond(&request_id, json!({ "success": true }));
        assert!(call.await.unwrap().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_origin_response_is_ignored_and_times_out() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move {
            bridge
                .send_with_timeout(Command::navigate("/foo"), Duration::from_millis(60))
                .await
        });
        let request_id = h.next_request_id().await;

        h.window.dispatch(MessageEvent::new(
            "https://evil.example",
            h.frame.source_id(),
            json!({ "requestId": request_id.as_str(), "payload": { "ok": true } }),
        ));

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::RequestTimeout { timeout_ms: 60, .. }));
        assert!(err.to_string().contains("Request timeout"));
        assert_eq!(h.bridge.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_source_is_ignored() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        h.bridge
            .on("usage", event_callback(move |_| *counter.lock() += 1));

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move {
            bridge
                .send_with_timeout(Command::navigate("/foo"), Duration::from_millis(60))
                .await
        });
        let request_id = h.next_request_id().await;

        let (impostor, _outbox) = LocalFrame::new(format!("{ORIGIN}/embedded"));
        h.window.dispatch(impostor.message(json!({
            "requestId": request_id.as_str(),
            "success": true
        })));
        h.window.dispatch(impostor.message(json!({
            "type": "CORTI_EMBEDDED_EVENT",
            "event": "usage"
        })));

        assert!(call.await.unwrap().unwrap_err().is_timeout());
        assert_eq!(*fired.lock(), 0);
    }

    #[tokio::test]
    async fn test_wrong_origin_event_never_fires_callbacks() {
        let h = Harness::new();
        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        h.bridge
            .on("ready", event_callback(move |_| *counter.lock() += 1));
        let mut ready_events = h.bridge.subscribe("ready");

        h.window.dispatch(MessageEvent::new(
            "https://evil.example",
            h.frame.source_id(),
            json!({ "type": "CORTI_EMBEDDED_EVENT", "event": "ready" }),
        ));
        h.ready();

        assert_eq!(ready_events.next().await, Some(None));
        assert_eq!(*fired.lock(), 1);
    }

    #[tokio::test]
    async fn test_not_ready_without_content_window() {
        let h = Harness::new();
        h.frame.detach();
        let err = h.bridge.send(Command::GetStatus {}).await.unwrap_err();
        assert!(matches!(err, Error::NotReady));
    }

    #[tokio::test]
    async fn test_origin_unresolvable_when_src_blank() {
        let mut h = Harness::new();
        h.ready_and_settle().await;
        h.frame.set_src("about:blank");

        let err = h.bridge.send(Command::GetStatus {}).await.unwrap_err();

        assert!(matches!(err, Error::OriginUnresolvable));
        assert!(h.outbox.try_recv().is_err());
        assert_eq!(h.bridge.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent_and_unsubscribes() {
        let h = Harness::new();
        assert_eq!(h.window.listener_count(), 1);
        h.ready_and_settle().await;

        h.bridge.destroy();
        h.bridge.destroy();

        assert!(!h.bridge.is_active());
        assert_eq!(h.window.listener_count(), 0);
        assert!(!h.bridge.is_ready());
        assert!(matches!(
            h.bridge.send(Command::GetStatus {}).await,
            Err(Error::NotReady)
        ));
    }

    #[tokio::test]
    async fn test_inbound_after_destroy_changes_nothing() {
        let h = Harness::new();
        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        h.bridge
            .on("ready", event_callback(move |_| *counter.lock() += 1));

        h.bridge.destroy();
        assert_eq!(h.window.dispatch(h.frame.message(json!({
            "type": "CORTI_EMBEDDED_EVENT",
            "event": "ready"
        }))), 0);
        tokio::task::yield_now().await;

        assert!(!h.bridge.is_ready());
        assert_eq!(*fired.lock(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_leaves_callers_on_their_own_timer() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move {
            bridge
                .send_with_timeout(Command::navigate("/x"), Duration::from_secs(5))
                .await
        });
        let request_id = h.next_request_id().await;

        h.bridge.destroy();
        assert_eq!(h.bridge.pending_count(), 0);

        let started = Instant::now();
        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::RequestTimeout { request_id: ref id, .. } if *id == request_id));
        assert!(started.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_reset_ready_requires_new_ready_event() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        h.bridge.inner.reset_ready();
        assert!(!h.bridge.is_ready());

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move { bridge.send(Command::GetStatus {}).await });
        tokio::task::yield_now().await;
        assert!(h.outbox.try_recv().is_err());

        h.from_frame(json!({
            "type": "CORTI_EMBEDDED_EVENT",
            "event": LegacyEvent::Ready.as_str(),
            "deprecated": true
        }));
        let request_id = h.next_request_id().await;
        h.respond(&request_id, json!({ "success": true }));
        assert!(call.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_ready_right_after_auth_response_is_kept() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move {
            bridge
                .authenticate(AuthPayload::bearer("token", AuthMode::Stateful))
                .await
        });
        let request_id = h.next_request_id().await;

        h.respond(
            &request_id,
            json!({ "action": "auth", "success": true, "payload": { "user": { "id": "u1", "email": "doc@example.com" } } }),
        );
        h.ready();
        call.await.unwrap().unwrap();

        h.bridge
            .wait_for_ready_with_timeout(Duration::from_millis(300))
            .await
            .unwrap();
        assert!(h.bridge.is_ready());

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move { bridge.send(Command::GetStatus {}).await });
        let request_id = h.next_request_id().await;
        h.respond(&request_id, json!({ "success": true }));
        assert!(call.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_failed_auth_keeps_ready() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move {
            bridge
                .authenticate(AuthPayload::bearer("token", AuthMode::Stateful))
                .await
        });
        let request_id = h.next_request_id().await;
        h.respond(&request_id, json!({ "success": false, "error": "Unauthorized" }));

        assert!(matches!(call.await.unwrap(), Err(Error::RemoteFailure { .. })));
        assert!(h.bridge.is_ready());
    }

    #[tokio::test]
    async fn test_unbounded_request_timeout_resolves() {
        let mut h = Harness::new();
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move {
            bridge
                .send_with_timeout(Command::GetStatus {}, Duration::MAX)
                .await
        });
        let request_id = h.next_request_id().await;
        h.respond(&request_id, json!({ "success": true }));
        assert!(call.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_unknown_traffic_does_not_break_listener() {
        let mut h = Harness::new();
        h.from_frame(json!("noise"));
        h.from_frame(json!({ "requestId": "req_unknown", "success": true }));
        h.from_frame(json!({ "type": "CORTI_EMBEDDED_EVENT" }));
        h.ready_and_settle().await;

        let bridge = h.bridge.clone();
        let call = tokio::spawn(async move { bridge.send(Command::GetStatus {}).await });
        let request_id = h.next_request_id().await;
        h.respond(&request_id, json!({ "success": true }));
        assert!(call.await.unwrap().is_ok());
    }

    #[test]
    fn test_bridge_is_clone_and_debug() {
        fn assert_traits<T: Clone + fmt::Debug + Send + Sync>() {}
        assert_traits::<Bridge>();
    }
}
