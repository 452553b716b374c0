//! Event callback registry.
//!
//! Callbacks are keyed by wire event name. Both protocol generations
//! route through the same table, so `on("ready", ..)` fires for a legacy
//! `ready` and for a current-generation `ready` alike.
//!
//! A panicking callback is caught and reported through `tracing`; the
//! remaining callbacks for the event still run.

// ============================================================================
// Imports
// ============================================================================

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures_util::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{error, trace};

use crate::protocol::EmbeddedEvent;

// ============================================================================
// Types
// ============================================================================

/// Callback invoked with an event's payload.
pub type EventCallback = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Callback invoked for every event, before named callbacks.
pub type EventForwarder = Arc<dyn Fn(&EmbeddedEvent) + Send + Sync>;

/// Stream of payloads for one event name.
pub type EventStream = BoxStream<'static, Option<Value>>;

/// Wraps a closure as an [`EventCallback`].
#[inline]
#[must_use]
pub fn event_callback<F>(f: F) -> EventCallback
where
    F: Fn(Option<&Value>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps a closure as an [`EventForwarder`].
#[inline]
#[must_use]
pub fn event_forwarder<F>(f: F) -> EventForwarder
where
    F: Fn(&EmbeddedEvent) + Send + Sync + 'static,
{
    Arc::new(f)
}

// ============================================================================
// EventDispatcher
// ============================================================================

/// Per-bridge event registry.
#[derive(Default)]
pub struct EventDispatcher {
    callbacks: Mutex<FxHashMap<String, Vec<EventCallback>>>,
    streams: Mutex<FxHashMap<String, Vec<mpsc::UnboundedSender<Option<Value>>>>>,
    forwarder: Mutex<Option<EventForwarder>>,
}

impl EventDispatcher {
    /// Creates an empty registry.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback. The same callback may be registered twice and
    /// then runs twice.
    pub fn on(&self, event: &str, callback: EventCallback) {
        self.callbacks
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(callback);
    }

    /// Removes the earliest registration of `callback` for `event`.
    ///
    /// Returns `false` if it was not registered.
    pub fn off(&self, event: &str, callback: &EventCallback) -> bool {
        let mut callbacks = self.callbacks.lock();
        let Some(list) = callbacks.get_mut(event) else {
            return false;
        };
        let Some(index) = list.iter().position(|cb| Arc::ptr_eq(cb, callback)) else {
            return false;
        };
        list.remove(index);
        if list.is_empty() {
            callbacks.remove(event);
        }
        true
    }

    /// Returns a stream of payloads for `event`.
    ///
    /// Events dispatched after this call are never missed; the stream ends
    /// when the registry is cleared.
    #[must_use]
    pub fn subscribe(&self, event: &str) -> EventStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(tx);

        stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|payload| (payload, rx))
        })
        .boxed()
    }

    /// Sets the forwarder that sees every event.
    pub fn set_forwarder(&self, forwarder: EventForwarder) {
        *self.forwarder.lock() = Some(forwarder);
    }

    /// Clears the forwarder.
    pub fn clear_forwarder(&self) {
        self.forwarder.lock().take();
    }

    /// Returns the number of callbacks registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.callbacks.lock().get(event).map_or(0, Vec::len)
    }

    /// Drops every callback, stream and the forwarder.
    pub fn clear(&self) {
        self.callbacks.lock().clear();
        self.streams.lock().clear();
        self.forwarder.lock().take();
    }

    /// Routes an inbound event to the forwarder, callbacks and streams.
    pub fn dispatch(&self, event: &EmbeddedEvent) {
        let name = event.name();
        let payload = event.payload();

        let forwarder = self.forwarder.lock().clone();
        if let Some(forwarder) = forwarder {
            isolate(name, || forwarder(event));
        }

        self.dispatch_named(name, payload);
    }

    /// Invokes every callback for `name` in registration order.
    ///
    /// Callbacks run outside the registry lock and may call `on`/`off`.
    pub fn dispatch_named(&self, name: &str, payload: Option<&Value>) {
        let callbacks = self.callbacks.lock().get(name).cloned().unwrap_or_default();

        trace!(event = name, callbacks = callbacks.len(), "Dispatching event");

        for callback in callbacks {
            isolate(name, || callback(payload));
        }

        let mut streams = self.streams.lock();
        if let Some(senders) = streams.get_mut(name) {
            senders.retain(|tx| tx.send(payload.cloned()).is_ok());
            if senders.is_empty() {
                streams.remove(name);
            }
        }
    }
}

/// Runs a callback, reporting a panic instead of propagating it.
fn isolate(event: &str, f: impl FnOnce()) {
    if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
        error!(event, reason = %panic_message(&*panic), "Event callback panicked");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

// ============================================================================
// Tests
// ============================================================================
