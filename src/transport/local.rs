//! In-process transport.
//!
//! [`LocalWindow`] is a fan-out message bus standing in for the parent
//! window; [`LocalFrame`] is a frame whose content window hands every
//! posted message to an outbox channel. Together they let a host drive the
//! bridge without a browser.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use corti_embedded::transport::{LocalFrame, LocalWindow};
//! use corti_embedded::Bridge;
//!
//! # async fn example() {
//! let window = Arc::new(LocalWindow::new());
//! let (frame, mut outbox) = LocalFrame::new("https://assistant.eu.corti.app/embedded");
//! let bridge = Bridge::new(frame.clone(), window.clone());
//!
//! // Play the embedded side
//! window.dispatch(frame.message(serde_json::json!({
//!     "type": "CORTI_EMBEDDED_EVENT",
//!     "event": "ready"
//! })));
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, SourceId};
use crate::origin::resolve_origin;

use super::{ContentWindow, FrameElement, MessageEvent, MessageTarget};

// ============================================================================
// LocalWindow
// ============================================================================

/// In-process message bus.
#[derive(Default)]
pub struct LocalWindow {
    listeners: Mutex<FxHashMap<ListenerId, mpsc::UnboundedSender<MessageEvent>>>,
}

impl LocalWindow {
    /// Creates a bus with no listeners.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers a message to every registered listener.
    ///
    /// Returns the number of listeners reached.
    pub fn dispatch(&self, event: MessageEvent) -> usize {
        let mut listeners = self.listeners.lock();
        listeners.retain(|_, tx| tx.send(event.clone()).is_ok());
        trace!(origin = %event.origin, delivered = listeners.len(), "Dispatched message");
        listeners.len()
    }

    /// Returns the number of registered listeners.
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl MessageTarget for LocalWindow {
    fn add_listener(&self) -> (ListenerId, mpsc::UnboundedReceiver<MessageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = ListenerId::next();
        self.listeners.lock().insert(id, tx);
        (id, rx)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }
}

// ============================================================================
// PostedMessage
// ============================================================================

/// A message the host posted into a [`LocalFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    /// Message body.
    pub message: Value,
    /// Origin the host restricted delivery to.
    pub target_origin: String,
}

// ============================================================================
// LocalContentWindow
// ============================================================================

struct LocalContentWindow {
    id: SourceId,
    outbox: mpsc::UnboundedSender<PostedMessage>,
}

impl ContentWindow for LocalContentWindow {
    fn id(&self) -> SourceId {
        self.id
    }

    fn post_message(&self, message: &Value, target_origin: &str) -> Result<()> {
        self.outbox
            .send(PostedMessage {
                message: message.clone(),
                target_origin: target_origin.to_string(),
            })
            .map_err(|_| Error::transport("frame outbox closed"))
    }
}

// ============================================================================
// LocalFrame
// ============================================================================

/// In-process frame.
pub struct LocalFrame {
    src: Mutex<Option<String>>,
    window: Mutex<Option<Arc<LocalContentWindow>>>,
}

impl LocalFrame {
    /// Creates a frame loaded at `src` with a live content window.
    ///
    /// Returns the frame and the receiver for messages posted into it.
    #[must_use]
    pub fn new(src: impl Into<String>) -> (Arc<Self>, mpsc::UnboundedReceiver<PostedMessage>) {
        let (outbox, rx) = mpsc::unbounded_channel();
        let window = LocalContentWindow {
            id: SourceId::next(),
            outbox,
        };
        let frame = Self {
            src: Mutex::new(Some(src.into())),
            window: Mutex::new(Some(Arc::new(window))),
        };
        (Arc::new(frame), rx)
    }

    /// Creates a frame that has no content window (not attached yet).
    #[must_use]
    pub fn detached(src: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            src: Mutex::new(Some(src.into())),
            window: Mutex::new(None),
        })
    }

    /// Drops the content window, as when the frame is removed.
    pub fn detach(&self) {
        self.window.lock().take();
    }

    /// Returns the content window identity, if attached.
    #[must_use]
    pub fn source_id(&self) -> Option<SourceId> {
        self.window.lock().as_ref().map(|w| w.id)
    }

    /// Builds a message as the frame's document would send it.
    ///
    /// The origin is taken from the current `src`.
    #[must_use]
    pub fn message(&self, data: Value) -> MessageEvent {
        let origin = self
            .src()
            .as_deref()
            .and_then(resolve_origin)
            .unwrap_or_else(|| "null".to_string());
        MessageEvent::new(origin, self.source_id(), data)
    }
}

impl FrameElement for LocalFrame {
    fn src(&self) -> Option<String> {
        self.src.lock().clone()
    }

    fn set_src(&self, src: &str) {
        *self.src.lock() = Some(src.to_string());
    }

    fn content_window(&self) -> Option<Arc<dyn ContentWindow>> {
        self.window
            .lock()
            .clone()
            .map(|w| w as Arc<dyn ContentWindow>)
    }
}

// ============================================================================
// Tests
// ============================================================================
