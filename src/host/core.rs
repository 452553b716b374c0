//! Embedding lifecycle controller.
//!
//! [`EmbedHost`] owns the configured base address, the frame it points at,
//! and at most one [`Bridge`] at a time.
//!
//! # Lifecycle
//!
//! | Step | Effect |
//! |------|--------|
//! | build | Base address validated; failure is reported and returned |
//! | [`EmbedHost::attach_frame`] | Frame pointed at the embed address (or `about:blank`) |
//! | [`EmbedHost::handle_frame_load`] | Bridge created on the first genuine load only |
//! | [`EmbedHost::set_base_address`] | Bridge torn down; frame re-pointed or blanked |
//! | [`EmbedHost::destroy`] | Everything torn down; safe to repeat |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::bridge::{Bridge, BridgeOptions, EventCallback, EventDispatcher, event_forwarder};
use crate::error::{Error, Result};
use crate::origin::{TrustedOrigin, is_genuine_load};
use crate::protocol::{
    AddFactsPayload, AuthPayload, ConfigureAppPayload, ConfigureAppResponse,
    ConfigureSessionPayload, CreateInteractionPayload, CreateInteractionResponse, Fact,
    GetStatusResponse, LegacyEvent, UserInfo,
};
use crate::report::ErrorReport;
use crate::transport::{FrameElement, MessageTarget};

use super::builder::EmbedHostBuilder;
use super::options::EmbedOptions;

// ============================================================================
// Constants
// ============================================================================

/// Address a frame is parked at while no valid origin is configured.
pub const BLANK_ADDRESS: &str = "about:blank";

// ============================================================================
// HostCallbacks
// ============================================================================

/// Invoked when the frame signals `ready`.
pub type ReadyCallback = Arc<dyn Fn() + Send + Sync>;

/// Invoked with the wire name and payload of every inbound event.
pub type HostEventCallback = Arc<dyn Fn(&str, Option<&Value>) + Send + Sync>;

/// Invoked with a normalized report whenever an operation fails.
pub type ErrorCallback = Arc<dyn Fn(&ErrorReport) + Send + Sync>;

/// Callbacks the embedding shell receives.
#[derive(Clone, Default)]
pub struct HostCallbacks {
    /// Frame readiness.
    pub on_ready: Option<ReadyCallback>,
    /// Every inbound event.
    pub on_event: Option<HostEventCallback>,
    /// Failures.
    pub on_error: Option<ErrorCallback>,
}

impl fmt::Debug for HostCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostCallbacks")
            .field("on_ready", &self.on_ready.is_some())
            .field("on_event", &self.on_event.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl HostCallbacks {
    fn error(&self, report: &ErrorReport) {
        if let Some(on_error) = &self.on_error {
            on_error(report);
        }
    }
}

// ============================================================================
// HostStatus
// ============================================================================

/// Diagnostic snapshot of a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    /// Base address as last configured.
    pub base_address: String,
    /// Trusted origin, if the base address is valid.
    pub origin: Option<String>,
    /// Whether a frame is attached.
    pub frame_attached: bool,
    /// Current frame `src`.
    pub frame_src: Option<String>,
    /// Whether the frame has a live content window.
    pub content_window: bool,
    /// Whether a bridge exists.
    pub bridge_active: bool,
    /// Whether the bridge has observed readiness.
    pub bridge_ready: bool,
}

// ============================================================================
// EmbedHost
// ============================================================================

#[derive(Default)]
struct HostState {
    base_address: String,
    origin: Option<TrustedOrigin>,
    frame: Option<Arc<dyn FrameElement>>,
    bridge: Option<Bridge>,
}

/// Lifecycle controller for one embedded frame.
///
/// Created through [`EmbedHost::builder`]. Methods that create a bridge
/// spawn its listener, so they must run inside a tokio runtime.
pub struct EmbedHost {
    target: Arc<dyn MessageTarget>,
    bridge_options: BridgeOptions,
    callbacks: Arc<HostCallbacks>,
    public: Arc<EventDispatcher>,
    state: Mutex<HostState>,
}

impl fmt::Debug for EmbedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedHost")
            .field("status", &self.status())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

impl EmbedHost {
    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> EmbedHostBuilder {
        EmbedHostBuilder::new()
    }

    /// Validates the base address and creates the host.
    ///
    /// A failed validation is reported through `on_error` and returned.
    pub(crate) fn new(
        target: Arc<dyn MessageTarget>,
        options: EmbedOptions,
        callbacks: HostCallbacks,
    ) -> Result<Self> {
        let origin = match TrustedOrigin::validate(&options.base_address) {
            Ok(origin) => origin,
            Err(e) => {
                callbacks.error(&ErrorReport::from(&e));
                return Err(e);
            }
        };

        debug!(origin = %origin, "Embed host created");

        Ok(Self {
            target,
            bridge_options: options.bridge,
            callbacks: Arc::new(callbacks),
            public: Arc::new(EventDispatcher::new()),
            state: Mutex::new(HostState {
                base_address: options.base_address,
                origin: Some(origin),
                ..Default::default()
            }),
        })
    }
}

// ============================================================================
// EmbedHost - Frame Lifecycle
// ============================================================================

impl EmbedHost {
    /// Attaches the frame and points it at the embed address.
    ///
    /// Parks the frame at `about:blank` if no valid origin is configured.
    pub fn attach_frame(&self, frame: Arc<dyn FrameElement>) {
        let mut state = self.state.lock();
        let target = state
            .origin
            .as_ref()
            .map_or_else(|| BLANK_ADDRESS.to_string(), TrustedOrigin::embed_address);

        if frame.src().as_deref() != Some(target.as_str()) {
            frame.set_src(&target);
        }

        debug!(src = %target, "Frame attached");
        state.frame = Some(frame);
    }

    /// Changes the base address.
    ///
    /// Any bridge is torn down either way. On success the frame is
    /// re-pointed and the new embed address returned; setting the current
    /// address again changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] (also reported through `on_error`)
    /// if validation fails; the frame is then parked at `about:blank`.
    pub fn set_base_address(&self, raw: &str) -> Result<String> {
        let validated = TrustedOrigin::validate(raw);
        let mut state = self.state.lock();

        if let (Ok(new), Some(current)) = (&validated, &state.origin)
            && state.base_address == raw
            && new == current
        {
            return Ok(new.embed_address());
        }

        state.base_address = raw.to_string();
        if let Some(bridge) = state.bridge.take() {
            bridge.destroy();
        }

        match validated {
            Ok(origin) => {
                let address = origin.embed_address();
                if let Some(frame) = &state.frame
                    && frame.src().as_deref() != Some(address.as_str())
                {
                    frame.set_src(&address);
                }
                debug!(origin = %origin, "Base address changed");
                state.origin = Some(origin);
                Ok(address)
            }
            Err(e) => {
                state.origin = None;
                if let Some(frame) = &state.frame {
                    frame.set_src(BLANK_ADDRESS);
                }
                drop(state);

                debug!(error = %e, "Base address rejected");
                self.callbacks.error(&ErrorReport::from(&e));
                Err(e)
            }
        }
    }

    /// Handles a load event from the frame.
    ///
    /// Returns `Ok(true)` if a bridge was set up. Transitional loads
    /// (`about:blank`, foreign pages) and repeated loads while a bridge
    /// exists return `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] (also reported through `on_error`) if
    /// the frame has no content window.
    pub fn handle_frame_load(&self, frame: Arc<dyn FrameElement>) -> Result<bool> {
        let mut state = self.state.lock();
        state.frame = Some(Arc::clone(&frame));

        let Some(origin) = state.origin.as_ref() else {
            trace!("Frame load ignored: no trusted origin");
            return Ok(false);
        };

        let src = frame.src().unwrap_or_default();
        if !is_genuine_load(&src, origin) {
            trace!(src = %src, "Frame load ignored: not the embedded page");
            return Ok(false);
        }

        if state.bridge.is_some() {
            trace!("Frame load ignored: bridge already set up");
            return Ok(false);
        }

        if frame.content_window().is_none() {
            drop(state);
            self.callbacks
                .error(&ErrorReport::new("No iframe or contentWindow available"));
            return Err(Error::NotReady);
        }

        let bridge = Bridge::with_options(frame, Arc::clone(&self.target), self.bridge_options);
        self.wire_events(&bridge);
        state.bridge = Some(bridge);

        debug!(src = %src, "Bridge set up");
        Ok(true)
    }

    /// Routes bridge events to the shell callbacks and public listeners.
    fn wire_events(&self, bridge: &Bridge) {
        let callbacks = Arc::clone(&self.callbacks);
        let public = Arc::clone(&self.public);

        bridge.set_event_forwarder(event_forwarder(move |event| {
            let payload = event.payload();

            if let Some(kind) = event.legacy_kind() {
                public.dispatch_named(kind.public_name(), payload);
            }

            if event.name() == LegacyEvent::Ready.as_str()
                && let Some(on_ready) = &callbacks.on_ready
            {
                on_ready();
            }

            if let Some(on_event) = &callbacks.on_event {
                on_event(event.name(), payload);
            }
        }));
    }

    /// Returns the current bridge.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if no genuine load has set one up.
    pub fn bridge(&self) -> Result<Bridge> {
        self.state.lock().bridge.clone().ok_or(Error::NotReady)
    }

    /// Returns `true` if a bridge exists and has observed readiness.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state
            .lock()
            .bridge
            .as_ref()
            .is_some_and(Bridge::is_ready)
    }

    /// Returns the trusted origin, if the base address is valid.
    #[must_use]
    pub fn trusted_origin(&self) -> Option<TrustedOrigin> {
        self.state.lock().origin.clone()
    }

    /// Returns a diagnostic snapshot.
    #[must_use]
    pub fn status(&self) -> HostStatus {
        let state = self.state.lock();
        let frame = state.frame.as_ref();

        HostStatus {
            base_address: state.base_address.clone(),
            origin: state.origin.as_ref().map(|o| o.as_str().to_string()),
            frame_attached: frame.is_some(),
            frame_src: frame.and_then(|f| f.src()),
            content_window: frame.is_some_and(|f| f.content_window().is_some()),
            bridge_active: state.bridge.as_ref().is_some_and(Bridge::is_active),
            bridge_ready: state.bridge.as_ref().is_some_and(Bridge::is_ready),
        }
    }

    /// Tears down the bridge and drops every public listener.
    ///
    /// Safe to call more than once.
    pub fn destroy(&self) {
        let (bridge, frame) = {
            let mut state = self.state.lock();
            (state.bridge.take(), state.frame.take())
        };

        if let Some(bridge) = bridge {
            bridge.destroy();
        }
        self.public.clear();

        if frame.is_some() {
            debug!("Embed host destroyed");
        }
    }
}

impl Drop for EmbedHost {
    fn drop(&mut self) {
        self.destroy();
    }
}

// ============================================================================
// EmbedHost - Public Events
// ============================================================================

impl EmbedHost {
    /// Registers a listener for a public event (`recording-started`, ...).
    ///
    /// Listeners survive bridge replacement.
    pub fn on(&self, event: &str, callback: EventCallback) {
        self.public.on(event, callback);
    }

    /// Removes a public event listener.
    pub fn off(&self, event: &str, callback: &EventCallback) {
        self.public.off(event, callback);
    }
}

// ============================================================================
// EmbedHost - Commands
// ============================================================================

impl EmbedHost {
    /// Runs an operation on the current bridge, reporting failures.
    async fn run<T, F, Fut>(&self, fallback: &str, op: F) -> Result<T>
    where
        F: FnOnce(Bridge) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let bridge = self.bridge()?;

        op(bridge).await.inspect_err(|e| {
            let mut report = ErrorReport::from(e);
            if report.message.is_empty() {
                report.message = fallback.to_string();
            }
            debug!(error = %report, "Operation failed");
            self.callbacks.error(&report);
        })
    }

    /// Authenticates the embedded application.
    ///
    /// # Errors
    ///
    /// See [`Bridge::authenticate`]; [`Error::NotReady`] without a bridge.
    pub async fn authenticate(&self, payload: AuthPayload) -> Result<UserInfo> {
        self.run("Authentication failed", |bridge| async move {
            bridge.authenticate(payload).await
        })
        .await
    }

    /// Creates a new interaction.
    ///
    /// # Errors
    ///
    /// See [`Bridge::create_interaction`].
    pub async fn create_interaction(
        &self,
        payload: CreateInteractionPayload,
    ) -> Result<CreateInteractionResponse> {
        self.run("Failed to create interaction", |bridge| async move {
            bridge.create_interaction(payload).await
        })
        .await
    }

    /// Sets session defaults.
    ///
    /// # Errors
    ///
    /// See [`Bridge::configure_session`].
    pub async fn configure_session(&self, payload: ConfigureSessionPayload) -> Result<()> {
        self.run("Failed to configure session", |bridge| async move {
            bridge.configure_session(payload).await
        })
        .await
    }

    /// Adds facts to the current interaction.
    ///
    /// # Errors
    ///
    /// See [`Bridge::add_facts`].
    pub async fn add_facts(&self, facts: Vec<Fact>) -> Result<()> {
        self.run("Failed to add facts", |bridge| async move {
            bridge.add_facts(AddFactsPayload { facts }).await
        })
        .await
    }

    /// Navigates inside the embedded application.
    ///
    /// # Errors
    ///
    /// See [`Bridge::navigate_to`].
    pub async fn navigate(&self, path: &str) -> Result<()> {
        self.run("Failed to navigate", |bridge| async move {
            bridge.navigate_to(path).await
        })
        .await
    }

    /// Starts recording.
    ///
    /// # Errors
    ///
    /// See [`Bridge::start_recording`].
    pub async fn start_recording(&self) -> Result<()> {
        self.run("Failed to start recording", |bridge| async move {
            bridge.start_recording().await
        })
        .await
    }

    /// Stops recording.
    ///
    /// # Errors
    ///
    /// See [`Bridge::stop_recording`].
    pub async fn stop_recording(&self) -> Result<()> {
        self.run("Failed to stop recording", |bridge| async move {
            bridge.stop_recording().await
        })
        .await
    }

    /// Returns the embedded application's status.
    ///
    /// # Errors
    ///
    /// See [`Bridge::get_status`].
    pub async fn get_status(&self) -> Result<GetStatusResponse> {
        self.run("Failed to get status", |bridge| async move {
            bridge.get_status().await
        })
        .await
    }

    /// Configures the embedded application.
    ///
    /// # Errors
    ///
    /// See [`Bridge::configure_app`].
    pub async fn configure_app(&self, payload: ConfigureAppPayload) -> Result<ConfigureAppResponse> {
        self.run("Failed to configure component", |bridge| async move {
            bridge.configure_app(payload).await
        })
        .await
    }

    /// Sets the password used by the embedded application.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an empty password; otherwise
    /// see [`Bridge::set_credentials`].
    pub async fn set_credentials(&self, password: &str) -> Result<()> {
        self.run("Failed to set credentials", |bridge| async move {
            if password.is_empty() {
                return Err(Error::invalid_argument("Password is required"));
            }
            bridge.set_credentials(password).await
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
