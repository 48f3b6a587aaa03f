//! Gateway session
//!
//! Owns one logical connection: drives the HELLO → IDENTIFY → READY
//! handshake, dispatches decoded events to registered handlers, and keeps
//! the session alive across transport drops when the reconnect policy
//! allows it.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::transport::{BoxTransport, Connector, TransportEvent, WebSocketConnector};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use toplist_protocol::{EventKind, GatewayMessage, OpCode, RateEvent, VoteEvent};

type VoteHandler = Arc<dyn Fn(VoteEvent) + Send + Sync>;
type RateHandler = Arc<dyn Fn(RateEvent) + Send + Sync>;

/// Session lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempt has been made yet
    Idle,
    /// Opening the transport
    Connecting,
    /// Transport open, waiting for HELLO
    AwaitingHello,
    /// HELLO received, sending IDENTIFY
    Identifying,
    /// IDENTIFY sent, waiting for READY
    AwaitingReady,
    /// Handshake complete, events are flowing
    Ready,
    /// Transport dropped after the session was ready
    Closed,
    /// The connection attempt aborted
    Failed,
}

impl SessionState {
    /// Get the name of this state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::AwaitingHello => "awaiting_hello",
            Self::Identifying => "identifying",
            Self::AwaitingReady => "awaiting_ready",
            Self::Ready => "ready",
            Self::Closed => "closed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Default)]
struct HandlerSlots {
    vote: RwLock<Option<VoteHandler>>,
    rate: RwLock<Option<RateHandler>>,
}

/// Client for the toplist gateway
///
/// Created once from a token; `connect` drives the handshake and resolves
/// when the gateway reports READY. Handlers may be registered before or
/// during a session. Dropping the client requests shutdown of the
/// background session task.
pub struct GatewayClient {
    shared: Arc<SessionShared>,
}

impl GatewayClient {
    /// Create a client for the entity associated with the given token
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(token, GatewayConfig::default())
    }

    /// Create a client and install a tracing subscriber at the given level
    ///
    /// Convenience for binaries that do not manage their own subscriber;
    /// the subscriber part is a no-op when one is already installed.
    #[must_use]
    pub fn with_log_level(token: impl Into<String>, level: tracing::Level) -> Self {
        let _ = crate::telemetry::try_init_tracing(level);
        Self::new(token)
    }

    /// Create a client with an explicit configuration
    #[must_use]
    pub fn with_config(token: impl Into<String>, config: GatewayConfig) -> Self {
        Self::with_connector(token, config, WebSocketConnector::new())
    }

    /// Create a client with a custom transport connector
    ///
    /// Used for alternative transports and for tests.
    #[must_use]
    pub fn with_connector<C>(token: impl Into<String>, config: GatewayConfig, connector: C) -> Self
    where
        C: Connector + 'static,
    {
        let (shutdown, _) = watch::channel(false);
        Self {
            shared: Arc::new(SessionShared {
                token: token.into(),
                config,
                connector: Box::new(connector),
                handlers: HandlerSlots::default(),
                state: RwLock::new(SessionState::Idle),
                shutdown,
                running: AtomicBool::new(false),
            }),
        }
    }

    /// Register the handler invoked for each VOTE event
    pub fn on_vote<F>(&self, handler: F)
    where
        F: Fn(VoteEvent) + Send + Sync + 'static,
    {
        *self.shared.handlers.vote.write() = Some(Arc::new(handler));
    }

    /// Register the handler invoked for each RATE event
    pub fn on_rate<F>(&self, handler: F)
    where
        F: Fn(RateEvent) + Send + Sync + 'static,
    {
        *self.shared.handlers.rate.write() = Some(Arc::new(handler));
    }

    /// Get the current session state
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.shared.state.read()
    }

    /// Connect to the gateway and resolve once READY is observed
    ///
    /// The returned future is cancel safe: dropping it aborts the pending
    /// attempt and closes the transport. After a successful handshake the
    /// session keeps running in the background, dispatching events and
    /// reconnecting per the configured policy.
    pub async fn connect(&self) -> GatewayResult<()> {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Err(GatewayError::AlreadyConnected);
        }
        self.shared.shutdown.send_replace(false);

        let (ready_tx, ready_rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared.run(ready_tx).await;
        });

        match ready_rx.await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Shutdown),
        }
    }

    /// [`connect`](Self::connect) under a deadline
    ///
    /// An elapsed deadline aborts the attempt, closes the transport, and
    /// returns [`GatewayError::ConnectTimeout`].
    pub async fn connect_timeout(&self, deadline: Duration) -> GatewayResult<()> {
        match tokio::time::timeout(deadline, self.connect()).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::ConnectTimeout),
        }
    }

    /// Stop the session: the supervising task closes any live transport and
    /// exits. Idempotent.
    pub fn shutdown(&self) {
        self.shared.shutdown.send_replace(true);
    }
}

impl Drop for GatewayClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("state", &self.state())
            .field("url", &self.shared.config.url)
            .finish()
    }
}

struct SessionShared {
    token: String,
    config: GatewayConfig,
    connector: Box<dyn Connector>,
    handlers: HandlerSlots,
    state: RwLock<SessionState>,
    shutdown: watch::Sender<bool>,
    running: AtomicBool,
}

/// Result of the connect attempt, delivered at most once per `connect` call
type AttemptWaiter = Option<oneshot::Sender<GatewayResult<()>>>;

/// How one connection attempt ended
enum AttemptOutcome {
    /// Transport never opened or the handshake aborted
    Aborted,
    /// The session was ready, then the transport dropped
    Dropped,
    /// Shutdown was requested or the connect caller stopped waiting
    Stopped,
}

enum Wake {
    Shutdown,
    Cancelled,
    Event(Option<TransportEvent>),
}

enum FrameFlow {
    Continue,
    Abort,
}

impl SessionShared {
    fn set_state(&self, state: SessionState) {
        *self.state.write() = state;
    }

    /// Supervising task: one initial attempt, then the reconnect loop
    async fn run(self: Arc<Self>, ready_tx: oneshot::Sender<GatewayResult<()>>) {
        let _running = RunningGuard(&self.running);
        let mut shutdown_rx = self.shutdown.subscribe();
        let mut waiter: AttemptWaiter = Some(ready_tx);

        match self.run_attempt(&mut waiter, &mut shutdown_rx).await {
            AttemptOutcome::Aborted | AttemptOutcome::Stopped => return,
            AttemptOutcome::Dropped => {}
        }

        let policy = &self.config.reconnect;
        if !policy.is_enabled() {
            tracing::info!("reconnect disabled, session closed");
            return;
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            if let Some(max) = policy.max_attempts {
                if attempt > max {
                    tracing::error!(attempts = max, "giving up on reconnecting");
                    return;
                }
            }

            let delay = policy.delay_for(attempt);
            tracing::debug!(delay_ms = delay.as_millis() as u64, attempt, "reconnecting after delay");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = shutdown_requested(&mut shutdown_rx) => return,
            }

            match self.run_attempt(&mut waiter, &mut shutdown_rx).await {
                // A session was served again; start the backoff over on the
                // next drop.
                AttemptOutcome::Dropped => attempt = 0,
                AttemptOutcome::Aborted => {}
                AttemptOutcome::Stopped => return,
            }
        }
    }

    /// Open a transport, drive the handshake, then pump events until the
    /// connection ends one way or another
    async fn run_attempt(
        &self,
        waiter: &mut AttemptWaiter,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> AttemptOutcome {
        self.set_state(SessionState::Connecting);
        let (mut transport, mut events) = match self.connector.connect(&self.config.url).await {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(error = %err, url = %self.config.url, "failed to open gateway connection");
                self.set_state(SessionState::Failed);
                resolve(waiter, Err(GatewayError::Connect(err)));
                return AttemptOutcome::Aborted;
            }
        };
        self.set_state(SessionState::AwaitingHello);

        loop {
            let wake = {
                let cancelled = async {
                    match waiter.as_mut() {
                        Some(tx) => tx.closed().await,
                        None => std::future::pending::<()>().await,
                    }
                };
                tokio::select! {
                    () = shutdown_requested(shutdown_rx) => Wake::Shutdown,
                    () = cancelled => Wake::Cancelled,
                    event = events.recv() => Wake::Event(event),
                }
            };

            match wake {
                Wake::Shutdown => {
                    tracing::debug!("shutdown requested, closing transport");
                    let _ = transport.close().await;
                    self.set_state(SessionState::Closed);
                    resolve(waiter, Err(GatewayError::Shutdown));
                    return AttemptOutcome::Stopped;
                }
                Wake::Cancelled => {
                    // The connect caller stopped waiting; do not leak the
                    // socket.
                    tracing::debug!("connect cancelled, closing transport");
                    let _ = transport.close().await;
                    self.set_state(SessionState::Failed);
                    *waiter = None;
                    return AttemptOutcome::Stopped;
                }
                Wake::Event(None) => {
                    return self.on_closed(waiter, None, "transport channel closed".to_string());
                }
                Wake::Event(Some(TransportEvent::Closed { code, reason })) => {
                    return self.on_closed(waiter, code, reason);
                }
                Wake::Event(Some(TransportEvent::Error(err))) => {
                    tracing::error!(error = %err, "transport error");
                }
                Wake::Event(Some(TransportEvent::Frame(frame))) => {
                    match self.on_frame(&mut transport, waiter, &frame).await {
                        FrameFlow::Continue => {}
                        FrameFlow::Abort => {
                            let _ = transport.close().await;
                            return AttemptOutcome::Aborted;
                        }
                    }
                }
            }
        }
    }

    /// React to one decoded envelope per the current protocol state
    async fn on_frame(
        &self,
        transport: &mut BoxTransport,
        waiter: &mut AttemptWaiter,
        frame: &str,
    ) -> FrameFlow {
        let message = match GatewayMessage::decode(frame) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(error = %err, "error decoding gateway message");
                return FrameFlow::Continue;
            }
        };
        tracing::debug!(op = %message.op, "gateway message received");

        match message.op {
            OpCode::Hello => {
                self.set_state(SessionState::Identifying);
                let encoded = match GatewayMessage::identify(self.token.clone()).encode() {
                    Ok(encoded) => encoded,
                    Err(err) => {
                        tracing::error!(error = %err, "error encoding identify");
                        self.set_state(SessionState::Failed);
                        resolve(waiter, Err(GatewayError::Protocol(err)));
                        return FrameFlow::Abort;
                    }
                };
                if let Err(err) = transport.send(encoded).await {
                    tracing::error!(error = %err, "failed to send identify");
                    self.set_state(SessionState::Failed);
                    resolve(waiter, Err(GatewayError::Identify(err)));
                    return FrameFlow::Abort;
                }
                self.set_state(SessionState::AwaitingReady);
            }
            OpCode::Ready => {
                self.set_state(SessionState::Ready);
                tracing::info!("connected to the toplist gateway");
                resolve(waiter, Ok(()));
            }
            OpCode::Event => self.dispatch_event(&message),
            OpCode::Disconnect => {
                let reason = message.disconnect_reason();
                if *self.state.read() == SessionState::Ready {
                    // Forced-disconnect notice; the transport close that
                    // follows drives the transition.
                    tracing::warn!(reason = %reason, "gateway requested disconnect");
                } else {
                    tracing::warn!(reason = %reason, "disconnected during handshake");
                    self.set_state(SessionState::Failed);
                    resolve(waiter, Err(GatewayError::Disconnected(reason)));
                    return FrameFlow::Abort;
                }
            }
            OpCode::Identify => {
                tracing::warn!(op = %message.op, "gateway sent a client-only operation");
            }
        }
        FrameFlow::Continue
    }

    /// Decode an EVENT payload by kind and invoke the matching handler
    ///
    /// Handlers run synchronously on the session task; a slow handler delays
    /// delivery of subsequent messages on this connection.
    fn dispatch_event(&self, message: &GatewayMessage) {
        let Some(kind) = message.event else {
            tracing::debug!("event message without a kind, ignoring");
            return;
        };
        match kind {
            EventKind::Vote => match message.payload::<VoteEvent>() {
                Ok(vote) => {
                    let handler = self.handlers.vote.read().clone();
                    if let Some(handler) = handler {
                        handler(vote);
                    }
                }
                Err(err) => tracing::error!(error = %err, "error decoding vote event"),
            },
            EventKind::Rate => match message.payload::<RateEvent>() {
                Ok(rate) => {
                    let handler = self.handlers.rate.read().clone();
                    if let Some(handler) = handler {
                        handler(rate);
                    }
                }
                Err(err) => tracing::error!(error = %err, "error decoding rate event"),
            },
            EventKind::Unknown => tracing::debug!("unrecognized event kind, ignoring"),
        }
    }

    fn on_closed(&self, waiter: &mut AttemptWaiter, code: Option<u16>, reason: String) -> AttemptOutcome {
        tracing::warn!(code = ?code, reason = %reason, "connection has been closed");
        if waiter.is_some() {
            self.set_state(SessionState::Failed);
            resolve(waiter, Err(GatewayError::ConnectionClosed { code, reason }));
            AttemptOutcome::Aborted
        } else if *self.state.read() == SessionState::Ready {
            self.set_state(SessionState::Closed);
            AttemptOutcome::Dropped
        } else {
            // Close during a background reconnect handshake.
            self.set_state(SessionState::Failed);
            AttemptOutcome::Aborted
        }
    }
}

/// Deliver the attempt result at most once; a dropped receiver means the
/// caller stopped waiting and the result is discarded
fn resolve(waiter: &mut AttemptWaiter, result: GatewayResult<()>) {
    if let Some(tx) = waiter.take() {
        let _ = tx.send(result);
    }
}

async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
