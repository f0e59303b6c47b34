//! Core event types, timers and async event sources.
//!
//! All keystroke processing is serialized through one bounded mpsc channel:
//! producers (stdin/terminal key sources, ambiguity timers, config watchers)
//! push `Event`s, a single consumer resolves them one at a time. The engine
//! never reorders keys; the channel order is the processing order.

pub mod timer;

use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

pub use timer::{TimeoutScheduler, TimeoutToken, TimerHandle, TokioTimeoutScheduler};
#[cfg(any(test, feature = "testing"))]
pub use timer::{ArmedTimer, ManualTimeoutScheduler};

// -------------------------------------------------------------------------------------------------
// Channel Policy
// -------------------------------------------------------------------------------------------------
// Bounded channel; producers use `send().await` and park rather than drop keys. Dropping a key
// would break the remap invariant that consumed + re-emitted keys equal the keys received.
// -------------------------------------------------------------------------------------------------
pub const EVENT_CHANNEL_CAP: usize = 8192;

/// Sentinel appended to the pending key list when an ambiguity timer fires.
pub const BUFFERED_KEYS_SENTINEL: &str = "<BufferedKeys>";

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    /// Configuration source changed; remap tables must be rebuilt.
    ConfigChanged,
    Shutdown,
}

/// Normalized input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// One key in canonical bracket notation (`x`, `<esc>`, `<c-r>`).
    Key(String),
    /// An ambiguity timer elapsed.
    BufferedKeysTimeout(TimeoutToken),
}

// -------------------------------------------------------------------------------------------------
// Event Transform Hooks
// -------------------------------------------------------------------------------------------------
/// Optional hooks that can observe events at the loop boundary. Must not block.
pub trait EventHooks: Send + Sync + 'static {
    fn pre_handle(&self, _event: &Event) {}
    fn post_handle(&self, _event: &Event) {}
}

/// Default no-op hooks implementation.
pub struct NoopEventHooks;

impl EventHooks for NoopEventHooks {}

// -------------------------------------------------------------------------------------------------
// Async Event Sources
// -------------------------------------------------------------------------------------------------

/// Trait implemented by any async event producer. Implementors usually hold configuration and
/// spawn one background task that pushes `Event`s into the shared channel.
pub trait AsyncEventSource: Send + 'static {
    /// Stable identifier (used for logging / diagnostics).
    fn name(&self) -> &'static str;
    /// Consume self and spawn the background task. Implementors stop when `tx.send(..).await`
    /// returns Err (channel closed) or on their own internal stop condition.
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Registry of event sources, spawned together at startup.
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl Default for EventSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    pub fn register_boxed(&mut self, src: Box<dyn AsyncEventSource>) {
        self.sources.push(src);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Spawn all registered sources, returning their JoinHandles. Each source receives its own
    /// `Sender` clone. During shutdown the caller drops its final `Sender` before awaiting the
    /// handles so the sources observe the closed channel and exit.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            let name = src.name();
            tracing::info!(target: "runtime.events", source = name, "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}

/// Source replaying a fixed key list (scripted input, `--keys` on the command line).
pub struct ScriptedKeySource {
    keys: Vec<String>,
    then_shutdown: bool,
}

impl ScriptedKeySource {
    pub fn new(keys: Vec<String>, then_shutdown: bool) -> Self {
        Self {
            keys,
            then_shutdown,
        }
    }
}

impl AsyncEventSource for ScriptedKeySource {
    fn name(&self) -> &'static str {
        "scripted_keys"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        tokio::spawn(async move {
            for key in self.keys {
                if tx.send(Event::Input(InputEvent::Key(key))).await.is_err() {
                    return;
                }
            }
            if self.then_shutdown {
                let _ = tx.send(Event::Shutdown).await;
            }
        })
    }
}
