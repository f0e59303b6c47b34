//! One-shot ambiguity timers.
//!
//! A remapping engine that buffers an ambiguous sequence arms exactly one timer.
//! Firing never runs a remap: it only pushes `InputEvent::BufferedKeysTimeout`
//! back into the ordered event queue, where the dispatcher turns it into the
//! buffered-keys sentinel. The token carries the arming engine's generation so
//! a timer that fires after its sequence was already resolved is recognised
//! as stale and dropped.

use crate::{Event, InputEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio::task::AbortHandle;
use tracing::trace;

/// Identifies the engine that armed a timer and the buffered sequence it
/// belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutToken {
    pub engine: usize,
    pub generation: u64,
}

/// Cancellable handle returned by `TimeoutScheduler::schedule`.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: TimeoutToken,
    cancelled: Arc<AtomicBool>,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn new(token: TimeoutToken) -> Self {
        Self {
            token,
            cancelled: Arc::new(AtomicBool::new(false)),
            abort: None,
        }
    }

    fn with_abort(mut self, abort: AbortHandle) -> Self {
        self.abort = Some(abort);
        self
    }

    pub fn token(&self) -> TimeoutToken {
        self.token
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(abort) = &self.abort {
            abort.abort();
        }
        trace!(target: "input.timer", engine = self.token.engine, generation = self.token.generation, "timer_cancel");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// `schedule(delay) -> cancellable handle`.
pub trait TimeoutScheduler: Send {
    fn schedule(&mut self, delay: Duration, token: TimeoutToken) -> TimerHandle;
}

/// Production scheduler: one tokio sleep task per armed timer.
pub struct TokioTimeoutScheduler {
    tx: Sender<Event>,
}

impl TokioTimeoutScheduler {
    pub fn new(tx: Sender<Event>) -> Self {
        Self { tx }
    }
}

impl TimeoutScheduler for TokioTimeoutScheduler {
    fn schedule(&mut self, delay: Duration, token: TimeoutToken) -> TimerHandle {
        let handle = TimerHandle::new(token);
        let cancelled = handle.cancelled.clone();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if cancelled.load(Ordering::SeqCst) {
                return;
            }
            if tx
                .send(Event::Input(InputEvent::BufferedKeysTimeout(token)))
                .await
                .is_err()
            {
                trace!(target: "input.timer", "timer_fire_channel_closed");
            }
        });
        trace!(target: "input.timer", engine = token.engine, generation = token.generation, delay_ms = delay.as_millis() as u64, "timer_armed");
        handle.with_abort(task.abort_handle())
    }
}

/// A timer recorded by `ManualTimeoutScheduler`.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone)]
pub struct ArmedTimer {
    pub delay: Duration,
    pub handle: TimerHandle,
}

/// Deterministic scheduler: records armed timers and lets the caller decide
/// when (and whether) they fire. Clones share the same record.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone, Default)]
pub struct ManualTimeoutScheduler {
    armed: Arc<Mutex<Vec<ArmedTimer>>>,
}

#[cfg(any(test, feature = "testing"))]
impl ManualTimeoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every timer ever armed, cancelled or not, oldest first.
    pub fn armed(&self) -> Vec<ArmedTimer> {
        self.armed.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Timers that have not been cancelled.
    pub fn live(&self) -> Vec<ArmedTimer> {
        self.armed()
            .into_iter()
            .filter(|t| !t.handle.is_cancelled())
            .collect()
    }

    /// Most recently armed live timer's token.
    pub fn latest_live(&self) -> Option<TimeoutToken> {
        self.live().last().map(|t| t.handle.token())
    }
}

#[cfg(any(test, feature = "testing"))]
impl TimeoutScheduler for ManualTimeoutScheduler {
    fn schedule(&mut self, delay: Duration, token: TimeoutToken) -> TimerHandle {
        let handle = TimerHandle::new(token);
        if let Ok(mut armed) = self.armed.lock() {
            armed.push(ArmedTimer {
                delay,
                handle: handle.clone(),
            });
        }
        handle
    }
}
