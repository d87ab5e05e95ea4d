//! Per-request context carried through every store round trip.
//!
//! # Responsibility
//! - Identify one logical operation for log correlation.
//! - Carry the cancellation signal and optional deadline of that operation.
//!
//! # Invariants
//! - A context is never shared between requests; clones share one signal.
//! - Cancellation is one-way: once fired it stays fired.

use std::panic::RefUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Shareable cancellation signal.
///
/// Clones observe the same flag, so the transport layer can keep one handle
/// and fire it from another thread while the request is executing.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires the signal. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Identity, cancellation and deadline for one logical operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: Uuid,
    cancellation: CancellationHandle,
    deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// Creates a context with a fresh request id, no deadline, not cancelled.
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            cancellation: CancellationHandle::new(),
            deadline: None,
        }
    }

    /// Replaces the cancellation signal with an externally owned handle.
    pub fn with_cancellation(mut self, handle: CancellationHandle) -> Self {
        self.cancellation = handle;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn cancellation(&self) -> &CancellationHandle {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn deadline_exceeded(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Returns a probe that reports `true` once the operation must stop.
    ///
    /// The probe owns its captures so it can be installed as a SQLite
    /// progress handler for the duration of one statement.
    pub(crate) fn interrupt_probe(
        &self,
    ) -> impl FnMut() -> bool + Send + RefUnwindSafe + 'static {
        let cancelled = Arc::clone(&self.cancellation.cancelled);
        let deadline = self.deadline;
        move || {
            cancelled.load(Ordering::Relaxed)
                || deadline.is_some_and(|deadline| Instant::now() >= deadline)
        }
    }
}
