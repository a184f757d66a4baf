//! Process-scoped logging session
//!
//! A [`Session`] is the explicit context shared by producers and the single
//! consumer. Producers obtain a [`SessionWriter`] once per thread and reuse
//! it; the consumer is obtained with [`Session::consumer`]. There is no
//! global session: the host creates one at startup and passes it around.

use crate::consumer::Consumer;
use crate::errors::{LogError, LogResult};
use crate::session_writer::{SessionWriter, WriterQueue};
use crate::severity::Severity;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default per-writer queue capacity in bytes
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 20;

/// Lifecycle of a session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    /// No writer has been created yet
    Uninitialized,
    Active,
    /// The final drain is in progress
    Draining,
    Closed,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => SessionState::Uninitialized,
            1 => SessionState::Active,
            2 => SessionState::Draining,
            _ => SessionState::Closed,
        }
    }
}

struct SessionShared {
    queues: Mutex<Vec<Arc<WriterQueue>>>,
    next_writer_id: AtomicU64,
    min_severity: AtomicU8,
    state: AtomicU8,
    consumer_attached: AtomicBool,
    queue_capacity: usize,
}

/// Shared handle to a logging session. Cloning is cheap.
#[derive(Clone)]
pub struct Session {
    shared: Arc<SessionShared>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl Session {
    /// Create a session whose writers get `queue_capacity` bytes each
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                queues: Mutex::new(Vec::new()),
                next_writer_id: AtomicU64::new(1),
                min_severity: AtomicU8::new(Severity::Trace.as_u8()),
                state: AtomicU8::new(SessionState::Uninitialized as u8),
                consumer_attached: AtomicBool::new(false),
                queue_capacity,
            }),
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.shared.queue_capacity
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// Producer-side gate: events below this are never encoded
    pub fn min_severity(&self) -> Severity {
        Severity::from_u8(self.shared.min_severity.load(Ordering::Relaxed))
    }

    pub fn set_min_severity(&self, severity: Severity) {
        self.shared
            .min_severity
            .store(severity.as_u8(), Ordering::Relaxed);
    }

    /// Create a writer named after the calling thread
    pub fn thread_writer(&self) -> SessionWriter {
        let thread = std::thread::current();
        let name = match thread.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", thread.id()),
        };
        self.writer(name)
    }

    /// Create and register a writer with the session's default capacity
    pub fn writer(&self, name: impl Into<String>) -> SessionWriter {
        self.writer_with_capacity(name, self.shared.queue_capacity)
    }

    /// Create and register a writer with its own queue capacity in bytes
    pub fn writer_with_capacity(&self, name: impl Into<String>, capacity: usize) -> SessionWriter {
        let id = self.shared.next_writer_id.fetch_add(1, Ordering::Relaxed);
        let queue = Arc::new(WriterQueue::new(capacity));

        self.lock_queues().push(Arc::clone(&queue));

        let _ = self.shared.state.compare_exchange(
            SessionState::Uninitialized as u8,
            SessionState::Active as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );

        SessionWriter::new(self.clone(), id, name.into(), queue)
    }

    /// Attach the session's single consumer
    pub fn consumer(&self) -> LogResult<Consumer> {
        if self.state() == SessionState::Closed {
            return Err(LogError::SessionClosed);
        }

        self.shared
            .consumer_attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LogError::ConsumerTaken)?;

        Ok(Consumer::new(self.clone()))
    }

    /// Number of queues currently registered, including closed ones not yet drained
    pub fn writer_count(&self) -> usize {
        self.lock_queues().len()
    }

    /// Queues to visit in one drain pass, in registration order.
    ///
    /// Queues whose writer is gone and which hold nothing are dropped here,
    /// so a writer's last events are still drained after its thread exits.
    pub(crate) fn drain_snapshot(&self) -> Vec<Arc<WriterQueue>> {
        let mut queues = self.lock_queues();
        queues.retain(|queue| !(queue.is_closed() && queue.is_empty()));
        queues.clone()
    }

    pub(crate) fn detach_consumer(&self) {
        self.shared.consumer_attached.store(false, Ordering::Release);
    }

    pub(crate) fn begin_draining(&self) -> bool {
        let current = self.state();
        if current >= SessionState::Draining {
            return false;
        }
        self.shared
            .state
            .store(SessionState::Draining as u8, Ordering::Release);
        tracing::debug!("log session draining");
        true
    }

    pub(crate) fn close(&self) {
        self.shared
            .state
            .store(SessionState::Closed as u8, Ordering::Release);
        tracing::debug!("log session closed");
    }

    fn lock_queues(&self) -> MutexGuard<'_, Vec<Arc<WriterQueue>>> {
        // The registry only holds Arcs, so a poisoned lock still guards a valid Vec.
        self.shared
            .queues
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("min_severity", &self.min_severity())
            .field("queue_capacity", &self.shared.queue_capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_writer_activates_session() {
        let session = Session::default();
        assert_eq!(session.state(), SessionState::Uninitialized);

        let _writer = session.writer("main");
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.writer_count(), 1);
    }

    #[test]
    fn only_one_consumer_at_a_time() {
        let session = Session::default();
        let consumer = session.consumer().unwrap();
        assert!(matches!(session.consumer(), Err(LogError::ConsumerTaken)));

        drop(consumer);
        assert!(session.consumer().is_ok());
    }

    #[test]
    fn writer_ids_are_unique() {
        let session = Session::default();
        let a = session.writer("a");
        let b = session.writer("b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn dropped_empty_writer_is_pruned() {
        let session = Session::default();
        let writer = session.writer("short-lived");
        drop(writer);

        assert_eq!(session.writer_count(), 1);
        assert!(session.drain_snapshot().is_empty());
        assert_eq!(session.writer_count(), 0);
    }

    #[test]
    fn closed_session_refuses_consumers() {
        let session = Session::default();
        assert!(session.begin_draining());
        assert!(!session.begin_draining());
        session.close();
        assert!(matches!(session.consumer(), Err(LogError::SessionClosed)));
    }
}
