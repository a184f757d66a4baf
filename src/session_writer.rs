//! Per-thread event encoder
//!
//! Each producing thread holds one [`SessionWriter`]. A log call encodes the
//! event into a frame and pushes it onto the writer's bounded queue; it never
//! blocks and never reports failure. When the queue lacks room the event is
//! dropped.

use crate::log_event::{encode_frame, Arg, EventFrame, StaticLocation};
use crate::session_context::{Session, SessionState};
use crate::severity::Severity;
use chrono::Utc;
use crossbeam_queue::SegQueue;
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Single-producer, single-consumer queue of encoded frames with a byte budget.
pub(crate) struct WriterQueue {
    frames: SegQueue<Vec<u8>>,
    used: AtomicUsize,
    capacity: usize,
    closed: AtomicBool,
}

impl WriterQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            frames: SegQueue::new(),
            used: AtomicUsize::new(0),
            capacity,
            closed: AtomicBool::new(false),
        }
    }

    /// Push a frame if it fits. Only the owning writer calls this, so the
    /// check and the reservation cannot race with another producer.
    pub(crate) fn try_push(&self, frame: Vec<u8>) -> bool {
        let len = frame.len();
        let used = self.used.load(Ordering::Acquire);
        if used.saturating_add(len) > self.capacity {
            return false;
        }

        self.used.fetch_add(len, Ordering::AcqRel);
        self.frames.push(frame);
        true
    }

    pub(crate) fn pop(&self) -> Option<Vec<u8>> {
        let frame = self.frames.pop()?;
        self.used.fetch_sub(frame.len(), Ordering::AcqRel);
        Some(frame)
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn used_bytes(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Handle used by one thread to log into a [`Session`].
///
/// The handle is `Send` but not `Sync`: it can move to the thread that will
/// use it, but two threads never push into the same queue at once.
pub struct SessionWriter {
    session: Session,
    id: u64,
    name: String,
    queue: Arc<WriterQueue>,
    _single_producer: PhantomData<Cell<()>>,
}

impl SessionWriter {
    pub(crate) fn new(session: Session, id: u64, name: String, queue: Arc<WriterQueue>) -> Self {
        Self {
            session,
            id,
            name,
            queue,
            _single_producer: PhantomData,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Bytes currently waiting to be drained
    pub fn queued_bytes(&self) -> usize {
        self.queue.used_bytes()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Whether an event of `severity` would be encoded right now
    pub fn enabled(&self, severity: Severity) -> bool {
        severity.passes(self.session.min_severity())
            && self.session.state() < SessionState::Closed
    }

    /// Record one event. Disabled, unencodable or overflowing events are dropped.
    pub fn log(
        &self,
        severity: Severity,
        category: &str,
        location: StaticLocation,
        format: &str,
        args: &[Arg],
    ) {
        if !self.enabled(severity) {
            return;
        }

        let frame = EventFrame {
            severity,
            category,
            timestamp: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
            writer_id: self.id,
            writer_name: &self.name,
            location,
            format,
            args,
        };

        if let Ok(bytes) = encode_frame(&frame) {
            self.queue.try_push(bytes);
        }
    }
}

impl Drop for SessionWriter {
    fn drop(&mut self) {
        self.queue.close();
    }
}

impl std::fmt::Debug for SessionWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionWriter")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("queued_bytes", &self.queued_bytes())
            .field("capacity", &self.capacity())
            .finish()
    }
}
