//! The session's single event consumer
//!
//! A drain pass snapshots the registered writer queues and visits them in
//! registration order. For each queue it takes at most the number of frames
//! present when the visit starts, so a busy producer cannot keep a pass
//! running forever. Nothing here blocks on producers.

use crate::log_event::{decode_body, LogEvent, FRAME_HEADER_LEN};
use crate::log_sink::BatchSink;
use crate::session_context::Session;
use crate::session_writer::WriterQueue;
use std::sync::Arc;

/// Counters for one consume call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeStats {
    pub events: usize,
    pub bytes: usize,
}

impl ConsumeStats {
    pub fn is_empty(&self) -> bool {
        self.events == 0
    }
}

/// Exclusive reader of a session's queues. See [`Session::consumer`].
pub struct Consumer {
    session: Session,
}

impl Consumer {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Lazily drain encoded frames, each including its length header
    pub fn drain_frames(&mut self) -> FrameDrain<'_> {
        FrameDrain {
            queues: self.session.drain_snapshot(),
            index: 0,
            budget: None,
            _consumer: self,
        }
    }

    /// Lazily drain decoded events.
    ///
    /// Frames that fail to decode are reported and skipped.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain {
            frames: self.drain_frames(),
        }
    }

    /// Drain everything currently queued into one contiguous batch
    pub fn collect_batch(&mut self) -> (Vec<u8>, ConsumeStats) {
        let mut batch = Vec::new();
        let mut stats = ConsumeStats::default();

        for frame in self.drain_frames() {
            stats.events += 1;
            stats.bytes += frame.len();
            batch.extend_from_slice(&frame);
        }

        (batch, stats)
    }

    /// Drain everything currently queued and hand it to `sink` as one batch.
    /// With nothing queued the sink is not called.
    pub fn consume<S: BatchSink>(&mut self, sink: &mut S) -> ConsumeStats {
        let (batch, stats) = self.collect_batch();
        if !stats.is_empty() {
            sink.write_batch(&batch);
        }
        stats
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        self.session.detach_consumer();
    }
}

/// Iterator over encoded frames. Created by [`Consumer::drain_frames`].
pub struct FrameDrain<'a> {
    queues: Vec<Arc<WriterQueue>>,
    index: usize,
    budget: Option<usize>,
    _consumer: &'a mut Consumer,
}

impl Iterator for FrameDrain<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(queue) = self.queues.get(self.index) {
            let budget = self.budget.get_or_insert_with(|| queue.len());
            if *budget > 0 {
                if let Some(frame) = queue.pop() {
                    *budget -= 1;
                    return Some(frame);
                }
            }

            self.index += 1;
            self.budget = None;
        }

        None
    }
}

/// Iterator over decoded events. Created by [`Consumer::drain`].
pub struct Drain<'a> {
    frames: FrameDrain<'a>,
}

impl Iterator for Drain<'_> {
    type Item = LogEvent;

    fn next(&mut self) -> Option<Self::Item> {
        for frame in self.frames.by_ref() {
            match decode_body(&frame[FRAME_HEADER_LEN..]) {
                Ok(event) => return Some(event),
                Err(e) => tracing::warn!("Skipping undecodable log frame: {}", e),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{log_i, log_w};

    #[test]
    fn drain_without_events_is_empty() {
        let session = Session::default();
        let _writer = session.writer("main");
        let mut consumer = session.consumer().unwrap();

        assert_eq!(consumer.drain().count(), 0);
        assert!(consumer.collect_batch().1.is_empty());
    }

    #[test]
    fn drain_is_fifo_per_writer() {
        let session = Session::default();
        let writer = session.writer("main");
        let mut consumer = session.consumer().unwrap();

        for i in 0..50u32 {
            log_i!(writer, "seq", "event {}", i);
        }

        let messages: Vec<String> = consumer.drain().map(|e| e.message()).collect();
        let expected: Vec<String> = (0..50).map(|i| format!("event {i}")).collect();
        assert_eq!(messages, expected);
    }

    #[test]
    fn drain_is_restartable() {
        let session = Session::default();
        let writer = session.writer("main");
        let mut consumer = session.consumer().unwrap();

        log_i!(writer, "a", "first");
        assert_eq!(consumer.drain().count(), 1);

        log_w!(writer, "a", "second");
        let events: Vec<_> = consumer.drain().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message(), "second");
    }

    #[test]
    fn partially_consumed_drain_leaves_rest_queued() {
        let session = Session::default();
        let writer = session.writer("main");
        let mut consumer = session.consumer().unwrap();

        for i in 0..3 {
            log_i!(writer, "a", "n={}", i);
        }

        let first = consumer.drain().next().unwrap();
        assert_eq!(first.message(), "n=0");

        let rest: Vec<_> = consumer.drain().map(|e| e.message()).collect();
        assert_eq!(rest, vec!["n=1", "n=2"]);
    }

    #[test]
    fn events_of_exited_writer_are_still_drained() {
        let session = Session::default();
        let mut consumer = session.consumer().unwrap();

        {
            let writer = session.writer("gone");
            log_i!(writer, "a", "last words");
        }

        let events: Vec<_> = consumer.drain().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].writer_name(), "gone");

        consumer.drain().count();
        assert_eq!(session.writer_count(), 0);
    }
}
