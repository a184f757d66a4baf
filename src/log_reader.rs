//! Streaming reader for binary log files
//!
//! Reads frames written by [`BinarySink`](crate::BinarySink) back into
//! [`LogEvent`]s. Used by `spud dump` and by tests.

use crate::errors::{LogError, LogResult};
use crate::log_event::{decode_body, LogEvent, FRAME_HEADER_LEN, MAX_FRAME_SIZE};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

pub struct LogReader<R: Read> {
    input: R,
    body: Vec<u8>,
    done: bool,
}

impl LogReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> LogResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| LogError::io(format!("open {}", path.display()), e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> LogReader<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            body: Vec::new(),
            done: false,
        }
    }

    /// Read the next frame body. `Ok(None)` on a clean end of input.
    fn next_body(&mut self) -> LogResult<Option<&[u8]>> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        let got = read_full(&mut self.input, &mut header)?;
        if got == 0 {
            return Ok(None);
        }
        if got < FRAME_HEADER_LEN {
            return Err(LogError::TruncatedFrame {
                expected: FRAME_HEADER_LEN,
                available: got,
            });
        }

        let len = u32::from_be_bytes(header) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(LogError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_SIZE,
            });
        }

        self.body.resize(len, 0);
        let got = read_full(&mut self.input, &mut self.body)?;
        if got < len {
            return Err(LogError::TruncatedFrame {
                expected: len,
                available: got,
            });
        }

        Ok(Some(&self.body))
    }
}

impl<R: Read> Iterator for LogReader<R> {
    type Item = LogResult<LogEvent>;

    /// Body decode errors are yielded and reading continues; framing and
    /// I/O errors are yielded once and end the stream.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_body() {
            Ok(Some(body)) => Some(decode_body(body)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn read_full<R: Read>(input: &mut R, buf: &mut [u8]) -> LogResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(LogError::io("read binary log", e)),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{log_c, log_t, Session, Severity};
    use std::io::Cursor;

    fn batch() -> Vec<u8> {
        let session = Session::default();
        let writer = session.writer("main");
        let mut consumer = session.consumer().unwrap();
        log_t!(writer, "main", "tick {}", 1u64);
        log_c!(writer, "main", "Out of memory!");
        consumer.collect_batch().0
    }

    #[test]
    fn reads_all_events_from_stream() {
        let events: Vec<_> = LogReader::new(Cursor::new(batch()))
            .collect::<LogResult<_>>()
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity(), Severity::Trace);
        assert_eq!(events[1].message(), "Out of memory!");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(LogReader::new(Cursor::new(Vec::new())).count(), 0);
    }

    #[test]
    fn truncated_tail_is_reported_once() {
        let mut bytes = batch();
        bytes.truncate(bytes.len() - 1);

        let results: Vec<_> = LogReader::new(Cursor::new(bytes)).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(LogError::TruncatedFrame { .. })));
    }
}
