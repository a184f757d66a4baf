// log_sink.rs
// Purpose: Destinations for drained batches: binary archive, colorized text, and the fan-out of both

use crate::errors::{LogError, LogResult};
use crate::log_event::decode_batch;
use crate::pretty_printer::PrettyPrinter;
use crate::severity::{Severity, COLOR_RESET};
use std::io::Write;

/// Receives drained batches. Implementations report their own failures;
/// a batch that cannot be written never stops the drain loop.
pub trait BatchSink {
    fn write_batch(&mut self, batch: &[u8]);
}

/// Failure counters and throughput for a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub batches: u64,
    pub binary_bytes: u64,
    pub text_lines: u64,
    pub decode_errors: u64,
    pub io_errors: u64,
}

/// Appends batches verbatim. Never filters.
pub struct BinarySink<W: Write> {
    out: W,
    stats: SinkStats,
}

impl<W: Write> BinarySink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stats: SinkStats::default(),
        }
    }

    pub fn try_write(&mut self, batch: &[u8]) -> LogResult<()> {
        self.out
            .write_all(batch)
            .and_then(|_| self.out.flush())
            .map_err(|e| LogError::io("write binary log", e))?;
        self.stats.binary_bytes += batch.len() as u64;
        Ok(())
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> BatchSink for BinarySink<W> {
    fn write_batch(&mut self, batch: &[u8]) {
        self.stats.batches += 1;
        if let Err(e) = self.try_write(batch) {
            self.stats.io_errors += 1;
            tracing::error!("{}", e);
        }
    }
}

/// Decodes batches and writes one line per event at or above the threshold.
pub struct TextSink<W: Write> {
    out: W,
    printer: PrettyPrinter,
    threshold: Severity,
    color: bool,
    stats: SinkStats,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W, printer: PrettyPrinter, threshold: Severity) -> Self {
        Self {
            out,
            printer,
            threshold,
            color: true,
            stats: SinkStats::default(),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Render the qualifying events of a batch. Undecodable frames are
    /// reported and skipped; the first I/O error aborts the batch.
    pub fn try_write(&mut self, batch: &[u8]) -> LogResult<()> {
        let mut line = String::new();

        for decoded in decode_batch(batch) {
            let event = match decoded {
                Ok(event) => event,
                Err(e) => {
                    self.stats.decode_errors += 1;
                    tracing::error!("Failed to convert buffer to text: {}", e);
                    continue;
                }
            };

            if !event.severity().passes(self.threshold) {
                continue;
            }

            line.clear();
            if self.color {
                line.push_str(event.severity().color());
            }
            self.printer.render_into(&mut line, &event);
            if self.color {
                line.push_str(COLOR_RESET);
            }

            self.out
                .write_all(line.as_bytes())
                .map_err(|e| LogError::io("write text log", e))?;
            self.stats.text_lines += 1;
        }

        self.out
            .flush()
            .map_err(|e| LogError::io("flush text log", e))
    }
}

impl<W: Write> BatchSink for TextSink<W> {
    fn write_batch(&mut self, batch: &[u8]) {
        self.stats.batches += 1;
        if let Err(e) = self.try_write(batch) {
            self.stats.io_errors += 1;
            tracing::error!("{}", e);
        }
    }
}

/// Writes each batch to the binary sink first, then to the text sink.
///
/// The text path runs after the binary write has completed and its failures
/// are contained, so the archive never depends on it.
pub struct MultiSink<B: Write, T: Write> {
    binary: BinarySink<B>,
    text: TextSink<T>,
}

impl<B: Write, T: Write> MultiSink<B, T> {
    pub fn new(binary: BinarySink<B>, text: TextSink<T>) -> Self {
        Self { binary, text }
    }

    pub fn binary(&self) -> &BinarySink<B> {
        &self.binary
    }

    pub fn text(&self) -> &TextSink<T> {
        &self.text
    }

    pub fn into_parts(self) -> (BinarySink<B>, TextSink<T>) {
        (self.binary, self.text)
    }

    /// Combined counters of both paths. `batches` counts fan-out calls.
    pub fn stats(&self) -> SinkStats {
        let binary = self.binary.stats();
        let text = self.text.stats();
        SinkStats {
            batches: binary.batches,
            binary_bytes: binary.binary_bytes,
            text_lines: text.text_lines,
            decode_errors: text.decode_errors,
            io_errors: binary.io_errors + text.io_errors,
        }
    }
}

impl<B: Write, T: Write> BatchSink for MultiSink<B, T> {
    fn write_batch(&mut self, batch: &[u8]) {
        self.binary.write_batch(batch);
        self.text.write_batch(batch);
    }
}
