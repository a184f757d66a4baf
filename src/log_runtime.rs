//! Host-facing driver for the logging pipeline
//!
//! [`LogRuntime`] owns the session's consumer together with the
//! binary-file + console sink. The host calls [`LogRuntime::process`] on its
//! idle cadence and [`LogRuntime::shutdown`] (or simply drops the runtime)
//! at exit. The binary file is opened at the first drain that has events,
//! truncating whatever an earlier session left there, and stays open until
//! the runtime is dropped. Within a session the archive only grows.

use crate::config::LogConfig;
use crate::consumer::{ConsumeStats, Consumer};
use crate::errors::{LogError, LogResult};
use crate::log_sink::{BatchSink, BinarySink, MultiSink, SinkStats, TextSink};
use crate::session_context::{Session, SessionState};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Create a session sized and gated according to `config`
pub fn open_session(config: &LogConfig) -> Session {
    let session = Session::new(config.queue_capacity);
    session.set_min_severity(config.min_severity);
    session
}

enum Output<T: Write> {
    /// File not opened yet; only the text half exists
    Pending(TextSink<T>),
    Open(MultiSink<File, T>),
    /// Transient state while switching variants
    Empty,
}

pub struct LogRuntime<T: Write = io::Stderr> {
    consumer: Consumer,
    log_path: PathBuf,
    output: Output<T>,
}

impl LogRuntime<io::Stderr> {
    /// Runtime writing colorized lines to stderr
    pub fn new(session: &Session, config: &LogConfig) -> LogResult<Self> {
        Self::with_text_output(session, config, io::stderr())
    }
}

impl<T: Write> LogRuntime<T> {
    pub fn with_text_output(session: &Session, config: &LogConfig, text: T) -> LogResult<Self> {
        config.validate()?;
        let text = TextSink::new(text, config.printer()?, config.console_severity)
            .with_color(config.color);

        Ok(Self {
            consumer: session.consumer()?,
            log_path: config.log_file.clone(),
            output: Output::Pending(text),
        })
    }

    pub fn session(&self) -> &Session {
        self.consumer.session()
    }

    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Whether the binary file has been opened
    pub fn is_open(&self) -> bool {
        matches!(self.output, Output::Open(_))
    }

    pub fn sink_stats(&self) -> SinkStats {
        match &self.output {
            Output::Open(sink) => sink.stats(),
            Output::Pending(text) => text.stats(),
            Output::Empty => SinkStats::default(),
        }
    }

    /// Drain all queued events to the sinks. A no-op once the session is closed.
    pub fn process(&mut self) -> ConsumeStats {
        if self.state() == SessionState::Closed {
            return ConsumeStats::default();
        }
        self.drain_once()
    }

    /// Final drain, then close the session. Later calls do nothing.
    pub fn shutdown(&mut self) -> ConsumeStats {
        if !self.session().begin_draining() {
            return ConsumeStats::default();
        }

        let stats = self.drain_once();
        self.session().close();
        tracing::debug!(
            events = stats.events,
            "final log drain complete for {}",
            self.log_path.display()
        );
        stats
    }

    fn drain_once(&mut self) -> ConsumeStats {
        let (batch, stats) = self.consumer.collect_batch();
        if stats.is_empty() {
            return stats;
        }

        if let Err(e) = self.ensure_open() {
            tracing::error!("{}", e);
        }

        match &mut self.output {
            Output::Open(sink) => sink.write_batch(&batch),
            // The archive is unavailable this cycle, keep the console informed.
            Output::Pending(text) => text.write_batch(&batch),
            Output::Empty => {}
        }

        stats
    }

    fn ensure_open(&mut self) -> LogResult<()> {
        if !matches!(self.output, Output::Pending(_)) {
            return Ok(());
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.log_path)
            .map_err(|e| LogError::io(format!("open {}", self.log_path.display()), e))?;

        if let Output::Pending(text) = std::mem::replace(&mut self.output, Output::Empty) {
            self.output = Output::Open(MultiSink::new(BinarySink::new(file), text));
            tracing::debug!("opened binary log {}", self.log_path.display());
        }
        Ok(())
    }
}

impl<T: Write> Drop for LogRuntime<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
