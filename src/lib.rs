//! Library root for the `spudlog` crate
//!
//! Structured events are encoded on the calling thread into a per-thread
//! queue, drained by a single consumer, and fanned out to an append-only
//! binary archive and a severity-filtered, colorized console stream.
//!
//! ```
//! use spudlog::{log_e, log_i, BinarySink, MultiSink, PrettyPrinter, Session, Severity, TextSink};
//!
//! let session = Session::default();
//! let writer = session.writer("main");
//! let mut consumer = session.consumer().unwrap();
//!
//! log_i!(writer, "app", "A");
//! log_e!(writer, "app", "B");
//!
//! let text = TextSink::new(Vec::new(), PrettyPrinter::default(), Severity::Warning);
//! let mut sink = MultiSink::new(BinarySink::new(Vec::new()), text);
//! assert_eq!(consumer.consume(&mut sink).events, 2);
//! assert_eq!(sink.stats().text_lines, 1);
//! ```

// Core error handling
pub mod errors;

// Event model and encoding
pub mod log_event;
pub mod severity;

// Producers
mod macros;
pub mod session_context;
pub mod session_writer;

// Consumer and sinks
pub mod consumer;
pub mod log_sink;
pub mod pretty_printer;

// Reading archives back
pub mod log_reader;

// Configuration & CLI
pub mod cli;
pub mod config;
pub mod config_loader;

// Host lifecycle
pub mod log_runtime;


pub use config::LogConfig;
pub use consumer::{ConsumeStats, Consumer, Drain, FrameDrain};
pub use errors::{LogError, LogResult};
pub use log_event::{render_message, Arg, LogEvent, SourceLocation, StaticLocation};
pub use log_reader::LogReader;
pub use log_runtime::{open_session, LogRuntime};
pub use log_sink::{BatchSink, BinarySink, MultiSink, SinkStats, TextSink};
pub use pretty_printer::PrettyPrinter;
pub use session_context::{Session, SessionState};
pub use session_writer::SessionWriter;
pub use severity::Severity;
