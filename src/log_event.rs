//! Structured log events and their binary frame encoding
//!
//! A frame is a big-endian `u32` body length followed by a MessagePack
//! body. Frames are self-delimiting, so a batch is just frames laid end to
//! end and a binary log file is a sequence of batches.

use crate::errors::{LogError, LogResult};
use crate::severity::Severity;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Length of the frame header carrying the body size
pub const FRAME_HEADER_LEN: usize = 4;

/// Upper bound on a single frame body. Larger length prefixes are treated as corruption.
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Where a log call was made
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub module: String,
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(module: &str, file: &str, line: u32) -> Self {
        Self {
            module: module.to_string(),
            file: file.to_string(),
            line,
        }
    }

    /// File name without its directories
    pub fn file_name(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }
}

/// Call-site location as captured by the logging macros
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StaticLocation {
    pub module: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl StaticLocation {
    pub const fn new(module: &'static str, file: &'static str, line: u32) -> Self {
        Self { module, file, line }
    }
}

/// An argument value carried alongside the format template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Arg {
    None,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::None => f.write_str("{null}"),
            Arg::Bool(v) => write!(f, "{v}"),
            Arg::Int(v) => write!(f, "{v}"),
            Arg::UInt(v) => write!(f, "{v}"),
            Arg::Float(v) => write!(f, "{v}"),
            Arg::Char(v) => write!(f, "{v}"),
            Arg::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! arg_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for Arg {
                fn from(value: $source) -> Self {
                    Arg::$variant(value as $target)
                }
            }
        )+
    };
}

arg_from!(Int as i64: i8, i16, i32, i64, isize);
arg_from!(UInt as u64: u8, u16, u32, u64, usize);
arg_from!(Float as f64: f32, f64);

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Str(value.clone())
    }
}

impl From<Duration> for Arg {
    fn from(value: Duration) -> Self {
        Arg::Str(format!("{value:?}"))
    }
}

/// Instants render as RFC 3339 in UTC with nanosecond precision
impl From<DateTime<Utc>> for Arg {
    fn from(value: DateTime<Utc>) -> Self {
        Arg::Str(value.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }
}

impl From<SystemTime> for Arg {
    fn from(value: SystemTime) -> Self {
        Arg::from(DateTime::<Utc>::from(value))
    }
}

impl From<&Path> for Arg {
    fn from(value: &Path) -> Self {
        Arg::Str(value.display().to_string())
    }
}

impl From<&PathBuf> for Arg {
    fn from(value: &PathBuf) -> Self {
        Arg::from(value.as_path())
    }
}

impl From<&std::io::Error> for Arg {
    fn from(value: &std::io::Error) -> Self {
        Arg::Str(value.to_string())
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::None, Into::into)
    }
}

/// A decoded log event. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    severity: Severity,
    category: String,
    timestamp: i64,
    writer_id: u64,
    writer_name: String,
    location: SourceLocation,
    format: String,
    args: Vec<Arg>,
}

impl LogEvent {
    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Nanoseconds since the Unix epoch, UTC
    pub fn timestamp_nanos(&self) -> i64 {
        self.timestamp
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.timestamp)
    }

    pub fn writer_id(&self) -> u64 {
        self.writer_id
    }

    pub fn writer_name(&self) -> &str {
        &self.writer_name
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// The format template with its arguments substituted
    pub fn message(&self) -> String {
        render_message(&self.format, &self.args)
    }
}

/// Borrowed view of an event, serialized on the producer side so the hot
/// path only allocates the output buffer. Field names match [`LogEvent`].
#[derive(Serialize)]
pub(crate) struct EventFrame<'a> {
    pub severity: Severity,
    pub category: &'a str,
    pub timestamp: i64,
    pub writer_id: u64,
    pub writer_name: &'a str,
    pub location: StaticLocation,
    pub format: &'a str,
    pub args: &'a [Arg],
}

/// Substitute `{}` placeholders with `args`, in order.
///
/// `{{` and `}}` produce literal braces. Placeholders without a matching
/// argument stay as `{}`; surplus arguments are ignored.
pub fn render_message(format: &str, args: &[Arg]) -> String {
    let mut out = String::with_capacity(format.len() + args.len() * 8);
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('{', Some('{')) => {
                chars.next();
                out.push('{');
            }
            ('}', Some('}')) => {
                chars.next();
                out.push('}');
            }
            ('{', Some('}')) => {
                chars.next();
                match args.next() {
                    Some(arg) => out.push_str(&arg.to_string()),
                    None => out.push_str("{}"),
                }
            }
            _ => out.push(c),
        }
    }

    out
}

pub(crate) fn encode_frame(frame: &EventFrame<'_>) -> LogResult<Vec<u8>> {
    let body = rmp_serde::to_vec_named(frame)?;
    if body.len() > MAX_FRAME_SIZE {
        return Err(LogError::FrameTooLarge {
            size: body.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let mut out = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a single frame body (without its length header)
pub fn decode_body(body: &[u8]) -> LogResult<LogEvent> {
    Ok(rmp_serde::from_slice(body)?)
}

/// Split a byte batch into frame bodies.
///
/// A bad length prefix makes the rest of the batch unreadable, so the
/// iterator yields that error once and then ends.
pub struct Frames<'a> {
    remaining: &'a [u8],
}

impl<'a> Frames<'a> {
    pub fn new(batch: &'a [u8]) -> Self {
        Self { remaining: batch }
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = LogResult<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        let result = split_frame(self.remaining);
        match result {
            Ok((body, rest)) => {
                self.remaining = rest;
                Some(Ok(body))
            }
            Err(e) => {
                self.remaining = &[];
                Some(Err(e))
            }
        }
    }
}

fn split_frame(buf: &[u8]) -> LogResult<(&[u8], &[u8])> {
    if buf.len() < FRAME_HEADER_LEN {
        return Err(LogError::TruncatedFrame {
            expected: FRAME_HEADER_LEN,
            available: buf.len(),
        });
    }

    let mut header = [0u8; FRAME_HEADER_LEN];
    header.copy_from_slice(&buf[..FRAME_HEADER_LEN]);
    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(LogError::FrameTooLarge {
            size: len,
            max: MAX_FRAME_SIZE,
        });
    }

    let rest = &buf[FRAME_HEADER_LEN..];
    if rest.len() < len {
        return Err(LogError::TruncatedFrame {
            expected: len,
            available: rest.len(),
        });
    }

    Ok(rest.split_at(len))
}

/// Decode every event in a batch. Body errors are yielded and skipped;
/// framing errors end the iteration.
pub fn decode_batch(batch: &[u8]) -> impl Iterator<Item = LogResult<LogEvent>> + '_ {
    Frames::new(batch).map(|frame| frame.and_then(decode_body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(args: &[Arg]) -> Vec<u8> {
        encode_frame(&EventFrame {
            severity: Severity::Warning,
            category: "net",
            timestamp: 1_700_000_000_123_456_789,
            writer_id: 3,
            writer_name: "worker-3",
            location: StaticLocation::new("spudlog::net", "src/net/conn.rs", 42),
            format: "retry {} of {}",
            args,
        })
        .unwrap()
    }

    #[test]
    fn renders_placeholders_in_order() {
        let args = [Arg::from(2u8), Arg::from("three")];
        assert_eq!(render_message("{} then {}", &args), "2 then three");
    }

    #[test]
    fn renders_escaped_braces_and_missing_args() {
        assert_eq!(render_message("{{x}} = {}", &[]), "{x} = {}");
        assert_eq!(render_message("only {}", &[Arg::Int(1), Arg::Int(2)]), "only 1");
    }

    #[test]
    fn option_adapter_maps_none() {
        assert_eq!(Arg::from(None::<u32>), Arg::None);
        assert_eq!(Arg::from(Some(-4i32)), Arg::Int(-4));
        assert_eq!(render_message("{}", &[Arg::None]), "{null}");
    }

    #[test]
    fn time_points_render_as_utc() {
        let at = SystemTime::UNIX_EPOCH + Duration::from_nanos(1_700_000_000_123_456_789);
        let expected = Arg::Str("2023-11-14T22:13:20.123456789Z".to_string());
        assert_eq!(Arg::from(at), expected);
        assert_eq!(Arg::from(DateTime::<Utc>::from(at)), expected);
    }

    #[test]
    fn frame_decodes_to_the_logged_event() {
        let bytes = sample_frame(&[Arg::UInt(1), Arg::UInt(5)]);
        let events: Vec<_> = decode_batch(&bytes).collect::<LogResult<_>>().unwrap();

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.severity(), Severity::Warning);
        assert_eq!(event.category(), "net");
        assert_eq!(event.writer_name(), "worker-3");
        assert_eq!(event.location().file_name(), "conn.rs");
        assert_eq!(event.location().line, 42);
        assert_eq!(event.message(), "retry 1 of 5");
        assert_eq!(event.timestamp_nanos(), 1_700_000_000_123_456_789);
    }

    #[test]
    fn truncated_batch_reports_one_error() {
        let mut bytes = sample_frame(&[]);
        let second = sample_frame(&[Arg::Bool(true)]);
        bytes.extend_from_slice(&second[..second.len() - 3]);

        let results: Vec<_> = decode_batch(&bytes).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(LogError::TruncatedFrame { .. })));
    }

    #[test]
    fn oversized_length_prefix_is_rejected() {
        let bytes = u32::MAX.to_be_bytes();
        let results: Vec<_> = decode_batch(&bytes).collect();
        assert!(matches!(results[0], Err(LogError::FrameTooLarge { .. })));
    }

    #[test]
    fn corrupt_body_is_skipped() {
        let mut bytes = vec![0, 0, 0, 2, 0xc1, 0xc1];
        bytes.extend(sample_frame(&[]));

        let results: Vec<_> = decode_batch(&bytes).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].as_ref().is_err_and(LogError::is_decode_error));
        assert!(results[1].is_ok());
    }
}
