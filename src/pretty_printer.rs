//! Text rendering of log events
//!
//! The event format is a template of `%` tokens:
//!
//! | token | expands to |
//! |-------|------------|
//! | `%S`  | severity tag (`INFO`, `EROR`, ...) |
//! | `%C`  | category |
//! | `%d`  | timestamp in local time, using the date format |
//! | `%u`  | timestamp in UTC, using the date format |
//! | `%n`  | writer name |
//! | `%t`  | writer id |
//! | `%m`  | message with arguments substituted |
//! | `%M`  | module path of the call site |
//! | `%F`  | full source file path |
//! | `%G`  | source file name |
//! | `%L`  | source line |
//! | `%%`  | a literal `%` |
//!
//! Unknown tokens are printed as-is.

use crate::errors::{LogError, LogResult};
use crate::log_event::LogEvent;
use chrono::format::{Item, StrftimeItems};
use chrono::Local;
use std::fmt::Write as _;

pub const DEFAULT_EVENT_FORMAT: &str = "%S %C [%d] %n %m (%G:%L)\n";
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Severity,
    Category,
    LocalDate,
    UtcDate,
    WriterName,
    WriterId,
    Message,
    Module,
    FullPath,
    FileName,
    Line,
}

#[derive(Debug, Clone)]
pub struct PrettyPrinter {
    tokens: Vec<Token>,
    date_format: String,
}

impl Default for PrettyPrinter {
    fn default() -> Self {
        Self {
            tokens: parse_event_format(DEFAULT_EVENT_FORMAT),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl PrettyPrinter {
    /// Build a printer, rejecting date formats chrono cannot render
    pub fn new(event_format: &str, date_format: &str) -> LogResult<Self> {
        if StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error)) {
            return Err(LogError::config(format!(
                "invalid date format: {date_format:?}"
            )));
        }

        Ok(Self {
            tokens: parse_event_format(event_format),
            date_format: date_format.to_string(),
        })
    }

    pub fn render(&self, event: &LogEvent) -> String {
        let mut out = String::new();
        self.render_into(&mut out, event);
        out
    }

    pub fn render_into(&self, out: &mut String, event: &LogEvent) {
        for token in &self.tokens {
            // Writing into a String cannot fail.
            let _ = match token {
                Token::Literal(text) => out.write_str(text),
                Token::Severity => out.write_str(event.severity().tag()),
                Token::Category => out.write_str(event.category()),
                Token::LocalDate => write!(
                    out,
                    "{}",
                    event
                        .timestamp()
                        .with_timezone(&Local)
                        .format(&self.date_format)
                ),
                Token::UtcDate => write!(out, "{}", event.timestamp().format(&self.date_format)),
                Token::WriterName => out.write_str(event.writer_name()),
                Token::WriterId => write!(out, "{}", event.writer_id()),
                Token::Message => out.write_str(&event.message()),
                Token::Module => out.write_str(&event.location().module),
                Token::FullPath => out.write_str(&event.location().file),
                Token::FileName => out.write_str(event.location().file_name()),
                Token::Line => write!(out, "{}", event.location().line),
            };
        }
    }
}

fn parse_event_format(format: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            literal.push(c);
            continue;
        }

        let token = match chars.next() {
            Some('S') => Token::Severity,
            Some('C') => Token::Category,
            Some('d') => Token::LocalDate,
            Some('u') => Token::UtcDate,
            Some('n') => Token::WriterName,
            Some('t') => Token::WriterId,
            Some('m') => Token::Message,
            Some('M') => Token::Module,
            Some('F') => Token::FullPath,
            Some('G') => Token::FileName,
            Some('L') => Token::Line,
            Some('%') => {
                literal.push('%');
                continue;
            }
            Some(other) => {
                literal.push('%');
                literal.push(other);
                continue;
            }
            None => {
                literal.push('%');
                continue;
            }
        };

        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(token);
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }

    tokens
}
