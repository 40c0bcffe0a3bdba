//! Error type for format-string parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// The input is not a well-formed format string.
///
/// `offset` is the byte position where parsing stopped and `remainder` the
/// unconsumed tail of the input from that position on. `message` and
/// `expected` carry the parser's diagnostics for nicer reporting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("syntax error at byte {offset}: {message}")]
pub struct SyntaxError {
    pub offset: usize,
    pub remainder: String,
    pub message: String,
    pub expected: Vec<String>,
}

impl SyntaxError {
    /// Collapse chumsky's diagnostics into a single error, keeping the one
    /// that made it furthest into the input.
    pub(crate) fn from_rich(errors: Vec<chumsky::error::Rich<'_, char>>, source: &str) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let Some(err) = errors
            .into_iter()
            .max_by_key(|e| e.span().into_range().start)
        else {
            return Self {
                offset: source.len(),
                remainder: String::new(),
                message: "parse failed".to_string(),
                expected: Vec::new(),
            };
        };

        let offset = err.span().into_range().start;

        let message = match err.reason() {
            RichReason::Custom(msg) => msg.to_string(),
            RichReason::ExpectedFound { .. } => match err.found() {
                Some(c) => format!("unexpected character {:?}", c),
                None => "unexpected end of input".to_string(),
            },
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|pattern| match pattern {
                RichPattern::Token(c) => Some(format_char(c)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any character".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        Self {
            offset,
            remainder: source.get(offset..).unwrap_or_default().to_string(),
            message,
            expected,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let end = (self.offset + 1).min(source.len()).max(self.offset);
        let span = self.offset..end;

        let expected_str = if self.expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", self.expected.join(", "))
        };

        let mut buf = Vec::new();
        Report::build(ReportKind::Error, filename, self.offset)
            .with_message(&self.message)
            .with_label(
                Label::new((filename, span))
                    .with_message(format!("{}{}", self.message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }
}

fn format_char(c: &char) -> String {
    format!("{:?}", c)
}
