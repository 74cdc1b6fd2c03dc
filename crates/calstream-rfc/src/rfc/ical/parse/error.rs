//! iCalendar parse error types.

use std::fmt;

/// Result type for iCalendar parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A fatal error raised while deserializing a calendar stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Line number active when the error was raised (1-based).
    pub line: usize,
    /// What was being parsed, e.g. `VCALENDAR > VEVENT > DTSTART`.
    pub context: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            context: None,
        }
    }

    /// Attaches context, keeping any context already present.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if self.context.is_none() {
            self.context = Some(context.into());
        }
        self
    }

    /// Prefixes the context with where the error happened, e.g.
    /// `VCALENDAR > VEVENT > DTSTART`. An empty path leaves it unchanged.
    #[must_use]
    pub fn at_path(mut self, path: &str) -> Self {
        if path.is_empty() {
            return self;
        }
        self.context = Some(match self.context.take() {
            Some(context) => format!("{path}: {context}"),
            None => path.to_string(),
        });
        self
    }

    /// Returns whether this error is a BEGIN/END nesting violation.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::MissingBegin
                | ParseErrorKind::MismatchedEnd
                | ParseErrorKind::MissingEnd
                | ParseErrorKind::NestingTooDeep
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)?;
        if let Some(context) = &self.context {
            write!(f, ": {context}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Whitespace or a line break inside a field name, or an empty name.
    MalformedFieldName,
    /// Stream ended before a field name was delimited by `:` or `;`.
    UnterminatedFieldName,
    /// Parameter without a name or without a value.
    MalformedParameter,
    /// Stream ended inside a parameter list.
    UnterminatedParameters,
    /// CR not immediately followed by LF.
    UnexpectedLineEnding,
    /// Property (or END) with no open component.
    MissingBegin,
    /// END naming a component other than the open one.
    MismatchedEnd,
    /// Stream ended with components still open.
    MissingEnd,
    /// BEGIN beyond the configured nesting limit.
    NestingTooDeep,
    /// Value rejected by its value deserializer.
    InvalidValue,
    /// Underlying reader failed.
    Io,
    /// Input is not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedFieldName => write!(f, "malformed field name"),
            Self::UnterminatedFieldName => write!(f, "unterminated field name"),
            Self::MalformedParameter => write!(f, "malformed parameter"),
            Self::UnterminatedParameters => write!(f, "unterminated parameter list"),
            Self::UnexpectedLineEnding => write!(f, "unexpected line ending"),
            Self::MissingBegin => write!(f, "expected BEGIN"),
            Self::MismatchedEnd => write!(f, "mismatched END"),
            Self::MissingEnd => write!(f, "missing END"),
            Self::NestingTooDeep => write!(f, "components nested too deeply"),
            Self::InvalidValue => write!(f, "invalid value"),
            Self::Io => write!(f, "read error"),
            Self::InvalidUtf8 => write!(f, "invalid UTF-8"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_line_and_context() {
        let err = ParseError::new(ParseErrorKind::MismatchedEnd, 7)
            .with_context("expected END:VEVENT, found END:VTODO");
        assert_eq!(
            err.to_string(),
            "line 7: mismatched END: expected END:VEVENT, found END:VTODO"
        );
    }

    #[test]
    fn first_context_wins() {
        let err = ParseError::new(ParseErrorKind::InvalidValue, 2)
            .with_context("inner")
            .with_context("outer");
        assert_eq!(err.context.as_deref(), Some("inner"));
    }

    #[test]
    fn path_prefixes_context() {
        let err = ParseError::new(ParseErrorKind::InvalidValue, 4)
            .with_context("expected INTEGER, found \"x\"")
            .at_path("VCALENDAR > VTODO > PRIORITY");
        assert_eq!(
            err.context.as_deref(),
            Some("VCALENDAR > VTODO > PRIORITY: expected INTEGER, found \"x\"")
        );

        let bare = ParseError::new(ParseErrorKind::MissingEnd, 9).at_path("VCALENDAR");
        assert_eq!(bare.context.as_deref(), Some("VCALENDAR"));
        assert_eq!(bare.clone().at_path(""), bare);
    }

    #[test]
    fn structural_kinds() {
        assert!(ParseError::new(ParseErrorKind::MissingBegin, 1).is_structural());
        assert!(!ParseError::new(ParseErrorKind::UnexpectedLineEnding, 1).is_structural());
    }
}
