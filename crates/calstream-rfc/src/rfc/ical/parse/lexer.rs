//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Reads one content line at a time straight off the character cursor:
//! field name, then (optionally) a streamed parameter list, then the value
//! up to the true end of the folded logical line. Nothing is buffered
//! beyond the cursor's single character of lookahead.

use super::context::{Frame, ParseContext};
use super::cursor::{CharSource, Cursor};
use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{Parameter, Property};

/// Reads a field name up to the first `:` or `;`.
///
/// Returns the name as written and whether a parameter list follows
/// (the delimiter was `;`).
///
/// ## Errors
/// Returns `MalformedFieldName` on whitespace or a line break before the
/// delimiter, or on an empty name; `UnterminatedFieldName` if the stream
/// ends first.
pub fn read_field_name<S: CharSource>(cursor: &mut Cursor<S>) -> ParseResult<(String, bool)> {
    let mut name = String::new();

    loop {
        match cursor.read()? {
            Some(delimiter @ (':' | ';')) => {
                if name.is_empty() {
                    return Err(ParseError::new(ParseErrorKind::MalformedFieldName, cursor.line())
                        .with_context("empty field name"));
                }
                return Ok((name, delimiter == ';'));
            }
            Some(c @ (' ' | '\t' | '\r' | '\n')) => {
                return Err(
                    ParseError::new(ParseErrorKind::MalformedFieldName, cursor.line())
                        .with_context(format!("unexpected {c:?} after {name:?}")),
                );
            }
            Some(c) => name.push(c),
            None => {
                return Err(
                    ParseError::new(ParseErrorKind::UnterminatedFieldName, cursor.line())
                        .with_context(format!("stream ended after {name:?}")),
                );
            }
        }
    }
}

/// Requires the next character to be LF after a CR was read.
fn expect_lf<S: CharSource>(cursor: &mut Cursor<S>) -> ParseResult<()> {
    if cursor.peek()? == Some('\n') {
        Ok(())
    } else {
        Err(ParseError::new(
            ParseErrorKind::UnexpectedLineEnding,
            cursor.line(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamState {
    Name,
    Value,
    Quoted,
    Terminated,
}

/// Streaming parser for the parameter list of one property.
///
/// Entered just after the `;` that ends the field name. Yields each
/// parameter as soon as its `;` or `:` is read and stops after the `:` that
/// starts the value. Quoted text may contain `;`, `:` and `,` literally;
/// the quotes themselves are dropped. Folded parameter lists are unfolded
/// in place.
pub struct Parameters<'a, S> {
    cursor: &'a mut Cursor<S>,
    ctx: &'a mut ParseContext,
    state: ParamState,
}

impl<'a, S: CharSource> Parameters<'a, S> {
    pub fn new(cursor: &'a mut Cursor<S>, ctx: &'a mut ParseContext) -> Self {
        Self {
            cursor,
            ctx,
            state: ParamState::Name,
        }
    }

    /// Consumes a line-break character. Returns `false` for anything else.
    fn line_break(&mut self, c: char) -> ParseResult<bool> {
        match c {
            '\r' => expect_lf(self.cursor)?,
            '\n' => {
                self.cursor.advance_line();
                self.cursor.skip_fold_whitespace()?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn next_char(&mut self) -> ParseResult<char> {
        self.cursor.read()?.ok_or_else(|| {
            ParseError::new(ParseErrorKind::UnterminatedParameters, self.cursor.line())
        })
    }

    fn read_name(&mut self) -> ParseResult<String> {
        let mut name = String::new();

        loop {
            let c = self.next_char()?;
            if self.line_break(c)? {
                continue;
            }
            match c {
                '=' if name.is_empty() => {
                    return Err(
                        ParseError::new(ParseErrorKind::MalformedParameter, self.cursor.line())
                            .with_context("parameter without a name"),
                    );
                }
                '=' => return Ok(name.to_ascii_uppercase()),
                ',' | ';' | ':' | '"' => {
                    return Err(
                        ParseError::new(ParseErrorKind::MalformedParameter, self.cursor.line())
                            .with_context(format!("unexpected {c:?} in parameter name {name:?}")),
                    );
                }
                _ => name.push(c),
            }
        }
    }

    fn read_values(&mut self, mut param: Parameter) -> ParseResult<Parameter> {
        let mut text = String::new();

        loop {
            let c = self.next_char()?;
            if self.line_break(c)? {
                continue;
            }
            match (self.state, c) {
                (ParamState::Value, '"') => self.state = ParamState::Quoted,
                (ParamState::Quoted, '"') => self.state = ParamState::Value,
                (ParamState::Value, ',') => param.add_value(std::mem::take(&mut text)),
                (ParamState::Value, ';' | ':') => {
                    param.add_value(text);
                    self.state = if c == ':' {
                        ParamState::Terminated
                    } else {
                        ParamState::Name
                    };
                    return Ok(param);
                }
                _ => text.push(c),
            }
        }
    }

    fn read_parameter(&mut self) -> ParseResult<Parameter> {
        let name = self.read_name()?;
        self.ctx.push(Frame::Parameter(name.clone()));
        self.state = ParamState::Value;

        let param = self.read_values(Parameter::named(name))?;

        self.ctx.pop();
        self.ctx.attach_parameter(param.clone());
        Ok(param)
    }
}

impl<S: CharSource> Iterator for Parameters<'_, S> {
    type Item = ParseResult<Parameter>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ParamState::Terminated {
            return None;
        }
        let result = self.read_parameter();
        if result.is_err() {
            self.state = ParamState::Terminated;
        }
        Some(result)
    }
}

/// How the value portion of a content line is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueMode {
    /// RFC 5545 unfolding only.
    Basic,
    /// Unfolding plus `=` soft line breaks, which are kept in the raw text.
    QuotedPrintable,
}

impl ValueMode {
    /// Picks the mode from the property's ENCODING parameter.
    #[must_use]
    pub fn for_property(property: &Property) -> Self {
        if property.is_quoted_printable() {
            Self::QuotedPrintable
        } else {
            Self::Basic
        }
    }
}

/// Reads a raw value up to the end of the logical line.
///
/// CRLF followed by a space or tab is a fold: all three characters are
/// dropped and the value continues. Any other line break, or the end of the
/// stream, ends the value. In quoted-printable mode `=` followed by CRLF or
/// LF is a soft break and is appended verbatim.
///
/// ## Errors
/// Returns `UnexpectedLineEnding` for a CR not followed by LF.
pub fn read_value<S: CharSource>(cursor: &mut Cursor<S>, mode: ValueMode) -> ParseResult<String> {
    let mut value = String::new();

    while let Some(c) = cursor.read()? {
        match c {
            '=' if mode == ValueMode::QuotedPrintable => {
                value.push('=');
                if !matches!(cursor.peek()?, Some('\r' | '\n')) {
                    continue;
                }
                if cursor.peek()? == Some('\r') {
                    cursor.read()?;
                    expect_lf(cursor)?;
                    value.push('\r');
                }
                cursor.read()?;
                cursor.advance_line();
                value.push('\n');
            }
            '\r' => expect_lf(cursor)?,
            '\n' => {
                cursor.advance_line();
                if !cursor.skip_fold_whitespace()? {
                    break;
                }
            }
            _ => value.push(c),
        }
    }

    Ok(value)
}
