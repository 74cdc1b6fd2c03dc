//! Streaming iCalendar deserialization (RFC 5545).
//!
//! Content lines are pulled straight off a character stream and assembled
//! into components as they are read; nothing beyond the current property
//! and the chain of open components is held in memory.
//!
//! ## Usage
//!
//! ```rust
//! use calstream_rfc::rfc::ical::parse::CalendarDeserializer;
//!
//! let input = "\
//! BEGIN:VCALENDAR\r\n\
//! VERSION:2.0\r\n\
//! BEGIN:VEVENT\r\n\
//! UID:1@example.com\r\n\
//! SUMMARY:Planning\r\n\
//! END:VEVENT\r\n\
//! END:VCALENDAR\r\n";
//!
//! for calendar in CalendarDeserializer::from_text(input) {
//!     let calendar = calendar.unwrap();
//!     assert_eq!(calendar.events()[0].summary(), Some("Planning"));
//! }
//! ```
//!
//! ## Stages
//!
//! - [`Cursor`]: one character of lookahead and the current line
//! - [`read_field_name`], [`Parameters`], [`read_value`]: one content line
//! - [`dispatch`]: raw value text to typed [`Value`](crate::rfc::ical::core::Value)s
//! - [`CalendarDeserializer`]: `BEGIN`/`END` nesting, one top-level
//!   component per iteration
//!
//! The [`ParseContext`] stack tracks what is being parsed for error
//! messages and for value deserializers that depend on parameters.

pub mod context;
pub mod cursor;
pub mod dispatch;
pub mod factory;

mod deserializer;
mod error;
mod lexer;
mod values;

pub use context::{Frame, ParseContext, PropertyFrame};
pub use cursor::{CharSource, Cursor, ReaderSource, StrSource};
pub use deserializer::{CalendarDeserializer, DEFAULT_BUFFER_CAPACITY, DeserializerBuilder};
pub use dispatch::{
    DataTypeMapper, DefaultSerializerFactory, Deserialized, Dispatcher, SerializerFactory,
    TypeMapper, ValueDeserializer, ValueType,
};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use factory::{ComponentFactory, ComponentHooks, ComponentRegistry, NoopHooks};
pub use lexer::{Parameters, ValueMode, read_field_name, read_value};
pub use values::{
    ValueError, ValueResult, decode_base64, decode_quoted_printable, parse_boolean, parse_date,
    parse_datetime, parse_duration, parse_float, parse_integer, parse_utc_offset,
    split_text_list, unescape_text,
};

use crate::rfc::ical::core::Component;

/// Deserializes every top-level component in `input`.
///
/// ## Errors
/// Returns the first error encountered; components before it are dropped.
#[tracing::instrument(skip(input), fields(len = input.len()))]
pub fn parse_str(input: &str) -> ParseResult<Vec<Component>> {
    CalendarDeserializer::from_text(input).collect()
}

/// Deserializes every top-level component from a reader.
///
/// ## Errors
/// Returns the first error encountered, including read failures.
#[tracing::instrument(skip(reader))]
pub fn parse_reader<R: std::io::BufRead>(reader: R) -> ParseResult<Vec<Component>> {
    CalendarDeserializer::from_reader(reader).collect()
}
