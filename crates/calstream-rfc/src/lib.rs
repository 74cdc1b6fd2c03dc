//! Streaming deserializer for the RFC 5545 content-line grammar.
//!
//! ```rust
//! use calstream_rfc::rfc::ical::parse::CalendarDeserializer;
//!
//! let input = "BEGIN:VEVENT\r\nSUMMARY:Standup\r\nEND:VEVENT\r\n";
//! let events = CalendarDeserializer::from_text(input)
//!     .collect::<Result<Vec<_>, _>>()
//!     .unwrap();
//!
//! assert_eq!(events[0].summary(), Some("Standup"));
//! ```

pub mod error;
pub mod rfc;
