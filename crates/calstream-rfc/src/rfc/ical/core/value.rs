//! iCalendar property values (RFC 5545 §3.3).

use chrono::NaiveDate;
use serde::Serialize;

use super::{DateTime, Duration, UtcOffset};

/// A quoted-printable value after transfer decoding.
///
/// The raw text, soft line breaks included, stays on the owning
/// [`Property::raw_value`](super::Property::raw_value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotedPrintableString {
    /// CHARSET parameter, if the property carried one.
    pub charset: Option<String>,
    /// Decoded text.
    pub value: String,
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Value {
    /// BINARY value (base64 decoded).
    Binary(Vec<u8>),
    /// BOOLEAN value.
    Boolean(bool),
    /// CAL-ADDRESS value (typically a mailto: URI).
    CalAddress(String),
    /// DATE value.
    Date(NaiveDate),
    /// DATE-TIME value.
    DateTime(DateTime),
    /// DURATION value.
    Duration(Duration),
    /// FLOAT value.
    Float(f64),
    /// INTEGER value.
    Integer(i32),
    /// RECUR value, kept as written.
    Recur(String),
    /// TEXT value (unescaped).
    Text(String),
    /// URI value.
    Uri(String),
    /// UTC-OFFSET value.
    UtcOffset(UtcOffset),
    /// Text carried in the quoted-printable transfer encoding.
    QuotedPrintable(QuotedPrintableString),
    /// Value of an unrecognized VALUE type, kept as written.
    Unknown(String),
}

impl Value {
    /// Returns this value as text, if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::QuotedPrintable(qp) => Some(&qp.value),
            _ => None,
        }
    }

    /// Returns this value as an integer, if it is an integer value.
    #[must_use]
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns this value as a date, if it is a date value.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns this value as a date-time, if it is a date-time value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns this value as a duration, if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Returns this value as bytes, if it is a binary value.
    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the URI text of URI and CAL-ADDRESS values.
    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Uri(s) | Self::CalAddress(s) => Some(s),
            _ => None,
        }
    }
}
