//! Value type parsers for iCalendar (RFC 5545 §3.3).
//!
//! These operate on the raw value text produced by the lexer and back the
//! default value deserializers in [`super::dispatch`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::rfc::ical::core::{DateTime, Duration, UtcOffset};

/// A raw value that does not match its value type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found:?}")]
pub struct ValueError {
    /// Name of the expected value type.
    pub expected: &'static str,
    /// Offending text.
    pub found: String,
}

impl ValueError {
    #[must_use]
    pub fn new(expected: &'static str, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

pub type ValueResult<T> = Result<T, ValueError>;

/// Unescapes text values (RFC 5545 §3.3.11).
///
/// Escape sequences: \\ \, \; \n \N
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n' | 'N') => result.push('\n'),
                Some(',') => result.push(','),
                Some(';') => result.push(';'),
                Some('\\') | None => result.push('\\'),
                Some(other) => {
                    // Invalid escape, preserve as-is
                    result.push('\\');
                    result.push(other);
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Splits a TEXT list on unescaped commas, unescaping each item.
#[must_use]
pub fn split_text_list(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => {
                items.push(unescape_text(&s[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(unescape_text(&s[start..]));
    items
}

/// Parses a BOOLEAN value (RFC 5545 §3.3.2).
///
/// ## Errors
/// Returns an error if the string is not "TRUE" or "FALSE".
pub fn parse_boolean(s: &str) -> ValueResult<bool> {
    if s.eq_ignore_ascii_case("TRUE") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("FALSE") {
        Ok(false)
    } else {
        Err(ValueError::new("BOOLEAN", s))
    }
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a valid integer.
pub fn parse_integer(s: &str) -> ValueResult<i32> {
    s.parse().map_err(|_e| ValueError::new("INTEGER", s))
}

/// Parses a FLOAT value (RFC 5545 §3.3.7).
///
/// ## Errors
/// Returns an error if the string is not a valid floating-point number.
pub fn parse_float(s: &str) -> ValueResult<f64> {
    s.parse().map_err(|_e| ValueError::new("FLOAT", s))
}

/// Parses a fixed-width run of ASCII digits.
fn digits(s: &str, range: std::ops::Range<usize>) -> Option<u32> {
    let part = s.get(range)?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

fn date_parts(s: &str) -> Option<NaiveDate> {
    let year = i32::try_from(digits(s, 0..4)?).ok()?;
    NaiveDate::from_ymd_opt(year, digits(s, 4..6)?, digits(s, 6..8)?)
}

/// Parses a DATE value (RFC 5545 §3.3.4), e.g. `19970714`.
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str) -> ValueResult<NaiveDate> {
    if s.len() != 8 {
        return Err(ValueError::new("DATE", s));
    }
    date_parts(s).ok_or_else(|| ValueError::new("DATE", s))
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5), e.g. `19970714T133000Z`.
///
/// A trailing `Z` makes the value UTC; otherwise it is zoned when the
/// property carried a TZID and floating when it did not.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time.
pub fn parse_datetime(s: &str, tzid: Option<&str>) -> ValueResult<DateTime> {
    let err = || ValueError::new("DATE-TIME", s);
    let (text, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };
    if text.len() != 15 || text.get(8..9) != Some("T") {
        return Err(err());
    }

    let date = date_parts(text).ok_or_else(err)?;
    let time = NaiveTime::from_hms_opt(
        digits(text, 9..11).ok_or_else(err)?,
        digits(text, 11..13).ok_or_else(err)?,
        digits(text, 13..15).ok_or_else(err)?,
    )
    .ok_or_else(err)?;
    let local = NaiveDateTime::new(date, time);

    Ok(match (is_utc, tzid) {
        (true, _) => DateTime::utc(local),
        (false, Some(tzid)) => DateTime::zoned(local, tzid),
        (false, None) => DateTime::floating(local),
    })
}

/// Parses a UTC-OFFSET value (RFC 5545 §3.3.14), e.g. `+0530` or `-080000`.
///
/// ## Errors
/// Returns an error if the string is not a valid UTC offset.
pub fn parse_utc_offset(s: &str) -> ValueResult<UtcOffset> {
    let err = || ValueError::new("UTC-OFFSET", s);

    let (sign, body) = match s.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(err()),
    };
    if !(body.len() == 4 || body.len() == 6) || !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }

    let field = |range: std::ops::Range<usize>| -> ValueResult<i32> {
        body
            .get(range)
            .map_or(Ok(0), |part| part.parse::<i32>().map_err(|_e| err()))
    };
    let (hours, minutes, seconds) = (field(0..2)?, field(2..4)?, field(4..6)?);
    if minutes > 59 || seconds > 59 {
        return Err(err());
    }

    Ok(UtcOffset::from_seconds(
        sign * (hours * 3600 + minutes * 60 + seconds),
    ))
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: [+|-]P[nW] or [+|-]P[nD][T[nH][nM][nS]]
///
/// ## Errors
/// Returns an error if the string is not a valid duration.
pub fn parse_duration(s: &str) -> ValueResult<Duration> {
    let err = || ValueError::new("DURATION", s);
    let mut dur = Duration::zero();

    let rest = if let Some(rest) = s.strip_prefix('-') {
        dur.negative = true;
        rest
    } else {
        s.strip_prefix('+').unwrap_or(s)
    };
    let rest = rest.strip_prefix('P').ok_or_else(err)?;
    if rest.is_empty() {
        return Err(err());
    }

    let mut in_time = false;
    let mut seen_component = false;
    let mut number = String::new();

    for c in rest.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        if c == 'T' {
            if in_time || !number.is_empty() {
                return Err(err());
            }
            in_time = true;
            continue;
        }

        let n: u32 = number.parse().map_err(|_e| err())?;
        number.clear();
        match (c, in_time) {
            ('W', false) if !seen_component => dur.weeks = n,
            ('D', false) if dur.weeks == 0 => dur.days = n,
            ('H', true) => dur.hours = n,
            ('M', true) => dur.minutes = n,
            ('S', true) => dur.seconds = n,
            _ => return Err(err()),
        }
        seen_component = true;
    }

    if !number.is_empty() || !seen_component {
        return Err(err());
    }
    Ok(dur)
}

/// Decodes quoted-printable text (RFC 2045 §6.7).
///
/// Soft line breaks (`=` before CRLF or LF) are removed and `=XX` escapes
/// are decoded to bytes.
///
/// ## Errors
/// Returns an error for an `=` followed by anything but two hex digits or
/// a line break.
pub fn decode_quoted_printable(s: &str) -> ValueResult<Vec<u8>> {
    let err = || ValueError::new("QUOTED-PRINTABLE", s);
    let mut result = Vec::with_capacity(s.len());
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'=' {
            result.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes.get(i + 1..i + 3) {
            Some([b'\r', b'\n']) => i += 3,
            Some([b'\n', _]) => i += 2,
            Some(&[hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                let hex = [hi, lo];
                let hex = std::str::from_utf8(&hex).map_err(|_e| err())?;
                result.push(u8::from_str_radix(hex, 16).map_err(|_e| err())?);
                i += 3;
            }
            _ if bytes.get(i + 1) == Some(&b'\n') => i += 2,
            _ => return Err(err()),
        }
    }

    Ok(result)
}

/// Decodes base64 content (RFC 4648), as used by BINARY values.
///
/// ## Errors
/// Returns an error if the text is not valid base64.
pub fn decode_base64(s: &str) -> ValueResult<Vec<u8>> {
    STANDARD.decode(s).map_err(|_e| ValueError::new("BASE64", s))
}
