//! iCalendar DATE-TIME and UTC-OFFSET value types (RFC 5545 §3.3.5, §3.3.14).

use std::fmt;

use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Form of a DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum DateTimeForm {
    /// Same wall-clock time in any timezone, e.g. `19980118T230000`.
    Floating,
    /// Absolute instant, e.g. `19980119T070000Z`.
    Utc,
    /// Local time with a TZID reference. The TZID is not resolved here.
    Zoned {
        /// Timezone identifier as written in the TZID parameter.
        tzid: String,
    },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateTime {
    /// Wall-clock date and time as written.
    pub local: NaiveDateTime,
    /// The form of this DATE-TIME.
    #[serde(flatten)]
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a floating DATE-TIME.
    #[must_use]
    pub fn floating(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Floating,
        }
    }

    /// Creates a UTC DATE-TIME.
    #[must_use]
    pub fn utc(local: NaiveDateTime) -> Self {
        Self {
            local,
            form: DateTimeForm::Utc,
        }
    }

    /// Creates a zoned DATE-TIME.
    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self {
            local,
            form: DateTimeForm::Zoned { tzid: tzid.into() },
        }
    }

    /// Returns whether this is a UTC time.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns the timezone ID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            _ => None,
        }
    }

    /// Returns the absolute instant for UTC values.
    #[must_use]
    pub fn to_utc(&self) -> Option<chrono::DateTime<Utc>> {
        self.is_utc().then(|| Utc.from_utc_datetime(&self.local))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.local.format("%Y%m%dT%H%M%S"))?;
        if self.is_utc() {
            f.write_str("Z")?;
        }
        Ok(())
    }
}

/// UTC-OFFSET value (RFC 5545 §3.3.14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UtcOffset {
    /// Signed offset from UTC in seconds.
    pub seconds: i32,
}

impl UtcOffset {
    /// Creates an offset from a signed number of seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i32) -> Self {
        Self { seconds }
    }

    /// Converts to a chrono offset, if within chrono's supported range.
    #[must_use]
    pub fn to_fixed_offset(self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.seconds)
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        let total = self.seconds.unsigned_abs();
        let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
        write!(f, "{sign}{hours:02}{minutes:02}")?;
        if seconds > 0 {
            write!(f, "{seconds:02}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 23)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn display_marks_utc() {
        assert_eq!(DateTime::utc(sample()).to_string(), "20260123T093000Z");
        assert_eq!(DateTime::floating(sample()).to_string(), "20260123T093000");
    }

    #[test]
    fn only_utc_converts_to_instant() {
        assert!(DateTime::utc(sample()).to_utc().is_some());
        assert!(DateTime::zoned(sample(), "Europe/Oslo").to_utc().is_none());
        assert_eq!(
            DateTime::zoned(sample(), "Europe/Oslo").tzid(),
            Some("Europe/Oslo")
        );
    }

    #[test]
    fn utc_offset_display() {
        assert_eq!(UtcOffset::from_seconds(-5 * 3600).to_string(), "-0500");
        assert_eq!(UtcOffset::from_seconds(19_800).to_string(), "+0530");
        assert_eq!(UtcOffset::from_seconds(3_661).to_string(), "+010101");
    }
}
