//! Value type resolution and typed value deserialization.
//!
//! Once a property's header is complete and its raw value has been read,
//! a [`TypeMapper`] picks the value type and a [`SerializerFactory`] builds
//! the [`ValueDeserializer`] that turns the raw text into typed values.

use super::context::ParseContext;
use super::values::{
    ValueError, decode_base64, decode_quoted_printable, parse_boolean, parse_date, parse_datetime,
    parse_duration, parse_float, parse_integer, parse_utc_offset, split_text_list, unescape_text,
};
use crate::rfc::ical::core::{Property, QuotedPrintableString, Value, names};
use encoding_rs::{Encoding, UTF_8};

/// RFC 5545 value data types (§3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Binary,
    Boolean,
    CalAddress,
    Date,
    DateTime,
    Duration,
    Float,
    Integer,
    Recur,
    Text,
    /// Comma-separated TEXT, e.g. CATEGORIES.
    TextList,
    Uri,
    UtcOffset,
    /// A `VALUE=` type this crate does not know. Kept as written.
    Unknown,
}

impl ValueType {
    /// Parses the value of a `VALUE=` parameter (case-insensitive).
    #[must_use]
    pub fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "BOOLEAN" => Self::Boolean,
            "CAL-ADDRESS" => Self::CalAddress,
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "FLOAT" => Self::Float,
            "INTEGER" => Self::Integer,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "URI" => Self::Uri,
            "UTC-OFFSET" => Self::UtcOffset,
            _ => Self::Unknown,
        }
    }
}

/// Maps a property to the data type of its value.
pub trait TypeMapper {
    /// Returns `None` when the property has no specific type; the value is
    /// then read as text.
    fn lookup(&self, property: &Property) -> Option<ValueType>;
}

/// Default mapping: an explicit `VALUE=` parameter wins, then the RFC 5545
/// default type of well-known property names.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTypeMapper;

impl TypeMapper for DataTypeMapper {
    fn lookup(&self, property: &Property) -> Option<ValueType> {
        if let Some(value_type) = property.value_type() {
            return Some(ValueType::from_param(value_type));
        }

        let ty = match property.name.as_str() {
            "DTSTART" | "DTEND" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "COMPLETED" | "DUE"
            | "RECURRENCE-ID" | "EXDATE" | "RDATE" => ValueType::DateTime,

            // TRIGGER may also be an absolute DATE-TIME
            "DURATION" | "TRIGGER" => {
                if property.raw_value.starts_with(['P', '-', '+']) {
                    ValueType::Duration
                } else {
                    ValueType::DateTime
                }
            }

            "PERCENT-COMPLETE" | "PRIORITY" | "REPEAT" | "SEQUENCE" => ValueType::Integer,
            "TZOFFSETFROM" | "TZOFFSETTO" => ValueType::UtcOffset,
            "URL" | "TZURL" | "SOURCE" => ValueType::Uri,
            "ATTENDEE" | "ORGANIZER" => ValueType::CalAddress,
            "RRULE" | "EXRULE" => ValueType::Recur,
            "CATEGORIES" | "RESOURCES" => ValueType::TextList,
            _ => return None,
        };
        Some(ty)
    }
}

/// Output of a value deserializer.
#[derive(Debug, Clone, PartialEq)]
pub enum Deserialized {
    Single(Value),
    Many(Vec<Value>),
    /// Plain strings, stored as text values.
    Strings(Vec<String>),
}

impl Deserialized {
    /// Flattens into the values to append to the property, in order.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        match self {
            Self::Single(value) => vec![value],
            Self::Many(values) => values,
            Self::Strings(strings) => strings.into_iter().map(Value::Text).collect(),
        }
    }
}

/// Turns a raw value into typed values.
pub trait ValueDeserializer {
    /// ## Errors
    /// Returns a [`ValueError`] if `raw` is not valid for this value type.
    fn deserialize(&self, raw: &str) -> Result<Deserialized, ValueError>;
}

impl<F> ValueDeserializer for F
where
    F: Fn(&str) -> Result<Deserialized, ValueError>,
{
    fn deserialize(&self, raw: &str) -> Result<Deserialized, ValueError> {
        self(raw)
    }
}

/// Builds the deserializer for a value type.
///
/// The context gives access to the property being parsed, so factories can
/// react to parameters such as TZID or ENCODING.
pub trait SerializerFactory {
    fn build(&self, ty: ValueType, ctx: &ParseContext) -> Box<dyn ValueDeserializer>;
}

/// Default factory covering every [`ValueType`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSerializerFactory;

impl SerializerFactory for DefaultSerializerFactory {
    fn build(&self, ty: ValueType, ctx: &ParseContext) -> Box<dyn ValueDeserializer> {
        let encoding = ctx.encoding().map(str::to_ascii_uppercase);

        if encoding.as_deref() == Some(names::QUOTED_PRINTABLE) {
            let charset = ctx.charset().map(str::to_string);
            return from_fn(move |raw| {
                let bytes = decode_quoted_printable(raw)?;
                Ok(Deserialized::Single(Value::QuotedPrintable(
                    QuotedPrintableString {
                        value: decode_charset(&bytes, charset.as_deref()),
                        charset: charset.clone(),
                    },
                )))
            });
        }

        match ty {
            ValueType::Text => from_fn(|raw| {
                Ok(Deserialized::Single(Value::Text(unescape_text(raw))))
            }),
            ValueType::TextList => {
                from_fn(|raw| Ok(Deserialized::Strings(split_text_list(raw))))
            }
            ValueType::DateTime => {
                let tzid = ctx.tzid().map(str::to_string);
                from_fn(move |raw| {
                    let mut values = raw
                        .split(',')
                        .map(|item| date_or_datetime(item.trim(), tzid.as_deref()))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(if values.len() == 1 {
                        Deserialized::Single(values.remove(0))
                    } else {
                        Deserialized::Many(values)
                    })
                })
            }
            ValueType::Date => from_fn(|raw| {
                let mut values = raw
                    .split(',')
                    .map(|item| parse_date(item.trim()).map(Value::Date))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if values.len() == 1 {
                    Deserialized::Single(values.remove(0))
                } else {
                    Deserialized::Many(values)
                })
            }),
            ValueType::Binary => {
                let base64 = encoding.as_deref() == Some(names::BASE64);
                from_fn(move |raw| {
                    let bytes = if base64 {
                        decode_base64(raw)?
                    } else {
                        raw.as_bytes().to_vec()
                    };
                    Ok(Deserialized::Single(Value::Binary(bytes)))
                })
            }
            ValueType::Boolean => single(|raw| parse_boolean(raw).map(Value::Boolean)),
            ValueType::Integer => single(|raw| parse_integer(raw).map(Value::Integer)),
            ValueType::Float => single(|raw| parse_float(raw).map(Value::Float)),
            ValueType::Duration => single(|raw| parse_duration(raw).map(Value::Duration)),
            ValueType::UtcOffset => single(|raw| parse_utc_offset(raw).map(Value::UtcOffset)),
            ValueType::Uri => single(|raw| Ok(Value::Uri(raw.to_string()))),
            ValueType::CalAddress => single(|raw| Ok(Value::CalAddress(raw.to_string()))),
            ValueType::Recur => single(|raw| Ok(Value::Recur(raw.to_string()))),
            ValueType::Unknown => single(|raw| Ok(Value::Unknown(raw.to_string()))),
        }
    }
}

/// Boxes a closure as a [`ValueDeserializer`].
pub fn from_fn<F>(f: F) -> Box<dyn ValueDeserializer>
where
    F: Fn(&str) -> Result<Deserialized, ValueError> + 'static,
{
    Box::new(f)
}

fn single(parse: fn(&str) -> Result<Value, ValueError>) -> Box<dyn ValueDeserializer> {
    from_fn(move |raw| parse(raw).map(Deserialized::Single))
}

/// DATE-TIME properties written with a bare DATE and no `VALUE=DATE` are
/// common in the wild; accept them as dates.
fn date_or_datetime(s: &str, tzid: Option<&str>) -> Result<Value, ValueError> {
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        parse_date(s).map(Value::Date)
    } else {
        parse_datetime(s, tzid).map(Value::DateTime)
    }
}

/// Decodes text bytes in the named charset. A missing or unrecognized
/// charset is read as UTF-8.
fn decode_charset(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = match charset {
        Some(label) => Encoding::for_label(label.trim().as_bytes()).unwrap_or_else(|| {
            tracing::warn!(charset = label, "Unknown charset, decoding as UTF-8");
            UTF_8
        }),
        None => UTF_8,
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        tracing::warn!(
            charset = encoding.name(),
            "Quoted-printable text is not valid in its charset; invalid bytes replaced"
        );
    }
    text.into_owned()
}

/// Applies a type mapper and serializer factory to finished properties.
pub struct Dispatcher {
    mapper: Box<dyn TypeMapper>,
    factory: Box<dyn SerializerFactory>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Box::new(DataTypeMapper), Box::new(DefaultSerializerFactory))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher").finish_non_exhaustive()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(mapper: Box<dyn TypeMapper>, factory: Box<dyn SerializerFactory>) -> Self {
        Self { mapper, factory }
    }

    /// Stores `raw` on the property and appends its typed values.
    ///
    /// A value the deserializer rejects is kept as a single
    /// [`Value::Unknown`] holding the raw text.
    pub fn apply(&self, property: &mut Property, raw: String, ctx: &ParseContext, line: usize) {
        property.raw_value = raw;
        let ty = self.mapper.lookup(property).unwrap_or(ValueType::Text);
        let deserializer = self.factory.build(ty, ctx);

        match deserializer.deserialize(&property.raw_value) {
            Ok(deserialized) => property.values.extend(deserialized.into_values()),
            Err(e) => {
                tracing::warn!(
                    line,
                    property = %property.name,
                    error = %e,
                    "Value rejected, keeping raw text"
                );
                property
                    .values
                    .push(Value::Unknown(property.raw_value.clone()));
            }
        }
    }
}
