//! iCalendar property type (RFC 5545 §3.1, §3.8).

use serde::Serialize;

use super::{Parameter, Value};

/// A parsed iCalendar property.
///
/// Parameters keep every occurrence in document order. Lookup by name
/// returns the most recently inserted parameter with that name, so a later
/// `TZID=...` shadows an earlier one without discarding it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Typed values in order of appearance. Never deduplicated.
    pub values: Vec<Value>,
    /// Unfolded value text exactly as read from the stream.
    pub raw_value: String,
}

impl Property {
    /// Creates a property with no parameters and no values.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            values: Vec::new(),
            raw_value: String::new(),
        }
    }

    /// Creates a property with a single text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            values: vec![Value::Text(value.clone())],
            raw_value: value,
        }
    }

    /// Returns whether this is a `BEGIN` or `END` marker.
    #[must_use]
    pub fn is_structural(&self) -> bool {
        self.name == names::BEGIN || self.name == names::END
    }

    /// Returns the last parameter inserted under the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        self.params
            .iter()
            .rev()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns every parameter with the given name, in order.
    pub fn params_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Parameter> {
        self.params
            .iter()
            .filter(move |p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns the first value of the named parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    /// Adds a parameter to this property.
    pub fn add_param(&mut self, param: Parameter) {
        self.params.push(param);
    }

    /// Appends a typed value.
    pub fn add_value(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Returns the first value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.values.first()
    }

    /// Returns the first value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value()?.as_text()
    }

    /// Returns the VALUE parameter if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.get_param_value(names::VALUE)
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value(names::TZID)
    }

    /// Returns the ENCODING parameter if present.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.get_param_value(names::ENCODING)
    }

    /// Returns whether the value uses the quoted-printable transfer encoding.
    #[must_use]
    pub fn is_quoted_printable(&self) -> bool {
        self.encoding()
            .is_some_and(|e| e.eq_ignore_ascii_case(names::QUOTED_PRINTABLE))
    }
}

/// Property and parameter names the deserializer itself depends on.
pub mod names {
    pub const BEGIN: &str = "BEGIN";
    pub const END: &str = "END";

    pub const CHARSET: &str = "CHARSET";
    pub const ENCODING: &str = "ENCODING";
    pub const TZID: &str = "TZID";
    pub const VALUE: &str = "VALUE";

    pub const BASE64: &str = "BASE64";
    pub const QUOTED_PRINTABLE: &str = "QUOTED-PRINTABLE";
}
