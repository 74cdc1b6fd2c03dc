//! iCalendar core models (RFC 5545).
//!
//! These types are what the streaming deserializer produces:
//! - Order preservation: properties, parameters and values keep document order
//! - No deduplication: repeated parameters and values are all retained
//! - Raw fidelity: every property keeps its unfolded raw value

mod component;
mod datetime;
mod duration;
mod parameter;
mod property;
mod value;

pub use component::{Component, ComponentKind};
pub use datetime::{DateTime, DateTimeForm, UtcOffset};
pub use duration::Duration;
pub use parameter::Parameter;
pub use property::{Property, names};
pub use value::{QuotedPrintableString, Value};
