//! iCalendar (RFC 5545).
//!
//! - `core`: the component/property/parameter/value model
//! - `parse`: the streaming deserializer and its collaborators

pub mod core;
pub mod parse;

#[cfg(test)]
mod tests;
