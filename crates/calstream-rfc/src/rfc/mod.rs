//! RFC implementations.

pub mod ical;
