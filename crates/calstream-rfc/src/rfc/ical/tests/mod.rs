//! End-to-end deserialization scenarios.

mod streaming;
