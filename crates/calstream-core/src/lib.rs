//! Shared configuration and error types for the calstream crates.

pub mod config;
pub mod error;
