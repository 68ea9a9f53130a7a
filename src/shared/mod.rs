//! Cross-cutting concerns: configuration.

pub mod config;
