//! Infrastructure adapters. Implement outbound ports.
//!
//! Telegram, AI providers, external tools. Map errors to DomainError.

pub mod ai;
pub mod image;
pub mod telegram;
pub mod tools;
pub mod ui;
