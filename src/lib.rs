//! tg-digest: weekly Telegram channel digest with an AI illustration, Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
