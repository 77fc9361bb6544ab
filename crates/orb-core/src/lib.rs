//! Core domain + application logic for the OpenRouter relay bot.
//!
//! This crate is intentionally framework-agnostic. Telegram / OpenRouter
//! live behind ports (traits) implemented in adapter crates.

pub mod completion;
pub mod config;
pub mod domain;
pub mod errors;
pub mod exchange_log;
pub mod logging;
pub mod messaging;
pub mod relay;
pub mod replies;
pub mod supervisor;

pub use errors::{Error, Result};
