//! Core logic for the Telegram webhook configurator.
//!
//! Framework-agnostic: the Bot API and the function URL lookup live behind
//! ports (traits) implemented in adapter crates.

pub mod config;
pub mod console;
pub mod domain;
pub mod errors;
pub mod flow;
pub mod logging;
pub mod ports;
pub mod secret;
pub mod validate;

pub use errors::{Error, Result};
