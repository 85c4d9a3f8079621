//! Core domain + dispatch logic for the kono Telegram bot.
//!
//! This crate is framework-agnostic. Telegram and SQLite live behind ports
//! (traits) implemented in adapter crates; the only decision-making in the
//! whole bot — update classification, command routing, first-contact user
//! creation — lives in [`dispatch`].

pub mod config;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod ports;
pub mod store;
pub mod update;

pub use errors::{Error, Result};
