//! wpstage CLI library components.
//!
//! The binary in `main.rs` only parses arguments and sets up logging; the
//! command handlers and output formatting live here.

pub mod commands;
pub mod context;
pub mod formatters;
pub mod logging;

pub use formatters::OutputFormat;
