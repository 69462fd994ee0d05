//! Structured logging for the feed service.

pub mod logger;

pub use logger::{Logger, Severity};
