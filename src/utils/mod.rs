//! Shared helpers.

pub mod command;
pub mod log;
