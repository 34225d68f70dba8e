//! Subcommand handlers.

pub(crate) mod bridge;
pub(crate) mod config;
pub(crate) mod module;
