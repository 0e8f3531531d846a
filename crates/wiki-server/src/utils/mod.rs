//! Shared helpers for the CLI and server.

pub mod logging;

pub use logging::initialize_logging;
