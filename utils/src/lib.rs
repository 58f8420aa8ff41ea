//! Shared utilities for the Agora voting core.

pub mod logging;

pub use logging::{init_logging, init_tracing, LogFormat};
