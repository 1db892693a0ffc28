//! Library side of the `drugcat` binary: configuration resolution and logging.

pub mod config;
pub mod logging;
