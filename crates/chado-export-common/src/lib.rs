//! Chado Export Common Library
//!
//! Shared infrastructure for the chado-export workspace members.
//! Currently this holds the logging layer used by the CLI binary.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogLevel, LogOutput};
