pub mod app;
pub mod backends;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliCommand, CliConfig};

pub use config::{FdwConfig, ForeignTableOptions};
pub use core::{
    registry::AdapterRegistry,
    scan::{ForeignScan, ScanError, ScanPhase, ScanSummary},
};
pub use domain::model::{AdapterOptions, Column, ImportRequest, Lifecycle, Pull, Row};
pub use domain::ports::Adapter;
pub use utils::error::{AdapterError, ErrorCategory, Result};
