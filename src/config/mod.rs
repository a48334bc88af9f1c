#[cfg(feature = "cli")]
pub mod cli;
pub mod table;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliCommand, CliConfig};
pub use table::ForeignTableOptions;
pub use toml_config::{FdwConfig, TableConfig};
