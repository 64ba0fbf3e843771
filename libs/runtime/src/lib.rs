//! Process plumbing for the PortfoHub server: layered configuration,
//! logging bootstrap and home directory resolution.

pub mod config;
pub mod logging;
pub mod paths;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
pub use logging::init_logging_from_config;
