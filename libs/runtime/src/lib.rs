//! Ambient runtime support for SDK consumers: layered client configuration
//! and logging initialisation.

pub mod config;
pub mod logging;

pub use config::{default_logging_config, ApiConfig, ClientConfig, LoggingConfig, Section};
pub use logging::init_logging_from_config;
