//! Infrastructure layer: persistence adapters and configuration.

pub mod config;
pub mod directory;

mod integration_tests;

pub use config::{AppConfig, ConfigError};
pub use directory::{InMemoryDirectory, PostgresDirectory};
