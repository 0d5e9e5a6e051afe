//! Configuration loading and raw TOML data types

mod file_config;
mod loader;

pub use file_config::{
    FileBreakerConfig, FileConfig, FileCouncilConfig, FileGatewayConfig, FileRoutingConfig,
};
pub use loader::ConfigLoader;
