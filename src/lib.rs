pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::storage::LocalStorage;
pub use config::TomlConfig;
pub use core::{etl::EtlEngine, pipeline::HallPipeline};
pub use utils::error::{HallError, Result};
