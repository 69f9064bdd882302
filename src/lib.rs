pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::GeoJsonPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{engine::RunOutcome, engine::WalkabilityEngine};
pub use domain::crs::Crs;
pub use utils::error::{Result, WalkError};
