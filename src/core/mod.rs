pub mod engine;
pub mod loader;
pub mod metrics;
pub mod projection;
pub mod publisher;
pub mod scorer;

pub use crate::domain::model::{Cadastre, Measurement, MetricSet, RoadNetwork, Score};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
