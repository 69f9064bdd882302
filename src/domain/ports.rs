use crate::core::loader::LoaderConfig;
use crate::core::scorer::ScoringConfig;
use crate::domain::model::{Cadastre, Measurement, RoadNetwork, Score, WalkabilityReport};
use crate::utils::error::Result;

/// Destination for published reports.
pub trait Storage {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Human-readable location of `path` inside this storage.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider {
    fn roads_path(&self) -> &str;
    fn cadastre_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// 壓縮檔名；`None` 表示不壓縮
    fn compression(&self) -> Option<&str>;
    /// `[min_x, min_y, max_x, max_y]` to clip both layers to; `None` measures
    /// over the layers' combined bounding box.
    fn analysis_bounds(&self) -> Option<[f64; 4]>;
    fn loader_config(&self) -> LoaderConfig;
    fn scoring_config(&self) -> ScoringConfig;
}

/// The stages one walkability run goes through, in order.
pub trait Pipeline {
    fn load_layers(&self) -> Result<(RoadNetwork, Cadastre)>;
    fn measure(&self, roads: &RoadNetwork, cadastre: &Cadastre) -> Result<Measurement>;
    fn score(&self, measurement: &Measurement) -> Result<Score>;
    fn publish(&self, report: &WalkabilityReport) -> Result<Vec<String>>;
    fn describe_inputs(&self) -> (String, String);
}
