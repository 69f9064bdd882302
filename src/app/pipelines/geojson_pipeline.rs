use crate::core::loader::Loader;
use crate::core::scorer::Scorer;
use crate::core::{metrics, publisher};
use crate::core::{Cadastre, ConfigProvider, Measurement, Pipeline, RoadNetwork, Score, Storage};
use crate::domain::model::{AnalysisArea, WalkabilityReport};
use crate::utils::error::Result;

/// Pipeline over two GeoJSON files, publishing to a [`Storage`].
pub struct GeoJsonPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    loader: Loader,
    scorer: Scorer,
}

impl<S: Storage, C: ConfigProvider> GeoJsonPipeline<S, C> {
    /// Fails if the scoring configuration is invalid.
    pub fn new(storage: S, config: C) -> Result<Self> {
        let loader = Loader::new(config.loader_config());
        let scorer = Scorer::new(config.scoring_config())?;
        Ok(Self {
            storage,
            config,
            loader,
            scorer,
        })
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for GeoJsonPipeline<S, C> {
    fn load_layers(&self) -> Result<(RoadNetwork, Cadastre)> {
        tracing::debug!(
            "Loading roads from {} and cadastre from {} (fallback {})",
            self.config.roads_path(),
            self.config.cadastre_path(),
            self.loader.config().fallback_crs
        );
        self.loader
            .load(self.config.roads_path(), self.config.cadastre_path())
    }

    fn measure(&self, roads: &RoadNetwork, cadastre: &Cadastre) -> Result<Measurement> {
        match self.config.analysis_bounds() {
            Some(bounds) => {
                let area = AnalysisArea::from_bounds(bounds)?;
                metrics::measure_within(roads, cadastre, &area)
            }
            None => metrics::measure(roads, cadastre),
        }
    }

    fn score(&self, measurement: &Measurement) -> Result<Score> {
        self.scorer.score(&measurement.metrics)
    }

    fn publish(&self, report: &WalkabilityReport) -> Result<Vec<String>> {
        let files = publisher::render(report, self.config.output_formats())?;

        // 啟用壓縮時只輸出一個 ZIP
        if let Some(archive_name) = self.config.compression() {
            let zip_data = publisher::bundle_zip(&files)?;
            tracing::debug!("Writing ZIP archive ({} bytes) to storage", zip_data.len());
            self.storage.write_file(archive_name, &zip_data)?;
            return Ok(vec![self.storage.location(archive_name)]);
        }

        let mut outputs = Vec::with_capacity(files.len());
        for file in &files {
            self.storage.write_file(&file.name, &file.data)?;
            outputs.push(self.storage.location(&file.name));
        }
        Ok(outputs)
    }

    fn describe_inputs(&self) -> (String, String) {
        (
            self.config.roads_path().to_string(),
            self.config.cadastre_path().to_string(),
        )
    }
}
