use crate::core::Pipeline;
use crate::domain::model::WalkabilityReport;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;

/// Result of a completed run: the report and where it was written.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: WalkabilityReport,
    pub outputs: Vec<String>,
}

pub struct WalkabilityEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> WalkabilityEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Load → measure → score → publish. Any stage failing aborts the run.
    pub fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚶 Starting walkability analysis...");

        // Load
        tracing::info!("📥 Loading layers...");
        let (roads, cadastre) = self.pipeline.load_layers()?;
        tracing::info!(
            "Loaded {} roads and {} parcels ({})",
            roads.len(),
            cadastre.len(),
            roads.crs()
        );
        self.monitor.log_stats("Load");

        // Measure
        tracing::info!("📐 Computing metrics...");
        let measurement = self.pipeline.measure(&roads, &cadastre)?;
        tracing::info!(
            "Road density {:.6} m/m², {} intersections, median parcel {:.1} m²",
            measurement.metrics.road_density,
            measurement.intersection_count,
            measurement.metrics.parcel_size_stat
        );
        self.monitor.log_stats("Measure");

        // Score
        let score = self.pipeline.score(&measurement)?;
        tracing::info!("🏁 Walkability score: {:.2}", score.value);

        let (roads_path, cadastre_path) = self.pipeline.describe_inputs();
        let report = WalkabilityReport {
            generated_at: Utc::now(),
            roads_path,
            cadastre_path,
            crs: roads.crs(),
            measurement,
            score,
        };

        // Publish
        tracing::info!("💾 Writing report...");
        let outputs = self.pipeline.publish(&report)?;
        for output in &outputs {
            tracing::debug!("Wrote {}", output);
        }
        self.monitor.log_final_stats();

        Ok(RunOutcome { report, outputs })
    }
}
