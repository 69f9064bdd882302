use clap::Parser;
use walkscore::core::ConfigProvider;
use walkscore::utils::{logger, validation::Validate};
use walkscore::{CliConfig, GeoJsonPipeline, LocalStorage, RunOutcome, WalkError, WalkabilityEngine};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting walkscore CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 建立存儲和管道
    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = match GeoJsonPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => fail(&e),
    };

    let engine = WalkabilityEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(outcome) => print_summary(&outcome),
        Err(e) => fail(&e),
    }
}

fn print_summary(outcome: &RunOutcome) {
    let m = &outcome.report.measurement;
    let score = &outcome.report.score;

    println!("✅ Walkability analysis completed");
    println!("  CRS: {}", outcome.report.crs);
    println!("  Analysis area: {:.3} km²", m.analysis_area_m2 / 1e6);
    println!(
        "  Road density: {:.3} km/km² ({} roads, {:.1} km)",
        m.metrics.road_density * 1000.0,
        m.road_count,
        m.total_road_length_m / 1000.0
    );
    println!(
        "  Intersection density: {:.2} per km² ({} intersections)",
        m.metrics.intersection_density * 1e6,
        m.intersection_count
    );
    println!(
        "  Median parcel area: {:.1} m² ({} parcels, mean {:.1} m²)",
        m.metrics.parcel_size_stat, m.parcel_stats.count, m.parcel_stats.mean_area
    );
    println!("  Walkability score (0-100): {:.2}", score.value);
    for output in &outcome.outputs {
        println!("📁 Output saved to: {}", output);
    }
}

fn fail(e: &WalkError) -> ! {
    tracing::error!(
        "❌ Walkability analysis failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1));
}
