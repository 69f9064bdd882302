use clap::Parser;
use walkscore::core::ConfigProvider;
use walkscore::utils::{logger, validation::Validate};
use walkscore::{GeoJsonPipeline, LocalStorage, TomlConfig, WalkabilityEngine};

#[derive(Parser)]
#[command(name = "toml-walk")]
#[command(about = "Walkability scoring driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "walkscore.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - validate and show the configuration without loading data
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.log_format() == Some("json") {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based walkability analysis");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No data will be loaded");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = GeoJsonPipeline::new(storage, config)?;
    let engine = WalkabilityEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(outcome) => {
            println!(
                "✅ Walkability score (0-100): {:.2}",
                outcome.report.score.value
            );
            for output in &outcome.outputs {
                println!("📁 Output saved to: {}", output);
            }
        }
        Err(e) => {
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
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Analysis: {}", config.analysis.name);
    if let Some(description) = &config.analysis.description {
        println!("  Description: {}", description);
    }
    println!("  Roads: {}", config.roads_path());
    println!("  Cadastre: {}", config.cadastre_path());
    match config.analysis_bounds() {
        Some([min_x, min_y, max_x, max_y]) => println!(
            "  Bounds: [{}, {}] - [{}, {}]",
            min_x, min_y, max_x, max_y
        ),
        None => println!("  Bounds: combined extent of both layers"),
    }
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    let loader = config.loader_config();
    let scoring = config.scoring_config();

    println!("🔍 Dry Run Analysis:");
    println!();

    println!("🌐 Projection:");
    println!("  Fallback CRS: {}", loader.fallback_crs);
    match loader.roads_crs {
        Some(crs) => println!("  Roads CRS (declared): {}", crs),
        None => println!("  Roads CRS: taken from file, EPSG:4326 if absent"),
    }
    match loader.cadastre_crs {
        Some(crs) => println!("  Cadastre CRS (declared): {}", crs),
        None => println!("  Cadastre CRS: taken from file, EPSG:4326 if absent"),
    }

    println!();
    println!("⚖️ Scoring:");
    println!(
        "  Reference road density: {} m/m² ({} km/km²)",
        scoring.reference_road_density,
        scoring.reference_road_density * 1000.0
    );
    println!(
        "  Reference intersection density: {} /m² ({} /km²)",
        scoring.reference_intersection_density,
        scoring.reference_intersection_density * 1e6
    );
    println!("  Reference parcel area: {} m²", scoring.reference_parcel_area);
    println!(
        "  Weights: road {}, intersection {}, parcel {}",
        scoring.weights.road, scoring.weights.intersection, scoring.weights.parcel
    );

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    if let Some(archive) = config.compression() {
        println!("  Compression: {} (ZIP)", archive);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
