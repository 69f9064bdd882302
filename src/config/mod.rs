pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::core::loader::LoaderConfig;
    use crate::core::publisher::DEFAULT_ARCHIVE_NAME;
    use crate::core::scorer::{ScoringConfig, Weights};
    use crate::core::ConfigProvider;
    use crate::domain::crs::Crs;
    use crate::utils::error::Result;
    use crate::utils::validation::{
        validate_bounds, validate_file_extension, validate_output_formats, validate_path,
        Validate,
    };
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "walkscore")]
    #[command(about = "Walkability score from a road network and a cadastre layer")]
    pub struct CliConfig {
        /// GeoJSON file with road centrelines
        #[arg(long)]
        pub roads: String,

        /// GeoJSON file with parcel polygons
        #[arg(long)]
        pub cadastre: String,

        #[arg(long, default_value = "./outputs")]
        pub output_path: String,

        #[arg(long, value_delimiter = ',', default_value = "json")]
        pub formats: Vec<String>,

        /// Bundle all outputs into one ZIP archive
        #[arg(long)]
        pub compress: bool,

        /// Projected CRS geographic layers are converted to
        #[arg(long, default_value = "EPSG:3857")]
        pub fallback_crs: Crs,

        /// CRS to assume for the roads file instead of what it declares
        #[arg(long)]
        pub roads_crs: Option<Crs>,

        #[arg(long)]
        pub cadastre_crs: Option<Crs>,

        /// Clip both layers to min_x,min_y,max_x,max_y (projected units)
        #[arg(long, num_args = 1, value_delimiter = ',', allow_hyphen_values = true)]
        pub bounds: Option<Vec<f64>>,

        #[arg(long, default_value_t = 0.4)]
        pub weight_road: f64,

        #[arg(long, default_value_t = 0.4)]
        pub weight_intersection: f64,

        #[arg(long, default_value_t = 0.2)]
        pub weight_parcel: f64,

        /// Road density (m/m²) that earns the full road component
        #[arg(long, default_value_t = 0.005)]
        pub ref_road_density: f64,

        /// Intersections per m² that earn the full intersection component
        #[arg(long, default_value_t = 1e-4)]
        pub ref_intersection_density: f64,

        /// Median parcel area (m²) that earns the full parcel component
        #[arg(long, default_value_t = 2000.0)]
        pub ref_parcel_area: f64,

        #[arg(long, help = "Log CPU and memory usage per stage")]
        pub monitor: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl ConfigProvider for CliConfig {
        fn roads_path(&self) -> &str {
            &self.roads
        }

        fn cadastre_path(&self) -> &str {
            &self.cadastre
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.formats
        }

        fn compression(&self) -> Option<&str> {
            self.compress.then_some(DEFAULT_ARCHIVE_NAME)
        }

        fn analysis_bounds(&self) -> Option<[f64; 4]> {
            self.bounds
                .as_deref()
                .and_then(|b| <[f64; 4]>::try_from(b).ok())
        }

        fn loader_config(&self) -> LoaderConfig {
            LoaderConfig {
                fallback_crs: self.fallback_crs,
                roads_crs: self.roads_crs,
                cadastre_crs: self.cadastre_crs,
            }
        }

        fn scoring_config(&self) -> ScoringConfig {
            ScoringConfig {
                reference_road_density: self.ref_road_density,
                reference_intersection_density: self.ref_intersection_density,
                reference_parcel_area: self.ref_parcel_area,
                weights: Weights {
                    road: self.weight_road,
                    intersection: self.weight_intersection,
                    parcel: self.weight_parcel,
                },
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_path("roads", &self.roads)?;
            validate_path("cadastre", &self.cadastre)?;
            validate_file_extension("roads", &self.roads, &["geojson", "json"])?;
            validate_file_extension("cadastre", &self.cadastre, &["geojson", "json"])?;
            validate_path("output_path", &self.output_path)?;
            validate_output_formats("formats", &self.formats)?;
            if let Some(bounds) = &self.bounds {
                validate_bounds("bounds", bounds)?;
            }
            self.loader_config().validate()?;
            self.scoring_config().validate()
        }
    }

}
