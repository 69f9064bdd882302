pub mod geojson_pipeline;

pub use geojson_pipeline::GeoJsonPipeline;
