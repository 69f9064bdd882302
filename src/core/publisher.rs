use crate::domain::model::WalkabilityReport;
use crate::utils::error::{Result, WalkError};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const JSON_FILENAME: &str = "walkability_report.json";
pub const CSV_FILENAME: &str = "walkability_report.csv";
pub const DEFAULT_ARCHIVE_NAME: &str = "walkability_report.zip";

/// A rendered output file: name plus contents.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// Render the report once per requested format (`json`, `csv`).
pub fn render(report: &WalkabilityReport, formats: &[String]) -> Result<Vec<OutputFile>> {
    formats
        .iter()
        .map(|format| match format.as_str() {
            "json" => Ok(OutputFile {
                name: JSON_FILENAME.to_string(),
                data: serde_json::to_vec_pretty(report)?,
            }),
            "csv" => Ok(OutputFile {
                name: CSV_FILENAME.to_string(),
                data: render_csv(report)?,
            }),
            other => Err(WalkError::InvalidConfigValueError {
                field: "output.formats".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: json, csv".to_string(),
            }),
        })
        .collect()
}

fn render_csv(report: &WalkabilityReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.serialize(report.to_row())?;
    writer
        .into_inner()
        .map_err(|e| WalkError::IoError(e.into_error()))
}

/// 把所有輸出打包成單一 ZIP
pub fn bundle_zip(files: &[OutputFile]) -> Result<Vec<u8>> {
    tracing::debug!("Creating ZIP archive with {} files", files.len());

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for file in files {
        zip.start_file::<_, ()>(file.name.as_str(), FileOptions::default())?;
        zip.write_all(&file.data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crs::Crs;
    use crate::domain::model::{Measurement, MetricSet, ParcelStats, Score, ScoreComponents};
    use chrono::Utc;
    use std::io::Read;

    fn sample_report() -> WalkabilityReport {
        WalkabilityReport {
            generated_at: Utc::now(),
            roads_path: "roads.geojson".to_string(),
            cadastre_path: "cadastre.geojson".to_string(),
            crs: Crs::WEB_MERCATOR,
            measurement: Measurement {
                metrics: MetricSet {
                    road_density: 0.02,
                    intersection_density: 1e-4,
                    parcel_size_stat: 2_500.0,
                },
                analysis_area_m2: 10_000.0,
                bounds: [0.0, 0.0, 100.0, 100.0],
                road_count: 2,
                total_road_length_m: 200.0,
                intersection_count: 1,
                parcel_stats: ParcelStats {
                    count: 4,
                    mean_area: 2_500.0,
                    median_area: 2_500.0,
                    min_area: 2_500.0,
                    max_area: 2_500.0,
                },
                parcel_density: 4e-4,
            },
            score: Score {
                value: 96.0,
                components: ScoreComponents {
                    road: 1.0,
                    intersection: 1.0,
                    parcel: 0.8,
                },
            },
        }
    }

    #[test]
    fn test_render_json_and_csv() {
        let files = render(&sample_report(), &["json".to_string(), "csv".to_string()]).unwrap();
        assert_eq!(files.len(), 2);

        let json: serde_json::Value = serde_json::from_slice(&files[0].data).unwrap();
        assert_eq!(json["score"]["value"], 96.0);
        assert_eq!(json["crs"], "EPSG:3857");

        let csv_text = String::from_utf8(files[1].data.clone()).unwrap();
        let mut lines = csv_text.lines();
        assert!(lines.next().unwrap().starts_with("generated_at,roads_path"));
        assert!(lines.next().unwrap().contains("roads.geojson"));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(render(&sample_report(), &["tsv".to_string()]).is_err());
    }

    #[test]
    fn test_bundle_zip_contains_every_file() {
        let files = render(&sample_report(), &["json".to_string(), "csv".to_string()]).unwrap();
        let data = bundle_zip(&files).unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut json = String::new();
        archive
            .by_name(JSON_FILENAME)
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        assert!(json.contains("\"intersection_count\": 1"));
    }
}
