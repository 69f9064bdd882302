use crate::domain::crs::Crs;
use crate::utils::error::{Result, WalkError};
use chrono::{DateTime, Utc};
use geo::{coord, Area, BoundingRect, EuclideanLength, LineString, Polygon, Rect};
use serde::{Deserialize, Serialize};

/// Road centrelines in one projected CRS. A road's identity is its index.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    crs: Crs,
    roads: Vec<LineString<f64>>,
}

impl RoadNetwork {
    pub fn new(crs: Crs, roads: Vec<LineString<f64>>) -> Self {
        Self { crs, roads }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn roads(&self) -> &[LineString<f64>] {
        &self.roads
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    pub fn total_length(&self) -> f64 {
        self.roads.iter().map(|road| road.euclidean_length()).sum()
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        union_rects(self.roads.iter().filter_map(|road| road.bounding_rect()))
    }
}

/// Parcel polygons sharing the road network's CRS once loaded.
#[derive(Debug, Clone)]
pub struct Cadastre {
    crs: Crs,
    parcels: Vec<Polygon<f64>>,
}

impl Cadastre {
    pub fn new(crs: Crs, parcels: Vec<Polygon<f64>>) -> Self {
        Self { crs, parcels }
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn parcels(&self) -> &[Polygon<f64>] {
        &self.parcels
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    pub fn parcel_areas(&self) -> Vec<f64> {
        self.parcels.iter().map(|parcel| parcel.unsigned_area()).collect()
    }

    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        union_rects(self.parcels.iter().filter_map(|parcel| parcel.bounding_rect()))
    }
}

fn union_rects(rects: impl Iterator<Item = Rect<f64>>) -> Option<Rect<f64>> {
    rects.reduce(|acc, rect| {
        Rect::new(
            coord! { x: acc.min().x.min(rect.min().x), y: acc.min().y.min(rect.min().y) },
            coord! { x: acc.max().x.max(rect.max().x), y: acc.max().y.max(rect.max().y) },
        )
    })
}

/// The region densities are measured over: configured bounds, or the
/// bounding box of both layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisArea {
    bounds: Rect<f64>,
    area: f64,
}

impl AnalysisArea {
    /// 以明確的矩形建立分析範圍；面積必須為正且有限
    pub fn from_rect(bounds: Rect<f64>) -> Result<Self> {
        let area = bounds.width() * bounds.height();
        if !area.is_finite() || area <= 0.0 {
            return Err(WalkError::computation(
                "analysis area",
                format!(
                    "bounding region {:.3} x {:.3} has zero or undefined area",
                    bounds.width(),
                    bounds.height()
                ),
            ));
        }
        Ok(Self { bounds, area })
    }

    /// `[min_x, min_y, max_x, max_y]` in the layers' projected units.
    pub fn from_bounds(bounds: [f64; 4]) -> Result<Self> {
        let [min_x, min_y, max_x, max_y] = bounds;
        if min_x >= max_x || min_y >= max_y {
            return Err(WalkError::computation(
                "analysis area",
                format!("bounds {:?} must satisfy min < max on both axes", bounds),
            ));
        }
        Self::from_rect(Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }))
    }

    /// Bounding box of every road and parcel. Both layers must share one
    /// projected CRS.
    pub fn from_layers(roads: &RoadNetwork, cadastre: &Cadastre) -> Result<Self> {
        ensure_comparable(roads, cadastre)?;

        let bounds = union_rects(roads.bounding_rect().into_iter().chain(cadastre.bounding_rect()))
            .ok_or_else(|| {
                WalkError::computation("analysis area", "neither layer contains any geometry")
            })?;

        Self::from_rect(bounds)
    }

    pub fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Area in square CRS units (m² for projected systems).
    pub fn area(&self) -> f64 {
        self.area
    }
}

/// Both layers must share one projected CRS before anything is measured.
pub fn ensure_comparable(roads: &RoadNetwork, cadastre: &Cadastre) -> Result<()> {
    if roads.crs() != cadastre.crs() {
        return Err(WalkError::CrsMismatchError {
            roads: roads.crs().to_string(),
            cadastre: cadastre.crs().to_string(),
        });
    }
    if roads.crs().is_geographic() {
        return Err(WalkError::computation(
            "analysis area",
            format!("{} is geographic; areas would be in square degrees", roads.crs()),
        ));
    }
    Ok(())
}

/// The three scalars the scorer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSet {
    /// Road length per unit area (m/m²).
    pub road_density: f64,
    /// Intersecting road pairs per unit area (1/m²).
    pub intersection_density: f64,
    /// Median parcel area (m²).
    pub parcel_size_stat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParcelStats {
    pub count: usize,
    pub mean_area: f64,
    pub median_area: f64,
    pub min_area: f64,
    pub max_area: f64,
}

/// Everything the metric engine computed for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub metrics: MetricSet,
    pub analysis_area_m2: f64,
    /// `[min_x, min_y, max_x, max_y]`
    pub bounds: [f64; 4],
    pub road_count: usize,
    pub total_road_length_m: f64,
    pub intersection_count: usize,
    pub parcel_stats: ParcelStats,
    /// Parcels per m².
    pub parcel_density: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub road: f64,
    pub intersection: f64,
    pub parcel: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Composite walkability in `[0, 100]`.
    pub value: f64,
    pub components: ScoreComponents,
}

/// 一次執行的完整輸出紀錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkabilityReport {
    pub generated_at: DateTime<Utc>,
    pub roads_path: String,
    pub cadastre_path: String,
    pub crs: Crs,
    pub measurement: Measurement,
    pub score: Score,
}

/// Flat CSV row for a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRow<'a> {
    pub generated_at: String,
    pub roads_path: &'a str,
    pub cadastre_path: &'a str,
    pub crs: String,
    pub analysis_area_m2: f64,
    pub road_count: usize,
    pub total_road_length_m: f64,
    pub intersection_count: usize,
    pub parcel_count: usize,
    pub road_density: f64,
    pub intersection_density: f64,
    pub median_parcel_area_m2: f64,
    pub mean_parcel_area_m2: f64,
    pub parcel_density: f64,
    pub road_component: f64,
    pub intersection_component: f64,
    pub parcel_component: f64,
    pub score: f64,
}

impl WalkabilityReport {
    pub fn to_row(&self) -> ReportRow<'_> {
        let m = &self.measurement;
        ReportRow {
            generated_at: self.generated_at.to_rfc3339(),
            roads_path: &self.roads_path,
            cadastre_path: &self.cadastre_path,
            crs: self.crs.to_string(),
            analysis_area_m2: m.analysis_area_m2,
            road_count: m.road_count,
            total_road_length_m: m.total_road_length_m,
            intersection_count: m.intersection_count,
            parcel_count: m.parcel_stats.count,
            road_density: m.metrics.road_density,
            intersection_density: m.metrics.intersection_density,
            median_parcel_area_m2: m.parcel_stats.median_area,
            mean_parcel_area_m2: m.parcel_stats.mean_area,
            parcel_density: m.parcel_density,
            road_component: self.score.components.road,
            intersection_component: self.score.components.intersection,
            parcel_component: self.score.components.parcel,
            score: self.score.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        Polygon::new(
            line_string![
                (x: x, y: y),
                (x: x + size, y: y),
                (x: x + size, y: y + size),
                (x: x, y: y + size),
                (x: x, y: y),
            ],
            vec![],
        )
    }

    #[test]
    fn test_area_covers_both_layers() {
        let roads = RoadNetwork::new(
            Crs::WEB_MERCATOR,
            vec![line_string![(x: 0.0, y: 0.0), (x: 50.0, y: 10.0)]],
        );
        let cadastre = Cadastre::new(Crs::WEB_MERCATOR, vec![square(40.0, 40.0, 60.0)]);

        let area = AnalysisArea::from_layers(&roads, &cadastre).unwrap();
        assert_eq!(area.area(), 100.0 * 100.0);
    }

    #[test]
    fn test_zero_area_is_an_error() {
        let roads = RoadNetwork::new(
            Crs::WEB_MERCATOR,
            vec![line_string![(x: 0.0, y: 5.0), (x: 100.0, y: 5.0)]],
        );
        let cadastre = Cadastre::new(Crs::WEB_MERCATOR, vec![]);

        let err = AnalysisArea::from_layers(&roads, &cadastre).unwrap_err();
        assert!(matches!(err, WalkError::ComputationError { .. }));
    }

    #[test]
    fn test_explicit_bounds() {
        let area = AnalysisArea::from_bounds([10.0, 20.0, 60.0, 120.0]).unwrap();
        assert_eq!(area.area(), 5_000.0);
        assert_eq!(area.bounds().min(), coord! { x: 10.0, y: 20.0 });

        // 反向或退化的範圍
        assert!(AnalysisArea::from_bounds([60.0, 20.0, 10.0, 120.0]).is_err());
        assert!(AnalysisArea::from_bounds([0.0, 0.0, 10.0, 0.0]).is_err());
    }

    #[test]
    fn test_no_geometry_is_an_error() {
        let roads = RoadNetwork::new(Crs::WEB_MERCATOR, vec![]);
        let cadastre = Cadastre::new(Crs::WEB_MERCATOR, vec![]);
        assert!(AnalysisArea::from_layers(&roads, &cadastre).is_err());
    }

    #[test]
    fn test_geographic_layers_are_rejected() {
        let roads = RoadNetwork::new(
            Crs::WGS84,
            vec![line_string![(x: 151.0, y: -33.0), (x: 151.1, y: -33.1)]],
        );
        let cadastre = Cadastre::new(Crs::WGS84, vec![]);
        assert!(AnalysisArea::from_layers(&roads, &cadastre).is_err());
    }

    #[test]
    fn test_mismatched_crs_is_an_error() {
        let roads = RoadNetwork::new(
            Crs::WEB_MERCATOR,
            vec![line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 10.0)]],
        );
        let cadastre = Cadastre::new(Crs::from_epsg(28356), vec![square(0.0, 0.0, 10.0)]);
        let err = AnalysisArea::from_layers(&roads, &cadastre).unwrap_err();
        assert!(matches!(err, WalkError::CrsMismatchError { .. }));
    }

    #[test]
    fn test_parcel_areas_subtract_holes() {
        let with_hole = Polygon::new(
            square(0.0, 0.0, 10.0).exterior().clone(),
            vec![square(2.0, 2.0, 2.0).exterior().clone()],
        );
        let cadastre = Cadastre::new(Crs::WEB_MERCATOR, vec![with_hole]);
        assert_eq!(cadastre.parcel_areas(), vec![96.0]);
    }
}
