//! Metric engine: road density, intersection density and parcel size
//! statistics over one pair of loaded layers.
//!
//! Intersections are found by brute force over every unordered pair of roads.
//! A pair counts once when the two lines meet at any point that is not an
//! endpoint of both, so node continuations (two roads ending at the same
//! node) are never counted while crossings and T-junctions are. Points that
//! fall inside a collinear overlap of the pair are part of that overlap, not
//! a crossing, so overlapping roads only count where they also cross
//! elsewhere. Any spatial index added later has to keep exactly this rule.
//!
//! With explicit analysis bounds both layers are clipped to the bounds
//! first: road lengths and parcel areas are the clipped ones, and a pair
//! only counts when a qualifying meeting point lies inside the bounds.

use crate::domain::model::{
    ensure_comparable, AnalysisArea, Cadastre, Measurement, MetricSet, ParcelStats, RoadNetwork,
};
use crate::utils::error::{Result, WalkError};
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    Area, BooleanOps, BoundingRect, Coord, EuclideanDistance, EuclideanLength, Line, LineString,
    MultiLineString, Point, Rect,
};

/// Two endpoints closer than this (in CRS units) are the same node.
pub const ENDPOINT_TOLERANCE: f64 = 1e-6;

/// Total road length divided by the analysis area. An empty network is 0.
pub fn road_density(roads: &RoadNetwork, area: &AnalysisArea) -> f64 {
    if roads.is_empty() {
        return 0.0;
    }
    roads.total_length() / area.area()
}

/// Number of road pairs that intersect, excluding shared-endpoint touches.
pub fn count_intersections(roads: &RoadNetwork) -> usize {
    count_pairs(roads, None)
}

/// Intersecting road pairs per unit area.
pub fn intersection_density(roads: &RoadNetwork, area: &AnalysisArea) -> f64 {
    count_intersections(roads) as f64 / area.area()
}

/// Parcel area statistics. The median is the scored statistic.
///
/// An empty cadastre has no defined statistic and yields
/// [`WalkError::EmptyCadastre`].
pub fn parcel_size_stats(cadastre: &Cadastre) -> Result<ParcelStats> {
    area_stats(cadastre.parcel_areas())
}

/// Run every metric over the two layers, measured against their combined
/// bounding box.
pub fn measure(roads: &RoadNetwork, cadastre: &Cadastre) -> Result<Measurement> {
    let area = AnalysisArea::from_layers(roads, cadastre)?;
    tracing::debug!("Analysis area: {:.1} m²", area.area());

    let parcel_stats = parcel_size_stats(cadastre)?;
    Ok(assemble(
        &area,
        road_density(roads, &area),
        roads.total_length(),
        roads.len(),
        count_intersections(roads),
        parcel_stats,
    ))
}

/// Run every metric over the part of both layers inside `area`.
pub fn measure_within(
    roads: &RoadNetwork,
    cadastre: &Cadastre,
    area: &AnalysisArea,
) -> Result<Measurement> {
    ensure_comparable(roads, cadastre)?;
    let window = area.bounds().to_polygon();
    tracing::debug!(
        "Clipping {} roads and {} parcels to {:.1} m² of explicit bounds",
        roads.len(),
        cadastre.len(),
        area.area()
    );

    let road_lengths: Vec<f64> = roads
        .roads()
        .iter()
        .map(|road| {
            window
                .clip(&MultiLineString::new(vec![road.clone()]), false)
                .euclidean_length()
        })
        .collect();
    let total_road_length_m: f64 = road_lengths.iter().sum();
    let road_count = road_lengths.iter().filter(|length| **length > 0.0).count();

    let parcel_areas: Vec<f64> = cadastre
        .parcels()
        .iter()
        .map(|parcel| parcel.intersection(&window).unsigned_area())
        .filter(|clipped| *clipped > 0.0)
        .collect();
    let parcel_stats = area_stats(parcel_areas)?;

    let bounds = area.bounds();
    Ok(assemble(
        area,
        total_road_length_m / area.area(),
        total_road_length_m,
        road_count,
        count_pairs(roads, Some(&bounds)),
        parcel_stats,
    ))
}

fn assemble(
    area: &AnalysisArea,
    road_density: f64,
    total_road_length_m: f64,
    road_count: usize,
    intersection_count: usize,
    parcel_stats: ParcelStats,
) -> Measurement {
    let bounds = area.bounds();
    Measurement {
        metrics: MetricSet {
            road_density,
            intersection_density: intersection_count as f64 / area.area(),
            parcel_size_stat: parcel_stats.median_area,
        },
        analysis_area_m2: area.area(),
        bounds: [bounds.min().x, bounds.min().y, bounds.max().x, bounds.max().y],
        road_count,
        total_road_length_m,
        intersection_count,
        parcel_density: parcel_stats.count as f64 / area.area(),
        parcel_stats,
    }
}

fn area_stats(mut areas: Vec<f64>) -> Result<ParcelStats> {
    if areas.is_empty() {
        return Err(WalkError::EmptyCadastre);
    }
    if areas.iter().any(|a| !a.is_finite()) {
        return Err(WalkError::computation(
            "parcel size statistic",
            "a parcel has a non-finite area",
        ));
    }

    areas.sort_by(|a, b| a.total_cmp(b));

    let count = areas.len();
    let mid = count / 2;
    let median_area = if count % 2 == 0 {
        (areas[mid - 1] + areas[mid]) / 2.0
    } else {
        areas[mid]
    };
    let mean_area = areas.iter().sum::<f64>() / count as f64;

    Ok(ParcelStats {
        count,
        mean_area,
        median_area,
        min_area: areas[0],
        max_area: areas[count - 1],
    })
}

fn count_pairs(roads: &RoadNetwork, window: Option<&Rect<f64>>) -> usize {
    let lines = roads.roads();
    let bounds: Vec<Option<Rect<f64>>> = lines.iter().map(|line| line.bounding_rect()).collect();

    let mut count = 0;
    for i in 0..lines.len() {
        for j in (i + 1)..lines.len() {
            let (Some(a), Some(b)) = (bounds[i], bounds[j]) else {
                continue;
            };
            if !rects_overlap(&a, &b) {
                continue;
            }
            if roads_intersect(&lines[i], &lines[j], window) {
                count += 1;
            }
        }
    }

    tracing::debug!(
        "Found {} intersecting pairs among {} roads",
        count,
        lines.len()
    );
    count
}

fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x + ENDPOINT_TOLERANCE
        && b.min().x <= a.max().x + ENDPOINT_TOLERANCE
        && a.min().y <= b.max().y + ENDPOINT_TOLERANCE
        && b.min().y <= a.max().y + ENDPOINT_TOLERANCE
}

fn roads_intersect(a: &LineString<f64>, b: &LineString<f64>, window: Option<&Rect<f64>>) -> bool {
    let mut meetings: Vec<Coord<f64>> = Vec::new();
    let mut overlaps: Vec<Line<f64>> = Vec::new();
    for segment_a in a.lines() {
        for segment_b in b.lines() {
            match line_intersection(segment_a, segment_b) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    meetings.push(intersection)
                }
                Some(LineIntersection::Collinear { intersection }) => overlaps.push(intersection),
                None => {}
            }
        }
    }

    meetings.into_iter().any(|point| {
        !(is_endpoint(point, a) && is_endpoint(point, b))
            // 共線重疊上的點不算路口
            && !overlaps.iter().any(|overlap| on_segment(point, overlap))
            && window.map_or(true, |w| inside(point, w))
    })
}

fn is_endpoint(point: Coord<f64>, line: &LineString<f64>) -> bool {
    let near = |c: &Coord<f64>| {
        (c.x - point.x).abs() <= ENDPOINT_TOLERANCE && (c.y - point.y).abs() <= ENDPOINT_TOLERANCE
    };
    line.0.first().is_some_and(near) || line.0.last().is_some_and(near)
}

fn on_segment(point: Coord<f64>, segment: &Line<f64>) -> bool {
    Point::from(point).euclidean_distance(segment) <= ENDPOINT_TOLERANCE
}

fn inside(point: Coord<f64>, rect: &Rect<f64>) -> bool {
    point.x >= rect.min().x
        && point.x <= rect.max().x
        && point.y >= rect.min().y
        && point.y <= rect.max().y
}
