mod common;

use anyhow::Result;
use common::*;
use serde_json::Value;
use tempfile::TempDir;
use walkscore::core::loader::{Loader, LoaderConfig};
use walkscore::core::metrics;
use walkscore::core::projection::Reprojector;
use walkscore::Crs;

/// Small block grid near Sydney expressed in lon/lat degrees.
const ORIGIN: (f64, f64) = (151.20, -33.87);
const STEP: f64 = 0.001;

fn geographic_layers() -> (Vec<Vec<(f64, f64)>>, Vec<Vec<(f64, f64)>>) {
    let (lon0, lat0) = ORIGIN;
    let mut roads = Vec::new();
    for k in 1..=2 {
        let offset = k as f64 * STEP;
        roads.push(vec![(lon0, lat0 + offset), (lon0 + 3.0 * STEP, lat0 + offset)]);
        roads.push(vec![(lon0 + offset, lat0), (lon0 + offset, lat0 + 3.0 * STEP)]);
    }

    let mut parcels = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            let x0 = lon0 + i as f64 * STEP;
            let y0 = lat0 + j as f64 * STEP;
            parcels.push(vec![
                (x0, y0),
                (x0 + STEP, y0),
                (x0 + STEP, y0 + STEP),
                (x0, y0 + STEP),
                (x0, y0),
            ]);
        }
    }
    (roads, parcels)
}

fn to_geojson(roads: &[Vec<(f64, f64)>], parcels: &[Vec<(f64, f64)>], crs: Option<&str>) -> (Value, Value) {
    let road_geoms = roads.iter().map(|r| line(r)).collect();
    let parcel_geoms = parcels
        .iter()
        .map(|ring| {
            let coords: Vec<[f64; 2]> = ring.iter().map(|&(x, y)| [x, y]).collect();
            serde_json::json!({"type": "Polygon", "coordinates": [coords]})
        })
        .collect();
    (
        feature_collection(crs, road_geoms),
        feature_collection(crs, parcel_geoms),
    )
}

fn project_all(reprojector: &Reprojector, layer: &[Vec<(f64, f64)>]) -> Vec<Vec<(f64, f64)>> {
    layer
        .iter()
        .map(|coords| {
            coords
                .iter()
                .map(|&(x, y)| {
                    let c = reprojector.project(geo::Coord { x, y }).unwrap();
                    (c.x, c.y)
                })
                .collect()
        })
        .collect()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1e-12)
}

#[test]
fn test_geographic_input_matches_projected_equivalent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (roads, parcels) = geographic_layers();

    // 未宣告 CRS → 視為 WGS 84
    let (geo_roads, geo_parcels) = to_geojson(&roads, &parcels, None);
    let geo_roads_path = write_json(temp_dir.path(), "roads_4326.geojson", &geo_roads);
    let geo_parcels_path = write_json(temp_dir.path(), "cadastre_4326.geojson", &geo_parcels);

    let reprojector = Reprojector::new(Crs::WEB_MERCATOR).unwrap();
    let (proj_roads, proj_parcels) = to_geojson(
        &project_all(&reprojector, &roads),
        &project_all(&reprojector, &parcels),
        Some("EPSG:3857"),
    );
    let proj_roads_path = write_json(temp_dir.path(), "roads_3857.geojson", &proj_roads);
    let proj_parcels_path = write_json(temp_dir.path(), "cadastre_3857.geojson", &proj_parcels);

    let loader = Loader::new(LoaderConfig::default());
    let (r1, c1) = loader.load(&geo_roads_path, &geo_parcels_path)?;
    let (r2, c2) = loader.load(&proj_roads_path, &proj_parcels_path)?;

    assert_eq!(r1.crs(), Crs::WEB_MERCATOR);
    assert_eq!(c1.crs(), Crs::WEB_MERCATOR);
    assert!(r1.crs().is_projected());

    let m1 = metrics::measure(&r1, &c1)?;
    let m2 = metrics::measure(&r2, &c2)?;

    assert!(close(m1.metrics.road_density, m2.metrics.road_density));
    assert!(close(m1.metrics.intersection_density, m2.metrics.intersection_density));
    assert!(close(m1.metrics.parcel_size_stat, m2.metrics.parcel_size_stat));
    assert_eq!(m1.intersection_count, 4);
    assert_eq!(m1.intersection_count, m2.intersection_count);
    Ok(())
}

#[test]
fn test_explicit_wgs84_member_is_reprojected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (roads, parcels) = geographic_layers();
    let (geo_roads, geo_parcels) = to_geojson(&roads, &parcels, Some("urn:ogc:def:crs:OGC:1.3:CRS84"));
    let roads_path = write_json(temp_dir.path(), "roads.geojson", &geo_roads);
    let parcels_path = write_json(temp_dir.path(), "cadastre.geojson", &geo_parcels);

    let (r, c) = Loader::new(LoaderConfig::default()).load(&roads_path, &parcels_path)?;
    assert_eq!(r.crs(), Crs::WEB_MERCATOR);
    assert_eq!(c.crs(), Crs::WEB_MERCATOR);

    // 0.001° 經度在 Web Mercator 中約為 111 m
    let width = r.bounding_rect().unwrap().width();
    assert!((width - 333.96).abs() < 0.1);
    Ok(())
}

#[test]
fn test_projected_input_passes_through_unchanged() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let roads = write_json(
        temp_dir.path(),
        "roads.geojson",
        &feature_collection(Some("EPSG:28356"), cross_roads()),
    );
    let cadastre = write_json(
        temp_dir.path(),
        "cadastre.geojson",
        &feature_collection(Some("EPSG:28356"), quad_parcels()),
    );

    let (r, c) = Loader::new(LoaderConfig::default()).load(&roads, &cadastre)?;
    assert_eq!(r.crs().epsg(), 28356);
    assert_eq!(c.crs().epsg(), 28356);
    assert_eq!(r.total_length(), 200.0);
    Ok(())
}

#[test]
fn test_mixed_geographic_and_projected_layers() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let (roads, parcels) = geographic_layers();
    let (geo_roads, _) = to_geojson(&roads, &parcels, None);
    let roads_path = write_json(temp_dir.path(), "roads.geojson", &geo_roads);

    let reprojector = Reprojector::new(Crs::WEB_MERCATOR).unwrap();
    let (_, proj_parcels) = to_geojson(&roads, &project_all(&reprojector, &parcels), Some("EPSG:3857"));
    let parcels_path = write_json(temp_dir.path(), "cadastre.geojson", &proj_parcels);

    // 地理座標的道路被投影到 3857，與地籍一致
    let (r, c) = Loader::new(LoaderConfig::default()).load(&roads_path, &parcels_path)?;
    assert_eq!(r.crs(), c.crs());
    assert!(metrics::measure(&r, &c).is_ok());
    Ok(())
}
