#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub fn feature_collection(crs: Option<&str>, geometries: Vec<Value>) -> Value {
    let features: Vec<Value> = geometries
        .into_iter()
        .map(|geometry| json!({"type": "Feature", "properties": {}, "geometry": geometry}))
        .collect();

    match crs {
        Some(name) => json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": name}},
            "features": features,
        }),
        None => json!({"type": "FeatureCollection", "features": features}),
    }
}

pub fn line(coords: &[(f64, f64)]) -> Value {
    let coordinates: Vec<[f64; 2]> = coords.iter().map(|&(x, y)| [x, y]).collect();
    json!({"type": "LineString", "coordinates": coordinates})
}

pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]],
    })
}

/// 100 m × 100 m: one horizontal and one vertical road crossing in the middle.
pub fn cross_roads() -> Vec<Value> {
    vec![
        line(&[(0.0, 50.0), (100.0, 50.0)]),
        line(&[(50.0, 0.0), (50.0, 100.0)]),
    ]
}

/// Four 50 m × 50 m parcels tiling the same square.
pub fn quad_parcels() -> Vec<Value> {
    vec![
        rectangle(0.0, 0.0, 50.0, 50.0),
        rectangle(50.0, 0.0, 100.0, 50.0),
        rectangle(0.0, 50.0, 50.0, 100.0),
        rectangle(50.0, 50.0, 100.0, 100.0),
    ]
}

pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
    path
}

pub fn toml_config(roads: &Path, cadastre: &Path, output: &Path, extra: &str) -> String {
    // Windows 路徑的反斜線在 TOML 字串中需要轉換
    let norm = |p: &Path| p.display().to_string().replace('\\', "/");
    format!(
        r#"
[analysis]
name = "test-run"

[input]
roads = "{}"
cadastre = "{}"

[output]
path = "{}"
formats = ["json", "csv"]
{}
"#,
        norm(roads),
        norm(cadastre),
        norm(output),
        extra
    )
}
