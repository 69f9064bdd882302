use crate::core::projection::Reprojector;
use crate::domain::crs::Crs;
use crate::domain::model::{Cadastre, RoadNetwork};
use crate::utils::error::{Result, WalkError};
use crate::utils::validation::Validate;
use geo::{Coord, LineString, Polygon};
use geojson::{GeoJson, Geometry, JsonObject, Value};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Loader settings. The fallback CRS is passed in explicitly, never global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Projection geographic layers are converted into.
    pub fallback_crs: Crs,
    /// CRS to assume for the roads file, overriding whatever it declares.
    pub roads_crs: Option<Crs>,
    pub cadastre_crs: Option<Crs>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fallback_crs: Crs::WEB_MERCATOR,
            roads_crs: None,
            cadastre_crs: None,
        }
    }
}

impl Validate for LoaderConfig {
    fn validate(&self) -> Result<()> {
        if self.fallback_crs.is_geographic() {
            return Err(WalkError::InvalidConfigValueError {
                field: "projection.fallback_crs".to_string(),
                value: self.fallback_crs.to_string(),
                reason: "fallback CRS must be projected (meters)".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    Roads,
    Cadastre,
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Roads => "roads",
            LayerKind::Cadastre => "cadastre",
        }
    }
}

/// One layer as read from disk, before any reprojection.
#[derive(Debug)]
struct ParsedLayer<G> {
    crs: Crs,
    geometries: Vec<G>,
}

pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load both layers and guarantee they share one projected CRS.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        roads_path: P,
        cadastre_path: Q,
    ) -> Result<(RoadNetwork, Cadastre)> {
        let roads = self.load_roads(roads_path)?;
        let cadastre = self.load_cadastre(cadastre_path)?;

        if roads.crs() != cadastre.crs() {
            return Err(WalkError::CrsMismatchError {
                roads: roads.crs().to_string(),
                cadastre: cadastre.crs().to_string(),
            });
        }

        Ok((roads, cadastre))
    }

    pub fn load_roads<P: AsRef<Path>>(&self, path: P) -> Result<RoadNetwork> {
        let layer = LayerKind::Roads;
        let path = path.as_ref();
        let geojson = read_geojson(path, layer)?;
        let parsed = parse_layer(&geojson, path, layer, self.config.roads_crs, collect_lines)?;

        let (crs, roads) = self.ensure_projected(layer, parsed, |r, line| r.project_line(line))?;
        tracing::info!("🛣️ Loaded {} roads in {}", roads.len(), crs);
        Ok(RoadNetwork::new(crs, roads))
    }

    pub fn load_cadastre<P: AsRef<Path>>(&self, path: P) -> Result<Cadastre> {
        let layer = LayerKind::Cadastre;
        let path = path.as_ref();
        let geojson = read_geojson(path, layer)?;
        let parsed = parse_layer(&geojson, path, layer, self.config.cadastre_crs, collect_polygons)?;

        let (crs, parcels) =
            self.ensure_projected(layer, parsed, |r, polygon| r.project_polygon(polygon))?;
        tracing::info!("🗺️ Loaded {} parcels in {}", parcels.len(), crs);
        Ok(Cadastre::new(crs, parcels))
    }

    /// 地理座標（度）的圖層轉換到備援投影；已投影的圖層原樣通過
    fn ensure_projected<G>(
        &self,
        layer: LayerKind,
        parsed: ParsedLayer<G>,
        project: impl Fn(&Reprojector, &G) -> std::result::Result<G, String>,
    ) -> Result<(Crs, Vec<G>)> {
        if parsed.crs.is_projected() {
            tracing::debug!("{} layer already projected ({})", layer.name(), parsed.crs);
            return Ok((parsed.crs, parsed.geometries));
        }

        let reprojection_error = |reason: String| WalkError::ReprojectionError {
            layer: layer.name().to_string(),
            reason,
        };

        let reprojector = Reprojector::new(self.config.fallback_crs).map_err(reprojection_error)?;
        tracing::info!(
            "🌐 {} layer is geographic ({}), reprojecting to {}",
            layer.name(),
            parsed.crs,
            reprojector.target()
        );

        let projected = parsed
            .geometries
            .iter()
            .map(|geometry| project(&reprojector, geometry))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(reprojection_error)?;

        Ok((reprojector.target(), projected))
    }
}

fn read_geojson(path: &Path, layer: LayerKind) -> Result<GeoJson> {
    let location = path.display().to_string();

    if !path.exists() {
        return Err(WalkError::load(layer.name(), &location, "file not found"));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| WalkError::load(layer.name(), &location, format!("unreadable: {}", e)))?;

    content
        .parse::<GeoJson>()
        .map_err(|e| WalkError::load(layer.name(), &location, format!("invalid GeoJSON: {}", e)))
}

fn parse_layer<G>(
    geojson: &GeoJson,
    path: &Path,
    layer: LayerKind,
    override_crs: Option<Crs>,
    collect: fn(&Geometry, &mut Vec<G>, &mut usize) -> std::result::Result<(), String>,
) -> Result<ParsedLayer<G>> {
    let location = path.display().to_string();

    let crs = match override_crs {
        Some(crs) => crs,
        None => declared_crs(geojson)
            .map_err(|reason| WalkError::load(layer.name(), &location, reason))?
            // RFC 7946: 未宣告時為 WGS 84
            .unwrap_or(Crs::WGS84),
    };

    let mut geometries = Vec::new();
    let mut skipped = 0;
    for geometry in top_level_geometries(geojson, &mut skipped) {
        collect(geometry, &mut geometries, &mut skipped)
            .map_err(|reason| WalkError::load(layer.name(), &location, reason))?;
    }

    if skipped > 0 {
        tracing::warn!(
            "Skipped {} features without usable {} geometry in {}",
            skipped,
            layer.name(),
            location
        );
    }

    if geometries.is_empty() {
        let expected = match layer {
            LayerKind::Roads => "line",
            LayerKind::Cadastre => "polygon",
        };
        return Err(WalkError::load(
            layer.name(),
            &location,
            format!("contains no {} geometries", expected),
        ));
    }

    Ok(ParsedLayer { crs, geometries })
}

fn top_level_geometries<'a>(geojson: &'a GeoJson, skipped: &mut usize) -> Vec<&'a Geometry> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection
            .features
            .iter()
            .filter_map(|feature| {
                if feature.geometry.is_none() {
                    *skipped += 1;
                }
                feature.geometry.as_ref()
            })
            .collect(),
        GeoJson::Feature(feature) => {
            if feature.geometry.is_none() {
                *skipped += 1;
            }
            feature.geometry.iter().collect()
        }
        GeoJson::Geometry(geometry) => vec![geometry],
    }
}

/// Legacy GeoJSON 2008 `crs` member: `{"type": "name", "properties": {"name": ...}}`.
fn declared_crs(geojson: &GeoJson) -> std::result::Result<Option<Crs>, String> {
    let members: Option<&JsonObject> = match geojson {
        GeoJson::FeatureCollection(collection) => collection.foreign_members.as_ref(),
        GeoJson::Feature(feature) => feature.foreign_members.as_ref(),
        GeoJson::Geometry(geometry) => geometry.foreign_members.as_ref(),
    };

    let Some(crs) = members.and_then(|m| m.get("crs")) else {
        return Ok(None);
    };
    if crs.is_null() {
        return Ok(None);
    }

    let name = crs
        .get("properties")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .ok_or_else(|| format!("unsupported crs member: {}", crs))?;

    name.parse::<Crs>()
        .map(Some)
        .map_err(|e| format!("invalid crs member: {}", e))
}

fn to_coord(position: &[f64]) -> std::result::Result<Coord<f64>, String> {
    match position {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(format!(
            "position {:?} has fewer than two ordinates",
            position
        )),
    }
}

fn to_line_string(positions: &[Vec<f64>]) -> std::result::Result<LineString<f64>, String> {
    positions
        .iter()
        .map(|p| to_coord(p))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(LineString::new)
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> std::result::Result<Option<Polygon<f64>>, String> {
    let Some((exterior, interiors)) = rings.split_first() else {
        return Ok(None);
    };
    if exterior.len() < 4 {
        return Ok(None);
    }

    let exterior = to_line_string(exterior)?;
    let interiors = interiors
        .iter()
        .map(|ring| to_line_string(ring))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(Some(Polygon::new(exterior, interiors)))
}

fn collect_lines(
    geometry: &Geometry,
    out: &mut Vec<LineString<f64>>,
    skipped: &mut usize,
) -> std::result::Result<(), String> {
    match &geometry.value {
        Value::LineString(line) => push_line(line, out, skipped)?,
        Value::MultiLineString(lines) => {
            for line in lines {
                push_line(line, out, skipped)?;
            }
        }
        Value::GeometryCollection(members) => {
            for member in members {
                collect_lines(member, out, skipped)?;
            }
        }
        _ => *skipped += 1,
    }
    Ok(())
}

fn push_line(
    positions: &[Vec<f64>],
    out: &mut Vec<LineString<f64>>,
    skipped: &mut usize,
) -> std::result::Result<(), String> {
    if positions.len() < 2 {
        *skipped += 1;
    } else {
        out.push(to_line_string(positions)?);
    }
    Ok(())
}

fn collect_polygons(
    geometry: &Geometry,
    out: &mut Vec<Polygon<f64>>,
    skipped: &mut usize,
) -> std::result::Result<(), String> {
    match &geometry.value {
        Value::Polygon(rings) => push_polygon(rings, out, skipped)?,
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                push_polygon(rings, out, skipped)?;
            }
        }
        Value::GeometryCollection(members) => {
            for member in members {
                collect_polygons(member, out, skipped)?;
            }
        }
        _ => *skipped += 1,
    }
    Ok(())
}

fn push_polygon(
    rings: &[Vec<Vec<f64>>],
    out: &mut Vec<Polygon<f64>>,
    skipped: &mut usize,
) -> std::result::Result<(), String> {
    match to_polygon(rings)? {
        Some(polygon) => out.push(polygon),
        None => *skipped += 1,
    }
    Ok(())
}
