use crate::domain::crs::Crs;
use geo::{Coord, LineString, Polygon};

/// Sphere radius used by EPSG:3857.
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude at which web mercator's square extent ends.
pub const WEB_MERCATOR_MAX_LATITUDE: f64 = 85.051_128_78;

/// Forward projection from geographic lon/lat (degrees) into a projected CRS.
#[derive(Debug, Clone, Copy)]
pub struct Reprojector {
    target: Crs,
}

impl Reprojector {
    /// Only EPSG:3857 is supported as a target.
    pub fn new(target: Crs) -> Result<Self, String> {
        if target != Crs::WEB_MERCATOR {
            return Err(format!(
                "unsupported target {}; only {} can be used as a fallback projection",
                target,
                Crs::WEB_MERCATOR
            ));
        }
        Ok(Self { target })
    }

    pub fn target(&self) -> Crs {
        self.target
    }

    pub fn project(&self, c: Coord<f64>) -> Result<Coord<f64>, String> {
        let (lon, lat) = (c.x, c.y);
        if !lon.is_finite() || !lat.is_finite() {
            return Err(format!("non-finite coordinate ({}, {})", lon, lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(format!("longitude {} is outside [-180, 180]", lon));
        }
        if lat.abs() > WEB_MERCATOR_MAX_LATITUDE {
            return Err(format!(
                "latitude {} is beyond the web mercator limit of ±{}",
                lat, WEB_MERCATOR_MAX_LATITUDE
            ));
        }

        let x = WEB_MERCATOR_RADIUS * lon.to_radians();
        let y = WEB_MERCATOR_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Ok(Coord { x, y })
    }

    pub fn project_line(&self, line: &LineString<f64>) -> Result<LineString<f64>, String> {
        line.0
            .iter()
            .map(|c| self.project(*c))
            .collect::<Result<Vec<_>, _>>()
            .map(LineString::new)
    }

    pub fn project_polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>, String> {
        let exterior = self.project_line(polygon.exterior())?;
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| self.project_line(ring))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Polygon::new(exterior, interiors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_origin_maps_to_origin() {
        let r = Reprojector::new(Crs::WEB_MERCATOR).unwrap();
        let p = r.project(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert!(approx(p.x, 0.0, 1e-9));
        assert!(approx(p.y, 0.0, 1e-9));
    }

    #[test]
    fn test_known_point() {
        // 雪梨市中心附近
        let r = Reprojector::new(Crs::WEB_MERCATOR).unwrap();
        let p = r.project(Coord { x: 151.2093, y: -33.8688 }).unwrap();
        assert!(approx(p.x, 16_832_542.279, 0.01));
        assert!(approx(p.y, -4_011_198.647, 0.01));
    }

    #[test]
    fn test_antimeridian_extent() {
        let r = Reprojector::new(Crs::WEB_MERCATOR).unwrap();
        let p = r.project(Coord { x: 180.0, y: 0.0 }).unwrap();
        assert!(approx(p.x, 20_037_508.342_789_244, 1e-6));
    }

    #[test]
    fn test_out_of_range_fails() {
        let r = Reprojector::new(Crs::WEB_MERCATOR).unwrap();
        assert!(r.project(Coord { x: 0.0, y: 89.0 }).is_err());
        assert!(r.project(Coord { x: 200.0, y: 0.0 }).is_err());
        assert!(r.project(Coord { x: f64::NAN, y: 0.0 }).is_err());
    }

    #[test]
    fn test_unsupported_target() {
        assert!(Reprojector::new(Crs::from_epsg(28356)).is_err());
    }
}
