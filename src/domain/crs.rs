use crate::utils::error::{Result, WalkError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 以經緯度（度）為單位的 EPSG 代碼
const GEOGRAPHIC_CODES: &[u32] = &[
    4326, // WGS 84
    4269, // NAD83
    4258, // ETRS89
    4283, // GDA94
    7844, // GDA2020
    4167, // NZGD2000
    4617, // NAD83(CSRS)
    4019, // GRS 1980 ellipsoid
    4230, // ED50
    4322, // WGS 72
];

/// Web mercator 的歷史別名，統一為 3857
const WEB_MERCATOR_ALIASES: &[u32] = &[900913, 3785, 102100, 102113];

/// A coordinate reference system identified by its EPSG code.
///
/// Codes in a small table of well-known geographic systems are treated as
/// angular (degrees); everything else is assumed to be projected in meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Crs {
    epsg: u32,
}

impl Crs {
    pub const WGS84: Crs = Crs { epsg: 4326 };
    pub const WEB_MERCATOR: Crs = Crs { epsg: 3857 };

    pub fn from_epsg(code: u32) -> Self {
        if WEB_MERCATOR_ALIASES.contains(&code) {
            Self::WEB_MERCATOR
        } else {
            Self { epsg: code }
        }
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn is_geographic(&self) -> bool {
        GEOGRAPHIC_CODES.contains(&self.epsg)
    }

    pub fn is_projected(&self) -> bool {
        !self.is_geographic()
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::WEB_MERCATOR
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

impl FromStr for Crs {
    type Err = WalkError;

    /// Accepts `EPSG:n`, OGC URNs and URLs, `CRS84` and bare codes.
    fn from_str(s: &str) -> Result<Self> {
        let parse_error = || WalkError::CrsParseError {
            value: s.to_string(),
        };

        let upper = s.trim().to_ascii_uppercase();
        if upper == "CRS84" || upper.ends_with(":CRS84") || upper.ends_with("/CRS84") {
            return Ok(Self::WGS84);
        }

        let code = if let Ok(code) = upper.parse::<u32>() {
            code
        } else if upper.contains("EPSG") {
            upper
                .rsplit([':', '/'])
                .next()
                .and_then(|tail| tail.parse::<u32>().ok())
                .ok_or_else(parse_error)?
        } else {
            return Err(parse_error());
        };

        if code == 0 {
            return Err(parse_error());
        }

        Ok(Self::from_epsg(code))
    }
}

impl TryFrom<String> for Crs {
    type Error = WalkError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Crs> for String {
    fn from(crs: Crs) -> Self {
        crs.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_spellings() {
        assert_eq!("EPSG:3857".parse::<Crs>().unwrap(), Crs::WEB_MERCATOR);
        assert_eq!("epsg:28356".parse::<Crs>().unwrap().epsg(), 28356);
        assert_eq!(
            "urn:ogc:def:crs:EPSG::4283".parse::<Crs>().unwrap().epsg(),
            4283
        );
        assert_eq!(
            "http://www.opengis.net/def/crs/EPSG/0/7855"
                .parse::<Crs>()
                .unwrap()
                .epsg(),
            7855
        );
        assert_eq!(
            "urn:ogc:def:crs:OGC:1.3:CRS84".parse::<Crs>().unwrap(),
            Crs::WGS84
        );
        assert_eq!("4326".parse::<Crs>().unwrap(), Crs::WGS84);
    }

    #[test]
    fn test_web_mercator_aliases_normalize() {
        assert_eq!("EPSG:900913".parse::<Crs>().unwrap(), Crs::WEB_MERCATOR);
        assert_eq!(Crs::from_epsg(102100), Crs::WEB_MERCATOR);
    }

    #[test]
    fn test_reject_garbage() {
        assert!("not-a-crs".parse::<Crs>().is_err());
        assert!("EPSG:".parse::<Crs>().is_err());
        assert!("EPSG:0".parse::<Crs>().is_err());
    }

    #[test]
    fn test_geographic_vs_projected() {
        assert!(Crs::WGS84.is_geographic());
        assert!(Crs::from_epsg(4283).is_geographic());
        assert!(Crs::WEB_MERCATOR.is_projected());
        assert!(Crs::from_epsg(28356).is_projected());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Crs::WEB_MERCATOR).unwrap();
        assert_eq!(json, "\"EPSG:3857\"");
        let back: Crs = serde_json::from_str("\"EPSG:4326\"").unwrap();
        assert_eq!(back, Crs::WGS84);
    }
}
