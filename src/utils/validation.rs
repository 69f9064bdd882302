use crate::utils::error::{Result, WalkError};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(WalkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(WalkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_set.contains(extension.to_ascii_lowercase().as_str()) => Ok(()),
        Some(extension) => Err(WalkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(WalkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_positive_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(WalkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number greater than 0".to_string(),
        });
    }
    Ok(())
}

pub fn validate_bounds(field_name: &str, bounds: &[f64]) -> Result<()> {
    let invalid = |reason: &str| WalkError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: format!("{:?}", bounds),
        reason: reason.to_string(),
    };

    let [min_x, min_y, max_x, max_y] = bounds else {
        return Err(invalid("Expected four values: min_x, min_y, max_x, max_y"));
    };
    if bounds.iter().any(|v| !v.is_finite()) {
        return Err(invalid("Bounds must be finite numbers"));
    }
    if min_x >= max_x || min_y >= max_y {
        return Err(invalid("Minimum must be less than maximum on both axes"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 也會落入這裡
    if !(value >= min && value <= max) {
        return Err(WalkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    let valid_formats = ["json", "csv"];

    if formats.is_empty() {
        return Err(WalkError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "At least one output format is required".to_string(),
        });
    }

    for format in formats {
        if !valid_formats.contains(&format.as_str()) {
            return Err(WalkError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    valid_formats.join(", ")
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("input.roads", "data/roads.geojson").is_ok());
        assert!(validate_path("input.roads", "").is_err());
        assert!(validate_path("input.roads", "   ").is_err());
        assert!(validate_path("input.roads", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["geojson", "json"];
        assert!(validate_file_extension("input.roads", "roads.geojson", &allowed).is_ok());
        assert!(validate_file_extension("input.roads", "roads.GeoJSON", &allowed).is_ok());
        assert!(validate_file_extension("input.roads", "roads.gpkg", &allowed).is_err());
        assert!(validate_file_extension("input.roads", "roads", &allowed).is_err());
    }

    #[test]
    fn test_validate_positive_finite() {
        assert!(validate_positive_finite("scoring.reference_parcel_area", 2000.0).is_ok());
        assert!(validate_positive_finite("scoring.reference_parcel_area", 0.0).is_err());
        assert!(validate_positive_finite("scoring.reference_parcel_area", f64::NAN).is_err());
        assert!(validate_positive_finite("scoring.reference_parcel_area", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("scoring.weights.road", 0.5, 0.0, 1.0).is_ok());
        assert!(validate_range("scoring.weights.road", -0.1, 0.0, 1.0).is_err());
        assert!(validate_range("scoring.weights.road", f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(validate_bounds("analysis.bounds", &[0.0, 0.0, 100.0, 50.0]).is_ok());
        assert!(validate_bounds("analysis.bounds", &[0.0, 0.0, 100.0]).is_err());
        assert!(validate_bounds("analysis.bounds", &[100.0, 0.0, 0.0, 50.0]).is_err());
        assert!(validate_bounds("analysis.bounds", &[0.0, 0.0, f64::NAN, 50.0]).is_err());
    }

    #[test]
    fn test_validate_output_formats() {
        assert!(validate_output_formats("output.formats", &["json".into(), "csv".into()]).is_ok());
        assert!(validate_output_formats("output.formats", &["tsv".into()]).is_err());
        assert!(validate_output_formats("output.formats", &[]).is_err());
    }
}
