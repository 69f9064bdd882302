use crate::domain::model::{MetricSet, Score, ScoreComponents};
use crate::utils::error::{Result, WalkError};
use crate::utils::validation::{validate_positive_finite, validate_range, Validate};
use serde::{Deserialize, Serialize};

/// Allowed deviation of the weight sum from 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub road: f64,
    pub intersection: f64,
    pub parcel: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            road: 0.4,
            intersection: 0.4,
            parcel: 0.2,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.road + self.intersection + self.parcel
    }
}

/// Reference scales each metric is normalized against, in SI units.
///
/// Every component is `min(metric / reference, 1)`. Defaults: 5 km of road
/// per km², 100 intersections per km² and a 2000 m² median parcel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// m/m² that saturates the road component.
    pub reference_road_density: f64,
    /// Intersections per m² that saturate the intersection component.
    pub reference_intersection_density: f64,
    /// Median parcel area (m²) at or above which the parcel component saturates.
    pub reference_parcel_area: f64,
    pub weights: Weights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            reference_road_density: 0.005,
            reference_intersection_density: 1e-4,
            reference_parcel_area: 2_000.0,
            weights: Weights::default(),
        }
    }
}

impl Validate for ScoringConfig {
    /// Weights are checked, never rescaled: each in `[0, 1]`, summing to 1.
    fn validate(&self) -> Result<()> {
        validate_positive_finite("scoring.reference_road_density", self.reference_road_density)?;
        validate_positive_finite(
            "scoring.reference_intersection_density",
            self.reference_intersection_density,
        )?;
        validate_positive_finite("scoring.reference_parcel_area", self.reference_parcel_area)?;

        validate_range("scoring.weights.road", self.weights.road, 0.0, 1.0)?;
        validate_range("scoring.weights.intersection", self.weights.intersection, 0.0, 1.0)?;
        validate_range("scoring.weights.parcel", self.weights.parcel, 0.0, 1.0)?;

        let sum = self.weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(WalkError::ConfigValidationError {
                field: "scoring.weights".to_string(),
                message: format!("weights must sum to 1, got {}", sum),
            });
        }
        Ok(())
    }
}

/// Maps a [`MetricSet`] to a score in `[0, 100]`.
#[derive(Debug, Clone)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn normalize(&self, metrics: &MetricSet) -> Result<ScoreComponents> {
        let fields = [
            ("road density", metrics.road_density),
            ("intersection density", metrics.intersection_density),
            ("parcel size statistic", metrics.parcel_size_stat),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(WalkError::computation(
                    "score",
                    format!("{} is {}, expected a finite non-negative number", name, value),
                ));
            }
        }

        let c = &self.config;
        Ok(ScoreComponents {
            road: clamp_unit(metrics.road_density / c.reference_road_density),
            intersection: clamp_unit(metrics.intersection_density / c.reference_intersection_density),
            parcel: clamp_unit(metrics.parcel_size_stat / c.reference_parcel_area),
        })
    }

    pub fn score(&self, metrics: &MetricSet) -> Result<Score> {
        let components = self.normalize(metrics)?;
        let w = &self.config.weights;
        let weighted = w.road * components.road
            + w.intersection * components.intersection
            + w.parcel * components.parcel;

        Ok(Score {
            value: (weighted * 100.0).clamp(0.0, 100.0),
            components,
        })
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
