use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("Failed to load {layer} layer from '{path}': {reason}")]
    LoadError {
        layer: String,
        path: String,
        reason: String,
    },

    #[error("Reprojection of {layer} layer failed: {reason}")]
    ReprojectionError { layer: String, reason: String },

    #[error("Layers do not share a CRS: roads are {roads}, cadastre is {cadastre}")]
    CrsMismatchError { roads: String, cadastre: String },

    #[error("Cannot compute {metric}: {reason}")]
    ComputationError { metric: String, reason: String },

    #[error("Cannot compute parcel size statistic: cadastre is empty")]
    EmptyCadastre,

    #[error("Unrecognised CRS '{value}'")]
    CrsParseError { value: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),
}

/// 錯誤所屬的管線階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Load,
    Computation,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WalkError {
    pub fn load(layer: &str, path: &str, reason: impl Into<String>) -> Self {
        Self::LoadError {
            layer: layer.to_string(),
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn computation(metric: &str, reason: impl Into<String>) -> Self {
        Self::ComputationError {
            metric: metric.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::LoadError { .. } | Self::ReprojectionError { .. } | Self::CrsMismatchError { .. } => {
                ErrorCategory::Load
            }
            Self::ComputationError { .. } | Self::EmptyCadastre => ErrorCategory::Computation,
            Self::CrsParseError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::IoError(_) | Self::CsvError(_) | Self::SerializationError(_) | Self::ZipError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Load | ErrorCategory::Computation => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::LoadError { .. } => {
                "Check that the file exists, is valid GeoJSON and contains the expected geometry type"
            }
            Self::ReprojectionError { .. } => {
                "Use EPSG:3857 as the fallback CRS or supply data already in a projected CRS"
            }
            Self::CrsMismatchError { .. } => {
                "Export both layers in the same projected CRS, or declare the CRS of each layer explicitly"
            }
            Self::ComputationError { .. } => {
                "Inspect the input extents; the layers must cover a non-degenerate area"
            }
            Self::EmptyCadastre => "Provide a cadastre layer with at least one parcel polygon",
            Self::CrsParseError { .. } => "Write CRS values as EPSG:<code>, e.g. EPSG:3857",
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Fix the configuration value and run again",
            Self::IoError(_) => "Check that the output directory is writable",
            Self::CsvError(_) | Self::SerializationError(_) | Self::ZipError(_) => {
                "Report writing failed; check disk space and output permissions"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Load => format!("Could not load input data: {}", self),
            ErrorCategory::Computation => format!("Could not compute walkability metrics: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
        }
    }

    /// 依嚴重程度決定 CLI 結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, WalkError>;
