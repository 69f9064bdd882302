use crate::core::loader::LoaderConfig;
use crate::core::publisher::DEFAULT_ARCHIVE_NAME;
use crate::core::scorer::ScoringConfig;
use crate::core::ConfigProvider;
use crate::domain::crs::Crs;
use crate::utils::error::{Result, WalkError};
use crate::utils::validation::{
    validate_bounds, validate_file_extension, validate_output_formats, validate_path, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub analysis: AnalysisConfig,
    pub input: InputConfig,
    pub projection: Option<ProjectionConfig>,
    pub scoring: Option<ScoringConfig>,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub name: String,
    pub description: Option<String>,
    /// `[min_x, min_y, max_x, max_y]` in the layers' projected CRS
    pub bounds: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub roads: String,
    pub cadastre: String,
    pub roads_crs: Option<Crs>,
    pub cadastre_crs: Option<Crs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub fallback_crs: Crs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// `compact`（預設）或 `json`
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(WalkError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WalkError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WalkError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("input.roads", &self.input.roads)?;
        validate_path("input.cadastre", &self.input.cadastre)?;
        validate_file_extension("input.roads", &self.input.roads, &["geojson", "json"])?;
        validate_file_extension("input.cadastre", &self.input.cadastre, &["geojson", "json"])?;

        if let Some(bounds) = &self.analysis.bounds {
            validate_bounds("analysis.bounds", bounds)?;
        }

        validate_path("output.path", &self.output.path)?;
        validate_output_formats("output.formats", &self.output.formats)?;

        if let Some(filename) = self.compression() {
            validate_file_extension("output.compression.filename", filename, &["zip"])?;
        }

        if let Some(format) = self.log_format() {
            if format != "compact" && format != "json" {
                return Err(WalkError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: "Valid formats: compact, json".to_string(),
                });
            }
        }

        self.loader_config().validate()?;
        self.scoring_config().validate()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_format(&self) -> Option<&str> {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
    }

    pub fn fallback_crs(&self) -> Crs {
        self.projection
            .as_ref()
            .map(|p| p.fallback_crs)
            .unwrap_or_default()
    }
}

impl ConfigProvider for TomlConfig {
    fn roads_path(&self) -> &str {
        &self.input.roads
    }

    fn cadastre_path(&self) -> &str {
        &self.input.cadastre
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn compression(&self) -> Option<&str> {
        match &self.output.compression {
            Some(c) if c.enabled => Some(c.filename.as_deref().unwrap_or(DEFAULT_ARCHIVE_NAME)),
            _ => None,
        }
    }

    fn analysis_bounds(&self) -> Option<[f64; 4]> {
        self.analysis
            .bounds
            .as_deref()
            .and_then(|b| <[f64; 4]>::try_from(b).ok())
    }

    fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            fallback_crs: self.fallback_crs(),
            roads_crs: self.input.roads_crs,
            cadastre_crs: self.input.cadastre_crs,
        }
    }

    fn scoring_config(&self) -> ScoringConfig {
        self.scoring.unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
