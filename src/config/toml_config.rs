use crate::core::distance::{Ellipsoid, WGS84_FLATTENING, WGS84_SEMI_MAJOR_AXIS_M};
use crate::core::ConfigProvider;
use crate::domain::model::{FlightBands, Kilometres, MAX_MIDDLE_FLIGHT_KM, MAX_SHORT_FLIGHT_KM};
use crate::utils::error::{FlightError, Result};
use crate::utils::validation::{config_error, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REGISTRY_PATH: &str = "data/airports.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub bands: BandsConfig,
    #[serde(default)]
    pub ellipsoid: EllipsoidConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_REGISTRY_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BandsConfig {
    pub short_max_km: Kilometres,
    pub middle_max_km: Kilometres,
}

impl Default for BandsConfig {
    fn default() -> Self {
        Self {
            short_max_km: MAX_SHORT_FLIGHT_KM,
            middle_max_km: MAX_MIDDLE_FLIGHT_KM,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EllipsoidConfig {
    pub semi_major_axis_m: f64,
    pub flattening: f64,
}

impl Default for EllipsoidConfig {
    fn default() -> Self {
        Self {
            semi_major_axis_m: WGS84_SEMI_MAJOR_AXIS_M,
            flattening: WGS84_FLATTENING,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(FlightError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| FlightError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${REGISTRY_PATH})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
        });

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("registry.path", &self.registry.path).map_err(config_error)?;
        FlightBands::new(self.bands.short_max_km, self.bands.middle_max_km)?;
        Ellipsoid::new(self.ellipsoid.semi_major_axis_m, self.ellipsoid.flattening)?;
        Ok(())
    }

    /// Validated distance bands.
    pub fn flight_bands(&self) -> Result<FlightBands> {
        FlightBands::new(self.bands.short_max_km, self.bands.middle_max_km)
    }

    pub fn reference_ellipsoid(&self) -> Result<Ellipsoid> {
        Ellipsoid::new(self.ellipsoid.semi_major_axis_m, self.ellipsoid.flattening)
    }
}

impl ConfigProvider for AppConfig {
    fn registry_path(&self) -> &str {
        &self.registry.path
    }

    fn bands(&self) -> Result<FlightBands> {
        self.flight_bands()
    }

    fn ellipsoid(&self) -> Result<Ellipsoid> {
        self.reference_ellipsoid()
    }

    fn pretty_output(&self) -> bool {
        self.output.pretty
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
