use crate::domain::model::{BackendKind, DirectionMode};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ReframeError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// swisstopo's published download location for the CHENyx06 NTv2 grid.
/// swisstopo has moved its download pages before, override via `grid.url`.
pub const DEFAULT_GRID_URL: &str = "http://www.swisstopo.admin.ch/internet/swisstopo/en/home/products/software/products/chenyx06.parsys.00011.downloadList.29885.DownloadFile.tmp/chenyx06etrs.gsb";
pub const DEFAULT_GRID_FILE_NAME: &str = "chenyx06etrs.gsb";
pub const DEFAULT_REST_ENDPOINT: &str = "https://geodesy.geo.admin.ch/reframe";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Environment variables PROJ itself reads grid directories from.
const PROJ_ENV_VARS: [&str; 2] = ["PROJ_LIB", "PROJ_DATA"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub grid: GridConfig,
    pub rest: RestConfig,
    pub conversion: ConversionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub url: String,
    pub file_name: String,
    pub local_dir: String,
    pub search_paths: Vec<String>,
    pub use_proj_env: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GRID_URL.to_string(),
            file_name: DEFAULT_GRID_FILE_NAME.to_string(),
            local_dir: ".".to_string(),
            search_paths: Vec::new(),
            use_proj_env: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_REST_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub backend: BackendKind,
    pub direction_mode: DirectionMode,
}

impl ConverterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReframeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GRID_DIR})，找不到的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| {
            ReframeError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_file_name("grid.file_name", &self.grid.file_name)?;
        validation::validate_grid_url("grid.url", &self.grid.url, &self.grid.file_name)?;
        validation::validate_directory("grid.local_dir", &self.grid.local_dir)?;
        for dir in &self.grid.search_paths {
            validation::validate_directory("grid.search_paths", dir)?;
        }

        validation::validate_service_endpoint("rest.endpoint", &self.rest.endpoint)?;
        validation::validate_range("rest.timeout_seconds", self.rest.timeout_seconds, 1, 600)?;

        Ok(())
    }
}

impl ConfigProvider for ConverterConfig {
    fn grid_url(&self) -> &str {
        &self.grid.url
    }

    fn grid_local_path(&self) -> PathBuf {
        Path::new(&self.grid.local_dir).join(&self.grid.file_name)
    }

    fn grid_search_paths(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self.grid.search_paths.iter().map(PathBuf::from).collect();

        if self.grid.use_proj_env {
            for var in PROJ_ENV_VARS {
                if let Some(value) = std::env::var_os(var) {
                    dirs.extend(std::env::split_paths(&value).filter(|p| !p.as_os_str().is_empty()));
                }
            }
        }

        dirs.push(PathBuf::from(&self.grid.local_dir));
        dirs.dedup();
        dirs
    }

    fn rest_endpoint(&self) -> &str {
        &self.rest.endpoint
    }

    fn rest_timeout(&self) -> Duration {
        Duration::from_secs(self.rest.timeout_seconds)
    }
}

impl Validate for ConverterConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
