//! # 运行配置
//!
//! TOML 配置文件（默认 `matfetch.toml`）一次性加载，启动期即校验，
//! 运行期不可变。
//!
//! ```toml
//! formulas = ["BeAlN2", "MgSiP2"]
//!
//! [api]
//! # api_key 可省略，改用 MP_API_KEY 环境变量
//! batch_size = 5
//! request_delay = 10.0
//! structure_dir = "data/processed/structures"
//!
//! [ml]
//! test_size = 0.2
//! random_state = 42
//! n_estimators = 100
//! ```
//!
//! `[ml]` 与 `[paths]` 供下游特征提取/训练脚本消费，这里只做载入与校验。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `serde` + `toml` 反序列化

use crate::error::{MatfetchError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 顶层配置
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// 目标化学式列表
    #[serde(default)]
    pub formulas: Vec<String>,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ml: MlConfig,
}

/// 数据目录布局
#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
    #[serde(default = "default_features_dir")]
    pub features_dir: PathBuf,
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,
}

/// Materials Project API 设置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API key；缺省时从 MP_API_KEY 环境变量解析
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 每处理多少条化学式后额外暂停一次
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// 相邻请求的最小间隔（秒）
    #[serde(default = "default_request_delay")]
    pub request_delay: f64,

    /// 单条化学式的最大请求次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 指数退避底数
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// 结构文件输出目录
    #[serde(default = "default_structure_dir")]
    pub structure_dir: PathBuf,
}

/// 下游 ML 脚本的训练参数
#[derive(Debug, Clone, Deserialize)]
pub struct MlConfig {
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_random_state")]
    pub random_state: u64,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: u32,
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}
fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}
fn default_features_dir() -> PathBuf {
    PathBuf::from("data/features")
}
fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}
fn default_base_url() -> String {
    "https://api.materialsproject.org".to_string()
}
fn default_batch_size() -> usize {
    5
}
fn default_request_delay() -> f64 {
    10.0
}
fn default_max_retries() -> u32 {
    5
}
fn default_backoff_factor() -> f64 {
    2.0
}
fn default_structure_dir() -> PathBuf {
    PathBuf::from("data/processed/structures")
}
fn default_test_size() -> f64 {
    0.2
}
fn default_random_state() -> u64 {
    42
}
fn default_n_estimators() -> u32 {
    100
}

impl Default for PathsConfig {
    fn default() -> Self {
        PathsConfig {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
            features_dir: default_features_dir(),
            model_dir: default_model_dir(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            api_key: None,
            base_url: default_base_url(),
            batch_size: default_batch_size(),
            request_delay: default_request_delay(),
            max_retries: default_max_retries(),
            backoff_factor: default_backoff_factor(),
            structure_dir: default_structure_dir(),
        }
    }
}

impl Default for MlConfig {
    fn default() -> Self {
        MlConfig {
            test_size: default_test_size(),
            random_state: default_random_state(),
            n_estimators: default_n_estimators(),
        }
    }
}

impl Config {
    /// 从文件加载并校验
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|e| MatfetchError::ConfigError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// 从 TOML 文本解析并校验
    pub fn from_toml(content: &str, origin: &str) -> Result<Config> {
        let config: Config = toml::from_str(content).map_err(|e| MatfetchError::ConfigError {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, origin: &str) -> Result<()> {
        let fail = |reason: String| MatfetchError::ConfigError {
            path: origin.to_string(),
            reason,
        };

        if self.api.batch_size == 0 {
            return Err(fail("api.batch_size must be at least 1".to_string()));
        }
        if self.api.request_delay < 0.0 || !self.api.request_delay.is_finite() {
            return Err(fail("api.request_delay must be a non-negative number".to_string()));
        }
        if self.api.max_retries == 0 {
            return Err(fail("api.max_retries must be at least 1".to_string()));
        }
        if self.api.backoff_factor < 1.0 {
            return Err(fail("api.backoff_factor must be >= 1.0".to_string()));
        }
        if self.api.base_url.trim().is_empty() {
            return Err(fail("api.base_url must be non-empty".to_string()));
        }
        if !(0.0..1.0).contains(&self.ml.test_size) {
            return Err(fail("ml.test_size must be in [0, 1)".to_string()));
        }
        if let Some(blank) = self.formulas.iter().find(|f| f.trim().is_empty()) {
            return Err(fail(format!("formulas contains a blank entry: '{blank}'")));
        }
        Ok(())
    }

    /// 解析最终 API key：命令行/环境变量优先于配置文件
    pub fn resolve_api_key(&self, override_key: Option<&str>) -> Result<String> {
        let key = override_key
            .map(str::to_string)
            .or_else(|| self.api.api_key.clone())
            .unwrap_or_default();

        if key.trim().is_empty() {
            return Err(MatfetchError::MissingApiKey);
        }
        Ok(key)
    }
}
