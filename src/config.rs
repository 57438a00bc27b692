//! 程序配置
//!
//! 启动时由 `CUSTOMER` 环境变量选择 `config/{CUSTOMER}.toml`，文件中未写的项使用默认值，
//! 最后再用环境变量覆盖。配置只在 main 中构建一次，之后按值传递。

use crate::error::ConfigError;
use crate::infrastructure::{ProxyEndpoint, RetryPolicy};
use crate::models::{ReportRequestSpec, SiteCredentials};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 配置文件目录
pub const CONFIG_DIR: &str = "config";

/// 程序配置文件
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 配置名称
    pub customer: String,
    /// 站点信息
    pub site: SiteCredentials,
    /// 报表请求
    pub report: ReportConfig,
    /// 提交报表请求的重试策略
    #[serde(rename = "retry", deserialize_with = "submission_policy")]
    pub retry_options: RetryPolicy,
    /// 轮询报表的重试策略
    #[serde(rename = "polling", deserialize_with = "polling_policy")]
    pub polling_options: RetryPolicy,
    /// 输出位置
    pub output: OutputConfig,
    /// 调试选项
    pub debug: DebugConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            customer: "default".to_string(),
            site: SiteCredentials::default(),
            report: ReportConfig::default(),
            retry_options: default_submission_policy(),
            polling_options: default_polling_policy(),
            output: OutputConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Config {
    /// 按 `CUSTOMER` 加载配置文件并应用环境变量
    pub fn load() -> anyhow::Result<Self> {
        let customer = std::env::var("CUSTOMER").unwrap_or_else(|_| "default".to_string());
        let path = PathBuf::from(CONFIG_DIR).join(format!("{}.toml", customer));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        if config.customer == "default" {
            config.customer = customer;
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// 从 TOML 文件加载
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ParseFailed {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseFailed { message, .. } => ConfigError::ParseFailed {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// 解析 TOML 文本
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed {
            path: String::new(),
            message: e.to_string(),
        })
    }

    /// 用环境变量覆盖配置
    ///
    /// 支持 CUSTOMER_ORGID、CUSTOMER_BEARER、BASE_URI、LOG_LEVEL
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(orgid) = lookup("CUSTOMER_ORGID") {
            self.site.orgid = Some(orgid);
        }
        if let Some(bearer) = lookup("CUSTOMER_BEARER") {
            self.site.bearer = Some(bearer);
        }
        if let Some(baseuri) = lookup("BASE_URI") {
            self.site.baseuri = baseuri;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.debug.logging_level = level;
        }
    }
}

fn default_submission_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(1), Duration::from_secs(2))
}

fn default_polling_policy() -> RetryPolicy {
    RetryPolicy::new(10, Duration::from_secs(60), Duration::from_secs(120))
}

/// `[retry]` / `[polling]` 表，只写部分字段时其余沿用各自的默认策略
#[derive(Debug, Default, Deserialize)]
struct RetrySection {
    retries: Option<u32>,
    min_timeout_ms: Option<u64>,
    max_timeout_ms: Option<u64>,
    factor: Option<u32>,
}

impl RetrySection {
    fn merge_onto(self, base: RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            retries: self.retries.unwrap_or(base.retries),
            min_timeout_ms: self.min_timeout_ms.unwrap_or(base.min_timeout_ms),
            max_timeout_ms: self.max_timeout_ms.unwrap_or(base.max_timeout_ms),
            factor: self.factor.unwrap_or(base.factor),
        }
    }
}

fn submission_policy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RetryPolicy, D::Error> {
    RetrySection::deserialize(deserializer).map(|s| s.merge_onto(default_submission_policy()))
}

fn polling_policy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RetryPolicy, D::Error> {
    RetrySection::deserialize(deserializer).map(|s| s.merge_onto(default_polling_policy()))
}

/// 报表请求配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 报表类型
    #[serde(rename = "type")]
    pub report_type: String,
    /// 请求参数
    pub request: Map<String, Value>,
    /// JSON 形式的请求参数，设置后替换 `request`，可以用 null 显式去掉字段
    pub request_json: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let request = json!({
            "timeframe": "DAY",
            "sort": { "field": "lastAccessDate", "order": "desc" },
            "formatType": "JSON"
        });

        Self {
            report_type: "learning-activity".to_string(),
            request: match request {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            request_json: None,
        }
    }
}

impl ReportConfig {
    /// 转换为报表请求
    pub fn to_spec(&self) -> Result<ReportRequestSpec, ConfigError> {
        let request = match &self.request_json {
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(map)) => map,
                Ok(other) => return Err(ConfigError::InvalidRequestJson(other.to_string())),
                Err(e) => return Err(ConfigError::InvalidRequestJson(e.to_string())),
            },
            None => self.request.clone(),
        };

        Ok(ReportRequestSpec::new(self.report_type.clone(), request))
    }
}

/// 输出位置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// 输出目录，不存在时自动创建
    pub path: Option<PathBuf>,
    /// 输出文件名
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("results")),
            file_name: "output.json".to_string(),
        }
    }
}

impl OutputConfig {
    /// 输出文件的完整路径
    pub fn destination(&self) -> Result<PathBuf, ConfigError> {
        if self.file_name.trim().is_empty() {
            return Err(ConfigError::MissingOutputFile);
        }
        Ok(match &self.path {
            Some(dir) => dir.join(&self.file_name),
            None => PathBuf::from(&self.file_name),
        })
    }
}

/// 调试选项
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// 日志级别（RUST_LOG 优先）
    pub logging_level: String,
    /// 日志目录
    pub log_path: PathBuf,
    /// 日志文件名
    pub log_file: String,
    /// 是否检查本地调试代理
    pub check_proxy: bool,
    pub proxy_address: String,
    pub proxy_port: u16,
    /// 单次 HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            logging_level: "info".to_string(),
            log_path: PathBuf::from("logs"),
            log_file: format!("app_{}.log", chrono::Utc::now().format("%Y%m%d_%H%M%S")),
            check_proxy: false,
            proxy_address: "127.0.0.1".to_string(),
            proxy_port: 8888,
            request_timeout_secs: 120,
        }
    }
}

impl DebugConfig {
    pub fn log_file_path(&self) -> PathBuf {
        self.log_path.join(&self.log_file)
    }

    pub fn proxy_endpoint(&self) -> ProxyEndpoint {
        ProxyEndpoint::new(self.proxy_address.clone(), self.proxy_port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
