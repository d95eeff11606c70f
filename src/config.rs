use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::infrastructure::quota::QuotaLimits;

/// 程序配置
///
/// API Key 不在这里：它由交互界面在运行时收集
#[derive(Clone, Debug)]
pub struct Config {
    // --- Gemini API 配置 ---
    pub gemini_api_base_url: String,
    pub gemini_model_name: String,
    /// 单次 HTTP 请求超时（秒）
    pub http_timeout_secs: u64,
    // --- 配额 ---
    pub requests_per_minute: usize,
    pub tokens_per_minute: usize,
    pub requests_per_day: usize,
    // --- 模板与输出 ---
    pub template_dir: String,
    pub template_file: String,
    pub output_dir: String,
    /// 非交互模式下的文章请求 TOML 文件
    pub article_request_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            gemini_model_name: "gemini-2.0-flash".to_string(),
            http_timeout_secs: 120,
            requests_per_minute: 15,
            tokens_per_minute: 1_000_000,
            requests_per_day: 1500,
            template_dir: "templates".to_string(),
            template_file: "article_template.html".to_string(),
            output_dir: ".".to_string(),
            article_request_file: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();
        Ok(Self {
            gemini_api_base_url: std::env::var("GEMINI_API_BASE_URL")
                .unwrap_or(default.gemini_api_base_url),
            gemini_model_name: std::env::var("GEMINI_MODEL_NAME")
                .unwrap_or(default.gemini_model_name),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", default.http_timeout_secs)?,
            requests_per_minute: parse_var("REQUESTS_PER_MINUTE", default.requests_per_minute)?,
            tokens_per_minute: parse_var("TOKENS_PER_MINUTE", default.tokens_per_minute)?,
            requests_per_day: parse_var("REQUESTS_PER_DAY", default.requests_per_day)?,
            template_dir: std::env::var("TEMPLATE_DIR").unwrap_or(default.template_dir),
            template_file: std::env::var("TEMPLATE_FILE").unwrap_or(default.template_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            article_request_file: std::env::var("ARTICLE_REQUEST_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            verbose_logging: parse_var("VERBOSE_LOGGING", default.verbose_logging)?,
        })
    }

    /// 配额限制
    pub fn quota_limits(&self) -> QuotaLimits {
        QuotaLimits {
            requests_per_minute: self.requests_per_minute,
            tokens_per_minute: self.tokens_per_minute,
            requests_per_day: self.requests_per_day,
            ..QuotaLimits::default()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// 读取并解析环境变量；未设置时返回默认值，设置了但无法解析时报错
fn parse_var<T: FromStr>(var_name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: std::any::type_name::<T>().to_string(),
            }),
        Err(_) => Ok(default),
    }
}
