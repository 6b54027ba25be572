//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `OPS__*` 覆盖（双下划线表示嵌套，如 `OPS__TOOLS__TIMEOUT_SECS=5`）。
//! 凭据未写入配置时回退到约定的环境变量：`OPENAI_API_KEY`、`GITHUB_TOKEN`、`OPENWEATHER_API_KEY`。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::pipeline::UnknownToolPolicy;
use crate::plan::DuplicateToolPolicy;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub tools: ToolsSection,
    pub pipeline: PipelineSection,
}

/// [llm] 段：模型、端点、凭据与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// 单次模型请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

impl LlmSection {
    /// 配置中的 api_key 优先，否则读 OPENAI_API_KEY
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| env_credential("OPENAI_API_KEY"))
    }
}

/// [tools] 段：单次调用超时、重试策略、各外部服务
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次 HTTP 调用超时（秒）
    pub timeout_secs: u64,
    pub retry: RetrySection,
    pub github: GithubSection,
    pub weather: WeatherSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            retry: RetrySection::default(),
            github: GithubSection::default(),
            weather: WeatherSection::default(),
        }
    }
}

impl ToolsSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// [tools.retry] 段：最多尝试次数与线性退避基数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
        }
    }
}

/// [tools.github] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    pub base_url: String,
    /// 可选：未设置时匿名调用（受限流）
    pub token: Option<String>,
    pub default_limit: u32,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: None,
            default_limit: 3,
        }
    }
}

impl GithubSection {
    pub fn resolved_token(&self) -> Option<String> {
        non_empty(self.token.clone()).or_else(|| env_credential("GITHUB_TOKEN"))
    }
}

/// [tools.weather] 段
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherSection {
    pub base_url: String,
    /// 必需：缺失时每个 weather 步骤直接失败
    pub api_key: Option<String>,
    pub units: String,
}

impl Default for WeatherSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            api_key: None,
            units: "metric".to_string(),
        }
    }
}

impl WeatherSection {
    pub fn resolved_api_key(&self) -> Option<String> {
        non_empty(self.api_key.clone()).or_else(|| env_credential("OPENWEATHER_API_KEY"))
    }
}

/// [pipeline] 段：未知工具与重复工具步骤的处理策略
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PipelineSection {
    pub unknown_tools: UnknownToolPolicy,
    pub duplicate_tools: DuplicateToolPolicy,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn env_credential(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

/// 从 config 目录加载配置，环境变量 OPS__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 OPS__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("OPS")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
