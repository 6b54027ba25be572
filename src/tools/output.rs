//! 工具结果：与上游响应解耦的精简记录

use serde::Serialize;
use serde_json::Number;

/// 仓库搜索结果中的一条
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub stars: u64,
    pub description: String,
    pub url: String,
}

/// 当前天气；温度与体感温度保留一位小数，湿度与风速原样透传
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRecord {
    pub city: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity: Number,
    pub condition: String,
    pub wind_speed_ms: Number,
}

/// 单个工具的成功结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Repositories(Vec<RepositoryRecord>),
    Weather(WeatherRecord),
}

impl ToolOutput {
    /// 空列表视为「没有数据」
    pub fn is_empty(&self) -> bool {
        match self {
            ToolOutput::Repositories(records) => records.is_empty(),
            ToolOutput::Weather(_) => false,
        }
    }
}
