//! 工具层：外部数据源适配器（GitHub 仓库搜索、OpenWeather 当前天气）、注册表与重试策略

pub mod github;
pub mod output;
mod params;
pub mod registry;
pub mod retry;
pub mod weather;

pub use github::GithubSearchTool;
pub use output::{RepositoryRecord, ToolOutput, WeatherRecord};
pub use registry::{ToolAdapter, ToolRegistry};
pub use retry::{AttemptError, LinearBackoff, RetryPolicy};
pub use weather::WeatherTool;
