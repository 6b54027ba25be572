//! 流水线构建器：启动时一次性组装 LLM 客户端、工具注册表、Planner / Executor / Verifier
//!
//! 所有组件显式注入，测试可用 with_llm / with_registry 替换为假实现。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::BuildError;
use crate::llm::{LlmClient, OpenAiClient};
use crate::pipeline::{Executor, Pipeline, Planner, Verifier};
use crate::tools::{GithubSearchTool, RetryPolicy, ToolRegistry, WeatherTool};

pub struct PipelineBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    registry: Option<ToolRegistry>,
}

impl PipelineBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            registry: None,
        }
    }

    /// 使用给定的 LLM 客户端（Planner 与 Verifier 共用）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// 使用给定的工具注册表
    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 按配置创建 OpenAI 兼容客户端；缺少凭据时失败
    pub fn build_llm(&self) -> Result<Arc<dyn LlmClient>, BuildError> {
        let llm = &self.config.llm;
        let api_key = llm
            .resolved_api_key()
            .ok_or_else(|| BuildError::Config("OPENAI_API_KEY not configured".to_string()))?;
        Ok(Arc::new(OpenAiClient::new(
            llm.base_url.as_deref(),
            &llm.model,
            &api_key,
            llm.request_timeout_secs,
        )))
    }

    /// 构建工具注册表（github + weather，共用同一重试策略）
    pub fn build_tool_registry(&self) -> Result<ToolRegistry, BuildError> {
        let tools = &self.config.tools;
        let retry = RetryPolicy::from_config(&tools.retry);

        let mut registry = ToolRegistry::new();
        registry.register(GithubSearchTool::new(&tools.github, tools.timeout(), retry.clone())?);
        registry.register(WeatherTool::new(&tools.weather, tools.timeout(), retry)?);

        if tools.weather.resolved_api_key().is_none() {
            tracing::warn!("OPENWEATHER_API_KEY not configured; weather steps will fail");
        }
        Ok(registry)
    }

    pub fn build(self) -> Result<Pipeline, BuildError> {
        let llm = match self.llm.clone() {
            Some(llm) => llm,
            None => self.build_llm()?,
        };
        let registry = match self.registry.clone() {
            Some(registry) => registry,
            None => self.build_tool_registry()?,
        };
        let pipeline = &self.config.pipeline;

        tracing::info!(
            tools = ?registry.kinds(),
            unknown_tools = ?pipeline.unknown_tools,
            duplicate_tools = ?pipeline.duplicate_tools,
            "pipeline assembled"
        );

        Ok(Pipeline::new(
            Planner::new(llm.clone()).with_duplicate_policy(pipeline.duplicate_tools),
            Executor::new(registry).with_unknown_tool_policy(pipeline.unknown_tools),
            Verifier::new(llm),
        ))
    }
}
