//! 流水线错误类型
//!
//! - 规划阶段：MalformedPlanError / PlanGenerationError，向上抛给调用方，不在内部重试
//! - 工具阶段：ToolExecutionError，由 Executor 捕获并转为执行日志，不会越过 Executor
//! - 组装阶段：BuildError（缺少必需凭据等）

use thiserror::Error;

use crate::llm::LlmError;
use crate::plan::ToolKind;

/// 模型输出不符合 Plan 结构
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed plan: {reason}")]
pub struct MalformedPlanError {
    pub reason: String,
}

impl MalformedPlanError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Planner 无法得到有效 Plan
#[derive(Error, Debug)]
pub enum PlanGenerationError {
    #[error("LLM backend error: {0}")]
    Backend(#[from] LlmError),

    #[error("Planner returned non-JSON output: {reason}")]
    InvalidJson { reason: String, raw: String },

    #[error(transparent)]
    Malformed(#[from] MalformedPlanError),
}

/// 工具调用失败；Display 文本即执行日志中的 error 字段
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolExecutionError {
    /// 配置缺失（如凭据），不消耗重试
    #[error("{tool} is not configured: {message}")]
    Configuration { tool: ToolKind, message: String },

    /// 参数不合法（缺少必需参数或出现未知参数），不消耗重试
    #[error("{tool} rejected params: {message}")]
    InvalidParams { tool: ToolKind, message: String },

    #[error("{tool} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        tool: ToolKind,
        attempts: u32,
        last_error: String,
    },

    /// 上游返回了无法解析的响应，重试无益
    #[error("{tool} returned an unusable response after {attempts} attempts: {message}")]
    Upstream {
        tool: ToolKind,
        attempts: u32,
        message: String,
    },
}

impl ToolExecutionError {
    pub fn tool(&self) -> ToolKind {
        match self {
            Self::Configuration { tool, .. }
            | Self::InvalidParams { tool, .. }
            | Self::RetriesExhausted { tool, .. }
            | Self::Upstream { tool, .. } => *tool,
        }
    }

    /// 实际发起的 HTTP 尝试次数
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Configuration { .. } | Self::InvalidParams { .. } => 0,
            Self::RetriesExhausted { attempts, .. } | Self::Upstream { attempts, .. } => *attempts,
        }
    }
}

/// 组装流水线失败
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
