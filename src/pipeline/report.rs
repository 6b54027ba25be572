//! 执行日志、结果映射与最终校验报告

use std::collections::BTreeMap;

use serde::Serialize;

use crate::plan::ToolKind;
use crate::tools::ToolOutput;

/// 工具标识 → 成功结果；失败或未调用的工具不出现
pub type ResultsMap = BTreeMap<ToolKind, ToolOutput>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Failed,
}

/// 每个已执行步骤一条，按步骤顺序追加
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionLogEntry {
    pub tool: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionLogEntry {
    pub fn success(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            status: StepStatus::Success,
            error: None,
        }
    }

    pub fn failed(tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            status: StepStatus::Failed,
            error: Some(error.into()),
        }
    }
}

/// 返回给调用方的最终报告，构造后不再修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    pub request: String,
    pub verified: bool,
    pub missing_data: Vec<ToolKind>,
    pub data_sources: Vec<String>,
    pub summary: String,
    pub results: ResultsMap,
    pub execution_log: Vec<ExecutionLogEntry>,
}
