//! Plan 数据模型：已知工具标识、步骤与计划

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 步骤参数：扁平 key → 标量值
pub type Params = Map<String, Value>;

/// 已知工具标识（封闭集合）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Github,
    Weather,
}

impl ToolKind {
    pub const ALL: [ToolKind; 2] = [ToolKind::Github, ToolKind::Weather];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Github => "github",
            ToolKind::Weather => "weather",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// 报告 data_sources 中展示的名称
    pub fn data_source(&self) -> &'static str {
        match self {
            ToolKind::Github => "GitHub API",
            ToolKind::Weather => "OpenWeather API",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 步骤指向的工具：已知工具或尚未实现的工具名（校验阶段不拒绝）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StepTool {
    Known(ToolKind),
    Unknown(String),
}

impl StepTool {
    pub fn from_name(name: &str) -> Self {
        ToolKind::parse(name)
            .map(StepTool::Known)
            .unwrap_or_else(|| StepTool::Unknown(name.to_string()))
    }

    pub fn name(&self) -> &str {
        match self {
            StepTool::Known(kind) => kind.as_str(),
            StepTool::Unknown(name) => name,
        }
    }

    pub fn kind(&self) -> Option<ToolKind> {
        match self {
            StepTool::Known(kind) => Some(*kind),
            StepTool::Unknown(_) => None,
        }
    }
}

impl From<ToolKind> for StepTool {
    fn from(kind: ToolKind) -> Self {
        StepTool::Known(kind)
    }
}

/// 计划中的一步；action 仅作说明，不参与分发
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStep {
    pub tool: StepTool,
    pub action: String,
    pub params: Params,
}

impl PlanStep {
    pub fn new(tool: impl Into<StepTool>, action: impl Into<String>, params: Params) -> Self {
        Self {
            tool: tool.into(),
            action: action.into(),
            params,
        }
    }
}

/// 有序步骤列表；步骤之间没有数据依赖，可为空
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// 由 JSON 对象字面量构造 Params（测试与组装时使用）
pub fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}
