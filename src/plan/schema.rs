//! Plan JSON Schema 生成（schemars 自动生成，拼入 Planner 的 system prompt）
//!
//! 用于将「合法 plan」的 JSON 结构注入 system prompt，减少 LLM 输出格式错误。

use std::collections::HashMap;

use schemars::{schema_for, JsonSchema};

use crate::plan::ToolKind;

/// 仅用于 Schema 生成的 plan 格式
#[allow(dead_code)]
#[derive(JsonSchema)]
struct PlanFormat {
    /// 按执行顺序排列的步骤
    pub steps: Vec<PlanStepFormat>,
}

#[allow(dead_code)]
#[derive(JsonSchema)]
struct PlanStepFormat {
    /// 工具名：github 或 weather
    pub tool: ToolKind,
    /// 动作名，如 search_repositories、get_weather
    pub action: String,
    /// 工具参数：github 需要 query（可选 limit），weather 需要 city
    pub params: HashMap<String, serde_json::Value>,
}

/// 返回 plan 的 JSON Schema 字符串，可拼入 system prompt
pub fn plan_schema_json() -> String {
    let schema = schema_for!(PlanFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}
