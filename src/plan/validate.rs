//! Plan 结构校验：把模型输出的 JSON 转为 Plan
//!
//! 只检查结构（steps 数组；每步含 tool / action / params；params 为扁平映射），
//! 不检查 tool 是否已实现，未知工具留给 Executor 按策略处理。

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::core::MalformedPlanError;
use crate::plan::{Params, Plan, PlanStep, StepTool, ToolKind};

/// 同一已知工具出现多个步骤时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateToolPolicy {
    /// 校验失败
    #[default]
    Reject,
    /// 允许，后一步结果覆盖前一步（Executor 输出 warn）
    Overwrite,
}

pub fn parse_plan(value: &Value, duplicates: DuplicateToolPolicy) -> Result<Plan, MalformedPlanError> {
    let root = value
        .as_object()
        .ok_or_else(|| MalformedPlanError::new("plan must be a JSON object"))?;
    let raw_steps = match root.get("steps") {
        Some(Value::Array(steps)) => steps,
        Some(_) => return Err(MalformedPlanError::new("`steps` must be an array")),
        None => return Err(MalformedPlanError::new("missing `steps` array")),
    };

    let steps = raw_steps
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_step(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    if duplicates == DuplicateToolPolicy::Reject {
        check_duplicates(&steps)?;
    }

    Ok(Plan::new(steps))
}

fn parse_step(index: usize, raw: &Value) -> Result<PlanStep, MalformedPlanError> {
    let step = raw
        .as_object()
        .ok_or_else(|| MalformedPlanError::new(format!("step {index}: must be an object")))?;

    let tool = required_str(index, step.get("tool"), "tool")?;
    if tool.is_empty() {
        return Err(MalformedPlanError::new(format!("step {index}: `tool` is empty")));
    }
    let action = required_str(index, step.get("action"), "action")?;

    let params = match step.get("params") {
        Some(Value::Object(map)) => flat_params(index, map)?,
        Some(_) => {
            return Err(MalformedPlanError::new(format!(
                "step {index}: `params` must be a key-value mapping"
            )))
        }
        None => return Err(MalformedPlanError::new(format!("step {index}: missing `params`"))),
    };

    Ok(PlanStep::new(StepTool::from_name(tool), action, params))
}

fn required_str<'a>(
    index: usize,
    value: Option<&'a Value>,
    field: &str,
) -> Result<&'a str, MalformedPlanError> {
    match value {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(MalformedPlanError::new(format!(
            "step {index}: `{field}` must be a string"
        ))),
        None => Err(MalformedPlanError::new(format!("step {index}: missing `{field}`"))),
    }
}

fn flat_params(index: usize, map: &Params) -> Result<Params, MalformedPlanError> {
    if let Some((key, _)) = map
        .iter()
        .find(|(_, v)| matches!(v, Value::Object(_) | Value::Array(_)))
    {
        return Err(MalformedPlanError::new(format!(
            "step {index}: params.{key} must be a scalar value"
        )));
    }
    Ok(map.clone())
}

fn check_duplicates(steps: &[PlanStep]) -> Result<(), MalformedPlanError> {
    let mut seen: HashMap<ToolKind, usize> = HashMap::new();
    for (index, step) in steps.iter().enumerate() {
        let Some(kind) = step.tool.kind() else {
            continue;
        };
        if let Some(first) = seen.insert(kind, index) {
            return Err(MalformedPlanError::new(format!(
                "duplicate steps for tool '{kind}' (steps {first} and {index})"
            )));
        }
    }
    Ok(())
}
