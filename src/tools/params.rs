//! 步骤参数读取：参数按「具名参数」对待，多余或缺失的键直接拒绝（不重试）

use serde_json::Value;

use crate::core::ToolExecutionError;
use crate::plan::{Params, ToolKind};

pub(crate) struct ParamReader<'a> {
    tool: ToolKind,
    params: &'a Params,
}

impl<'a> ParamReader<'a> {
    /// 检查参数键集合：required 必须出现，其余键必须属于 optional
    pub(crate) fn new(
        tool: ToolKind,
        params: &'a Params,
        required: &[&str],
        optional: &[&str],
    ) -> Result<Self, ToolExecutionError> {
        if let Some(missing) = required.iter().find(|key| !params.contains_key(**key)) {
            return Err(invalid(tool, format!("missing required param `{missing}`")));
        }
        if let Some(unexpected) = params
            .keys()
            .find(|key| !required.iter().chain(optional).any(|known| *known == key.as_str()))
        {
            return Err(invalid(tool, format!("unexpected param `{unexpected}`")));
        }
        Ok(Self { tool, params })
    }

    /// 非空字符串参数
    pub(crate) fn string(&self, key: &str) -> Result<String, ToolExecutionError> {
        match self.params.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(Value::String(_)) => Err(invalid(self.tool, format!("param `{key}` is empty"))),
            Some(_) => Err(invalid(self.tool, format!("param `{key}` must be a string"))),
            None => Err(invalid(self.tool, format!("missing required param `{key}`"))),
        }
    }

    /// 可选正整数参数，接受数字或数字字符串
    pub(crate) fn optional_u32(&self, key: &str) -> Result<Option<u32>, ToolExecutionError> {
        let parsed = match self.params.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
        };
        parsed
            .filter(|n| *n > 0)
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(self.tool, format!("param `{key}` must be a positive integer")))
    }
}

fn invalid(tool: ToolKind, message: String) -> ToolExecutionError {
    ToolExecutionError::InvalidParams { tool, message }
}
