//! Planner：自然语言请求 → Plan
//!
//! 一次 JSON 模式的 LLM 调用（temperature 0），解析 JSON 后做结构校验。
//! 失败不在内部重试，由调用方决定是否重试。

use std::sync::Arc;

use serde_json::Value;

use crate::core::PlanGenerationError;
use crate::llm::{LlmClient, Message};
use crate::plan::{parse_plan, plan_schema_json, DuplicateToolPolicy, Plan};

const PLANNER_INSTRUCTIONS: &str = r#"You turn a user request into an execution plan for the tools below.

Tools:
- github
  action: search_repositories
  params: {"query": "<search keywords>", "limit": <number of repositories, default 3>}
- weather
  action: get_weather
  params: {"city": "<city name>"}

Respond with a single JSON object and nothing else, for example:
{"steps": [
  {"tool": "github", "action": "search_repositories", "params": {"query": "AI", "limit": 3}},
  {"tool": "weather", "action": "get_weather", "params": {"city": "Bangalore"}}
]}

Rules:
- Add one step per piece of information the user asks for.
- For repository searches, keep only the relevant keywords as the query.
- Use the city named in the request; if none is named, use "Bangalore".
- No explanations, only JSON."#;

/// 去掉包裹整个输出的 ```json 代码块；其余文本原样交给 JSON 解析
fn extract_json_object(output: &str) -> &str {
    let trimmed = output.trim();
    trimmed
        .strip_prefix("```json")
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Planner：持有 LLM 与 system prompt
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    system_prompt: String,
    duplicates: DuplicateToolPolicy,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: format!(
                "{}\n\nJSON Schema of the plan:\n{}",
                PLANNER_INSTRUCTIONS,
                plan_schema_json()
            ),
            duplicates: DuplicateToolPolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicateToolPolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub async fn create_plan(&self, user_query: &str) -> Result<Plan, PlanGenerationError> {
        let messages = [
            Message::system(self.system_prompt.clone()),
            Message::user(user_query),
        ];
        let output = self.llm.complete_json(&messages).await?;

        let json_str = extract_json_object(&output);
        let value: Value = serde_json::from_str(json_str).map_err(|e| {
            tracing::warn!(error = %e, "planner returned non-JSON output");
            PlanGenerationError::InvalidJson {
                reason: e.to_string(),
                raw: output.clone(),
            }
        })?;

        let plan = parse_plan(&value, self.duplicates).map_err(|e| {
            tracing::warn!(reason = %e.reason, "planner returned malformed plan");
            e
        })?;
        let (prompt_tokens, completion_tokens, total_tokens) = self.llm.token_usage();
        tracing::info!(
            steps = plan.len(),
            prompt_tokens,
            completion_tokens,
            total_tokens,
            "plan created"
        );
        Ok(plan)
    }
}
