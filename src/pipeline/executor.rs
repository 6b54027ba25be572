//! Plan 执行器
//!
//! 按步骤顺序逐个调用对应的 ToolAdapter（不并发）；单步失败只记录日志，不影响后续步骤。
//! 每步输出一条结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::pipeline::{ExecutionLogEntry, ResultsMap};
use crate::plan::{Params, Plan, PlanStep, ToolKind};
use crate::tools::ToolRegistry;

/// 计划中出现未实现工具时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownToolPolicy {
    /// 跳过：不调用、不写执行日志（仅 warn）
    #[default]
    Skip,
    /// 写入一条 failed 执行日志
    RecordFailure,
}

/// 执行器：持有启动时构建的工具注册表
pub struct Executor {
    registry: ToolRegistry,
    unknown_tools: UnknownToolPolicy,
}

impl Executor {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            unknown_tools: UnknownToolPolicy::default(),
        }
    }

    pub fn with_unknown_tool_policy(mut self, policy: UnknownToolPolicy) -> Self {
        self.unknown_tools = policy;
        self
    }

    /// 执行整个计划，返回 (成功结果, 执行日志)；本方法本身不会失败
    pub async fn execute(&self, plan: Plan) -> (ResultsMap, Vec<ExecutionLogEntry>) {
        let mut results = ResultsMap::new();
        let mut log = Vec::with_capacity(plan.len());

        for (index, step) in plan.steps.into_iter().enumerate() {
            let Some(kind) = step.tool.kind() else {
                self.unknown_step(index, &step, &mut log);
                continue;
            };
            let Some(adapter) = self.registry.get(kind) else {
                tracing::warn!(step = index, tool = %kind, "no adapter registered");
                log.push(ExecutionLogEntry::failed(
                    kind.as_str(),
                    format!("no adapter registered for '{kind}'"),
                ));
                continue;
            };

            let start = Instant::now();
            let outcome = adapter.invoke(&step.params).await;
            let record = audit_record(index, kind, &step.params, outcome.is_ok(), start.elapsed());
            tracing::info!(audit = %record, "tool");

            match outcome {
                Ok(output) => {
                    if results.insert(kind, output).is_some() {
                        tracing::warn!(step = index, tool = %kind, "result overwrote an earlier step");
                    }
                    log.push(ExecutionLogEntry::success(kind.as_str()));
                }
                Err(e) => log.push(ExecutionLogEntry::failed(kind.as_str(), e.to_string())),
            }
        }

        (results, log)
    }

    fn unknown_step(&self, index: usize, step: &PlanStep, log: &mut Vec<ExecutionLogEntry>) {
        let name = step.tool.name();
        tracing::warn!(step = index, tool = %name, policy = ?self.unknown_tools, "unknown tool in plan");
        if self.unknown_tools == UnknownToolPolicy::RecordFailure {
            log.push(ExecutionLogEntry::failed(name, format!("unknown tool '{name}'")));
        }
    }
}

fn audit_record(
    index: usize,
    tool: ToolKind,
    params: &Params,
    ok: bool,
    elapsed: Duration,
) -> serde_json::Value {
    serde_json::json!({
        "event": "tool_audit",
        "step": index,
        "tool": tool.as_str(),
        "ok": ok,
        "outcome": if ok { "ok" } else { "error" },
        "duration_ms": elapsed.as_millis() as u64,
        "params_preview": params_preview(params),
    })
}

fn params_preview(params: &Params) -> String {
    let s = serde_json::Value::Object(params.clone()).to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::core::ToolExecutionError;
    use crate::pipeline::StepStatus;
    use crate::plan::{params, StepTool};
    use crate::tools::{RepositoryRecord, ToolAdapter, ToolOutput};

    /// 按调用顺序记录到共享 trace，返回 query 作为仓库名
    struct FakeGithub {
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ToolAdapter for FakeGithub {
        fn kind(&self) -> ToolKind {
            ToolKind::Github
        }

        async fn invoke(&self, params: &Params) -> Result<ToolOutput, ToolExecutionError> {
            let query = params["query"].as_str().unwrap_or_default().to_string();
            self.trace.lock().unwrap().push(format!("github:{query}"));
            Ok(ToolOutput::Repositories(vec![RepositoryRecord {
                name: query,
                stars: 10,
                description: "No description".to_string(),
                url: "https://github.com/x".to_string(),
            }]))
        }
    }

    struct FailingWeather {
        trace: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ToolAdapter for FailingWeather {
        fn kind(&self) -> ToolKind {
            ToolKind::Weather
        }

        async fn invoke(&self, _params: &Params) -> Result<ToolOutput, ToolExecutionError> {
            self.trace.lock().unwrap().push("weather".to_string());
            Err(ToolExecutionError::RetriesExhausted {
                tool: ToolKind::Weather,
                attempts: 3,
                last_error: "HTTP 503 Service Unavailable".to_string(),
            })
        }
    }

    fn executor(trace: &Arc<Mutex<Vec<String>>>) -> Executor {
        let registry = ToolRegistry::new()
            .with(FakeGithub {
                trace: trace.clone(),
            })
            .with(FailingWeather {
                trace: trace.clone(),
            });
        Executor::new(registry)
    }

    fn github_step(query: &str) -> PlanStep {
        PlanStep::new(ToolKind::Github, "search_repositories", params(json!({"query": query})))
    }

    fn weather_step() -> PlanStep {
        PlanStep::new(ToolKind::Weather, "get_weather", params(json!({"city": "Pune"})))
    }

    #[tokio::test]
    async fn test_empty_plan() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let (results, log) = executor(&trace).execute(Plan::default()).await;
        assert!(results.is_empty());
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_order_kept() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let plan = Plan::new(vec![weather_step(), github_step("AI")]);

        let (results, log) = executor(&trace).execute(plan).await;

        assert_eq!(*trace.lock().unwrap(), vec!["weather", "github:AI"]);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].tool, "weather");
        assert_eq!(log[0].status, StepStatus::Failed);
        assert_eq!(
            log[0].error.as_deref(),
            Some("weather failed after 3 attempts: HTTP 503 Service Unavailable")
        );
        assert_eq!(log[1], ExecutionLogEntry::success("github"));
        assert!(results.contains_key(&ToolKind::Github));
        assert!(!results.contains_key(&ToolKind::Weather));
    }

    #[tokio::test]
    async fn test_unknown_tool_skipped_by_default() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let plan = Plan::new(vec![
            PlanStep::new(StepTool::from_name("calendar"), "list", Params::new()),
            github_step("AI"),
        ]);

        let (results, log) = executor(&trace).execute(plan).await;
        assert_eq!(log, vec![ExecutionLogEntry::success("github")]);
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_recorded_when_configured() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let plan = Plan::new(vec![PlanStep::new(
            StepTool::from_name("calendar"),
            "list",
            Params::new(),
        )]);

        let (_, log) = executor(&trace)
            .with_unknown_tool_policy(UnknownToolPolicy::RecordFailure)
            .execute(plan)
            .await;
        assert_eq!(
            log,
            vec![ExecutionLogEntry::failed("calendar", "unknown tool 'calendar'")]
        );
    }

    #[tokio::test]
    async fn test_duplicate_steps_last_write_wins() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let plan = Plan::new(vec![github_step("AI"), github_step("ML")]);

        let (results, log) = executor(&trace).execute(plan).await;
        assert_eq!(log.len(), 2);
        match &results[&ToolKind::Github] {
            ToolOutput::Repositories(records) => assert_eq!(records[0].name, "ML"),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_adapter_is_logged() {
        let plan = Plan::new(vec![weather_step()]);
        let (results, log) = Executor::new(ToolRegistry::new()).execute(plan).await;
        assert!(results.is_empty());
        assert_eq!(
            log,
            vec![ExecutionLogEntry::failed("weather", "no adapter registered for 'weather'")]
        );
    }

    #[test]
    fn test_audit_record_carries_outcome() {
        let p = params(json!({"city": "Pune"}));
        let ok = audit_record(0, ToolKind::Weather, &p, true, Duration::from_millis(12));
        assert_eq!(ok["event"], "tool_audit");
        assert_eq!(ok["outcome"], "ok");
        assert_eq!(ok["duration_ms"], 12);
        assert_eq!(ok["params_preview"], r#"{"city":"Pune"}"#);

        let failed = audit_record(1, ToolKind::Github, &p, false, Duration::ZERO);
        assert_eq!(failed["ok"], false);
        assert_eq!(failed["outcome"], "error");
    }

    #[test]
    fn test_params_preview_truncates() {
        let long = params(json!({"query": "x".repeat(300)}));
        assert!(params_preview(&long).ends_with("..."));
        assert_eq!(params_preview(&params(json!({"city": "Pune"}))), r#"{"city":"Pune"}"#);
    }
}
