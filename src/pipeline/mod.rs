//! 请求流水线：Planner → Executor → Verifier
//!
//! 三个阶段按顺序执行；只有规划失败会向调用方返回错误，工具失败体现在报告的 missing_data 与 execution_log 中。

pub mod executor;
pub mod planner;
pub mod report;
pub mod verifier;

use tracing::Instrument;
use uuid::Uuid;

use crate::core::PlanGenerationError;

pub use executor::{Executor, UnknownToolPolicy};
pub use planner::Planner;
pub use report::{ExecutionLogEntry, ResultsMap, StepStatus, VerificationReport};
pub use verifier::{Verifier, FALLBACK_SUMMARY, INCOMPLETE_SUMMARY};

/// 组合好的流水线（由 PipelineBuilder 构建，或在测试中直接注入假实现）
pub struct Pipeline {
    planner: Planner,
    executor: Executor,
    verifier: Verifier,
}

impl Pipeline {
    pub fn new(planner: Planner, executor: Executor, verifier: Verifier) -> Self {
        Self {
            planner,
            executor,
            verifier,
        }
    }

    /// 处理一条自然语言请求
    pub async fn run(&self, query: &str) -> Result<VerificationReport, PlanGenerationError> {
        let span = tracing::info_span!("pipeline", request_id = %Uuid::new_v4());
        async {
            tracing::info!(query = %query, "request received");
            let plan = self.planner.create_plan(query).await?;
            let (results, log) = self.executor.execute(plan).await;
            Ok::<_, PlanGenerationError>(self.verifier.verify(query, results, log).await)
        }
        .instrument(span)
        .await
    }
}
