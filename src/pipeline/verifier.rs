//! Verifier：完整性检查与摘要生成
//!
//! 期望的数据源（github、weather）缺失或为空即记入 missing_data；全部到齐才调用 LLM 生成摘要。
//! 摘要生成的任何失败都退化为固定文案，verify 本身永不失败。

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::{LlmClient, LlmError, Message};
use crate::pipeline::{ExecutionLogEntry, ResultsMap, VerificationReport};
use crate::plan::ToolKind;

pub const INCOMPLETE_SUMMARY: &str = "Incomplete execution: Some data sources failed to respond.";
pub const FALLBACK_SUMMARY: &str = "Results retrieved successfully.";

const SUMMARY_INSTRUCTIONS: &str = r#"You write a short answer to the user's request from tool results.
Respond with a single JSON object: {"summary": "<your summary>"}"#;

/// 摘要生成失败（只在内部使用，最终转为 FALLBACK_SUMMARY）
#[derive(Error, Debug)]
enum SummaryGenerationFailure {
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("invalid summary JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("summary field missing or empty")]
    MissingSummary,
}

#[derive(Debug, Deserialize)]
struct SummaryPayload {
    summary: Option<String>,
}

pub struct Verifier {
    llm: Arc<dyn LlmClient>,
    expected: Vec<ToolKind>,
}

impl Verifier {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            expected: ToolKind::ALL.to_vec(),
        }
    }

    /// 期望数据源中缺失或为空的部分，按期望顺序
    pub fn missing_sources(&self, results: &ResultsMap) -> Vec<ToolKind> {
        self.expected
            .iter()
            .copied()
            .filter(|kind| results.get(kind).map_or(true, |output| output.is_empty()))
            .collect()
    }

    pub async fn verify(
        &self,
        user_query: &str,
        results: ResultsMap,
        execution_log: Vec<ExecutionLogEntry>,
    ) -> VerificationReport {
        let missing_data = self.missing_sources(&results);
        let verified = missing_data.is_empty();
        tracing::info!(verified, missing = ?missing_data, "verification");

        let summary = if verified {
            self.generate_summary(user_query, &results)
                .await
                .unwrap_or_else(|failure| {
                    tracing::warn!(error = %failure, "summary generation failed, using fallback");
                    FALLBACK_SUMMARY.to_string()
                })
        } else {
            INCOMPLETE_SUMMARY.to_string()
        };

        VerificationReport {
            request: user_query.to_string(),
            verified,
            missing_data,
            data_sources: self
                .expected
                .iter()
                .map(|kind| kind.data_source().to_string())
                .collect(),
            summary,
            results,
            execution_log,
        }
    }

    async fn generate_summary(
        &self,
        user_query: &str,
        results: &ResultsMap,
    ) -> Result<String, SummaryGenerationFailure> {
        let results_json = serde_json::to_string_pretty(results)?;
        let prompt = format!(
            "Request: {user_query}\n\nTool results:\n{results_json}\n\nSummarise these results so that they answer the request."
        );
        let messages = [Message::system(SUMMARY_INSTRUCTIONS), Message::user(prompt)];

        let response = self.llm.complete_json(&messages).await?;
        let payload: SummaryPayload = serde_json::from_str(response.trim())?;
        payload
            .summary
            .filter(|s| !s.trim().is_empty())
            .ok_or(SummaryGenerationFailure::MissingSummary)
    }
}
