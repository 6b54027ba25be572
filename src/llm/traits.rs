//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：complete（自由文本）与 complete_json（要求单个 JSON 对象、确定性解码）。

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::Message;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("empty response")]
    EmptyResponse,
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// JSON 模式完成：后端应只返回一个 JSON 对象，temperature = 0
    ///
    /// 默认退化为 complete，具体实现可覆盖
    async fn complete_json(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.complete(messages).await
    }

    /// 获取累计 token 使用统计：(prompt_tokens, completion_tokens, total_tokens)
    /// 默认返回 (0, 0, 0)，具体实现可覆盖
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
