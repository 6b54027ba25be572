//! GitHub 仓库搜索工具
//!
//! GET {base_url}/search/repositories?q=..&sort=stars&order=desc&per_page=limit；
//! 结果顺序沿用上游排序（star 降序），本地只按 limit 截断。配置了 token 时带 Bearer 认证。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use crate::config::GithubSection;
use crate::core::{BuildError, ToolExecutionError};
use crate::plan::{Params, ToolKind};
use crate::tools::params::ParamReader;
use crate::tools::retry::{AttemptError, RetryPolicy};
use crate::tools::{RepositoryRecord, ToolAdapter, ToolOutput};

const USER_AGENT: &str = concat!("ops-assistant/", env!("CARGO_PKG_VERSION"));
const NO_DESCRIPTION: &str = "No description";
/// GitHub search API 单页上限
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RepositoryItem>,
}

#[derive(Debug, Deserialize)]
struct RepositoryItem {
    full_name: String,
    stargazers_count: u64,
    description: Option<String>,
    html_url: String,
}

impl From<RepositoryItem> for RepositoryRecord {
    fn from(item: RepositoryItem) -> Self {
        Self {
            name: item.full_name,
            stars: item.stargazers_count,
            description: item
                .description
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            url: item.html_url,
        }
    }
}

/// 仓库搜索适配器
pub struct GithubSearchTool {
    client: Client,
    endpoint: String,
    token: Option<String>,
    default_limit: u32,
    retry: RetryPolicy,
}

impl GithubSearchTool {
    pub fn new(
        config: &GithubSection,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, BuildError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BuildError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/search/repositories",
                config.base_url.trim_end_matches('/')
            ),
            token: config.resolved_token(),
            default_limit: config.default_limit.clamp(1, MAX_LIMIT),
            retry,
        })
    }

    /// 搜索仓库；limit 被限制在 1..=100
    pub async fn search_repositories(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<RepositoryRecord>, ToolExecutionError> {
        let limit = limit.clamp(1, MAX_LIMIT);
        tracing::info!(query = %query, limit, "github search");
        self.retry
            .run(ToolKind::Github, |_| self.fetch(query, limit))
            .await
    }

    async fn fetch(&self, query: &str, limit: u32) -> Result<Vec<RepositoryRecord>, AttemptError> {
        let per_page = limit.to_string();
        let mut request = self
            .client
            .get(&self.endpoint)
            .header(ACCEPT, "application/vnd.github+json")
            .query(&[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AttemptError::Transient(format!("Request failed: {}", e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AttemptError::Transient(format!("HTTP {}", status)));
        }

        let body: SearchResponse = resp.json().await.map_err(|e| {
            if e.is_decode() {
                AttemptError::Fatal(format!("Invalid response body: {}", e))
            } else {
                AttemptError::Transient(format!("Read body: {}", e))
            }
        })?;

        Ok(body
            .items
            .into_iter()
            .take(limit as usize)
            .map(RepositoryRecord::from)
            .collect())
    }
}

#[async_trait]
impl ToolAdapter for GithubSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Github
    }

    async fn invoke(&self, params: &Params) -> Result<ToolOutput, ToolExecutionError> {
        let reader = ParamReader::new(ToolKind::Github, params, &["query"], &["limit"])?;
        let query = reader.string("query")?;
        let limit = reader.optional_u32("limit")?.unwrap_or(self.default_limit);
        self.search_repositories(&query, limit)
            .await
            .map(ToolOutput::Repositories)
    }
}
