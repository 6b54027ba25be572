//! Ops Assistant CLI
//!
//! 用法：ops-assistant "Find top AI repositories and Bangalore weather"
//! 将校验报告以 JSON 输出到 stdout；日志输出到 stderr。

use anyhow::{bail, Context};
use ops_assistant::{config::load_config, observability, PipelineBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        bail!("usage: ops-assistant <query>");
    }

    let config = load_config(None).context("Failed to load config")?;
    let pipeline = PipelineBuilder::new(config)
        .build()
        .context("Failed to build pipeline")?;

    let report = pipeline
        .run(query.trim())
        .await
        .context("Plan generation failed")?;

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );
    Ok(())
}
