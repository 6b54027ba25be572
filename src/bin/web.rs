//! Ops Assistant HTTP 服务
//!
//! 启动: cargo run --bin ops-assistant-web --features web
//! 调用: curl -X POST "http://127.0.0.1:8000/run?query=Find%20top%20AI%20repositories%20and%20Bangalore%20weather"

use std::sync::Arc;

use anyhow::Context;
use ops_assistant::{config::load_config, observability, web, PipelineBuilder};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config = load_config(None).context("Failed to load config")?;
    let pipeline = PipelineBuilder::new(config)
        .build()
        .context("Failed to build pipeline")?;

    let app = web::router(Arc::new(pipeline));
    let addr = std::env::var("OPS_WEB_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string());
    tracing::info!("Ops Assistant listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
