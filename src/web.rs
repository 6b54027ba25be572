//! HTTP 入口（feature = "web"）
//!
//! - GET /：服务信息
//! - POST /run?query=...：运行流水线，返回校验报告；规划失败返回 502

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::pipeline::{Pipeline, VerificationReport};

#[derive(Debug, Deserialize)]
pub struct RunQuery {
    pub query: String,
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/run", post(run))
        .with_state(pipeline)
}

async fn index() -> Json<Value> {
    Json(json!({
        "status": "operational",
        "service": "Ops Assistant",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "run": "POST /run?query=<your_query>",
            "health": "GET /"
        },
        "example": "POST /run?query=Find top AI repositories and Bangalore weather"
    }))
}

async fn run(
    State(pipeline): State<Arc<Pipeline>>,
    Query(params): Query<RunQuery>,
) -> Result<Json<VerificationReport>, (StatusCode, String)> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "query is required".to_string()));
    }
    pipeline.run(query).await.map(Json).map_err(|e| {
        tracing::warn!(error = %e, "plan generation failed");
        (StatusCode::BAD_GATEWAY, e.to_string())
    })
}
