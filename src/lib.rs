//! Ops Assistant - 自然语言请求 → 工具调用计划 → 执行 → 校验
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、流水线构建器
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **plan**: Plan 数据模型、结构校验、JSON Schema
//! - **tools**: 外部数据源适配器（GitHub / OpenWeather）、注册表、重试策略
//! - **pipeline**: Planner、Executor、Verifier 与请求流水线
//! - **observability**: 日志初始化
//! - **web**: HTTP 入口（feature = "web"）

pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod pipeline;
pub mod plan;
pub mod tools;
#[cfg(feature = "web")]
pub mod web;

pub use crate::core::PipelineBuilder;
pub use pipeline::{Pipeline, VerificationReport};
