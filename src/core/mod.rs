//! 核心层：错误类型与流水线组装

pub mod builder;
pub mod error;

pub use builder::PipelineBuilder;
pub use error::{BuildError, MalformedPlanError, PlanGenerationError, ToolExecutionError};
