//! Plan：模型产出的工具调用计划（数据模型、结构校验、JSON Schema）

pub mod model;
pub mod schema;
pub mod validate;

pub use model::{params, Params, Plan, PlanStep, StepTool, ToolKind};
pub use schema::plan_schema_json;
pub use validate::{parse_plan, DuplicateToolPolicy};
