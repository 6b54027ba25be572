//! 工具注册表
//!
//! 所有外部数据源实现 ToolAdapter trait（kind / invoke），由 ToolRegistry 在启动时按 ToolKind 注册，
//! Executor 按步骤的工具标识查表分发。测试中可注册假实现替换真实适配器。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::ToolExecutionError;
use crate::plan::{Params, ToolKind};
use crate::tools::ToolOutput;

/// 工具适配器：统一的调用接口，内部自行处理重试
#[async_trait]
pub trait ToolAdapter: Send + Sync {
    fn kind(&self) -> ToolKind;

    async fn invoke(&self, params: &Params) -> Result<ToolOutput, ToolExecutionError>;
}

/// 工具注册表：ToolKind → Arc<dyn ToolAdapter>
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn ToolAdapter>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同一 kind 重复注册时后者覆盖前者
    pub fn register(&mut self, tool: impl ToolAdapter + 'static) {
        self.register_arc(Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn ToolAdapter>) {
        self.tools.insert(tool.kind(), tool);
    }

    pub fn with(mut self, tool: impl ToolAdapter + 'static) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn ToolAdapter>> {
        self.tools.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<ToolKind> {
        let mut kinds: Vec<_> = self.tools.keys().copied().collect();
        kinds.sort();
        kinds
    }
}
