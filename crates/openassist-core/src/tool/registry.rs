use super::{to_llm_tool, ToolCallError, ToolT};
use openassist_llm::chat::Tool;
use std::sync::Arc;

/// Name-keyed collection of registered tools.
///
/// Append-only: registration order is preserved (it is the order tools are
/// presented to the provider) and registered tools are never mutated or
/// removed, matching the descriptor contract of immutability after
/// registration.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn ToolT>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Duplicate names are an error so a later registration
    /// can never shadow an earlier descriptor.
    pub fn register(&mut self, tool: Arc<dyn ToolT>) -> Result<(), ToolCallError> {
        if self.get(tool.name()).is_some() {
            return Err(ToolCallError::DuplicateTool(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolT>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ToolT>> {
        self.tools.iter()
    }

    /// Provider-facing declarations, in registration order.
    pub fn to_llm_tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|t| to_llm_tool(t.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
