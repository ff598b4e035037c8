use crate::assistant::{Assistant, AssistantBuildError, AssistantConfig, AssistantHooks, NoopHooks};
use crate::error::Error;
use crate::tool::{ToolRegistry, ToolT};
use openassist_llm::LLMProvider;
use std::sync::Arc;

/// Builder for [`Assistant`]. An LLM provider is required; everything else
/// has defaults.
pub struct AssistantBuilder {
    llm: Option<Arc<dyn LLMProvider>>,
    registry: ToolRegistry,
    config: AssistantConfig,
    hooks: Arc<dyn AssistantHooks>,
}

impl std::fmt::Debug for AssistantBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantBuilder").finish_non_exhaustive()
    }
}

impl Default for AssistantBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AssistantBuilder {
    pub fn new() -> Self {
        Self {
            llm: None,
            registry: ToolRegistry::new(),
            config: AssistantConfig::default(),
            hooks: Arc::new(NoopHooks),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LLMProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Register a tool. Fails at build time if a name is registered twice.
    pub fn with_tool(mut self, tool: impl ToolT + 'static) -> Result<Self, Error> {
        self.registry.register(Arc::new(tool))?;
        Ok(self)
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn AssistantHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.config.max_turns = max_turns;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn build(self) -> Result<Assistant, Error> {
        let llm = self.llm.ok_or_else(|| {
            AssistantBuildError::BuildFailure("LLM provider is required".to_string())
        })?;
        Ok(Assistant::new(llm, self.registry, self.config, self.hooks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::test_support::EchoTool;

    #[test]
    fn build_without_llm_fails() {
        let err = AssistantBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("LLM provider is required"));
    }

    #[test]
    fn duplicate_tool_is_rejected() {
        let err = AssistantBuilder::new()
            .with_tool(EchoTool::named("echo"))
            .unwrap()
            .with_tool(EchoTool::named("echo"))
            .unwrap_err();
        assert!(err.to_string().contains("echo"));
    }
}
