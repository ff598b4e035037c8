use crate::assistant::Context;
use async_trait::async_trait;
use openassist_protocol::{ToolCall, ToolCallResult};
use serde_json::Value;

#[derive(Debug, PartialEq, Eq)]
pub enum HookOutcome {
    Continue,
    Abort,
}

/// Session-level lifecycle hooks. All methods default to no-ops; the two
/// returning `HookOutcome` can abort before anything runs.
#[async_trait]
pub trait AssistantHooks: Send + Sync {
    /// Called when a run is triggered, before the user message is stored.
    async fn on_run_start(&self, _prompt: &str, _ctx: &Context) -> HookOutcome {
        HookOutcome::Continue
    }
    /// Called when the run has produced its final answer.
    async fn on_run_complete(&self, _response: &str, _ctx: &Context) {}
    /// Called when a turn starts.
    async fn on_turn_start(&self, _turn_index: usize, _ctx: &Context) {}
    /// Called when a turn completes.
    async fn on_turn_complete(&self, _turn_index: usize, _ctx: &Context) {}
    /// Called before a tool call executes, with the ability to abort it.
    async fn on_tool_call(&self, _tool_call: &ToolCall, _ctx: &Context) -> HookOutcome {
        HookOutcome::Continue
    }
    /// Called just before executing the tool.
    async fn on_tool_start(&self, _tool_call: &ToolCall, _ctx: &Context) {}
    /// Called after a successful tool execution.
    async fn on_tool_result(
        &self,
        _tool_call: &ToolCall,
        _result: &ToolCallResult,
        _ctx: &Context,
    ) {
    }
    /// Called when tool execution failed.
    async fn on_tool_error(&self, _tool_call: &ToolCall, _err: Value, _ctx: &Context) {}
}

/// Default hooks implementation that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

#[async_trait]
impl AssistantHooks for NoopHooks {}
