use crate::assistant::{AssistantHooks, Context, HookOutcome};
use crate::tool::{ToolRegistry, ToolT};
use openassist_llm::chat::ChatMessage;
use openassist_protocol::{Event, FunctionCall, ToolCall, ToolCallResult};
use serde_json::Value;

/// Handles all tool-related operations in a centralized manner.
pub struct ToolProcessor;

impl ToolProcessor {
    /// Process tool calls in stream order and return one result per call.
    ///
    /// Every call yields a result, including calls that fail, name an
    /// unknown tool, or are aborted by a hook: the provider requires a tool
    /// message for each call id it issued.
    pub async fn process_tool_calls(
        registry: &ToolRegistry,
        tool_calls: &[ToolCall],
        hooks: &dyn AssistantHooks,
        context: &Context,
    ) -> Vec<ToolCallResult> {
        let mut results = Vec::with_capacity(tool_calls.len());

        for call in tool_calls {
            let result = Self::process_single_tool_call(registry, call, hooks, context).await;
            results.push(result);
        }

        results
    }

    /// Process a single tool call, with hooks and caching.
    pub(crate) async fn process_single_tool_call(
        registry: &ToolRegistry,
        call: &ToolCall,
        hooks: &dyn AssistantHooks,
        context: &Context,
    ) -> ToolCallResult {
        // Provider-omitted ids get synthesized so cache keys stay unique.
        let call = if call.id.is_empty() {
            let mut call = call.clone();
            call.id = ToolCall::function(&call.function.name, "").id;
            call
        } else {
            call.clone()
        };

        context
            .send_event(Event::ToolCallRequested {
                id: call.id.clone(),
                tool_name: call.function.name.clone(),
                arguments: call.function.arguments.clone(),
            })
            .await;

        if hooks.on_tool_call(&call, context).await == HookOutcome::Abort {
            let result = Self::create_error_result(&call, "Tool call aborted by hook");
            Self::send_result_event(context, &result).await;
            return result;
        }

        hooks.on_tool_start(&call, context).await;

        let result = match registry.get(&call.function.name) {
            Some(tool) => Self::execute_tool(tool.as_ref(), &call, context).await,
            None => Self::create_error_result(
                &call,
                &format!("Tool '{}' not found", call.function.name),
            ),
        };

        if result.success {
            hooks.on_tool_result(&call, &result, context).await;
        } else {
            hooks
                .on_tool_error(&call, result.result.clone(), context)
                .await;
        }
        Self::send_result_event(context, &result).await;

        result
    }

    /// Execute a tool, catching argument and runtime failures into a
    /// `{success: false, error}` result.
    async fn execute_tool(tool: &dyn ToolT, call: &ToolCall, context: &Context) -> ToolCallResult {
        let raw_args = call.function.arguments.trim();
        let parsed: Result<Value, _> = if raw_args.is_empty() {
            Ok(Value::Object(Default::default()))
        } else {
            serde_json::from_str(raw_args)
        };

        match parsed {
            Ok(args) => match tool.execute(args.clone()).await {
                Ok(output) => {
                    if let Some(data) = &output.additional_data {
                        // Brief write lock: the cache must be readable by
                        // consumers while the run is still in flight.
                        context
                            .cache()
                            .write()
                            .await
                            .insert(call.id.clone(), data.clone());
                    }
                    tool.on_tool_completed(&call.id, &output).await;
                    ToolCallResult {
                        tool_call_id: call.id.clone(),
                        tool_name: call.function.name.clone(),
                        success: true,
                        arguments: args,
                        result: output.llm_result,
                    }
                }
                Err(e) => {
                    Self::create_error_result(call, &format!("Tool execution failed: {e}"))
                }
            },
            Err(e) => Self::create_error_result(call, &format!("Failed to parse arguments: {e}")),
        }
    }

    /// Create an error result for a tool call.
    fn create_error_result(call: &ToolCall, error: &str) -> ToolCallResult {
        log::warn!("Tool call {} failed: {error}", call.id);
        ToolCallResult {
            tool_call_id: call.id.clone(),
            tool_name: call.function.name.clone(),
            success: false,
            arguments: serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null),
            result: serde_json::json!({"success": false, "error": error}),
        }
    }

    async fn send_result_event(context: &Context, result: &ToolCallResult) {
        let event = if result.success {
            Event::ToolCallCompleted {
                id: result.tool_call_id.clone(),
                tool_name: result.tool_name.clone(),
                result: result.result.clone(),
            }
        } else {
            Event::ToolCallFailed {
                id: result.tool_call_id.clone(),
                tool_name: result.tool_name.clone(),
                error: result.result.to_string(),
            }
        };
        context.send_event(event).await;
    }

    /// Fold results into the tool-role message fed back to the model.
    pub fn create_result_message(results: &[ToolCallResult]) -> ChatMessage {
        let calls = results
            .iter()
            .map(|result| ToolCall {
                id: result.tool_call_id.clone(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: result.tool_name.clone(),
                    arguments: Self::result_content(result),
                },
            })
            .collect();
        ChatMessage::tool().tool_result(calls).build()
    }

    /// LLM-visible content for one result.
    fn result_content(result: &ToolCallResult) -> String {
        match &result.result {
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{AssistantConfig, NoopHooks};
    use crate::cache::AdditionalDataCache;
    use crate::tool::test_support::{EchoTool, FailingTool};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn make_context(registry: &Arc<ToolRegistry>) -> Context {
        Context::new(
            AssistantConfig::default(),
            registry.clone(),
            Arc::new(RwLock::new(AdditionalDataCache::new())),
            None,
        )
    }

    fn call(id: &str, name: &str, args: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: args.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn successful_call_caches_additional_data() {
        let mut registry = ToolRegistry::new();
        let tool = EchoTool::named("echo").with_additional_data(json!({"rows": [1]}));
        let completions = tool.completions.clone();
        registry.register(Arc::new(tool)).unwrap();
        let registry = Arc::new(registry);
        let context = make_context(&registry);

        let results = ToolProcessor::process_tool_calls(
            &registry,
            &[call("call_1", "echo", r#"{"x":1}"#)],
            &NoopHooks,
            &context,
        )
        .await;

        assert!(results[0].success);
        assert_eq!(results[0].result["echo"]["x"], 1);
        let cache = context.cache().read().await;
        assert_eq!(cache.get("call_1").unwrap()["rows"][0], 1);
        assert_eq!(completions.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_yields_failed_result() {
        let registry = Arc::new(ToolRegistry::new());
        let context = make_context(&registry);

        let results = ToolProcessor::process_tool_calls(
            &registry,
            &[call("call_1", "missing", "{}")],
            &NoopHooks,
            &context,
        )
        .await;

        assert!(!results[0].success);
        assert_eq!(results[0].result["success"], false);
        assert!(
            results[0].result["error"]
                .as_str()
                .unwrap()
                .contains("Tool 'missing' not found")
        );
        assert!(context.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_arguments_yield_failed_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::named("echo"))).unwrap();
        let registry = Arc::new(registry);
        let context = make_context(&registry);

        let results = ToolProcessor::process_tool_calls(
            &registry,
            &[call("call_1", "echo", "{not json")],
            &NoopHooks,
            &context,
        )
        .await;

        assert!(!results[0].success);
        assert!(
            results[0].result["error"]
                .as_str()
                .unwrap()
                .contains("Failed to parse arguments")
        );
    }

    #[tokio::test]
    async fn runtime_failure_is_caught() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FailingTool)).unwrap();
        let registry = Arc::new(registry);
        let context = make_context(&registry);

        let results = ToolProcessor::process_tool_calls(
            &registry,
            &[call("call_1", "failing", "{}")],
            &NoopHooks,
            &context,
        )
        .await;

        assert!(!results[0].success);
        assert!(
            results[0].result["error"]
                .as_str()
                .unwrap()
                .contains("Tool execution failed")
        );
    }

    #[tokio::test]
    async fn empty_call_id_gets_synthesized() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::named("echo"))).unwrap();
        let registry = Arc::new(registry);
        let context = make_context(&registry);

        let results = ToolProcessor::process_tool_calls(
            &registry,
            &[call("", "echo", "{}")],
            &NoopHooks,
            &context,
        )
        .await;

        assert!(results[0].tool_call_id.starts_with("call_"));
    }

    struct AbortAllTools;

    #[async_trait]
    impl AssistantHooks for AbortAllTools {
        async fn on_tool_call(&self, _tool_call: &ToolCall, _ctx: &Context) -> HookOutcome {
            HookOutcome::Abort
        }
    }

    #[tokio::test]
    async fn aborted_call_still_yields_a_result() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::named("echo"))).unwrap();
        let registry = Arc::new(registry);
        let context = make_context(&registry);

        let results = ToolProcessor::process_tool_calls(
            &registry,
            &[call("call_1", "echo", "{}")],
            &AbortAllTools,
            &context,
        )
        .await;

        assert!(!results[0].success);
        assert!(
            results[0].result["error"]
                .as_str()
                .unwrap()
                .contains("aborted by hook")
        );
    }

    #[test]
    fn result_message_carries_serialized_results() {
        let results = vec![ToolCallResult {
            tool_call_id: "call_1".to_string(),
            tool_name: "echo".to_string(),
            success: true,
            arguments: json!({}),
            result: json!({"rows": 2}),
        }];
        let msg = ToolProcessor::create_result_message(&results);
        match msg.message_type {
            openassist_llm::chat::MessageType::ToolResult(calls) => {
                assert_eq!(calls[0].id, "call_1");
                assert_eq!(calls[0].function.arguments, r#"{"rows":2}"#);
            }
            _ => panic!("expected ToolResult message"),
        }
    }
}
