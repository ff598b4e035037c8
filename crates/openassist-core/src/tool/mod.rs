use async_trait::async_trait;
use openassist_llm::chat::{FunctionTool, Tool};
use serde_json::Value;
use std::fmt::Debug;

mod registry;

pub use registry::ToolRegistry;

#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("Runtime Error {0}")]
    RuntimeError(#[from] Box<dyn std::error::Error + Sync + Send>),

    #[error("Serde Error {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// What a tool hands back after execution.
///
/// `llm_result` goes into the conversation for the model to read;
/// `additional_data` is the out-of-band payload a renderer consumes, cached
/// per tool call id and never shown to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub llm_result: Value,
    pub additional_data: Option<Value>,
}

impl ToolOutput {
    pub fn new(llm_result: Value) -> Self {
        Self {
            llm_result,
            additional_data: None,
        }
    }

    pub fn with_additional_data(llm_result: Value, additional_data: Value) -> Self {
        Self {
            llm_result,
            additional_data: Some(additional_data),
        }
    }
}

/// Implemented by `#[derive(ToolInput)]` on argument structs.
pub trait ToolInputT {
    fn io_schema() -> &'static str;
}

/// Tool metadata, generated by the `#[tool]` attribute macro.
pub trait ToolMetaT: Send + Sync {
    /// The name of the tool.
    fn name(&self) -> &str;
    /// A description explaining the tool's purpose.
    fn description(&self) -> &str;
    /// JSON schema of the expected arguments.
    fn args_schema(&self) -> Value;
}

/// Runtime behavior for tools.
#[async_trait]
pub trait ToolRuntime: Send + Sync + Debug {
    /// Execute the tool with the provided JSON arguments.
    async fn execute(&self, args: Value) -> Result<ToolOutput, ToolCallError>;

    /// Called once per invocation after the result has been cached. Tools
    /// that need to observe their own completions override this.
    async fn on_tool_completed(&self, _tool_call_id: &str, _output: &ToolOutput) {}
}

/// A complete tool: metadata plus runtime. Blanket-implemented, so a struct
/// only needs `#[tool(...)]` and a `ToolRuntime` impl.
pub trait ToolT: ToolMetaT + ToolRuntime {}

impl<T: ToolMetaT + ToolRuntime> ToolT for T {}

/// Convert a registered tool into the provider-facing function declaration.
pub fn to_llm_tool(tool: &dyn ToolT) -> Tool {
    Tool {
        tool_type: "function".to_string(),
        function: FunctionTool {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.args_schema(),
        },
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Echoes its arguments back, optionally with an additional-data payload.
    #[derive(Debug)]
    pub struct EchoTool {
        pub tool_name: &'static str,
        pub additional_data: Option<Value>,
        pub completions: Arc<AtomicUsize>,
    }

    impl EchoTool {
        pub fn named(tool_name: &'static str) -> Self {
            Self {
                tool_name,
                additional_data: None,
                completions: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn with_additional_data(mut self, data: Value) -> Self {
            self.additional_data = Some(data);
            self
        }
    }

    impl ToolMetaT for EchoTool {
        fn name(&self) -> &str {
            self.tool_name
        }

        fn description(&self) -> &str {
            "Echo the arguments back"
        }

        fn args_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    #[async_trait]
    impl ToolRuntime for EchoTool {
        async fn execute(&self, args: Value) -> Result<ToolOutput, ToolCallError> {
            Ok(ToolOutput {
                llm_result: json!({"echo": args}),
                additional_data: self.additional_data.clone(),
            })
        }

        async fn on_tool_completed(&self, _tool_call_id: &str, _output: &ToolOutput) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Always fails, for error-path tests.
    #[derive(Debug)]
    pub struct FailingTool;

    impl ToolMetaT for FailingTool {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "Always fails"
        }

        fn args_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
    }

    #[async_trait]
    impl ToolRuntime for FailingTool {
        async fn execute(&self, _args: Value) -> Result<ToolOutput, ToolCallError> {
            Err(ToolCallError::RuntimeError("boom".into()))
        }
    }
}
