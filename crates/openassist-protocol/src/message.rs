use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A renderable fragment of an assistant message.
///
/// Streamed responses interleave plain text with tool invocations; the
/// dispatcher assembles chunks into an ordered list of parts that a chat UI
/// can render incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePart {
    Text {
        text: String,
    },
    ToolInvocation {
        tool_call_id: String,
        tool_name: String,
        state: ToolInvocationState,
    },
}

/// Lifecycle state of a tool invocation part.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum ToolInvocationState {
    /// Arguments still streaming in; `partial_args` holds the raw JSON
    /// accumulated so far.
    Pending { partial_args: String },
    /// Execution finished. `result` mirrors the LLM-visible payload.
    Result {
        arguments: Value,
        result: Value,
        success: bool,
    },
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        MessagePart::Text { text: text.into() }
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            MessagePart::ToolInvocation {
                state: ToolInvocationState::Pending { .. },
                ..
            }
        )
    }

    /// The tool call id for invocation parts, `None` for text.
    pub fn tool_call_id(&self) -> Option<&str> {
        match self {
            MessagePart::Text { .. } => None,
            MessagePart::ToolInvocation { tool_call_id, .. } => Some(tool_call_id),
        }
    }
}
