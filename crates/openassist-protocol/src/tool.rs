use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result emitted after executing a single tool call.
///
/// `result` is the LLM-visible payload. On failure it carries
/// `{"error": ...}` and `success` is false; the out-of-band
/// `additional_data` payload travels through the session cache instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool_call_id: String,
    pub tool_name: String,
    pub success: bool,
    pub arguments: Value,
    pub result: Value,
}
