use serde::{Deserialize, Serialize};

/// Events emitted while a run is in flight.
///
/// Consumers subscribe to these to drive a chat UI: text deltas stream in,
/// tool calls are announced before execution and resolved after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Incremental text from the model.
    TextDelta { delta: String },

    /// Tool call requested (with ID)
    ToolCallRequested {
        id: String,
        tool_name: String,
        arguments: String,
    },

    /// Tool call completed (with ID and result)
    ToolCallCompleted {
        id: String,
        tool_name: String,
        result: serde_json::Value,
    },

    /// Tool call has failed
    ToolCallFailed {
        id: String,
        tool_name: String,
        error: String,
    },

    /// A turn has started
    TurnStarted { turn_number: usize, max_turns: usize },

    /// A turn has completed
    TurnCompleted { turn_number: usize, final_turn: bool },

    /// The run finished with a plain text answer.
    RunCompleted { response: String },

    /// The run ended with an error.
    RunFailed { error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_roundtrip() {
        let event = Event::ToolCallFailed {
            id: "call_1".to_string(),
            tool_name: "query".to_string(),
            error: "Tool 'query' not found".to_string(),
        };
        let serialized = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&serialized).unwrap();
        match deserialized {
            Event::ToolCallFailed { id, error, .. } => {
                assert_eq!(id, "call_1");
                assert!(error.contains("not found"));
            }
            _ => panic!("expected ToolCallFailed"),
        }
    }
}
