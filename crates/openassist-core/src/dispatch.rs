//! Assembles streamed chunks into renderable message parts.
//!
//! The dispatcher is the UI-facing half of the tool-invocation protocol: it
//! folds provider stream chunks (or run events) into an ordered list of
//! `MessagePart`s, flips tool invocations from pending to result state as
//! executions finish, and joins finished invocations with the session's
//! `additional_data` cache for rendering.

use crate::cache::AdditionalDataCache;
use openassist_protocol::{
    Event, MessagePart, StreamChunk, ToolCallResult, ToolInvocationState,
};
use serde_json::{json, Value};
use std::collections::HashMap;

/// A message part joined with its cached out-of-band payload.
#[derive(Debug, Clone)]
pub struct ResolvedPart {
    pub part: MessagePart,
    pub additional_data: Option<Value>,
}

#[derive(Debug, Default)]
pub struct StreamDispatcher {
    parts: Vec<MessagePart>,
    /// Stream tool index -> position in `parts`, valid within one turn.
    index_map: HashMap<usize, usize>,
    /// Tool call id -> position in `parts`, valid for the whole session.
    id_map: HashMap<String, usize>,
    /// Whether the last part is a text part still accepting deltas.
    text_open: bool,
}

impl StreamDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one provider stream chunk.
    pub fn push(&mut self, chunk: &StreamChunk) {
        match chunk {
            StreamChunk::Text(delta) => self.push_text(delta),
            StreamChunk::ToolUseStart { index, id, name } => {
                let part_index = self.start_tool(id.clone(), name.clone(), String::new());
                self.index_map.insert(*index, part_index);
            }
            StreamChunk::ToolUseInputDelta {
                index,
                partial_json,
            } => {
                if let Some(&part_index) = self.index_map.get(index) {
                    if let MessagePart::ToolInvocation {
                        state: ToolInvocationState::Pending { partial_args },
                        ..
                    } = &mut self.parts[part_index]
                    {
                        partial_args.push_str(partial_json);
                    }
                } else {
                    log::warn!("Input delta for unknown tool index {index}");
                }
            }
            StreamChunk::ToolUseComplete { index, tool_call } => {
                if let Some(&part_index) = self.index_map.get(index) {
                    if let MessagePart::ToolInvocation {
                        tool_call_id,
                        state: ToolInvocationState::Pending { partial_args },
                        ..
                    } = &mut self.parts[part_index]
                    {
                        *partial_args = tool_call.function.arguments.clone();
                        if tool_call_id != &tool_call.id {
                            *tool_call_id = tool_call.id.clone();
                        }
                    }
                    self.id_map.insert(tool_call.id.clone(), part_index);
                } else {
                    // Providers may complete a call without prior start chunks.
                    let part_index = self.start_tool(
                        tool_call.id.clone(),
                        tool_call.function.name.clone(),
                        tool_call.function.arguments.clone(),
                    );
                    self.index_map.insert(*index, part_index);
                }
            }
            StreamChunk::Done { .. } => {
                // Turn boundary: indexes restart at zero on the next turn.
                self.index_map.clear();
                self.text_open = false;
            }
            StreamChunk::Usage(_) => {}
        }
    }

    /// Feed one run event. Covers consumers that subscribe to assistant
    /// events rather than raw provider chunks.
    pub fn apply_event(&mut self, event: &Event) {
        match event {
            Event::TextDelta { delta } => self.push_text(delta),
            Event::ToolCallRequested {
                id,
                tool_name,
                arguments,
            } => {
                if !self.id_map.contains_key(id) {
                    self.start_tool(id.clone(), tool_name.clone(), arguments.clone());
                }
            }
            Event::ToolCallCompleted { id, result, .. } => {
                self.finalize(id, result.clone(), true);
            }
            Event::ToolCallFailed { id, error, .. } => {
                self.finalize(id, json!({"error": error}), false);
            }
            Event::TurnStarted { .. } => {
                self.index_map.clear();
                self.text_open = false;
            }
            Event::TurnCompleted { .. } | Event::RunCompleted { .. } | Event::RunFailed { .. } => {}
        }
    }

    /// Flip the matching invocation part into result state.
    pub fn complete_tool(&mut self, result: &ToolCallResult) {
        if !self.id_map.contains_key(&result.tool_call_id) {
            log::warn!(
                "Result for unmatched tool call id '{}'",
                result.tool_call_id
            );
            let part_index = self.parts.len();
            self.parts.push(MessagePart::ToolInvocation {
                tool_call_id: result.tool_call_id.clone(),
                tool_name: result.tool_name.clone(),
                state: ToolInvocationState::Pending {
                    partial_args: String::new(),
                },
            });
            self.id_map.insert(result.tool_call_id.clone(), part_index);
            self.text_open = false;
        }
        if let Some(&part_index) = self.id_map.get(&result.tool_call_id) {
            self.parts[part_index] = MessagePart::ToolInvocation {
                tool_call_id: result.tool_call_id.clone(),
                tool_name: result.tool_name.clone(),
                state: ToolInvocationState::Result {
                    arguments: result.arguments.clone(),
                    result: result.result.clone(),
                    success: result.success,
                },
            };
        }
    }

    pub fn parts(&self) -> &[MessagePart] {
        &self.parts
    }

    /// Join parts with cached `additional_data`. Infallible: parts without a
    /// cache entry resolve with `None`, never an error.
    pub fn resolve(&self, cache: &AdditionalDataCache) -> Vec<ResolvedPart> {
        self.parts
            .iter()
            .map(|part| ResolvedPart {
                additional_data: part
                    .tool_call_id()
                    .and_then(|id| cache.get(id))
                    .cloned(),
                part: part.clone(),
            })
            .collect()
    }

    fn push_text(&mut self, delta: &str) {
        if self.text_open
            && let Some(MessagePart::Text { text }) = self.parts.last_mut()
        {
            text.push_str(delta);
            return;
        }
        self.parts.push(MessagePart::text(delta));
        self.text_open = true;
    }

    fn start_tool(&mut self, id: String, name: String, partial_args: String) -> usize {
        let part_index = self.parts.len();
        self.id_map.insert(id.clone(), part_index);
        self.parts.push(MessagePart::ToolInvocation {
            tool_call_id: id,
            tool_name: name,
            state: ToolInvocationState::Pending { partial_args },
        });
        self.text_open = false;
        part_index
    }

    fn finalize(&mut self, id: &str, result: Value, success: bool) {
        match self.id_map.get(id) {
            Some(&part_index) => {
                if let MessagePart::ToolInvocation {
                    tool_call_id,
                    tool_name,
                    state,
                } = &self.parts[part_index]
                {
                    let arguments = match state {
                        ToolInvocationState::Pending { partial_args } => {
                            serde_json::from_str(partial_args).unwrap_or(Value::Null)
                        }
                        ToolInvocationState::Result { arguments, .. } => arguments.clone(),
                    };
                    self.parts[part_index] = MessagePart::ToolInvocation {
                        tool_call_id: tool_call_id.clone(),
                        tool_name: tool_name.clone(),
                        state: ToolInvocationState::Result {
                            arguments,
                            result,
                            success,
                        },
                    };
                }
            }
            None => {
                log::warn!("Completion for unknown tool call id '{id}'");
                let part_index = self.parts.len();
                self.id_map.insert(id.to_string(), part_index);
                self.parts.push(MessagePart::ToolInvocation {
                    tool_call_id: id.to_string(),
                    tool_name: String::new(),
                    state: ToolInvocationState::Result {
                        arguments: Value::Null,
                        result,
                        success,
                    },
                });
                self.text_open = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openassist_protocol::ToolCall;

    fn tool_start(index: usize, id: &str, name: &str) -> StreamChunk {
        StreamChunk::ToolUseStart {
            index,
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn text_deltas_coalesce_into_one_part() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.push(&StreamChunk::Text("Hel".to_string()));
        dispatcher.push(&StreamChunk::Text("lo".to_string()));

        assert_eq!(dispatcher.parts().len(), 1);
        assert!(matches!(
            &dispatcher.parts()[0],
            MessagePart::Text { text } if text == "Hello"
        ));
    }

    #[test]
    fn tool_invocation_interleaves_text() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.push(&StreamChunk::Text("Running".to_string()));
        dispatcher.push(&tool_start(0, "call_1", "query"));
        dispatcher.push(&StreamChunk::Text("done".to_string()));

        assert_eq!(dispatcher.parts().len(), 3);
        assert!(dispatcher.parts()[1].is_pending());
    }

    #[test]
    fn partial_args_accumulate_and_complete() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.push(&tool_start(0, "call_1", "query"));
        dispatcher.push(&StreamChunk::ToolUseInputDelta {
            index: 0,
            partial_json: "{\"sql\":".to_string(),
        });
        dispatcher.push(&StreamChunk::ToolUseInputDelta {
            index: 0,
            partial_json: "\"select 1\"}".to_string(),
        });

        let mut call = ToolCall::function("query", "{\"sql\":\"select 1\"}");
        call.id = "call_1".to_string();
        dispatcher.push(&StreamChunk::ToolUseComplete {
            index: 0,
            tool_call: call,
        });

        match &dispatcher.parts()[0] {
            MessagePart::ToolInvocation {
                state: ToolInvocationState::Pending { partial_args },
                ..
            } => assert_eq!(partial_args, "{\"sql\":\"select 1\"}"),
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn complete_tool_flips_to_result_state() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.push(&tool_start(0, "call_1", "query"));

        dispatcher.complete_tool(&ToolCallResult {
            tool_call_id: "call_1".to_string(),
            tool_name: "query".to_string(),
            success: true,
            arguments: serde_json::json!({"sql": "select 1"}),
            result: serde_json::json!({"rows": 1}),
        });

        match &dispatcher.parts()[0] {
            MessagePart::ToolInvocation {
                state: ToolInvocationState::Result { success, result, .. },
                ..
            } => {
                assert!(*success);
                assert_eq!(result["rows"], 1);
            }
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn unmatched_completion_becomes_fallback_part() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.complete_tool(&ToolCallResult {
            tool_call_id: "call_missing".to_string(),
            tool_name: "query".to_string(),
            success: false,
            arguments: Value::Null,
            result: serde_json::json!({"error": "Tool 'query' not found"}),
        });

        assert_eq!(dispatcher.parts().len(), 1);
        assert_eq!(dispatcher.parts()[0].tool_call_id(), Some("call_missing"));
        assert!(!dispatcher.parts()[0].is_pending());
    }

    #[test]
    fn turn_boundary_restarts_stream_indexes() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.push(&tool_start(0, "call_1", "query"));
        dispatcher.push(&StreamChunk::Done {
            stop_reason: "tool_calls".to_string(),
        });
        // Next turn reuses index 0 for a different call.
        dispatcher.push(&tool_start(0, "call_2", "histogram"));

        assert_eq!(dispatcher.parts().len(), 2);
        assert_eq!(dispatcher.parts()[1].tool_call_id(), Some("call_2"));
    }

    #[test]
    fn resolve_joins_cache_payloads() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.push(&StreamChunk::Text("hi".to_string()));
        dispatcher.push(&tool_start(0, "call_1", "query"));
        dispatcher.complete_tool(&ToolCallResult {
            tool_call_id: "call_1".to_string(),
            tool_name: "query".to_string(),
            success: true,
            arguments: Value::Null,
            result: serde_json::json!({"preview": []}),
        });

        let mut cache = AdditionalDataCache::new();
        cache.insert("call_1", serde_json::json!({"rows": [1, 2, 3]}));

        let resolved = dispatcher.resolve(&cache);
        assert_eq!(resolved.len(), 2);
        assert!(resolved[0].additional_data.is_none());
        assert_eq!(
            resolved[1].additional_data.as_ref().unwrap()["rows"][2],
            3
        );
    }

    #[test]
    fn events_drive_parts_like_chunks() {
        let mut dispatcher = StreamDispatcher::new();
        dispatcher.apply_event(&Event::TextDelta {
            delta: "thinking".to_string(),
        });
        dispatcher.apply_event(&Event::ToolCallRequested {
            id: "call_1".to_string(),
            tool_name: "histogram".to_string(),
            arguments: "{\"bins\":5}".to_string(),
        });
        dispatcher.apply_event(&Event::ToolCallCompleted {
            id: "call_1".to_string(),
            tool_name: "histogram".to_string(),
            result: serde_json::json!({"bins": 5}),
        });

        assert_eq!(dispatcher.parts().len(), 2);
        match &dispatcher.parts()[1] {
            MessagePart::ToolInvocation {
                state: ToolInvocationState::Result {
                    arguments, success, ..
                },
                ..
            } => {
                assert!(*success);
                assert_eq!(arguments["bins"], 5);
            }
            other => panic!("unexpected part: {other:?}"),
        }
    }
}
