use futures::StreamExt;
use httpmock::prelude::*;
use openassist_llm::backends::openai::OpenAI;
use openassist_llm::builder::LLMBuilder;
use openassist_llm::chat::{ChatMessage, ChatProvider, FunctionTool, Tool};
use openassist_llm::StreamChunk;
use serde_json::json;

fn build_test_openai() -> std::sync::Arc<OpenAI> {
    LLMBuilder::<OpenAI>::new()
        .api_key("test-key")
        .model("gpt-4o")
        .max_tokens(100)
        .temperature(0.7)
        .build()
        .expect("Failed to build OpenAI client")
}

fn query_tool() -> Tool {
    Tool {
        tool_type: "function".to_string(),
        function: FunctionTool {
            name: "query".to_string(),
            description: "Run a SQL query".to_string(),
            parameters: json!({"type": "object", "properties": {"sql": {"type": "string"}}}),
        },
    }
}

#[test]
fn test_openai_creation() {
    let client = build_test_openai();
    assert_eq!(client.api_key(), "test-key");
    assert_eq!(client.model(), "gpt-4o");
}

#[test]
fn test_openai_builder_requires_api_key() {
    let result = LLMBuilder::<OpenAI>::new().model("gpt-4o").build();
    assert!(result.is_err());
}

#[test]
fn test_openai_default_values() {
    let client = OpenAI::new("test-key", None, None, None, None, None, None, None, None)
        .expect("should build");
    assert_eq!(client.model(), "gpt-4o-mini");
    assert_eq!(client.base_url(), "https://api.openai.com/v1");
}

#[tokio::test]
async fn test_chat_text_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{"message": {"content": "Hello there"}}],
                "usage": {"prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8}
            }));
        })
        .await;

    let client = OpenAI::new(
        "test-key",
        Some(server.url("")),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    )
    .unwrap();

    let messages = vec![ChatMessage::user().content("hi").build()];
    let response = client.chat(&messages, None).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.text().as_deref(), Some("Hello there"));
    assert!(response.tool_calls().is_none());
    assert_eq!(response.usage().unwrap().total_tokens, 8);
}

#[tokio::test]
async fn test_chat_tool_call_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .body_includes("\"tools\"");
            then.status(200).json_body(json!({
                "choices": [{"message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "query", "arguments": "{\"sql\":\"select 1\"}"}
                    }]
                }}]
            }));
        })
        .await;

    let client = OpenAI::new(
        "test-key",
        Some(server.url("")),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    )
    .unwrap();

    let messages = vec![ChatMessage::user().content("run select 1").build()];
    let response = client.chat(&messages, Some(&[query_tool()])).await.unwrap();

    let calls = response.tool_calls().expect("expected tool calls");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function.name, "query");
    assert_eq!(calls[0].id, "call_1");
}

#[tokio::test]
async fn test_chat_provider_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500).body("upstream exploded");
        })
        .await;

    let client = OpenAI::new(
        "test-key",
        Some(server.url("")),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    )
    .unwrap();

    let messages = vec![ChatMessage::user().content("hi").build()];
    let err = client.chat(&messages, None).await.unwrap_err();
    assert!(err.to_string().contains("upstream exploded"));
}

#[tokio::test]
async fn test_chat_stream_tool_call_deltas() {
    let sse_body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Looking\"}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"query\",\"arguments\":\"\"}}]}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"{\\\"sql\\\":\\\"select 1\\\"}\"}}]}}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(sse_body);
        })
        .await;

    let client = OpenAI::new(
        "test-key",
        Some(server.url("")),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
    )
    .unwrap();

    let messages = vec![ChatMessage::user().content("run select 1").build()];
    let mut stream = client
        .chat_stream(&messages, Some(&[query_tool()]))
        .await
        .unwrap();

    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk.unwrap());
    }

    assert!(matches!(&chunks[0], StreamChunk::Text(t) if t == "Looking"));
    assert!(
        chunks
            .iter()
            .any(|c| matches!(c, StreamChunk::ToolUseStart { name, .. } if name == "query"))
    );
    let complete = chunks
        .iter()
        .find_map(|c| match c {
            StreamChunk::ToolUseComplete { tool_call, .. } => Some(tool_call),
            _ => None,
        })
        .expect("expected completed tool call");
    assert_eq!(complete.function.arguments, "{\"sql\":\"select 1\"}");
    assert!(
        chunks
            .iter()
            .any(|c| matches!(c, StreamChunk::Done { stop_reason } if stop_reason == "tool_calls"))
    );
}
