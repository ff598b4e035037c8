//! OpenAI-compatible chat completions backend.
//!
//! Speaks the `/chat/completions` protocol used by OpenAI and by
//! compatible servers (Ollama, DeepSeek, Groq, OpenRouter); point
//! `base_url` at the server of choice.

use crate::builder::{BuildableProvider, LLMBuilder};
use crate::chat::{
    ChatMessage, ChatProvider, ChatResponse, ChatRole, ChatStream, MessageType, Tool, ToolChoice,
};
use crate::error::LLMError;
use crate::LLMProvider;
use async_trait::async_trait;
use log::{debug, warn};
use openassist_protocol::{FunctionCall, StreamChunk, ToolCall, Usage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible chat client.
#[derive(Debug)]
pub struct OpenAI {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    top_p: Option<f32>,
    system: Option<String>,
    tool_choice: Option<ToolChoice>,
    client: reqwest::Client,
}

impl OpenAI {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        model: Option<String>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
        timeout_seconds: Option<u64>,
        top_p: Option<f32>,
        system: Option<String>,
        tool_choice: Option<ToolChoice>,
    ) -> Result<Self, LLMError> {
        let api_key = api_key.into();
        // Local servers that skip auth still need a placeholder key.
        if api_key.is_empty() {
            return Err(LLMError::AuthError("Missing API key".to_string()));
        }

        let mut client = reqwest::Client::builder();
        if let Some(seconds) = timeout_seconds {
            client = client.timeout(Duration::from_secs(seconds));
        }
        let client = client
            .build()
            .map_err(|e| LLMError::HttpError(e.to_string()))?;

        Ok(Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
            temperature,
            top_p,
            system,
            tool_choice,
            client,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn request_body<'a>(
        &'a self,
        messages: &[ChatMessage],
        tools: Option<&'a [Tool]>,
        stream: bool,
    ) -> OpenAIChatRequest<'a> {
        let tools = tools.filter(|t| !t.is_empty());
        OpenAIChatRequest {
            model: &self.model,
            messages: self.to_wire_messages(messages),
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            tool_choice: tools.and(self.tool_choice.as_ref()),
            tools,
            stream,
        }
    }

    /// Flatten chat history into the wire shape. A `ToolResult` message
    /// expands into one `tool`-role message per call id.
    fn to_wire_messages(&self, messages: &[ChatMessage]) -> Vec<WireMessage> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = &self.system {
            wire.push(WireMessage {
                role: "system",
                content: Some(system.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }

        for msg in messages {
            match &msg.message_type {
                MessageType::Text => wire.push(WireMessage {
                    role: role_str(msg.role),
                    content: Some(msg.content.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                }),
                MessageType::ToolUse(calls) => wire.push(WireMessage {
                    role: "assistant",
                    content: (!msg.content.is_empty()).then(|| msg.content.clone()),
                    tool_calls: Some(calls.clone()),
                    tool_call_id: None,
                }),
                MessageType::ToolResult(calls) => {
                    for call in calls {
                        wire.push(WireMessage {
                            role: "tool",
                            content: Some(call.function.arguments.clone()),
                            tool_calls: None,
                            tool_call_id: Some(call.id.clone()),
                        });
                    }
                }
            }
        }
        wire
    }
}

fn role_str(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::Tool => "tool",
    }
}

impl BuildableProvider for OpenAI {
    fn build_from(builder: LLMBuilder<Self>) -> Result<Self, LLMError> {
        let api_key = builder
            .api_key
            .ok_or_else(|| LLMError::AuthError("API key is required".to_string()))?;
        OpenAI::new(
            api_key,
            builder.base_url,
            builder.model,
            builder.max_tokens,
            builder.temperature,
            builder.timeout_seconds,
            builder.top_p,
            builder.system,
            builder.tool_choice,
        )
    }
}

impl LLMProvider for OpenAI {}

#[async_trait]
impl ChatProvider for OpenAI {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, LLMError> {
        let body = self.request_body(messages, tools, false);
        debug!("OpenAI chat request to {} model={}", self.endpoint(), self.model);

        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 {
                LLMError::AuthError(text)
            } else {
                LLMError::ProviderError(format!("{status}: {text}"))
            });
        }

        let raw = resp.text().await?;
        let parsed: OpenAIChatResponse =
            serde_json::from_str(&raw).map_err(|e| LLMError::ResponseFormatError {
                message: e.to_string(),
                raw_response: raw,
            })?;
        Ok(Box::new(parsed))
    }

    async fn chat_stream(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
    ) -> Result<ChatStream, LLMError> {
        use futures::StreamExt;

        let body = self.request_body(messages, tools, true);
        let resp = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 {
                LLMError::AuthError(text)
            } else {
                LLMError::ProviderError(format!("{status}: {text}"))
            });
        }

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<StreamChunk, LLMError>>(100);
        let mut bytes = resp.bytes_stream();

        tokio::spawn(async move {
            let mut decoder = SseToolCallDecoder::default();
            let mut buffer = String::new();

            'outer: while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(LLMError::HttpError(e.to_string()))).await;
                        break;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim_end_matches('\r').to_string();
                    buffer.drain(..=pos);

                    let Some(payload) = line.strip_prefix("data:") else {
                        continue;
                    };
                    let payload = payload.trim();
                    if payload == "[DONE]" {
                        break 'outer;
                    }

                    for out in decoder.decode(payload) {
                        if tx.send(out).await.is_err() {
                            break 'outer;
                        }
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Accumulates OpenAI stream deltas into `StreamChunk`s.
///
/// Tool call arguments arrive as partial JSON fragments keyed by index; the
/// decoder tracks each call until the finish marker, then emits the completed
/// `ToolCall`s in index order.
#[derive(Default)]
struct SseToolCallDecoder {
    partial: BTreeMap<usize, PartialToolCall>,
    finished: bool,
}

#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
    started: bool,
}

impl SseToolCallDecoder {
    fn decode(&mut self, payload: &str) -> Vec<Result<StreamChunk, LLMError>> {
        let mut out = Vec::new();
        let envelope: StreamEnvelope = match serde_json::from_str(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Skipping malformed stream payload: {e}");
                return out;
            }
        };

        if let Some(usage) = envelope.usage {
            out.push(Ok(StreamChunk::Usage(usage)));
        }

        for choice in envelope.choices {
            if let Some(content) = choice.delta.content
                && !content.is_empty()
            {
                out.push(Ok(StreamChunk::Text(content)));
            }

            for delta in choice.delta.tool_calls.unwrap_or_default() {
                let entry = self.partial.entry(delta.index).or_default();
                if let Some(id) = delta.id
                    && entry.id.is_empty()
                {
                    entry.id = id;
                }
                if let Some(function) = delta.function {
                    if let Some(name) = function.name
                        && entry.name.is_empty()
                    {
                        entry.name = name;
                    }
                    if !entry.started && !entry.name.is_empty() {
                        entry.started = true;
                        out.push(Ok(StreamChunk::ToolUseStart {
                            index: delta.index,
                            id: entry.id.clone(),
                            name: entry.name.clone(),
                        }));
                    }
                    if let Some(fragment) = function.arguments
                        && !fragment.is_empty()
                    {
                        entry.arguments.push_str(&fragment);
                        out.push(Ok(StreamChunk::ToolUseInputDelta {
                            index: delta.index,
                            partial_json: fragment,
                        }));
                    }
                }
            }

            if let Some(reason) = choice.finish_reason
                && !self.finished
            {
                self.finished = true;
                for (index, partial) in std::mem::take(&mut self.partial) {
                    let id = if partial.id.is_empty() {
                        ToolCall::function(&partial.name, "").id
                    } else {
                        partial.id
                    };
                    out.push(Ok(StreamChunk::ToolUseComplete {
                        index,
                        tool_call: ToolCall {
                            id,
                            call_type: "function".to_string(),
                            function: FunctionCall {
                                name: partial.name,
                                arguments: partial.arguments,
                            },
                        },
                    }));
                }
                out.push(Ok(StreamChunk::Done {
                    stop_reason: reason,
                }));
            }
        }
        out
    }
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Tool]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a ToolChoice>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct StreamEnvelope {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<StreamToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct StreamToolCallDelta {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<StreamFunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct StreamFunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

impl ChatResponse for OpenAIChatResponse {
    fn text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.clone())
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.choices
            .first()
            .and_then(|choice| choice.message.tool_calls.clone())
            .filter(|calls| !calls.is_empty())
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }
}

impl fmt::Display for OpenAIChatResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.text(), self.tool_calls()) {
            (Some(text), _) => write!(f, "{text}"),
            (None, Some(calls)) => {
                let names: Vec<&str> =
                    calls.iter().map(|c| c.function.name.as_str()).collect();
                write!(f, "[tool calls: {}]", names.join(", "))
            }
            (None, None) => write!(f, ""),
        }
    }
}
