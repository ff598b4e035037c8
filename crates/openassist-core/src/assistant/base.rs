use crate::assistant::{
    AssistantConfig, AssistantHooks, Context, HookOutcome, ToolProcessor,
};
use crate::cache::AdditionalDataCache;
use crate::error::Error;
use crate::tool::ToolRegistry;
use futures::StreamExt;
use openassist_llm::LLMProvider;
use openassist_llm::chat::{ChatMessage, Tool};
use openassist_protocol::{Event, StreamChunk, ToolCall};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc};
use tokio_stream::wrappers::ReceiverStream;

/// Conversation state carried across runs of one assistant.
///
/// Message history and the additional-data cache are locked independently
/// and only for the duration of a single read or mutation, so both stay
/// readable while a run is in flight.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: RwLock<Vec<ChatMessage>>,
    cache: Arc<RwLock<AdditionalDataCache>>,
}

struct AssistantInner {
    llm: Arc<dyn LLMProvider>,
    registry: Arc<ToolRegistry>,
    config: AssistantConfig,
    hooks: Arc<dyn AssistantHooks>,
    session: ChatSession,
}

/// A tool-calling assistant over a chat provider.
///
/// Cheap to clone; clones share the session, so a run started from one
/// handle is visible in the history of another.
#[derive(Clone)]
pub struct Assistant {
    inner: Arc<AssistantInner>,
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant").finish_non_exhaustive()
    }
}

impl Assistant {
    pub(crate) fn new(
        llm: Arc<dyn LLMProvider>,
        registry: ToolRegistry,
        config: AssistantConfig,
        hooks: Arc<dyn AssistantHooks>,
    ) -> Self {
        Self {
            inner: Arc::new(AssistantInner {
                llm,
                registry: Arc::new(registry),
                config,
                hooks,
                session: ChatSession::default(),
            }),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.inner.registry
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.inner.config
    }

    /// Snapshot of the message history.
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.inner.session.messages.read().await.clone()
    }

    /// Additional data a tool stored for the given call id, if any.
    pub async fn additional_data(&self, tool_call_id: &str) -> Option<serde_json::Value> {
        self.inner
            .session
            .cache
            .read()
            .await
            .get(tool_call_id)
            .cloned()
    }

    /// Drop the message history and the additional-data cache.
    pub async fn clear_session(&self) {
        self.inner.session.messages.write().await.clear();
        *self.inner.session.cache.write().await = AdditionalDataCache::new();
    }

    /// Run the tool-calling loop to completion and return the final answer.
    pub async fn run(&self, prompt: &str) -> Result<String, Error> {
        self.run_inner(prompt, None).await
    }

    /// Run the loop in the background and stream [`Event`]s as it progresses.
    ///
    /// Errors surface as a final [`Event::RunFailed`] rather than through a
    /// `Result`, so the stream is the only channel a consumer needs.
    pub fn run_stream(&self, prompt: impl Into<String>) -> ReceiverStream<Event> {
        let (tx, rx) = mpsc::channel(64);
        let assistant = self.clone();
        let prompt = prompt.into();
        tokio::spawn(async move {
            if let Err(e) = assistant.run_inner(&prompt, Some(tx.clone())).await {
                let _ = tx.send(Event::RunFailed { error: e.to_string() }).await;
            }
        });
        ReceiverStream::new(rx)
    }

    async fn run_inner(
        &self,
        prompt: &str,
        tx: Option<mpsc::Sender<Event>>,
    ) -> Result<String, Error> {
        let inner = &self.inner;
        let context = Context::new(
            inner.config.clone(),
            inner.registry.clone(),
            inner.session.cache.clone(),
            tx,
        );

        if inner.hooks.on_run_start(prompt, &context).await == HookOutcome::Abort {
            return Err(Error::Aborted);
        }

        {
            let mut messages = inner.session.messages.write().await;
            if messages.is_empty()
                && let Some(system) = &inner.config.system_prompt
            {
                messages.push(ChatMessage::system().content(system.clone()).build());
            }
            messages.push(ChatMessage::user().content(prompt).build());
        }

        let llm_tools = inner.registry.to_llm_tools();
        let tools = if llm_tools.is_empty() {
            None
        } else {
            Some(llm_tools.as_slice())
        };

        let max_turns = inner.config.max_turns;
        for turn in 0..max_turns {
            context
                .send_event(Event::TurnStarted {
                    turn_number: turn,
                    max_turns,
                })
                .await;
            inner.hooks.on_turn_start(turn, &context).await;

            // Provider calls run against a snapshot so the session stays
            // readable while the model is thinking.
            let snapshot = inner.session.messages.read().await.clone();
            let (text, tool_calls) = if context.tx().is_some() {
                self.stream_turn(&snapshot, tools, &context).await?
            } else {
                let response = inner.llm.chat(&snapshot, tools).await?;
                (
                    response.text().unwrap_or_default(),
                    response.tool_calls().unwrap_or_default(),
                )
            };

            if tool_calls.is_empty() {
                inner
                    .session
                    .messages
                    .write()
                    .await
                    .push(ChatMessage::assistant().content(text.clone()).build());
                inner.hooks.on_turn_complete(turn, &context).await;
                context
                    .send_event(Event::TurnCompleted {
                        turn_number: turn,
                        final_turn: true,
                    })
                    .await;
                inner.hooks.on_run_complete(&text, &context).await;
                context
                    .send_event(Event::RunCompleted {
                        response: text.clone(),
                    })
                    .await;
                return Ok(text);
            }

            log::debug!("turn {turn}: {} tool call(s) requested", tool_calls.len());
            inner.session.messages.write().await.push(
                ChatMessage::assistant()
                    .content(text)
                    .tool_use(tool_calls.clone())
                    .build(),
            );

            let results = ToolProcessor::process_tool_calls(
                &inner.registry,
                &tool_calls,
                inner.hooks.as_ref(),
                &context,
            )
            .await;
            inner
                .session
                .messages
                .write()
                .await
                .push(ToolProcessor::create_result_message(&results));

            inner.hooks.on_turn_complete(turn, &context).await;
            context
                .send_event(Event::TurnCompleted {
                    turn_number: turn,
                    final_turn: false,
                })
                .await;
        }

        Err(Error::MaxTurnsReached(max_turns))
    }

    /// Consume one streamed model turn, forwarding text deltas as events and
    /// collecting completed tool calls.
    async fn stream_turn(
        &self,
        messages: &[ChatMessage],
        tools: Option<&[Tool]>,
        context: &Context,
    ) -> Result<(String, Vec<ToolCall>), Error> {
        let mut stream = self.inner.llm.chat_stream(messages, tools).await?;
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        while let Some(chunk) = stream.next().await {
            match chunk? {
                StreamChunk::Text(delta) => {
                    text.push_str(&delta);
                    context.send_event(Event::TextDelta { delta }).await;
                }
                StreamChunk::ToolUseComplete { tool_call, .. } => tool_calls.push(tool_call),
                StreamChunk::Done { .. } => break,
                // Start and delta chunks are for progressive UI rendering;
                // the loop only needs the completed calls.
                StreamChunk::ToolUseStart { .. }
                | StreamChunk::ToolUseInputDelta { .. }
                | StreamChunk::Usage(_) => {}
            }
        }

        Ok((text, tool_calls))
    }
}
