//! OpenAssist prelude: common traits, types, and macros for quick start.

// Macros and derives
pub use openassist_derive::{ToolInput, tool};

// Assistant types
pub use crate::core::assistant::{
    Assistant, AssistantBuilder, AssistantConfig, AssistantHooks, Context, HookOutcome,
};

// Tools
pub use crate::core::tool::{
    ToolCallError, ToolInputT, ToolMetaT, ToolOutput, ToolRegistry, ToolRuntime, ToolT,
};

// Streaming and message parts
pub use crate::core::cache::AdditionalDataCache;
pub use crate::core::dispatch::{ResolvedPart, StreamDispatcher};
pub use crate::protocol::{Event, MessagePart, ToolCallResult};

// Errors
pub use crate::core::error::Error;

// LLM abstractions
pub use crate::llm::LLMProvider;
pub use crate::llm::builder::LLMBuilder;

// Utils
pub use crate::init_logging;
