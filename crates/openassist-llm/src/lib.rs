pub mod backends;
pub mod builder;
pub mod chat;
pub mod error;

pub use chat::{
    ChatMessage, ChatProvider, ChatResponse, ChatRole, ChatStream, FunctionTool, MessageType, Tool,
    ToolChoice,
};
pub use error::LLMError;
pub use openassist_protocol::{FunctionCall, StreamChunk, ToolCall, Usage};

/// Marker trait for a fully configured LLM backend.
///
/// Everything the assistant layer needs from a provider is the chat surface;
/// backends may additionally carry a default tool set.
pub trait LLMProvider: chat::ChatProvider {
    fn tools(&self) -> Option<&[Tool]> {
        None
    }
}
