pub mod event;
pub mod llm;
pub mod message;
pub mod tool;

pub use event::Event;
pub use llm::{FunctionCall, StreamChunk, ToolCall, Usage};
pub use message::{MessagePart, ToolInvocationState};
pub use tool::ToolCallResult;
