mod base;
mod builder;
mod config;
mod context;
mod error;
mod hooks;
mod tool_processor;

pub use base::{Assistant, ChatSession};
pub use builder::AssistantBuilder;
pub use config::AssistantConfig;
pub use context::Context;
pub use error::AssistantBuildError;
pub use hooks::{AssistantHooks, HookOutcome, NoopHooks};
pub use tool_processor::ToolProcessor;
