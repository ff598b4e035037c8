use crate::assistant::AssistantBuildError;
use crate::tool::ToolCallError;
use openassist_llm::error::LLMError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    LLMError(#[from] LLMError),
    #[error(transparent)]
    ToolCallError(#[from] ToolCallError),
    #[error(transparent)]
    BuildError(#[from] AssistantBuildError),
    #[error("Run aborted by hook")]
    Aborted,
    #[error("Reached maximum turns ({0}) without a final answer")]
    MaxTurnsReached(usize),
}
