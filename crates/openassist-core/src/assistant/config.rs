/// Configuration for an assistant run loop.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Upper bound on chat turns before the run is abandoned.
    pub max_turns: usize,
    /// Instructions prepended to the conversation as a system message.
    pub system_prompt: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_turns: 10,
            system_prompt: None,
        }
    }
}
