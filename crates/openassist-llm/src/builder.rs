//! Builder module for configuring and instantiating LLM providers.
//!
//! Provides a fluent interface for setting model selection, API keys,
//! generation parameters and tool-choice behavior before constructing a
//! concrete backend.

use crate::{LLMProvider, chat::ToolChoice, error::LLMError};
use std::marker::PhantomData;
use std::sync::Arc;

/// Supported LLM backend providers.
///
/// All of these speak the OpenAI-compatible chat completions protocol; the
/// variant selects the default base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LLMBackend {
    /// OpenAI API provider
    OpenAI,
    /// Ollama local provider for self-hosted models
    Ollama,
    /// DeepSeek API provider
    DeepSeek,
    /// Groq API provider
    Groq,
    /// OpenRouter API provider for various models
    OpenRouter,
}

impl LLMBackend {
    /// Default chat-completions base URL for the backend.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            LLMBackend::OpenAI => "https://api.openai.com/v1",
            LLMBackend::Ollama => "http://localhost:11434/v1",
            LLMBackend::DeepSeek => "https://api.deepseek.com/v1",
            LLMBackend::Groq => "https://api.groq.com/openai/v1",
            LLMBackend::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }
}

impl std::str::FromStr for LLMBackend {
    type Err = LLMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMBackend::OpenAI),
            "ollama" => Ok(LLMBackend::Ollama),
            "deepseek" => Ok(LLMBackend::DeepSeek),
            "groq" => Ok(LLMBackend::Groq),
            "openrouter" => Ok(LLMBackend::OpenRouter),
            _ => Err(LLMError::InvalidRequest(format!(
                "Unknown LLM backend: {s}"
            ))),
        }
    }
}

/// Constructed from a finished `LLMBuilder` by each backend type.
pub trait BuildableProvider: LLMProvider + Sized {
    fn build_from(builder: LLMBuilder<Self>) -> Result<Self, LLMError>;
}

/// Builder for configuring and instantiating LLM providers.
pub struct LLMBuilder<L: LLMProvider> {
    /// Selected backend provider
    pub(crate) backend_marker: PhantomData<L>,
    /// API key for authentication with the provider
    pub api_key: Option<String>,
    /// Base URL for API requests (primarily for self-hosted instances)
    pub base_url: Option<String>,
    /// Model identifier/name to use
    pub model: Option<String>,
    /// Maximum tokens to generate in responses
    pub max_tokens: Option<u32>,
    /// Temperature parameter for controlling response randomness (0.0-1.0)
    pub temperature: Option<f32>,
    /// Request timeout duration in seconds
    pub timeout_seconds: Option<u64>,
    /// Top-p (nucleus) sampling parameter
    pub top_p: Option<f32>,
    /// System prompt prepended to every conversation
    pub system: Option<String>,
    /// Tool choice behavior
    pub tool_choice: Option<ToolChoice>,
}

impl<L: LLMProvider> Default for LLMBuilder<L> {
    fn default() -> Self {
        Self {
            backend_marker: PhantomData,
            api_key: None,
            base_url: None,
            model: None,
            max_tokens: None,
            temperature: None,
            timeout_seconds: None,
            top_p: None,
            system: None,
            tool_choice: None,
        }
    }
}

impl<L: LLMProvider> LLMBuilder<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = Some(choice);
        self
    }
}

impl<L: BuildableProvider> LLMBuilder<L> {
    /// Construct the backend, validating required fields.
    pub fn build(self) -> Result<Arc<L>, LLMError> {
        Ok(Arc::new(L::build_from(self)?))
    }
}
