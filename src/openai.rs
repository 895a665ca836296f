use anyhow::{anyhow, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, error};

use crate::models::message::Role;
use crate::models::Message;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Generation settings fixed per deployment, never taken from a request.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 600,
            top_p: 0.9,
        }
    }
}

/// A chat-completion backend: takes the prompt messages, returns one completion text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Completion client for any OpenAI-compatible endpoint (Groq by default).
pub struct OpenAICompletionClient {
    client: Client<OpenAIConfig>,
    params: GenerationParams,
}

impl OpenAICompletionClient {
    pub fn new(api_key: &str, api_base: &str, params: GenerationParams) -> Self {
        let client = Client::with_config(
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(api_base),
        );
        OpenAICompletionClient { client, params }
    }
}

fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
    let content = message.content.as_str();
    let request_message = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(content)
            .build()?
            .into(),
    };
    Ok(request_message)
}

#[async_trait]
impl CompletionClient for OpenAICompletionClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.params.model)
            .messages(messages)
            .temperature(self.params.temperature)
            .max_tokens(self.params.max_tokens)
            .top_p(self.params.top_p)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            error!("Chat completion request failed: {:?}", e);
            anyhow!("Chat completion request failed: {}", e)
        })?;

        let content = response
            .choices
            .first()
            .ok_or_else(|| anyhow!("No choices in completion response"))?
            .message
            .content
            .clone()
            .ok_or_else(|| anyhow!("No content in completion response"))?;

        debug!("Received completion of {} characters", content.len());
        Ok(content)
    }
}
