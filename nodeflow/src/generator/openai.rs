//! OpenAI streaming chat-completions generator.
//!
//! Sends the graph context as a system prompt followed by the expansion messages, streams
//! the completion and feeds the text deltas through a [`RecordAssembler`], so records reach
//! the session while the model is still writing.
//!
//! **Interaction**: Implements [`Generator`]; depends on `async_openai` (feature `openai`).

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::{
    build_system_prompt, GenerationEvent, GenerationStream, Generator, GeneratorError,
    RecordAssembler,
};
use crate::context::{ChatMessage, ExpansionRequest, Role};

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const CHANNEL_CAPACITY: usize = 32;

/// Streaming OpenAI generator. Uses `OPENAI_API_KEY` from the environment by default,
/// or an explicit config via [`OpenAiGenerator::with_config`].
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            model: model.into(),
            temperature: None,
        }
    }

    /// Custom config (API key, base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn messages_to_request(request: &ExpansionRequest) -> Vec<ChatCompletionRequestMessage> {
        let system = build_system_prompt(request);
        std::iter::once(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage::from(system.as_str()),
        ))
        .chain(request.messages.iter().map(|m: &ChatMessage| match m.role {
            Role::System => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(m.content.as_str()),
            ),
            Role::User => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(m.content.as_str()),
            ),
            Role::Assistant => ChatCompletionRequestMessage::Assistant(m.content.as_str().into()),
        }))
        .collect()
    }
}

impl Default for OpenAiGenerator {
    /// Environment config with [`DEFAULT_MODEL`].
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, request: ExpansionRequest) -> Result<GenerationStream, GeneratorError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(&request));
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        let req = args
            .build()
            .map_err(|e| GeneratorError::Request(format!("OpenAI request build failed: {}", e)))?;

        let mut upstream = self
            .client
            .chat()
            .create_stream(req)
            .await
            .map_err(|e| GeneratorError::Request(format!("OpenAI API error: {}", e)))?;

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut assembler = RecordAssembler::new();
            while let Some(item) = upstream.next().await {
                let chunk = match item {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx
                            .send(GenerationEvent::Error(format!("OpenAI stream error: {}", e)))
                            .await;
                        return;
                    }
                };
                for choice in chunk.choices {
                    let Some(text) = choice.delta.content else {
                        continue;
                    };
                    for record in assembler.push(&text) {
                        if tx.send(GenerationEvent::Record(record)).await.is_err() {
                            // receiver dropped: session cancelled
                            return;
                        }
                    }
                }
            }
            let _ = tx.send(GenerationEvent::Complete).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}
