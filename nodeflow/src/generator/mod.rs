//! Generation capability: turns an [`ExpansionRequest`] into a stream of raw records.
//!
//! An expansion session calls [`Generator::generate`] once and drains the returned
//! [`GenerationStream`]. Records are unvalidated JSON; the stream must end with
//! [`GenerationEvent::Complete`] (or [`GenerationEvent::Error`]), otherwise the session
//! treats it as a transport failure.
//!
//! Implementations: [`MockGenerator`] (scripted, for tests and demos) and `OpenAiGenerator`
//! (streaming chat completions, feature `openai`).

mod assembler;
mod mock;
mod prompt;

#[cfg(feature = "openai")]
mod openai;

pub use assembler::RecordAssembler;
pub use mock::MockGenerator;
pub use prompt::build_system_prompt;

#[cfg(feature = "openai")]
pub use openai::{OpenAiGenerator, DEFAULT_MODEL};

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use thiserror::Error;

use crate::context::ExpansionRequest;

/// One item of a generation stream.
#[derive(Clone, Debug, PartialEq)]
pub enum GenerationEvent {
    /// One raw `{type, data}` record, not yet validated.
    Record(Value),
    /// Explicit end of stream; everything before it is the full batch.
    Complete,
    /// The generator failed mid-stream.
    Error(String),
}

pub type GenerationStream = Pin<Box<dyn Stream<Item = GenerationEvent> + Send>>;

/// Failure to start a generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The request could not be built or was refused.
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation transport error: {0}")]
    Transport(String),
}

/// Streams generated records for one expansion.
///
/// **Interaction**: Called by the expansion task spawned in
/// [`ExpansionManager::submit`](crate::session::ExpansionManager::submit).
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: ExpansionRequest) -> Result<GenerationStream, GeneratorError>;
}
