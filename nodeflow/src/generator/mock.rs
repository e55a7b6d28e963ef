//! Scripted generator for tests and the offline demo.
//!
//! Replays a fixed list of [`GenerationEvent`]s, optionally spacing them out with a delay
//! and optionally never finishing (to exercise cancellation and timeouts). Every request
//! it receives is recorded.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde_json::Value;

use super::{GenerationEvent, GenerationStream, Generator, GeneratorError};
use crate::context::ExpansionRequest;

/// Mock generator: fixed event script, same for every request.
#[derive(Clone, Debug, Default)]
pub struct MockGenerator {
    script: Vec<GenerationEvent>,
    delay: Option<Duration>,
    hang: bool,
    fail_with: Option<String>,
    requests: Arc<Mutex<Vec<ExpansionRequest>>>,
}

impl MockGenerator {
    /// Replays `script` exactly (no completion signal is added).
    pub fn new(script: Vec<GenerationEvent>) -> Self {
        Self {
            script,
            ..Self::default()
        }
    }

    /// Emits each record then [`GenerationEvent::Complete`].
    pub fn with_records(records: Vec<Value>) -> Self {
        let mut script: Vec<GenerationEvent> =
            records.into_iter().map(GenerationEvent::Record).collect();
        script.push(GenerationEvent::Complete);
        Self::new(script)
    }

    /// Refuses every request with [`GeneratorError::Request`].
    pub fn failing_request(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Waits `delay` before each event.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Never ends after the script: the stream stays pending.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Requests received so far, in call order.
    pub fn requests(&self) -> Vec<ExpansionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, request: ExpansionRequest) -> Result<GenerationStream, GeneratorError> {
        if let Ok(mut seen) = self.requests.lock() {
            seen.push(request);
        }
        if let Some(msg) = &self.fail_with {
            return Err(GeneratorError::Request(msg.clone()));
        }

        let delay = self.delay;
        let events = stream::iter(self.script.clone()).then(move |event| async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            event
        });
        if self.hang {
            Ok(Box::pin(events.chain(stream::pending())))
        } else {
            Ok(Box::pin(events))
        }
    }
}
