//! Expand one prompt with the given config; does not read .env, returns the laid-out tree.
//!
//! Seeds a root prompt node, submits the prompt and drives the engine with
//! [`FlowEngine::run_until_idle`](nodeflow::FlowEngine::run_until_idle) until the expansion is
//! committed and the layout animation has settled.

use std::sync::Arc;

use nodeflow::{Edge, FlowEngine, Generator, Node, NodeData};

use crate::config::RunConfig;

use super::demo::demo_generator;
use super::Error;

/// Id of the seeded root prompt node.
pub const ROOT_ID: &str = "1";

/// Final graph of a run.
#[derive(Clone, Debug)]
pub struct RunOutput {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Records dropped by schema validation.
    pub rejected: usize,
}

/// Expand `prompt` under a fresh root; does not read .env.
pub async fn run_with_config(config: &RunConfig, prompt: &str) -> Result<RunOutput, Error> {
    let generator = build_generator(config, prompt)?;
    let mut engine = FlowEngine::new(generator).with_session_config(config.session_config());
    engine.seed_root(ROOT_ID, NodeData::empty_prompt())?;
    engine.submit_prompt(ROOT_ID, prompt)?;

    let mut rejected = 0;
    for outcome in engine.run_until_idle().await {
        let summary = outcome?;
        tracing::debug!(
            parent = %summary.parent_id,
            nodes = summary.node_ids.len(),
            rejected = summary.rejected.len(),
            "expansion committed"
        );
        rejected += summary.rejected.len();
    }

    Ok(RunOutput {
        nodes: engine.nodes().to_vec(),
        edges: engine.edges().to_vec(),
        rejected,
    })
}

fn build_generator(config: &RunConfig, prompt: &str) -> Result<Arc<dyn Generator>, Error> {
    if config.mock {
        return Ok(Arc::new(demo_generator(prompt)));
    }
    openai_generator(config)
}

#[cfg(feature = "openai")]
fn openai_generator(config: &RunConfig) -> Result<Arc<dyn Generator>, Error> {
    use async_openai::config::OpenAIConfig;
    use nodeflow::OpenAiGenerator;

    let api_key = config
        .api_key
        .clone()
        .ok_or("OPENAI_API_KEY is not set; please configure it in .env or pass --mock")?;
    let openai_config = OpenAIConfig::new()
        .with_api_base(&config.api_base)
        .with_api_key(api_key);
    let mut generator = OpenAiGenerator::with_config(openai_config, config.model.clone());
    if let Some(t) = config.temperature {
        generator = generator.with_temperature(t);
    }
    Ok(Arc::new(generator))
}

#[cfg(not(feature = "openai"))]
fn openai_generator(_config: &RunConfig) -> Result<Arc<dyn Generator>, Error> {
    Err("built without the `openai` feature; pass --mock".into())
}
