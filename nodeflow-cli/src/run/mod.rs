//! Run entry points: run with default config, run_with_config, or run_with_options.
//!
//! Re-exports [`run`], [`run_with_config`], [`run_with_options`], [`RunOutput`] and [`Error`].

pub use crate::config::Error;

mod demo;
mod run_with_config;

use crate::config::{RunConfig, RunOptions};

pub use demo::demo_generator;
pub use run_with_config::{run_with_config, RunOutput, ROOT_ID};

/// Expand `prompt` with default config (from .env), returns the laid-out tree.
///
/// Loads `.env` internally, then calls `run_with_config`.
pub async fn run(prompt: &str) -> Result<RunOutput, Error> {
    dotenv::dotenv().ok();
    let config = RunConfig::from_env()?;
    run_with_config(&config, prompt).await
}

/// Expand `prompt` with config from env and optional overrides (e.g. from CLI).
///
/// With `options.mock` no environment is needed; otherwise loads `.env`, builds `RunConfig`
/// from env and applies `options`. Interacts with
/// [`RunConfig::apply_options`](crate::RunConfig::apply_options) and [`run_with_config`].
pub async fn run_with_options(prompt: &str, options: &RunOptions) -> Result<RunOutput, Error> {
    let mut config = if options.mock {
        RunConfig::mock()
    } else {
        dotenv::dotenv().ok();
        RunConfig::from_env()?
    };
    config.apply_options(options);
    run_with_config(&config, prompt).await
}
