//! nodeflow-cli library: reusable run logic for other crates.
//!
//! Reads OpenAI config from .env (or uses the scripted offline generator), seeds a root prompt,
//! expands it through a [`nodeflow::FlowEngine`] and returns the laid-out tree.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! let output = nodeflow_cli::run("plan a product launch").await?;
//! println!("{}", nodeflow_cli::render_tree(&output));
//! ```

mod config;
mod render;
mod run;

pub use config::{
    Error, RunConfig, RunOptions, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
pub use render::{render_json, render_tree};
pub use run::{demo_generator, run, run_with_config, run_with_options, RunOutput, ROOT_ID};

#[cfg(test)]
mod tests;
