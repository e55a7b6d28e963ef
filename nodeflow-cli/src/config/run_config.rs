//! Run config: API base, key, model, temperature, expansion timeout. Can be filled from env / .env.
//!
//! Interacts with [`RunOptions`](super::RunOptions) and [`run_with_config`](crate::run_with_config).

use std::time::Duration;

use nodeflow::SessionConfig;

use super::RunOptions;

/// Error type used for config loading and runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Request budget for one expansion.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Run config. `api_key` is only needed when `mock` is false.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// OpenAI-compatible API base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: Option<String>,
    /// Model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature 0–2. Default: unset (use API default).
    pub temperature: Option<f32>,
    /// Per-expansion timeout in seconds; `0` means no timeout.
    pub timeout_secs: u64,
    /// When true, expand with the scripted offline generator.
    pub mock: bool,
    /// When true, show debug logs.
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            mock: false,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Offline config: scripted generator, no API key.
    pub fn mock() -> Self {
        Self {
            mock: true,
            ..Self::default()
        }
    }

    /// Fill config from env vars (and .env). Requires `dotenv::dotenv().ok()` or load inside `run()`.
    ///
    /// `OPENAI_API_KEY` required; `OPENAI_API_BASE`, `OPENAI_MODEL` have defaults.
    /// `OPENAI_TEMPERATURE` and `NODEFLOW_TIMEOUT_SECS` optional.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "OPENAI_API_KEY is not set; please configure it in .env or pass --mock",
            )
        })?;
        let api_base =
            std::env::var("OPENAI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let temperature = std::env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok());
        let timeout_secs = std::env::var("NODEFLOW_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            api_base,
            api_key: Some(api_key),
            model,
            temperature,
            timeout_secs,
            mock: false,
            verbose: false,
        })
    }

    /// Apply optional overrides from `RunOptions` to this config. Only set fields override.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(model) = &options.model {
            self.model = model.clone();
        }
        if let Some(t) = options.temperature {
            self.temperature = Some(t);
        }
        if let Some(secs) = options.timeout_secs {
            self.timeout_secs = secs;
        }
        if options.mock {
            self.mock = true;
        }
        self.verbose = options.verbose;
    }

    /// Session settings for the engine: defaults plus this config's timeout.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
            ..SessionConfig::default()
        }
    }
}
