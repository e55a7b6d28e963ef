//! Optional overrides for a run (CLI args or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options) and
//! [`run_with_options`](crate::run_with_options). Callers build a `RunOptions` and pass it to
//! get env-based config with overrides applied.

/// Optional overrides for a run: generator, model, temperature, timeout, logging.
///
/// All fields are optional; only set fields override the base config (from env).
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Use the scripted offline generator instead of an API; no key needed.
    pub mock: bool,
    /// Override model name.
    pub model: Option<String>,
    /// Override sampling temperature (0–2).
    pub temperature: Option<f32>,
    /// Override the per-expansion timeout in seconds; `0` disables it.
    pub timeout_secs: Option<u64>,
    /// Show debug logs from the engine.
    pub verbose: bool,
}
