//! Optional overrides for a run (CLI flags or programmatic).
//!
//! Applied on top of the env-based config by
//! [`RunConfig::apply_options`](super::RunConfig::apply_options).

use unitflow::RunMode;

/// Optional overrides for a run. Only set fields override the base config.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Scheduler mode for this run.
    pub mode: Option<RunMode>,
    /// Send ai units to the reasoning model instead of the standard chat model.
    pub reasoner: bool,
    /// Sampling temperature (0–2).
    pub temperature: Option<f32>,
    /// Print node enter/exit to stderr.
    pub verbose: bool,
}
