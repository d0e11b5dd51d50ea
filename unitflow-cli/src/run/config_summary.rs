//! Config summary printed to stderr before a verbose run.

use crate::config::RunConfig;

/// `(key, value)` entries describing the effective run config. The api key is never shown.
pub fn config_summary(config: &RunConfig) -> Vec<(&'static str, String)> {
    let api_base = if config.reasoner {
        &config.reasoner_api_base
    } else {
        &config.api_base
    };
    vec![
        ("mode", config.mode.to_string()),
        ("model", config.active_model().to_string()),
        ("api_base", api_base.clone()),
        ("temperature", config.temperature.to_string()),
        (
            "api_key",
            if config.api_key.is_some() { "set" } else { "unset" }.to_string(),
        ),
    ]
}

pub fn print_config_summary(config: &RunConfig) {
    let line = config_summary(config)
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(" ");
    eprintln!("[config] {}", line);
}
