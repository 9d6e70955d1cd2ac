//! Service configuration loaded from `.env`.
//!
//! Everything is environment-driven with safe defaults so the gateway boots
//! without any configuration at all (corpus file aside). Change behavior
//! without code edits.

use serde::{Deserialize, Serialize};

/// Runtime configuration loaded from environment.
///
/// | Env | Default | Description |
/// |-----|---------|--------------|
/// | CSBOT_PORT | 5000 | Gateway listen port. |
/// | CSBOT_CORPUS_PATH | manual_data_entry.csv | CSV corpus with `heading` and `data` columns. |
/// | CSBOT_FUZZY_THRESHOLD | 80 | Minimum token-set score (0–100) to accept a corpus match. |
/// | CSBOT_HTTP_TIMEOUT_SECS | 15 | Per-call timeout for outbound search/article/generate requests. |
/// | CSBOT_REQUEST_DEADLINE_SECS | 60 | Overall deadline for one resolve; expiry degrades the answer. |
/// | CSBOT_LIVE_CLOCK | false | If true, date/time answers reflect "now" per request instead of the boot instant. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// CSBOT_PORT: Gateway listen port.
    pub port: u16,
    /// CSBOT_CORPUS_PATH: Path to the CSV corpus loaded once at startup.
    pub corpus_path: String,
    /// CSBOT_FUZZY_THRESHOLD: Acceptance threshold for the corpus matcher (0–100).
    pub fuzzy_threshold: u8,
    /// CSBOT_HTTP_TIMEOUT_SECS: Per-call timeout for every outbound HTTP request.
    pub http_timeout_secs: u64,
    /// CSBOT_REQUEST_DEADLINE_SECS: Overall per-request resolve deadline.
    pub request_deadline_secs: u64,
    /// CSBOT_LIVE_CLOCK: When true, time-sensitive canned answers are computed per request.
    pub live_clock: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            corpus_path: "manual_data_entry.csv".to_string(),
            fuzzy_threshold: 80,
            http_timeout_secs: 15,
            request_deadline_secs: 60,
            live_clock: false,
        }
    }
}

impl BotConfig {
    /// Load from environment. Unset or invalid => defaults (see struct field docs).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("CSBOT_PORT", defaults.port),
            corpus_path: env_opt_string("CSBOT_CORPUS_PATH").unwrap_or(defaults.corpus_path),
            fuzzy_threshold: env_parse::<u8>("CSBOT_FUZZY_THRESHOLD", defaults.fuzzy_threshold)
                .min(100),
            http_timeout_secs: env_parse("CSBOT_HTTP_TIMEOUT_SECS", defaults.http_timeout_secs),
            request_deadline_secs: env_parse(
                "CSBOT_REQUEST_DEADLINE_SECS",
                defaults.request_deadline_secs,
            ),
            live_clock: env_bool("CSBOT_LIVE_CLOCK", false),
        }
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => v.trim().eq_ignore_ascii_case("true") || (v.trim().is_empty() && default),
        Err(_) => default,
    }
}

fn env_parse<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_opt_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
