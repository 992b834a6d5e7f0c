use std::time::Duration;

use anyhow::Context;

pub const BACKEND_URL_VAR: &str = "DASHBOARD_BACKEND_URL";
pub const CACHE_TTL_VAR: &str = "DASHBOARD_CACHE_TTL_SECS";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_LOG_FILTER: &str = "health_risk_dashboard=info";

/// Backend base URL for bundle loading. A `--backend-url` flag wins over the
/// environment. Never fails; an unset or blank variable means the default.
pub fn backend_url(flag: Option<String>) -> String {
    backend_url_from_lookup(flag, |key| std::env::var(key).ok())
}

/// Bundle cache TTL for the backend service.
pub fn cache_ttl() -> anyhow::Result<Duration> {
    cache_ttl_from_lookup(|key| std::env::var(key).ok())
}

fn backend_url_from_lookup(flag: Option<String>, lookup: impl Fn(&str) -> Option<String>) -> String {
    let url = flag
        .or_else(|| lookup(BACKEND_URL_VAR))
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
    url.trim().trim_end_matches('/').to_string()
}

fn cache_ttl_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Duration> {
    let secs = match lookup(CACHE_TTL_VAR) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{CACHE_TTL_VAR} must be a whole number of seconds"))?,
        None => DEFAULT_CACHE_TTL_SECS,
    };
    Ok(Duration::from_secs(secs))
}
