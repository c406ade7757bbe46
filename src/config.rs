use std::time::Duration;
use url::Url;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the LifeLink API, e.g. `https://api.lifelink.example/api/v1/`.
    /// Set via LIFELINK_API_URL. Default: http://localhost:5000/api/v1/.
    pub api_url: Url,
    /// Bearer token for the session. Set via LIFELINK_API_TOKEN.
    pub api_token: Option<String>,
    /// Poll interval in seconds. Set via LIFELINK_POLL_SECS. Default: 30.
    pub poll_interval: Duration,
}

impl Config {
    /// Returns the session token or a uniform error for unauthenticated
    /// invocations.
    pub fn require_token(&self) -> anyhow::Result<String> {
        self.api_token
            .clone()
            .context("LIFELINK_API_TOKEN is not set; log in first")
    }
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let raw_url = std::env::var("LIFELINK_API_URL")
        .unwrap_or_else(|_| "http://localhost:5000/api/v1/".into());
    let api_url = Url::parse(&raw_url)
        .with_context(|| format!("LIFELINK_API_URL is not a valid URL: {raw_url}"))?;

    let poll_secs: u64 = std::env::var("LIFELINK_POLL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(crate::poller::DEFAULT_INTERVAL.as_secs());

    Ok(Config {
        api_url,
        api_token: std::env::var("LIFELINK_API_TOKEN").ok(),
        poll_interval: Duration::from_secs(poll_secs.max(1)),
    })
}
