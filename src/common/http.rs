use std::time::Duration;

use reqwest::{Client, Error};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT_MS: u64 = 8_000;

/// Settings for every outbound provider call.
///
/// Passed explicitly into each component that talks to an upstream; nothing
/// reads timeouts or user agents from ambient state.
#[derive(Debug, Clone)]
pub struct FetchConfig {
  pub timeout: Duration,
  pub user_agent: String,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
      user_agent: DEFAULT_USER_AGENT.to_string(),
    }
  }
}

impl FetchConfig {
  pub fn from_config(config: &crate::configs::FetchSettings) -> Self {
    Self {
      timeout: Duration::from_millis(config.timeout_ms),
      user_agent: config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
    }
  }

  /// Builds a client carrying the spoofed browser user agent and the
  /// per-call deadline. Timed-out calls surface as reqwest timeout errors
  /// and are treated like any other upstream failure.
  pub fn client(&self) -> Result<Client, Error> {
    Client::builder()
      .user_agent(self.user_agent.clone())
      .timeout(self.timeout)
      .build()
  }
}

/// Origin ("scheme://host[:port]") of a URL, used to forge same-origin
/// Referer/Origin headers providers insist on.
pub fn url_origin(url: &str) -> Option<String> {
  let rest = url
    .strip_prefix("https://")
    .map(|r| ("https://", r))
    .or_else(|| url.strip_prefix("http://").map(|r| ("http://", r)))?;
  let host = rest.1.split('/').next()?;
  if host.is_empty() {
    return None;
  }
  Some(format!("{}{}", rest.0, host))
}
