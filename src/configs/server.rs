use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3030,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub filters: Option<String>,
}

/// Outbound HTTP settings applied to every provider call.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FetchSettings {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            user_agent: None,
        }
    }
}

fn default_timeout_ms() -> u64 {
    8_000
}

/// Token-bucket rate limiting, keyed per client and per upstream provider.
/// Disabled buckets fall back to the permissive limiter.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_burst")]
    pub burst: u32,
    #[serde(default = "default_per_second")]
    pub per_second: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            burst: default_burst(),
            per_second: default_per_second(),
        }
    }
}

fn default_burst() -> u32 {
    20
}

fn default_per_second() -> f64 {
    5.0
}
