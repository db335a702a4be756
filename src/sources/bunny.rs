use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;

use crate::common::FetchConfig;
use crate::resolver::outcome::{MediaType, SourceOutcome};
use crate::sources::plugin::{ProviderAdapter, contains_fragment};

const FRAGMENTS: &[&str] = &["workers.dev", "bunny"];

/// Edge-hosted links (bunny CDN, Cloudflare workers.dev relays). The URL
/// itself is the media; the work here is classification and the Referer
/// these edges validate.
const PLAYER_REFERER: &str = "https://embdmstrplayer.com";

pub struct BunnySource {
    client: Client,
}

impl BunnySource {
    pub fn new(fetch: &FetchConfig) -> Result<Self, String> {
        Ok(Self {
            client: fetch.client().map_err(|e| e.to_string())?,
        })
    }

    fn playback_headers() -> HashMap<String, String> {
        HashMap::from([
            ("Referer".to_string(), format!("{PLAYER_REFERER}/")),
            ("Origin".to_string(), PLAYER_REFERER.to_string()),
        ])
    }
}

#[async_trait]
impl ProviderAdapter for BunnySource {
    fn name(&self) -> &str {
        "bunny"
    }

    fn matches(&self, url: &str) -> bool {
        contains_fragment(url, FRAGMENTS)
    }

    async fn resolve(&self, url: &str) -> SourceOutcome {
        let classified = MediaType::classify(url);
        if classified != MediaType::Unknown {
            return SourceOutcome::Direct {
                url: url.to_string(),
                media_type: classified,
                headers: Some(Self::playback_headers()),
                provider: self.name().to_string(),
            };
        }

        // extension-less edge path: sniff the content type
        let response = match self
            .client
            .get(url)
            .header("Referer", format!("{PLAYER_REFERER}/"))
            .header("Range", "bytes=0-512")
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("bunny request failed: {e}"),
                };
            }
        };

        if !response.status().is_success() {
            return SourceOutcome::Error {
                reason: format!("bunny returned status {}", response.status()),
            };
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body_head = response.text().await.unwrap_or_default();

        let media_type = if content_type.contains("mpegurl")
            || body_head.trim_start().starts_with("#EXTM3U")
        {
            MediaType::M3u8
        } else if content_type.contains("mp4") {
            MediaType::Mp4
        } else {
            return SourceOutcome::Error {
                reason: format!("bunny url is not a media endpoint ({content_type})"),
            };
        };

        SourceOutcome::Direct {
            url: url.to_string(),
            media_type,
            headers: Some(Self::playback_headers()),
            provider: self.name().to_string(),
        }
    }
}
