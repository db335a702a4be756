use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;

use crate::common::FetchConfig;
use crate::resolver::outcome::{MediaType, SourceOutcome};
use crate::sources::plugin::{ProviderAdapter, contains_fragment};
use crate::sources::scan;

const FRAGMENTS: &[&str] = &["vidmoly"];
const ORIGIN: &str = "https://vidmoly.net";

/// Vidmoly embed pages carry an inline jwplayer setup with the hls link in
/// its `sources` block.
pub struct VidmolySource {
    client: Client,
}

impl VidmolySource {
    pub fn new(fetch: &FetchConfig) -> Result<Self, String> {
        Ok(Self {
            client: fetch.client().map_err(|e| e.to_string())?,
        })
    }

    fn playback_headers() -> HashMap<String, String> {
        HashMap::from([
            ("Referer".to_string(), format!("{ORIGIN}/")),
            ("Origin".to_string(), ORIGIN.to_string()),
        ])
    }
}

#[async_trait]
impl ProviderAdapter for VidmolySource {
    fn name(&self) -> &str {
        "vidmoly"
    }

    fn matches(&self, url: &str) -> bool {
        contains_fragment(url, FRAGMENTS)
    }

    async fn resolve(&self, url: &str) -> SourceOutcome {
        let response = match self
            .client
            .get(url)
            .header("Referer", format!("{ORIGIN}/"))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("vidmoly request failed: {e}"),
                };
            }
        };

        if !response.status().is_success() {
            return SourceOutcome::Error {
                reason: format!("vidmoly returned status {}", response.status()),
            };
        }

        let body = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("vidmoly body read failed: {e}"),
                };
            }
        };

        let searchable = scan::with_unpacked_scripts(&body);
        if let Some(file) = scan::find_jwplayer_file(&searchable)
            .or_else(|| scan::find_quoted_media(&searchable))
        {
            return SourceOutcome::Direct {
                media_type: MediaType::classify(&file),
                url: file,
                headers: Some(Self::playback_headers()),
                provider: self.name().to_string(),
            };
        }

        if let Some(src) = scan::find_iframe_src(&searchable) {
            return SourceOutcome::Iframe { url: src };
        }

        SourceOutcome::Error {
            reason: "vidmoly page carried no sources block".to_string(),
        }
    }
}
