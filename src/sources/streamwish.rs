use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::common::{FetchConfig, url_origin};
use crate::resolver::outcome::{MediaType, SourceOutcome};
use crate::sources::plugin::{ProviderAdapter, contains_fragment};
use crate::sources::scan;

const FRAGMENTS: &[&str] = &["streamwish", "strwish", "swish"];

/// StreamWish and its rebrands. The player setup is shipped as a packed
/// eval blob; once unpacked it is a regular jwplayer config whose first
/// `file` entry is the hls master.
pub struct StreamWishSource {
    client: Client,
    hls_re: Regex,
}

impl StreamWishSource {
    pub fn new(fetch: &FetchConfig) -> Result<Self, String> {
        Ok(Self {
            client: fetch.client().map_err(|e| e.to_string())?,
            // some mirrors inline the link outside the sources block
            hls_re: Regex::new(r#""(https?://[^"]+/hls2?/[^"]+\.m3u8[^"]*)""#)
                .map_err(|e| e.to_string())?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for StreamWishSource {
    fn name(&self) -> &str {
        "streamwish"
    }

    fn matches(&self, url: &str) -> bool {
        contains_fragment(url, FRAGMENTS)
    }

    async fn resolve(&self, url: &str) -> SourceOutcome {
        let origin = url_origin(url).unwrap_or_else(|| "https://streamwish.to".to_string());

        let response = match self
            .client
            .get(url)
            .header("Referer", format!("{origin}/"))
            .header("Origin", origin.clone())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("streamwish request failed: {e}"),
                };
            }
        };

        if !response.status().is_success() {
            return SourceOutcome::Error {
                reason: format!("streamwish returned status {}", response.status()),
            };
        }

        let body = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("streamwish body read failed: {e}"),
                };
            }
        };

        let searchable = scan::with_unpacked_scripts(&body);
        let found = scan::find_jwplayer_file(&searchable)
            .or_else(|| {
                self.hls_re
                    .captures(&searchable)
                    .map(|caps| caps[1].to_string())
            })
            .or_else(|| scan::find_quoted_media(&searchable));

        match found {
            Some(file) => SourceOutcome::Direct {
                media_type: MediaType::classify(&file),
                url: file,
                headers: Some(HashMap::from([(
                    "Referer".to_string(),
                    format!("{origin}/"),
                )])),
                provider: self.name().to_string(),
            },
            None => SourceOutcome::Error {
                reason: "streamwish blob carried no file entry".to_string(),
            },
        }
    }
}
