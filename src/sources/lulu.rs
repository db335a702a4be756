use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;

use crate::common::{FetchConfig, url_origin};
use crate::resolver::outcome::{MediaType, SourceOutcome};
use crate::sources::plugin::{ProviderAdapter, contains_fragment};
use crate::sources::scan;

const FRAGMENTS: &[&str] = &["lulu"];

/// Lulustream mirrors. Same jwplayer page shape as vidmoly, but the player
/// setup is usually packed, and mirror hostnames vary, so Referer is forged
/// from the embed URL itself.
pub struct LuluSource {
    client: Client,
}

impl LuluSource {
    pub fn new(fetch: &FetchConfig) -> Result<Self, String> {
        Ok(Self {
            client: fetch.client().map_err(|e| e.to_string())?,
        })
    }
}

#[async_trait]
impl ProviderAdapter for LuluSource {
    fn name(&self) -> &str {
        "lulu"
    }

    fn matches(&self, url: &str) -> bool {
        contains_fragment(url, FRAGMENTS)
    }

    async fn resolve(&self, url: &str) -> SourceOutcome {
        let origin = url_origin(url).unwrap_or_else(|| "https://luluvdo.com".to_string());

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
                    reason: format!("lulu request failed: {e}"),
                };
            }
        };

        if !response.status().is_success() {
            return SourceOutcome::Error {
                reason: format!("lulu returned status {}", response.status()),
            };
        }

        let body = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("lulu body read failed: {e}"),
                };
            }
        };

        let searchable = scan::with_unpacked_scripts(&body);
        match scan::find_jwplayer_file(&searchable).or_else(|| scan::find_quoted_media(&searchable))
        {
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
                reason: "lulu page carried no sources block".to_string(),
            },
        }
    }
}
