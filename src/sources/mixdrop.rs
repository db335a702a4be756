use std::collections::HashMap;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;

use crate::common::{FetchConfig, url_origin};
use crate::resolver::outcome::{MediaType, SourceOutcome};
use crate::sources::plugin::{ProviderAdapter, contains_fragment};
use crate::sources::scan;

const FRAGMENTS: &[&str] = &["mixdrop"];

/// MixDrop. The delivery URL sits in `MDCore.wurl` inside a packed script,
/// written scheme-relative.
pub struct MixdropSource {
    client: Client,
    wurl_re: Regex,
}

impl MixdropSource {
    pub fn new(fetch: &FetchConfig) -> Result<Self, String> {
        Ok(Self {
            client: fetch.client().map_err(|e| e.to_string())?,
            wurl_re: Regex::new(r#"MDCore\.wurl\s*=\s*["']([^"']+)["']"#)
                .map_err(|e| e.to_string())?,
        })
    }

    fn absolutize(url: &str) -> String {
        if let Some(rest) = url.strip_prefix("//") {
            format!("https://{rest}")
        } else {
            url.to_string()
        }
    }
}

#[async_trait]
impl ProviderAdapter for MixdropSource {
    fn name(&self) -> &str {
        "mixdrop"
    }

    fn matches(&self, url: &str) -> bool {
        contains_fragment(url, FRAGMENTS)
    }

    async fn resolve(&self, url: &str) -> SourceOutcome {
        let origin = url_origin(url).unwrap_or_else(|| "https://mixdrop.ag".to_string());

        let response = match self
            .client
            .get(url)
            .header("Referer", format!("{origin}/"))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("mixdrop request failed: {e}"),
                };
            }
        };

        if !response.status().is_success() {
            return SourceOutcome::Error {
                reason: format!("mixdrop returned status {}", response.status()),
            };
        }

        let body = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("mixdrop body read failed: {e}"),
                };
            }
        };

        let searchable = scan::with_unpacked_scripts(&body);
        match self.wurl_re.captures(&searchable) {
            Some(caps) => {
                let delivery = Self::absolutize(&caps[1]);
                SourceOutcome::Direct {
                    media_type: MediaType::classify(&delivery),
                    url: delivery,
                    headers: Some(HashMap::from([(
                        "Referer".to_string(),
                        format!("{origin}/"),
                    )])),
                    provider: self.name().to_string(),
                }
            }
            None => SourceOutcome::Error {
                reason: "mixdrop page carried no MDCore.wurl".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wurl_is_extracted_and_absolutized() {
        let source = MixdropSource::new(&FetchConfig::default()).unwrap();
        let body = r#"MDCore.ref="";MDCore.wurl="//a-delivery31.mxdcontent.net/v/abc123.mp4?s=x&e=1";MDCore.vfile="";"#;
        let caps = source.wurl_re.captures(body).unwrap();
        assert_eq!(
            MixdropSource::absolutize(&caps[1]),
            "https://a-delivery31.mxdcontent.net/v/abc123.mp4?s=x&e=1"
        );
    }

    #[test]
    fn absolute_urls_are_untouched() {
        assert_eq!(
            MixdropSource::absolutize("https://cdn.example.com/v.mp4"),
            "https://cdn.example.com/v.mp4"
        );
    }
}
