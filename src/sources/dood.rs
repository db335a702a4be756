use std::collections::HashMap;

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;
use reqwest::Client;

use crate::common::{FetchConfig, url_origin};
use crate::resolver::outcome::{MediaType, SourceOutcome};
use crate::sources::plugin::{ProviderAdapter, contains_fragment};

const FRAGMENTS: &[&str] = &["dood", "d0000d", "ds2play"];

/// DoodStream and its mirror domains.
///
/// The embed page contains a `/pass_md5/<hash>/<token>` path; fetching it
/// (with the embed page as Referer) returns a partial stream URL that must
/// be completed with a fresh random suffix plus the token and an expiry
/// timestamp, mirroring the page's own `makePlay()` routine.
pub struct DoodSource {
    client: Client,
    pass_re: Regex,
}

impl DoodSource {
    pub fn new(fetch: &FetchConfig) -> Result<Self, String> {
        Ok(Self {
            client: fetch.client().map_err(|e| e.to_string())?,
            pass_re: Regex::new(r"(/pass_md5/[\w-]+/([\w-]+))").map_err(|e| e.to_string())?,
        })
    }

    fn random_suffix() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(10)
            .map(char::from)
            .collect()
    }

    fn now_ms() -> u128 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }

    /// Completes the partial URL returned by the pass_md5 endpoint.
    fn make_play(partial: &str, token: &str) -> String {
        format!(
            "{partial}{}?token={token}&expiry={}",
            Self::random_suffix(),
            Self::now_ms()
        )
    }
}

#[async_trait]
impl ProviderAdapter for DoodSource {
    fn name(&self) -> &str {
        "dood"
    }

    fn matches(&self, url: &str) -> bool {
        contains_fragment(url, FRAGMENTS)
    }

    async fn resolve(&self, url: &str) -> SourceOutcome {
        let Some(origin) = url_origin(url) else {
            return SourceOutcome::Error {
                reason: "dood embed url has no origin".to_string(),
            };
        };

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("dood request failed: {e}"),
                };
            }
        };

        if !response.status().is_success() {
            return SourceOutcome::Error {
                reason: format!("dood returned status {}", response.status()),
            };
        }

        let body = match response.text().await {
            Ok(t) => t,
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("dood body read failed: {e}"),
                };
            }
        };

        let Some(caps) = self.pass_re.captures(&body) else {
            return SourceOutcome::Error {
                reason: "dood page carried no pass_md5 path".to_string(),
            };
        };
        let pass_path = caps[1].to_string();
        let token = caps[2].to_string();

        let partial = match self
            .client
            .get(format!("{origin}{pass_path}"))
            .header("Referer", url)
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => match r.text().await {
                Ok(t) => t,
                Err(e) => {
                    return SourceOutcome::Error {
                        reason: format!("dood pass_md5 body read failed: {e}"),
                    };
                }
            },
            Ok(r) => {
                return SourceOutcome::Error {
                    reason: format!("dood pass_md5 returned status {}", r.status()),
                };
            }
            Err(e) => {
                return SourceOutcome::Error {
                    reason: format!("dood pass_md5 request failed: {e}"),
                };
            }
        };

        let partial = partial.trim();
        if !partial.starts_with("http") {
            return SourceOutcome::Error {
                reason: "dood pass_md5 response is not a stream url".to_string(),
            };
        }

        let play_url = Self::make_play(partial, &token);
        let classified = MediaType::classify(&play_url);
        SourceOutcome::Direct {
            // dood serves progressive mp4 behind extension-less paths
            media_type: if classified == MediaType::Unknown {
                MediaType::Mp4
            } else {
                classified
            },
            url: play_url,
            headers: Some(HashMap::from([(
                "Referer".to_string(),
                format!("{origin}/"),
            )])),
            provider: self.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_md5_path_and_token_are_extracted() {
        let source = DoodSource::new(&FetchConfig::default()).unwrap();
        let body = r#"$.get('/pass_md5/b8120aa-171/xkxpkzjeqq', function(data) { makePlay(data); });"#;
        let caps = source.pass_re.captures(body).unwrap();
        assert_eq!(&caps[1], "/pass_md5/b8120aa-171/xkxpkzjeqq");
        assert_eq!(&caps[2], "xkxpkzjeqq");
    }

    #[test]
    fn make_play_appends_token_and_expiry() {
        let url = DoodSource::make_play("https://c1.dood.video/abc~", "tok123");
        assert!(url.starts_with("https://c1.dood.video/abc~"));
        assert!(url.contains("?token=tok123&expiry="));
        // 10 random chars between the partial and the query
        let suffix = url
            .strip_prefix("https://c1.dood.video/abc~")
            .unwrap()
            .split('?')
            .next()
            .unwrap();
        assert_eq!(suffix.len(), 10);
    }
}
