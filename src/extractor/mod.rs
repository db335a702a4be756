use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::common::{FetchConfig, url_origin};
use crate::resolver::outcome::{MediaType, SourceOutcome};
use crate::sources::scan;

/// Generic fallback used when no adapter matched or the matched adapter
/// failed. Trait seam so the pipeline's fallback contract stays testable
/// without network access.
#[async_trait]
pub trait MasterExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> SourceOutcome;
}

/// Crawls an embed/aggregator page for a master-manifest reference:
/// the page may *be* the manifest, carry one in inline scripts (packed or
/// not), or nest one more embed page, which is followed exactly one level.
pub struct EmbedExtractor {
    client: Client,
}

/// A page fetch that never produced a body. Timeouts are kept apart so
/// the caller can report them as such.
enum FetchFailure {
    Timeout,
    Upstream(String),
}

impl EmbedExtractor {
    pub fn new(fetch: &FetchConfig) -> Result<Self, String> {
        Ok(Self {
            client: fetch.client().map_err(|e| e.to_string())?,
        })
    }

    async fn fetch_page(&self, url: &str) -> Result<(String, String), FetchFailure> {
        let referer = url_origin(url)
            .map(|o| format!("{o}/"))
            .unwrap_or_else(|| url.to_string());

        let response = self
            .client
            .get(url)
            .header("Referer", referer)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchFailure::Timeout
                } else {
                    FetchFailure::Upstream(format!("fetch failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(FetchFailure::Upstream(format!("status {}", response.status())));
        }

        // redirects may land on the manifest itself; keep the final URL
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Timeout
            } else {
                FetchFailure::Upstream(format!("body read failed: {e}"))
            }
        })?;
        Ok((final_url, body))
    }

    fn manifest_headers(url: &str) -> Option<HashMap<String, String>> {
        url_origin(url).map(|origin| {
            HashMap::from([
                ("Referer".to_string(), format!("{origin}/")),
                ("Origin".to_string(), origin),
            ])
        })
    }

    /// The crawl: at most the target page plus one followed embed level.
    async fn crawl(&self, url: &str) -> SourceOutcome {
        let mut current = url.to_string();

        for depth in 0..2 {
            let (final_url, body) = match self.fetch_page(&current).await {
                Ok(page) => page,
                Err(FetchFailure::Timeout) => {
                    return SourceOutcome::Unreachable {
                        reason: format!("{current}: timed out"),
                        timed_out: true,
                    };
                }
                Err(FetchFailure::Upstream(reason)) => {
                    return SourceOutcome::Unreachable {
                        reason: format!("{current}: {reason}"),
                        timed_out: false,
                    };
                }
            };

            if body.trim_start().starts_with("#EXTM3U") {
                return SourceOutcome::Direct {
                    headers: Self::manifest_headers(&final_url),
                    url: final_url,
                    media_type: MediaType::M3u8,
                    provider: "extracted".to_string(),
                };
            }

            let searchable = scan::with_unpacked_scripts(&body);
            if let Some(found) = scan::find_quoted_media(&searchable)
                .or_else(|| scan::find_jwplayer_file(&searchable))
            {
                return SourceOutcome::Direct {
                    media_type: MediaType::classify(&found),
                    headers: Self::manifest_headers(&found),
                    url: found,
                    provider: "extracted".to_string(),
                };
            }

            if let Some(nested) = scan::find_iframe_src(&searchable) {
                let nested = absolutize(&nested, &final_url);
                if depth == 0 {
                    debug!("following nested embed: {}", nested);
                    current = nested;
                    continue;
                }
                // depth exhausted: hand the embed page back for framing
                return SourceOutcome::Iframe { url: nested };
            }

            break;
        }

        SourceOutcome::Error {
            reason: format!("no manifest reference found in {current}"),
        }
    }
}

#[async_trait]
impl MasterExtractor for EmbedExtractor {
    async fn extract(&self, url: &str) -> SourceOutcome {
        self.crawl(url).await
    }
}

/// Resolves scheme-relative and path-relative references against the page
/// they were found on.
fn absolutize(reference: &str, page_url: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }
    if let Some(rest) = reference.strip_prefix("//") {
        return format!("https://{rest}");
    }
    match url_origin(page_url) {
        Some(origin) if reference.starts_with('/') => format!("{origin}{reference}"),
        Some(_) => {
            let base = match page_url.rfind('/') {
                // never truncate into the scheme's "//"
                Some(idx) if idx > 8 => &page_url[..=idx],
                _ => page_url,
            };
            format!("{base}{reference}")
        }
        None => reference.to_string(),
    }
}
