use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Media container/manifest kind, classified from a URL's path suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    M3u8,
    Mp4,
    Unknown,
}

impl MediaType {
    pub fn classify(url: &str) -> Self {
        // query strings routinely trail the extension, so substring match
        if url.contains(".m3u8") {
            Self::M3u8
        } else if url.contains(".mp4") {
            Self::Mp4
        } else {
            Self::Unknown
        }
    }
}

/// Result of a single adapter or extractor attempt. Exactly one variant.
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    /// A final media URL plus the request headers playback must send.
    Direct {
        url: String,
        media_type: MediaType,
        headers: Option<HashMap<String, String>>,
        provider: String,
    },
    /// An embed page that could not be reduced further; the caller has to
    /// frame it.
    Iframe { url: String },
    /// The upstream page could not be fetched: non-2xx status, network
    /// failure or a missed deadline (`timed_out`).
    Unreachable { reason: String, timed_out: bool },
    /// The page was fetched but lacked the expected fields. Triggers
    /// fallback when an adapter reports it, terminal when the extractor
    /// does.
    Error { reason: String },
}

/// Uniform response unit of the resolve endpoint, whichever path produced
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    pub direct: bool,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub url: String,
    pub original_url: String,
    /// Provider label, `"decoded"` or `"extracted"`.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
}

impl SourceDescriptor {
    /// Descriptor for an obfuscated payload whose decode revealed the
    /// final media URL.
    pub fn decoded(url: String) -> Self {
        Self {
            direct: true,
            media_type: MediaType::classify(&url),
            original_url: url.clone(),
            url,
            source: "decoded".to_string(),
            headers: None,
        }
    }

    /// Descriptor for a terminal outcome produced against `original_url`.
    /// Failure outcomes are handled by the caller and must not reach this.
    pub fn from_outcome(outcome: SourceOutcome, original_url: &str) -> Self {
        match outcome {
            SourceOutcome::Direct {
                url,
                media_type,
                headers,
                provider,
            } => Self {
                direct: true,
                media_type,
                url,
                original_url: original_url.to_string(),
                source: provider,
                headers,
            },
            SourceOutcome::Iframe { url } => Self {
                direct: false,
                media_type: MediaType::Unknown,
                url,
                original_url: original_url.to_string(),
                source: "extracted".to_string(),
                headers: None,
            },
            SourceOutcome::Error { reason }
            | SourceOutcome::Unreachable { reason, .. } => Self {
                direct: false,
                media_type: MediaType::Unknown,
                url: String::new(),
                original_url: original_url.to_string(),
                source: reason,
                headers: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_by_suffix() {
        assert_eq!(
            MediaType::classify("https://cdn.x.com/v/master.m3u8?token=1"),
            MediaType::M3u8
        );
        assert_eq!(MediaType::classify("https://cdn.x.com/clip.mp4"), MediaType::Mp4);
        assert_eq!(
            MediaType::classify("https://cdn.x.com/stream/abcdef"),
            MediaType::Unknown
        );
    }

    #[test]
    fn descriptor_serializes_to_the_wire_contract() {
        let descriptor = SourceDescriptor::decoded("https://cdn.x.com/v/master.m3u8".into());
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["direct"], true);
        assert_eq!(json["type"], "m3u8");
        assert_eq!(json["source"], "decoded");
        assert_eq!(json["originalUrl"], "https://cdn.x.com/v/master.m3u8");
        assert!(json.get("headers").is_none());
    }

    #[test]
    fn iframe_outcome_is_not_direct() {
        let descriptor = SourceDescriptor::from_outcome(
            SourceOutcome::Iframe {
                url: "https://host.example/e/xyz".into(),
            },
            "https://origin.example/page",
        );
        assert!(!descriptor.direct);
        assert_eq!(descriptor.media_type, MediaType::Unknown);
        assert_eq!(descriptor.source, "extracted");
        assert_eq!(descriptor.original_url, "https://origin.example/page");
    }
}
