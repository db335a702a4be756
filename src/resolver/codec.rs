use base64::prelude::*;

/// Reversible-transform detector/decoder for obfuscated link payloads.
///
/// The concrete transform is a versioned agreement with upstream services,
/// so it lives behind this trait and can be swapped without touching the
/// pipeline.
pub trait ObfuscationCodec: Send + Sync {
    /// Cheap structural check; must never attempt a full decode.
    fn is_obfuscated(&self, raw: &str) -> bool;

    /// Reverse transform. Returns `None` on malformed input, never panics.
    fn decode(&self, raw: &str) -> Option<String>;
}

/// Current upstream scheme: the payload is base64 of the target URL,
/// usually written backwards first to defeat naive hot-link scanners.
pub struct ReversedBase64Codec;

impl ObfuscationCodec for ReversedBase64Codec {
    fn is_obfuscated(&self, raw: &str) -> bool {
        if raw.len() < 20 {
            return false;
        }
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return false;
        }
        raw.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/' || b == b'=')
    }

    fn decode(&self, raw: &str) -> Option<String> {
        let bytes = BASE64_STANDARD.decode(raw).ok()?;
        let decoded = String::from_utf8(bytes).ok()?;

        let reversed: String = decoded.chars().rev().collect();
        if reversed.starts_with("http://") || reversed.starts_with("https://") {
            return Some(reversed);
        }
        if decoded.starts_with("http://") || decoded.starts_with("https://") {
            return Some(decoded);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_reversed(url: &str) -> String {
        let reversed: String = url.chars().rev().collect();
        BASE64_STANDARD.encode(reversed)
    }

    #[test]
    fn detects_base64_shaped_payloads_only() {
        let codec = ReversedBase64Codec;
        assert!(codec.is_obfuscated(&encode_reversed("https://cdn.example.com/v/master.m3u8")));
        // plain URLs are identifiers, not payloads
        assert!(!codec.is_obfuscated("https://vidmoly.net/embed-abc.html"));
        // too short to be a wrapped URL
        assert!(!codec.is_obfuscated("aGk="));
        // characters outside the base64 alphabet
        assert!(!codec.is_obfuscated("tv:66732-1-1 extra padding here"));
    }

    #[test]
    fn decodes_reversed_payload() {
        let codec = ReversedBase64Codec;
        let url = "https://cdn.example.com/v/master.m3u8";
        assert_eq!(codec.decode(&encode_reversed(url)).as_deref(), Some(url));
    }

    #[test]
    fn decodes_plain_payload() {
        let codec = ReversedBase64Codec;
        let url = "https://cdn.example.com/clip.mp4";
        let encoded = BASE64_STANDARD.encode(url);
        assert_eq!(codec.decode(&encoded).as_deref(), Some(url));
    }

    #[test]
    fn malformed_payloads_decode_to_none() {
        let codec = ReversedBase64Codec;
        // invalid base64
        assert_eq!(codec.decode("!!!not base64!!!"), None);
        // valid base64 of something that is not a URL either way round
        assert_eq!(codec.decode(&BASE64_STANDARD.encode("hello world")), None);
    }

    #[test]
    fn decode_then_detect_is_idempotent() {
        let codec = ReversedBase64Codec;
        let decoded = codec
            .decode(&encode_reversed("https://cdn.example.com/v/master.m3u8"))
            .unwrap();
        assert!(!codec.is_obfuscated(&decoded));
    }
}
