use std::sync::OnceLock;

use regex::Regex;

use crate::sources::unpacker::unpack;

fn jwplayer_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"file\s*:\s*["']([^"']+)["']"#).unwrap())
}

fn quoted_m3u8_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["'](https?://[^"']+\.m3u8[^"']*)["']"#).unwrap())
}

fn quoted_mp4_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["'](https?://[^"']+\.mp4[^"']*)["']"#).unwrap())
}

fn iframe_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"<iframe[^>]+src=["']([^"']+)["']"#).unwrap())
}

/// `file: "…"` entry of an inline jwplayer `sources` block.
pub fn find_jwplayer_file(body: &str) -> Option<String> {
    jwplayer_file_re()
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// First quoted absolute media URL in the body, manifests before
/// progressive files.
pub fn find_quoted_media(body: &str) -> Option<String> {
    quoted_m3u8_re()
        .captures(body)
        .or_else(|| quoted_mp4_re().captures(body))
        .map(|caps| caps[1].to_string())
}

/// `src` of the first iframe, for embed pages that nest another player.
pub fn find_iframe_src(body: &str) -> Option<String> {
    iframe_src_re()
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// Body with every packed script blob replaced by its unpacked form
/// appended, so the media-URL scans see through the obfuscation layer.
pub fn with_unpacked_scripts(body: &str) -> String {
    match unpack(body) {
        Some(unpacked) => format!("{}\n{}", body, unpacked),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwplayer_file_entry() {
        let body = r#"jwplayer("vplayer").setup({sources: [{file:"https://s1.example.com/hls/,x,.urlset/master.m3u8"}], image: "poster.jpg"});"#;
        assert_eq!(
            find_jwplayer_file(body).as_deref(),
            Some("https://s1.example.com/hls/,x,.urlset/master.m3u8")
        );
        assert_eq!(find_jwplayer_file("<html>no player</html>"), None);
    }

    #[test]
    fn manifests_win_over_progressive_files() {
        let body = r#"
            var fallback = 'https://cdn.example.com/v.mp4';
            var hls = "https://cdn.example.com/v/master.m3u8?t=1";
        "#;
        assert_eq!(
            find_quoted_media(body).as_deref(),
            Some("https://cdn.example.com/v/master.m3u8?t=1")
        );
    }

    #[test]
    fn mp4_found_when_no_manifest_present() {
        let body = r#"<source src="https://cdn.example.com/clip.mp4" type="video/mp4">"#;
        assert_eq!(
            find_quoted_media(body).as_deref(),
            Some("https://cdn.example.com/clip.mp4")
        );
    }

    #[test]
    fn iframe_source() {
        let body = r#"<iframe width="100%" src="https://inner.example.com/e/abc" allowfullscreen></iframe>"#;
        assert_eq!(
            find_iframe_src(body).as_deref(),
            Some("https://inner.example.com/e/abc")
        );
    }
}
