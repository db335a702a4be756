use crate::common::FetchConfig;
use crate::configs::Config;
use crate::resolver::target::ResolutionTarget;

use super::{
  bunny::BunnySource,
  dood::DoodSource,
  lulu::LuluSource,
  mixdrop::MixdropSource,
  plugin::BoxedAdapter,
  streamwish::StreamWishSource,
  vidmoly::VidmolySource,
};

/// Host fragments of services with a stable, scrapeable direct-link
/// pattern. Deliberately coarse substrings: these providers rotate mirror
/// domains and CDN edges constantly.
pub const DIRECT_HOST_FRAGMENTS: &[&str] = &[
  "vidmoly",
  "streamwish",
  "strwish",
  "swish",
  "dood",
  "d0000d",
  "ds2play",
  "mixdrop",
  "lulu",
  "workers.dev",
  "bunny",
];

/// Closed, ordered set of provider adapters; the first adapter whose
/// `matches` accepts a URL handles it.
pub struct AdapterRegistry {
  pub adapters: Vec<BoxedAdapter>,
}

impl AdapterRegistry {
  pub fn new(config: &Config) -> Self {
    let fetch = FetchConfig::from_config(&config.fetch);
    let mut adapters: Vec<BoxedAdapter> = Vec::new();

    macro_rules! register_source {
      ($enabled:expr, $name:literal, $ctor:expr) => {
        if $enabled {
          match $ctor {
            Ok(src) => {
              tracing::info!("Loaded source: {}", $name);
              adapters.push(Box::new(src));
            }
            Err(e) => {
              tracing::error!("{} source failed to initialize: {}", $name, e);
            }
          }
        }
      };
    }

    register_source!(config.sources.vidmoly, "Vidmoly", VidmolySource::new(&fetch));
    register_source!(
      config.sources.streamwish,
      "StreamWish",
      StreamWishSource::new(&fetch)
    );
    register_source!(config.sources.dood, "DoodStream", DoodSource::new(&fetch));
    register_source!(config.sources.mixdrop, "MixDrop", MixdropSource::new(&fetch));
    register_source!(config.sources.lulu, "Lulustream", LuluSource::new(&fetch));
    register_source!(config.sources.bunny, "Bunny", BunnySource::new(&fetch));

    Self { adapters }
  }

  #[cfg(test)]
  pub(crate) fn from_adapters(adapters: Vec<BoxedAdapter>) -> Self {
    Self { adapters }
  }

  /// Whether a target may be attempted by a direct adapter at all.
  /// Movie/Episode targets never are; the catalog collaborator has to turn
  /// them into a provider URL first.
  pub fn is_direct_eligible(&self, target: &ResolutionTarget) -> bool {
    match target {
      ResolutionTarget::ProviderUrl { url } => {
        let lower = url.to_ascii_lowercase();
        DIRECT_HOST_FRAGMENTS.iter().any(|f| lower.contains(f))
      }
      _ => false,
    }
  }

  /// First adapter claiming the URL, registration order.
  pub fn find(&self, url: &str) -> Option<&BoxedAdapter> {
    self.adapters.iter().find(|a| a.matches(url))
  }

  pub fn adapter_names(&self) -> Vec<String> {
    self.adapters.iter().map(|a| a.name().to_string()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> AdapterRegistry {
    AdapterRegistry::new(&Config::default())
  }

  fn provider_url(url: &str) -> ResolutionTarget {
    ResolutionTarget::ProviderUrl {
      url: url.to_string(),
    }
  }

  #[test]
  fn all_adapters_register_by_default() {
    assert_eq!(
      registry().adapter_names(),
      vec!["vidmoly", "streamwish", "dood", "mixdrop", "lulu", "bunny"]
    );
  }

  #[test]
  fn eligibility_is_case_insensitive_substring_match() {
    let registry = registry();
    assert!(registry.is_direct_eligible(&provider_url(
      "https://VIDMOLY.net/embed-abc123.html"
    )));
    assert!(registry.is_direct_eligible(&provider_url(
      "https://edge-7.relay.workers.dev/v/abc/master.m3u8"
    )));
    assert!(registry.is_direct_eligible(&provider_url(
      "https://d0000d.com/e/xyz?autoplay=1"
    )));
    assert!(!registry.is_direct_eligible(&provider_url(
      "https://player.example.com/movie/157336"
    )));
  }

  #[test]
  fn catalog_targets_are_never_direct_eligible() {
    let registry = registry();
    assert!(!registry.is_direct_eligible(&ResolutionTarget::Movie { id: 157336 }));
    assert!(!registry.is_direct_eligible(&ResolutionTarget::Episode {
      show_id: 66732,
      season: 1,
      episode: 1,
    }));
  }

  #[test]
  fn first_matching_adapter_wins() {
    let registry = registry();
    let adapter = registry.find("https://ds2play.com/d/abc").unwrap();
    assert_eq!(adapter.name(), "dood");
    assert!(registry.find("https://example.com/video").is_none());
  }

  #[test]
  fn every_allow_listed_fragment_has_an_adapter() {
    // eligibility without a claiming adapter would dead-end the direct path
    let registry = registry();
    for fragment in DIRECT_HOST_FRAGMENTS {
      let url = format!("https://{fragment}/embed/x");
      assert!(
        registry.find(&url).is_some(),
        "no adapter claims {fragment}"
      );
    }
  }
}
