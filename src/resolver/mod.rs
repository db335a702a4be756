pub mod catalog;
pub mod codec;
pub mod outcome;
pub mod ratelimit;
pub mod target;

use tracing::debug;

use crate::common::{AnyResult, FetchConfig, ResolveError};
use crate::configs::Config;
use crate::extractor::{EmbedExtractor, MasterExtractor};
use crate::sources::AdapterRegistry;

use catalog::{EmbedCatalog, TemplateCatalog};
use codec::{ObfuscationCodec, ReversedBase64Codec};
use outcome::{SourceDescriptor, SourceOutcome};
use ratelimit::{Permissive, RateLimiter, TokenBucket};
use target::{Normalizer, ResolutionTarget};

/// The resolution pipeline. Stateless between requests; a request walks
/// codec → normalizer → router → adapter, falling back to the extractor,
/// and every step short-circuits.
pub struct Resolver {
    normalizer: Normalizer,
    codec: Box<dyn ObfuscationCodec>,
    registry: AdapterRegistry,
    extractor: Box<dyn MasterExtractor>,
    catalog: Option<Box<dyn EmbedCatalog>>,
    limiter: Box<dyn RateLimiter>,
}

impl Resolver {
    pub fn new(config: &Config) -> AnyResult<Self> {
        let fetch = FetchConfig::from_config(&config.fetch);

        let limiter: Box<dyn RateLimiter> = if config.rate_limit.enabled {
            Box::new(TokenBucket::new(&config.rate_limit))
        } else {
            Box::new(Permissive)
        };

        Ok(Self {
            normalizer: Normalizer::new(),
            codec: Box::new(ReversedBase64Codec),
            registry: AdapterRegistry::new(config),
            extractor: Box::new(EmbedExtractor::new(&fetch)?),
            catalog: config
                .catalog
                .as_ref()
                .map(|c| Box::new(TemplateCatalog::new(c)) as Box<dyn EmbedCatalog>),
            limiter,
        })
    }

    pub async fn resolve(
        &self,
        raw: &str,
        client_id: &str,
    ) -> Result<SourceDescriptor, ResolveError> {
        // An obfuscated payload is not an identifier, it already is the
        // answer — the codec check precedes everything else.
        if self.codec.is_obfuscated(raw) {
            if let Some(decoded) = self.codec.decode(raw) {
                debug!("decoded obfuscated payload to {}", decoded);
                return Ok(SourceDescriptor::decoded(decoded));
            }
            debug!("payload looked obfuscated but did not decode; treating as identifier");
        }

        let mut target = self.normalizer.normalize(raw)?;

        // Catalog identifiers (movie/episode) have no provider URL yet; the
        // catalog collaborator supplies one, fed back through normalization.
        if !matches!(target, ResolutionTarget::ProviderUrl { .. }) {
            let Some(catalog) = &self.catalog else {
                debug!("no embed catalog configured for {:?}", target);
                return Err(ResolveError::NoSourceFound(raw.trim().to_string()));
            };
            let Some(embed_url) = catalog.embed_url(&target).await else {
                return Err(ResolveError::NoSourceFound(raw.trim().to_string()));
            };
            target = self.normalizer.normalize(&embed_url)?;
        }

        let eligible = self.registry.is_direct_eligible(&target);
        let ResolutionTarget::ProviderUrl { url } = target else {
            return Err(ResolveError::NoSourceFound(raw.trim().to_string()));
        };

        if eligible {
            if let Some(adapter) = self.registry.find(&url) {
                if !self.limiter.check(client_id, adapter.name()) {
                    return Err(ResolveError::RateLimited(adapter.name().to_string()));
                }
                match adapter.resolve(&url).await {
                    outcome @ SourceOutcome::Direct { .. } => {
                        return Ok(SourceDescriptor::from_outcome(outcome, &url));
                    }
                    SourceOutcome::Iframe { url: nested } => {
                        debug!(
                            "adapter {} handed back an iframe ({}); falling back",
                            adapter.name(),
                            nested
                        );
                    }
                    SourceOutcome::Error { reason }
                    | SourceOutcome::Unreachable { reason, .. } => {
                        debug!("adapter {} failed: {}; falling back", adapter.name(), reason);
                    }
                }
            }
        }

        if !self.limiter.check(client_id, "extract") {
            return Err(ResolveError::RateLimited("extract".to_string()));
        }

        match self.extractor.extract(&url).await {
            outcome @ (SourceOutcome::Direct { .. } | SourceOutcome::Iframe { .. }) => {
                Ok(SourceDescriptor::from_outcome(outcome, &url))
            }
            SourceOutcome::Unreachable { reason, timed_out } => {
                debug!("extraction could not reach upstream: {}", reason);
                if timed_out {
                    Err(ResolveError::Timeout)
                } else {
                    Err(ResolveError::UpstreamUnavailable(reason))
                }
            }
            SourceOutcome::Error { reason } => {
                debug!("extraction failed: {}", reason);
                Err(ResolveError::NoSourceFound(url))
            }
        }
    }

    pub fn adapter_names(&self) -> Vec<String> {
        self.registry.adapter_names()
    }
}
