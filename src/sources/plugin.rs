use async_trait::async_trait;

use crate::resolver::outcome::SourceOutcome;

/// Trait every provider adapter implements.
///
/// The adapter set is closed and ordered; adding a provider means adding a
/// module here and registering it, never touching the routing logic.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Provider label (e.g. "vidmoly", "dood"), also the `source` field of
    /// successful descriptors.
    fn name(&self) -> &str;

    /// Whether this adapter handles the given provider URL.
    fn matches(&self, url: &str) -> bool;

    /// Fetch the provider's page/API and extract a final media URL.
    ///
    /// Must return `SourceOutcome::Error` on upstream failure, missing
    /// fields or timeout — never panic. No retries: a failed provider is
    /// reported once and the router falls back.
    async fn resolve(&self, url: &str) -> SourceOutcome;
}

pub type BoxedAdapter = Box<dyn ProviderAdapter>;

/// Case-insensitive host-fragment match shared by the adapters.
pub fn contains_fragment(url: &str, fragments: &[&str]) -> bool {
    let lower = url.to_ascii_lowercase();
    fragments.iter().any(|f| lower.contains(f))
}
