use serde::{Deserialize, Serialize};

/// Enable flags for the provider adapters. All on by default; disabling one
/// removes it from the registry but keeps its host fragments allow-listed,
/// so matching URLs still reach the fallback extractor.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "enabled")]
    pub vidmoly: bool,
    #[serde(default = "enabled")]
    pub streamwish: bool,
    #[serde(default = "enabled")]
    pub dood: bool,
    #[serde(default = "enabled")]
    pub mixdrop: bool,
    #[serde(default = "enabled")]
    pub lulu: bool,
    #[serde(default = "enabled")]
    pub bunny: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            vidmoly: true,
            streamwish: true,
            dood: true,
            mixdrop: true,
            lulu: true,
            bunny: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Templates the embed catalog collaborator uses to turn catalog identifiers
/// (movie/episode) into provider embed URLs. `{id}`, `{season}` and
/// `{episode}` are substituted.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CatalogConfig {
    pub movie_template: String,
    pub episode_template: String,
}
