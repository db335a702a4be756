use async_trait::async_trait;

use crate::configs::CatalogConfig;
use crate::resolver::target::ResolutionTarget;

/// Collaborator seam: turns catalog identifiers (movie/episode) into a
/// provider embed URL that is fed back through normalization. The resolver
/// core never performs catalog metadata lookups itself.
#[async_trait]
pub trait EmbedCatalog: Send + Sync {
    async fn embed_url(&self, target: &ResolutionTarget) -> Option<String>;
}

/// Formats configured URL templates. Sufficient for embed players whose
/// paths are derived from the catalog id alone.
pub struct TemplateCatalog {
    movie_template: String,
    episode_template: String,
}

impl TemplateCatalog {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            movie_template: config.movie_template.clone(),
            episode_template: config.episode_template.clone(),
        }
    }
}

#[async_trait]
impl EmbedCatalog for TemplateCatalog {
    async fn embed_url(&self, target: &ResolutionTarget) -> Option<String> {
        match target {
            ResolutionTarget::Movie { id } => {
                Some(self.movie_template.replace("{id}", &id.to_string()))
            }
            ResolutionTarget::Episode {
                show_id,
                season,
                episode,
            } => Some(
                self.episode_template
                    .replace("{id}", &show_id.to_string())
                    .replace("{season}", &season.to_string())
                    .replace("{episode}", &episode.to_string()),
            ),
            ResolutionTarget::ProviderUrl { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::new(&CatalogConfig {
            movie_template: "https://player.example.com/movie/{id}".into(),
            episode_template: "https://player.example.com/tv/{id}/{season}/{episode}".into(),
        })
    }

    #[tokio::test]
    async fn movie_template_substitution() {
        let url = catalog()
            .embed_url(&ResolutionTarget::Movie { id: 157336 })
            .await;
        assert_eq!(
            url.as_deref(),
            Some("https://player.example.com/movie/157336")
        );
    }

    #[tokio::test]
    async fn episode_template_substitution() {
        let url = catalog()
            .embed_url(&ResolutionTarget::Episode {
                show_id: 66732,
                season: 1,
                episode: 1,
            })
            .await;
        assert_eq!(
            url.as_deref(),
            Some("https://player.example.com/tv/66732/1/1")
        );
    }

    #[tokio::test]
    async fn provider_urls_need_no_catalog() {
        let url = catalog()
            .embed_url(&ResolutionTarget::ProviderUrl {
                url: "https://vidmoly.net/embed-a.html".into(),
            })
            .await;
        assert_eq!(url, None);
    }
}
