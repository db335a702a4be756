use regex::{Captures, Regex};

use crate::common::ResolveError;

/// Canonical form of a resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionTarget {
    Movie {
        id: u64,
    },
    Episode {
        show_id: u64,
        season: u32,
        episode: u32,
    },
    ProviderUrl {
        url: String,
    },
}

/// Embed template the `vidmoly:<slug>` shorthand is rewritten into.
const VIDMOLY_EMBED_TEMPLATE: &str = "https://vidmoly.net/embed-{slug}.html";

type Builder = fn(&Captures) -> Option<ResolutionTarget>;

struct Rule {
    pattern: Regex,
    build: Builder,
}

/// Parses raw caller input into a [`ResolutionTarget`].
///
/// The grammar is an explicit ordered rule list; the first matching rule
/// wins and the order is part of the contract, so malformed inputs like
/// `"1-2-3-4"` fail deterministically instead of picking an arbitrary
/// partial interpretation.
pub struct Normalizer {
    rules: Vec<Rule>,
}

impl Normalizer {
    pub fn new() -> Self {
        let rules: Vec<Rule> = vec![
            // 1. pure digits: movie by numeric id
            Rule {
                pattern: Regex::new(r"^(\d+)$").unwrap(),
                build: |caps| {
                    let id = caps[1].parse().ok()?;
                    Some(ResolutionTarget::Movie { id })
                },
            },
            // 2. (tv:)?id-season-episode, separators -, / and : mix freely
            Rule {
                pattern: Regex::new(r"^(?:tv:)?(\d+)[-/:](\d+)[-/:](\d+)$").unwrap(),
                build: build_episode,
            },
            // 3. movie:<id>
            Rule {
                pattern: Regex::new(r"^movie:(\d+)$").unwrap(),
                build: |caps| {
                    let id = caps[1].parse().ok()?;
                    Some(ResolutionTarget::Movie { id })
                },
            },
            // 4. tmdb:(tv:)?id(-season)?(-episode)? — movie unless all three
            //    numbers are present
            Rule {
                pattern: Regex::new(r"^tmdb:(?:tv:)?(\d+)(?:[-/:](\d+))?(?:[-/:](\d+))?$")
                    .unwrap(),
                build: |caps| {
                    if caps.get(2).is_some() && caps.get(3).is_some() {
                        build_episode(caps)
                    } else {
                        let id = caps[1].parse().ok()?;
                        Some(ResolutionTarget::Movie { id })
                    }
                },
            },
            // 5. vidmoly:<slug> shorthand → canonical embed URL
            Rule {
                pattern: Regex::new(r"^vidmoly:([a-z0-9]+)$").unwrap(),
                build: |caps| {
                    Some(ResolutionTarget::ProviderUrl {
                        url: VIDMOLY_EMBED_TEMPLATE.replace("{slug}", &caps[1]),
                    })
                },
            },
        ];

        Self { rules }
    }

    pub fn normalize(&self, raw: &str) -> Result<ResolutionTarget, ResolveError> {
        let trimmed = raw.trim();
        let input = trimmed.to_ascii_lowercase();

        for rule in &self.rules {
            if let Some(caps) = rule.pattern.captures(&input) {
                if let Some(target) = (rule.build)(&caps) {
                    return Ok(target);
                }
            }
        }

        // 6. an absolute URL passes through untouched (original casing —
        //    provider paths are case-sensitive)
        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(ResolutionTarget::ProviderUrl {
                url: trimmed.to_string(),
            });
        }

        Err(ResolveError::InvalidIdentifier(trimmed.to_string()))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn build_episode(caps: &Captures) -> Option<ResolutionTarget> {
    Some(ResolutionTarget::Episode {
        show_id: caps[1].parse().ok()?,
        season: caps[2].parse().ok()?,
        episode: caps[3].parse().ok()?,
    })
}
