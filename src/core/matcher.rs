// ─── Platform Matcher ───
// Resolves a local mod to its remote project, trying CurseForge first and
// falling back to Modrinth when the primary platform is not usable.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::loader::ModLoader;
use crate::core::platform::{ModPlatform, RemoteFile, RemoteProject};
use crate::core::scanner::LocalMod;

/// Minimum slug-to-identifier similarity for a search hit to count.
pub const SIMILARITY_THRESHOLD: f32 = 0.55;

/// A matched project together with its file listing, fetched from the same
/// platform that produced the match.
pub struct Matched {
    pub project: RemoteProject,
    pub files: Vec<RemoteFile>,
}

pub struct Matcher {
    /// Ordered: primary first, fallbacks after.
    platforms: Vec<Arc<dyn ModPlatform>>,
    loader: Option<ModLoader>,
    threshold: f32,
}

impl Matcher {
    pub fn new(platforms: Vec<Arc<dyn ModPlatform>>, loader: Option<ModLoader>) -> Self {
        Self {
            platforms,
            loader,
            threshold: SIMILARITY_THRESHOLD,
        }
    }

    /// Match one local mod against the platforms in order.
    ///
    /// `AuthRequired` and `ApiUnavailable` fall through to the next platform.
    /// `Ok(None)` means every usable platform was consulted and none had the
    /// project; an error is returned only when no platform could be queried
    /// at all (or on a non-recoverable failure such as an ambiguous match).
    pub async fn match_mod(
        &self,
        local: &LocalMod,
        target_version: &str,
    ) -> UpdaterResult<Option<Matched>> {
        let mut last_err: Option<UpdaterError> = None;
        let mut any_lookup_succeeded = false;

        for platform in &self.platforms {
            match self.match_on(platform.as_ref(), local, target_version).await {
                Ok(Some(matched)) => return Ok(Some(matched)),
                Ok(None) => {
                    any_lookup_succeeded = true;
                }
                Err(
                    e @ (UpdaterError::AuthRequired { .. } | UpdaterError::ApiUnavailable { .. }),
                ) => {
                    warn!(
                        "{} lookup for '{}' failed, trying next platform: {}",
                        platform.name(),
                        local.file_name,
                        e
                    );
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match (any_lookup_succeeded, last_err) {
            (false, Some(err)) => Err(err),
            _ => Ok(None),
        }
    }

    async fn match_on(
        &self,
        platform: &dyn ModPlatform,
        local: &LocalMod,
        target_version: &str,
    ) -> UpdaterResult<Option<Matched>> {
        // Exact slug lookup first, free-text search second.
        let mut candidates = platform
            .search_by_slug(&local.identifier, target_version, self.loader)
            .await?;
        if candidates.is_empty() {
            let query = search_query(&local.identifier);
            candidates = platform.search(&query, target_version, self.loader).await?;
        }

        let Some(project) = pick_best_candidate(candidates, &local.identifier, self.threshold)?
        else {
            debug!(
                "{} has no candidate for '{}'",
                platform.name(),
                local.identifier
            );
            return Ok(None);
        };

        let files = platform
            .project_files(&project, target_version, self.loader)
            .await?;
        debug!(
            "Matched '{}' to {}:{} ({} files)",
            local.file_name,
            platform.name(),
            project.slug,
            files.len()
        );
        Ok(Some(Matched { project, files }))
    }
}

/// Free-text query derived from a slug-like identifier.
pub fn search_query(identifier: &str) -> String {
    identifier.replace('-', " ")
}

/// Choose the candidate whose slug is most similar to the identifier.
///
/// Below-threshold bests are discarded; two or more equally-scored bests are
/// an ambiguous match that needs manual resolution.
pub fn pick_best_candidate(
    candidates: Vec<RemoteProject>,
    identifier: &str,
    threshold: f32,
) -> UpdaterResult<Option<RemoteProject>> {
    if candidates.is_empty() {
        return Ok(None);
    }
    if candidates.len() == 1 {
        return Ok(candidates.into_iter().next());
    }

    let mut scored: Vec<(f32, RemoteProject)> = candidates
        .into_iter()
        .map(|c| (similarity_ratio(&c.slug, identifier), c))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let best_score = scored[0].0;
    if best_score < threshold {
        return Ok(None);
    }

    let tied: Vec<&RemoteProject> = scored
        .iter()
        .take_while(|(score, _)| (best_score - score).abs() < 1e-6)
        .map(|(_, c)| c)
        .collect();
    if tied.len() > 1 {
        return Err(UpdaterError::AmbiguousMatch {
            identifier: identifier.to_string(),
            candidates: tied.iter().map(|c| c.slug.clone()).collect(),
        });
    }

    Ok(scored.into_iter().next().map(|(_, c)| c))
}

/// Normalized Levenshtein similarity in `[0, 1]`.
pub fn similarity_ratio(a: &str, b: &str) -> f32 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(a, b);
    1.0 - (distance as f32 / max_len as f32)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    if a_bytes.is_empty() {
        return b_bytes.len();
    }
    if b_bytes.is_empty() {
        return a_bytes.len();
    }

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0; b_bytes.len() + 1];

    for (i, a_ch) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_ch) in b_bytes.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(slug: &str) -> RemoteProject {
        RemoteProject {
            platform: "Test",
            id: slug.to_string(),
            slug: slug.to_string(),
            display_name: slug.to_string(),
        }
    }

    #[test]
    fn similarity_of_identical_strings_is_one() {
        assert_eq!(similarity_ratio("sodium", "sodium"), 1.0);
        assert_eq!(similarity_ratio("", ""), 1.0);
    }

    #[test]
    fn similarity_orders_close_slugs_first() {
        let close = similarity_ratio("iron-chests", "iron-chest");
        let far = similarity_ratio("iron-furnaces", "iron-chest");
        assert!(close > far);
    }

    #[test]
    fn best_candidate_wins_by_slug_similarity() {
        let candidates = vec![project("sodium-extra"), project("sodium")];
        let best = pick_best_candidate(candidates, "sodium", SIMILARITY_THRESHOLD)
            .unwrap()
            .unwrap();
        assert_eq!(best.slug, "sodium");
    }

    #[test]
    fn below_threshold_is_not_found() {
        let candidates = vec![project("totally-unrelated"), project("also-unrelated")];
        let best = pick_best_candidate(candidates, "sodium", SIMILARITY_THRESHOLD).unwrap();
        assert!(best.is_none());
    }

    #[test]
    fn equal_scores_are_ambiguous() {
        // Same length and same distance from the identifier.
        let candidates = vec![project("sodiux"), project("sodiuy")];
        let err = pick_best_candidate(candidates, "sodium", SIMILARITY_THRESHOLD).unwrap_err();
        match err {
            UpdaterError::AmbiguousMatch { candidates, .. } => {
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("expected AmbiguousMatch, got {other:?}"),
        }
    }

    #[test]
    fn single_candidate_is_taken_as_is() {
        let best = pick_best_candidate(vec![project("anything")], "sodium", 0.99)
            .unwrap()
            .unwrap();
        assert_eq!(best.slug, "anything");
    }

    #[test]
    fn query_replaces_dashes_with_spaces() {
        assert_eq!(search_query("iron-chests"), "iron chests");
    }
}
