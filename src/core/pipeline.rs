// ─── Pipeline ───
// Drives scan results through match -> resolve with bounded concurrency.
// Lookups overlap, but `buffered` keeps results in scan order, so the report
// order never depends on which request finished first.

use futures_util::stream::{self, StreamExt};
use tracing::warn;

use crate::core::error::UpdaterError;
use crate::core::loader::ModLoader;
use crate::core::matcher::{Matched, Matcher};
use crate::core::report::MatchResult;
use crate::core::resolver::{self, Resolution};
use crate::core::scanner::LocalMod;

pub const DEFAULT_CONCURRENCY: usize = 4;

pub struct Pipeline {
    matcher: Matcher,
    loader: Option<ModLoader>,
    concurrency: usize,
}

impl Pipeline {
    pub fn new(matcher: Matcher, loader: Option<ModLoader>) -> Self {
        Self {
            matcher,
            loader,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    /// Check every scanned mod against the platforms. One `MatchResult` per
    /// input mod, in input order; per-mod errors are folded into the result
    /// instead of aborting the run.
    pub async fn check(&self, mods: Vec<LocalMod>, target_version: &str) -> Vec<MatchResult> {
        stream::iter(mods)
            .map(|local| self.check_one(local, target_version))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn check_one(&self, local: LocalMod, target_version: &str) -> MatchResult {
        match self.matcher.match_mod(&local, target_version).await {
            Ok(None) => MatchResult::not_found(local),
            Ok(Some(Matched { project, files })) => {
                let resolution = resolver::resolve(
                    files,
                    target_version,
                    local.installed_version.as_deref(),
                    &local.file_name,
                    self.loader,
                );
                match resolution {
                    Resolution::Update(candidate) => {
                        MatchResult::update_available(local, project, candidate)
                    }
                    Resolution::NoUpdateAvailable => MatchResult::up_to_date(local, project),
                }
            }
            Err(UpdaterError::AmbiguousMatch { candidates, .. }) => {
                MatchResult::ambiguous(local, candidates)
            }
            Err(e) => {
                warn!("Check failed for {}: {}", local.file_name, e);
                MatchResult::failed(local, e.to_string())
            }
        }
    }
}
