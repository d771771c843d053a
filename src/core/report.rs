// ─── Report ───
// Per-mod match results and the end-of-run summary.

use crate::core::platform::{RemoteFile, RemoteProject};
use crate::core::scanner::LocalMod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStatus {
    UpdateAvailable,
    UpToDate,
    NotFound,
    Ambiguous { candidates: Vec<String> },
    Failed { reason: String },
}

/// Outcome of the check pipeline for one local mod.
///
/// Invariant: `candidate` is present only when `project` is present and the
/// status is `UpdateAvailable`; the constructors below are the only way these
/// are built.
#[derive(Debug)]
pub struct MatchResult {
    pub local_mod: LocalMod,
    pub project: Option<RemoteProject>,
    pub candidate: Option<RemoteFile>,
    pub status: MatchStatus,
}

impl MatchResult {
    pub fn update_available(
        local_mod: LocalMod,
        project: RemoteProject,
        candidate: RemoteFile,
    ) -> Self {
        Self {
            local_mod,
            project: Some(project),
            candidate: Some(candidate),
            status: MatchStatus::UpdateAvailable,
        }
    }

    pub fn up_to_date(local_mod: LocalMod, project: RemoteProject) -> Self {
        Self {
            local_mod,
            project: Some(project),
            candidate: None,
            status: MatchStatus::UpToDate,
        }
    }

    pub fn not_found(local_mod: LocalMod) -> Self {
        Self {
            local_mod,
            project: None,
            candidate: None,
            status: MatchStatus::NotFound,
        }
    }

    pub fn ambiguous(local_mod: LocalMod, candidates: Vec<String>) -> Self {
        Self {
            local_mod,
            project: None,
            candidate: None,
            status: MatchStatus::Ambiguous { candidates },
        }
    }

    pub fn failed(local_mod: LocalMod, reason: String) -> Self {
        Self {
            local_mod,
            project: None,
            candidate: None,
            status: MatchStatus::Failed { reason },
        }
    }
}

/// Tallies across a whole run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub updates_available: usize,
    pub up_to_date: usize,
    pub not_found: usize,
    pub ambiguous: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn tally(results: &[MatchResult]) -> Self {
        let mut summary = RunSummary::default();
        for result in results {
            match &result.status {
                MatchStatus::UpdateAvailable => summary.updates_available += 1,
                MatchStatus::UpToDate => summary.up_to_date += 1,
                MatchStatus::NotFound => summary.not_found += 1,
                MatchStatus::Ambiguous { .. } => summary.ambiguous += 1,
                MatchStatus::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.updates_available + self.up_to_date + self.not_found + self.ambiguous + self.failed
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} checked: {} update(s) available, {} up to date, {} not found, {} ambiguous, {} failed",
            self.total(),
            self.updates_available,
            self.up_to_date,
            self.not_found,
            self.ambiguous,
            self.failed
        )
    }
}
