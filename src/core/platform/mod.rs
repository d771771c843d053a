// ─── Platform Clients ───
// CurseForge and Modrinth REST clients behind one async trait.

pub mod curseforge;
pub mod modrinth;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::loader::ModLoader;

pub use curseforge::CurseforgeClient;
pub use modrinth::ModrinthClient;

/// A project page on a modding platform.
#[derive(Debug, Clone)]
pub struct RemoteProject {
    pub platform: &'static str,
    pub id: String,
    pub slug: String,
    pub display_name: String,
}

/// A downloadable build belonging to a project.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub file_id: String,
    pub file_name: String,
    /// Version string as reported by the platform, or derived from the file
    /// name when the platform does not publish one.
    pub version: String,
    pub game_versions: Vec<String>,
    /// Some CurseForge files do not expose a download URL.
    pub download_url: Option<String>,
    pub released_at: DateTime<Utc>,
    pub sha1: Option<String>,
}

/// One modding platform's lookup surface.
#[async_trait]
pub trait ModPlatform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Exact slug lookup. Empty result means "no such project".
    async fn search_by_slug(
        &self,
        slug: &str,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteProject>>;

    /// Free-text search.
    async fn search(
        &self,
        query: &str,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteProject>>;

    /// File listing for a matched project.
    async fn project_files(
        &self,
        project: &RemoteProject,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteFile>>;
}

/// Classify a reqwest send error: timeouts and connection failures are
/// per-mod recoverable `ApiUnavailable`.
pub(crate) fn map_send_error(platform: &'static str, err: reqwest::Error) -> UpdaterError {
    if err.is_timeout() || err.is_connect() {
        UpdaterError::ApiUnavailable {
            platform,
            detail: err.to_string(),
        }
    } else {
        UpdaterError::Http(err)
    }
}

/// Map non-success statuses to the error taxonomy: 401/403 become
/// `AuthRequired`, everything else `ApiUnavailable`.
pub(crate) fn check_status(
    platform: &'static str,
    response: reqwest::Response,
) -> UpdaterResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(UpdaterError::AuthRequired { platform });
    }
    Err(UpdaterError::ApiUnavailable {
        platform,
        detail: format!("HTTP {}", status),
    })
}
