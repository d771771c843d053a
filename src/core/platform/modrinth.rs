use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{check_status, map_send_error, ModPlatform, RemoteFile, RemoteProject};
use crate::core::error::UpdaterResult;
use crate::core::loader::ModLoader;

const MODRINTH_API_BASE: &str = "https://api.modrinth.com/v2";
const PLATFORM_NAME: &str = "Modrinth";

/// Modrinth REST client. Keyless; the fallback platform when CurseForge is
/// not usable.
pub struct ModrinthClient {
    client: Client,
    base_url: String,
}

impl ModrinthClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: MODRINTH_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn facets(target_version: &str, loader: Option<ModLoader>) -> UpdaterResult<String> {
        let mut groups = vec![
            vec!["project_type:mod".to_string()],
            vec![format!("versions:{target_version}")],
        ];
        if let Some(loader) = loader {
            groups.push(vec![format!("categories:{loader}")]);
        }
        Ok(serde_json::to_string(&groups)?)
    }
}

#[async_trait]
impl ModPlatform for ModrinthClient {
    fn name(&self) -> &'static str {
        PLATFORM_NAME
    }

    async fn search_by_slug(
        &self,
        slug: &str,
        _target_version: &str,
        _loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteProject>> {
        let url = format!("{}/project/{}", self.base_url, slug);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_send_error(PLATFORM_NAME, e))?;

        // An unknown slug is a plain miss, not an error.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!("Modrinth has no project '{}'", slug);
            return Ok(Vec::new());
        }
        let response = check_status(PLATFORM_NAME, response)?;
        let project: ModrinthProject = response.json().await?;
        Ok(vec![project.into()])
    }

    async fn search(
        &self,
        query: &str,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteProject>> {
        let url = format!("{}/search", self.base_url);
        let facets = Self::facets(target_version, loader)?;
        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("facets", facets.as_str())])
            .send()
            .await
            .map_err(|e| map_send_error(PLATFORM_NAME, e))?;
        let response = check_status(PLATFORM_NAME, response)?;
        let result: ModrinthSearchResponse = response.json().await?;
        debug!("Modrinth search '{}': {} hits", query, result.hits.len());
        Ok(result.hits.into_iter().map(RemoteProject::from).collect())
    }

    async fn project_files(
        &self,
        project: &RemoteProject,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteFile>> {
        let url = format!("{}/project/{}/version", self.base_url, project.id);
        let mut params = vec![("game_versions", format!("[\"{target_version}\"]"))];
        if let Some(loader) = loader {
            params.push(("loaders", format!("[\"{loader}\"]")));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| map_send_error(PLATFORM_NAME, e))?;
        let response = check_status(PLATFORM_NAME, response)?;
        let versions: Vec<ModrinthVersion> = response.json().await?;

        Ok(versions.into_iter().filter_map(RemoteFile::try_from_version).collect())
    }
}

// ─── Wire DTOs ───

#[derive(Debug, Deserialize)]
struct ModrinthSearchResponse {
    hits: Vec<ModrinthHit>,
}

#[derive(Debug, Deserialize)]
struct ModrinthHit {
    project_id: String,
    slug: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ModrinthProject {
    id: String,
    slug: String,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ModrinthVersion {
    id: String,
    version_number: String,
    #[serde(default)]
    game_versions: Vec<String>,
    date_published: DateTime<Utc>,
    #[serde(default)]
    files: Vec<ModrinthVersionFile>,
}

#[derive(Debug, Deserialize)]
struct ModrinthVersionFile {
    url: String,
    filename: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    hashes: ModrinthHashes,
}

#[derive(Debug, Default, Deserialize)]
struct ModrinthHashes {
    sha1: Option<String>,
}

impl From<ModrinthHit> for RemoteProject {
    fn from(hit: ModrinthHit) -> Self {
        RemoteProject {
            platform: PLATFORM_NAME,
            id: hit.project_id,
            slug: hit.slug,
            display_name: hit.title,
        }
    }
}

impl From<ModrinthProject> for RemoteProject {
    fn from(p: ModrinthProject) -> Self {
        RemoteProject {
            platform: PLATFORM_NAME,
            id: p.id,
            slug: p.slug,
            display_name: p.title,
        }
    }
}

impl RemoteFile {
    /// One version maps to its primary file (or the first file when none is
    /// flagged primary). Versions without files are skipped.
    fn try_from_version(version: ModrinthVersion) -> Option<RemoteFile> {
        let file_index = version
            .files
            .iter()
            .position(|f| f.primary)
            .unwrap_or(0);
        let file = version.files.into_iter().nth(file_index)?;
        Some(RemoteFile {
            file_id: version.id,
            file_name: file.filename,
            version: version.version_number,
            game_versions: version.game_versions,
            download_url: Some(file.url),
            released_at: version.date_published,
            sha1: file.hashes.sha1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_version_and_pick_primary_file() {
        let json = r#"{
            "id": "xuGrqvl2",
            "version_number": "0.5.8",
            "game_versions": ["1.20.1"],
            "date_published": "2024-03-20T15:00:00Z",
            "files": [
                {"url": "https://cdn.modrinth.com/a.jar", "filename": "a.jar", "primary": false,
                 "hashes": {"sha1": "aaaa"}},
                {"url": "https://cdn.modrinth.com/b.jar", "filename": "b.jar", "primary": true,
                 "hashes": {"sha1": "bbbb"}}
            ]
        }"#;
        let version: ModrinthVersion = serde_json::from_str(json).unwrap();
        let file = RemoteFile::try_from_version(version).unwrap();
        assert_eq!(file.file_name, "b.jar");
        assert_eq!(file.version, "0.5.8");
        assert_eq!(file.sha1.as_deref(), Some("bbbb"));
    }

    #[test]
    fn version_without_files_is_skipped() {
        let json = r#"{
            "id": "empty",
            "version_number": "1.0.0",
            "game_versions": ["1.20.1"],
            "date_published": "2024-03-20T15:00:00Z",
            "files": []
        }"#;
        let version: ModrinthVersion = serde_json::from_str(json).unwrap();
        assert!(RemoteFile::try_from_version(version).is_none());
    }

    #[test]
    fn facets_include_loader_group() {
        let facets = ModrinthClient::facets("1.20.1", Some(ModLoader::Fabric)).unwrap();
        assert_eq!(
            facets,
            r#"[["project_type:mod"],["versions:1.20.1"],["categories:fabric"]]"#
        );
    }
}
