use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{check_status, map_send_error, ModPlatform, RemoteFile, RemoteProject};
use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::loader::ModLoader;
use crate::core::scanner::infer_version_from_name;

const CURSEFORGE_API_BASE: &str = "https://api.curseforge.com/v1";
const PLATFORM_NAME: &str = "CurseForge";
/// CurseForge game id for Minecraft.
const MINECRAFT_GAME_ID: u32 = 432;

/// CurseForge REST client. Every operation requires the API key that was
/// handed in at construction; a missing key fails fast with `AuthRequired`
/// so the matcher can fall back to a keyless platform.
pub struct CurseforgeClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl CurseforgeClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: CURSEFORGE_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn key(&self) -> UpdaterResult<HeaderValue> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(UpdaterError::AuthRequired {
                platform: PLATFORM_NAME,
            })?;
        HeaderValue::from_str(key).map_err(|_| UpdaterError::AuthRequired {
            platform: PLATFORM_NAME,
        })
    }

    async fn search_mods(
        &self,
        params: &[(&str, String)],
    ) -> UpdaterResult<Vec<CurseforgeMod>> {
        let key = self.key()?;
        let url = format!("{}/mods/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-api-key", key)
            .query(params)
            .send()
            .await
            .map_err(|e| map_send_error(PLATFORM_NAME, e))?;
        let response = check_status(PLATFORM_NAME, response)?;
        let envelope: DataEnvelope<Vec<CurseforgeMod>> = response.json().await?;
        Ok(envelope.data)
    }

    fn base_params(target_version: &str, loader: Option<ModLoader>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("gameId", MINECRAFT_GAME_ID.to_string()),
            ("gameVersion", target_version.to_string()),
        ];
        if let Some(loader) = loader {
            params.push(("modLoaderType", loader.curseforge_id().to_string()));
        }
        params
    }
}

#[async_trait]
impl ModPlatform for CurseforgeClient {
    fn name(&self) -> &'static str {
        PLATFORM_NAME
    }

    async fn search_by_slug(
        &self,
        slug: &str,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteProject>> {
        let mut params = Self::base_params(target_version, loader);
        params.push(("slug", slug.to_string()));
        let mods = self.search_mods(&params).await?;
        debug!("CurseForge slug lookup '{}': {} hits", slug, mods.len());
        Ok(mods.into_iter().map(RemoteProject::from).collect())
    }

    async fn search(
        &self,
        query: &str,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteProject>> {
        let mut params = Self::base_params(target_version, loader);
        params.push(("searchFilter", query.to_string()));
        let mods = self.search_mods(&params).await?;
        debug!("CurseForge search '{}': {} hits", query, mods.len());
        Ok(mods.into_iter().map(RemoteProject::from).collect())
    }

    async fn project_files(
        &self,
        project: &RemoteProject,
        target_version: &str,
        loader: Option<ModLoader>,
    ) -> UpdaterResult<Vec<RemoteFile>> {
        let key = self.key()?;
        let url = format!("{}/mods/{}/files", self.base_url, project.id);
        let mut params = vec![("gameVersion", target_version.to_string())];
        if let Some(loader) = loader {
            params.push(("modLoaderType", loader.curseforge_id().to_string()));
        }

        let response = self
            .client
            .get(&url)
            .header("x-api-key", key)
            .query(&params)
            .send()
            .await
            .map_err(|e| map_send_error(PLATFORM_NAME, e))?;
        let response = check_status(PLATFORM_NAME, response)?;
        let envelope: DataEnvelope<Vec<CurseforgeFile>> = response.json().await?;

        Ok(envelope
            .data
            .into_iter()
            .filter(|f| f.is_available)
            .map(RemoteFile::from)
            .collect())
    }
}

// ─── Wire DTOs ───

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurseforgeMod {
    id: u64,
    slug: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurseforgeFile {
    id: u64,
    file_name: String,
    #[serde(default)]
    display_name: Option<String>,
    file_date: DateTime<Utc>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    game_versions: Vec<String>,
    #[serde(default = "default_true")]
    is_available: bool,
    #[serde(default)]
    hashes: Vec<CurseforgeHash>,
}

#[derive(Debug, Deserialize)]
struct CurseforgeHash {
    value: String,
    /// 1 = SHA-1, 2 = MD5.
    algo: u8,
}

fn default_true() -> bool {
    true
}

impl From<CurseforgeMod> for RemoteProject {
    fn from(m: CurseforgeMod) -> Self {
        RemoteProject {
            platform: PLATFORM_NAME,
            id: m.id.to_string(),
            slug: m.slug,
            display_name: m.name,
        }
    }
}

impl From<CurseforgeFile> for RemoteFile {
    fn from(f: CurseforgeFile) -> Self {
        // CurseForge publishes no version string per file; derive one from the
        // file name the same way the scanner does for local archives.
        let version = infer_version_from_name(&f.file_name)
            .or_else(|| f.display_name.clone())
            .unwrap_or_else(|| f.file_name.clone());
        let sha1 = f
            .hashes
            .iter()
            .find(|h| h.algo == 1)
            .map(|h| h.value.clone());
        RemoteFile {
            file_id: f.id.to_string(),
            file_name: f.file_name,
            version,
            game_versions: f.game_versions,
            download_url: f.download_url,
            released_at: f.file_date,
            sha1,
        }
    }
}
