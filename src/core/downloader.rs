// ─── Downloader ───
// Streaming, SHA-1 validated downloads. Bytes always land in a `.part`
// staging file first so an aborted transfer never leaves a half-written
// archive at a final path.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{UpdaterError, UpdaterResult};

pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Staging path used for a download destined for `dest`.
    pub fn staging_path(dest: &Path) -> PathBuf {
        let mut name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        name.push_str(".part");
        dest.with_file_name(name)
    }

    /// Stream `url` into the staging file for `dest` and verify SHA-1 when a
    /// hash is known. The caller renames the staging file into place once the
    /// superseded archive has been relocated.
    ///
    /// On any failure the partial file is removed and `dest` is untouched.
    pub async fn fetch_to_staging(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> UpdaterResult<PathBuf> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| UpdaterError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdaterError::DownloadFailed {
                url: url.to_string(),
                detail: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::DownloadFailed {
                url: url.to_string(),
                detail: format!("HTTP {status}"),
            });
        }

        let staging = Self::staging_path(dest);
        if let Err(e) = self
            .write_stream(response, &staging, url, sha1_expected)
            .await
        {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        debug!("Downloaded {} -> {:?}", url, staging);
        Ok(staging)
    }

    async fn write_stream(
        &self,
        response: reqwest::Response,
        staging: &Path,
        url: &str,
        sha1_expected: Option<&str>,
    ) -> UpdaterResult<()> {
        let mut file =
            tokio::fs::File::create(staging)
                .await
                .map_err(|source| UpdaterError::Io {
                    path: staging.to_path_buf(),
                    source,
                })?;

        let mut hasher = Sha1::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| UpdaterError::DownloadFailed {
                url: url.to_string(),
                detail: e.to_string(),
            })?;
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|source| UpdaterError::Io {
                    path: staging.to_path_buf(),
                    source,
                })?;
        }
        file.flush().await.map_err(|source| UpdaterError::Io {
            path: staging.to_path_buf(),
            source,
        })?;
        drop(file);

        if let Some(expected) = sha1_expected {
            let actual = hex::encode(hasher.finalize());
            if actual != expected {
                return Err(UpdaterError::Sha1Mismatch {
                    path: staging.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        Ok(())
    }
}
