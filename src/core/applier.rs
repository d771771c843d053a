// ─── Update Applier ───
// Installs one update: download fully, relocate the superseded archive,
// rename the new build into the mods directory.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::config::Disposal;
use crate::core::downloader::Downloader;
use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::platform::RemoteFile;
use crate::core::scanner::LocalMod;

pub struct UpdateApplier<'a> {
    downloader: &'a Downloader,
    mods_dir: &'a Path,
    disposal: Disposal,
}

impl<'a> UpdateApplier<'a> {
    pub fn new(downloader: &'a Downloader, mods_dir: &'a Path, disposal: Disposal) -> Self {
        Self {
            downloader,
            mods_dir,
            disposal,
        }
    }

    /// Replace `local` with `candidate`. The installed file is touched only
    /// after the new build has been fully downloaded and verified.
    pub async fn apply(&self, local: &LocalMod, candidate: &RemoteFile) -> UpdaterResult<PathBuf> {
        let url = candidate
            .download_url
            .as_deref()
            .ok_or_else(|| UpdaterError::DownloadFailed {
                url: candidate.file_name.clone(),
                detail: "no download URL published".to_string(),
            })?;
        let dest = self.mods_dir.join(&candidate.file_name);

        let staging = self
            .downloader
            .fetch_to_staging(url, &dest, candidate.sha1.as_deref())
            .await?;

        let retired = self.retire(&local.path).await;
        if let Err(e) = retired {
            // Keep the mods directory as it was.
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e);
        }

        tokio::fs::rename(&staging, &dest)
            .await
            .map_err(|source| UpdaterError::Io {
                path: dest.clone(),
                source,
            })?;

        info!("Installed {} (was {})", candidate.file_name, local.file_name);
        Ok(dest)
    }

    /// Move the superseded archive into the disposal folder, creating it on
    /// demand.
    async fn retire(&self, path: &Path) -> UpdaterResult<PathBuf> {
        let dir = match &self.disposal {
            Disposal::Backup { label } => self.mods_dir.join(label),
            Disposal::Trash => self.mods_dir.join(".trash"),
        };
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| UpdaterError::Io {
                path: dir.clone(),
                source,
            })?;

        let file_name = path
            .file_name()
            .ok_or_else(|| UpdaterError::Other(format!("Not a file path: {path:?}")))?;
        let target = dir.join(file_name);
        tokio::fs::rename(path, &target)
            .await
            .map_err(|source| UpdaterError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Retired {:?} -> {:?}", path, target);
        Ok(target)
    }
}
