use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the updater.
/// Every module returns `Result<T, UpdaterError>`.
#[derive(Debug, Error)]
pub enum UpdaterError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Mods directory not found: {0:?}")]
    DirectoryNotFound(PathBuf),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{platform} is unavailable: {detail}")]
    ApiUnavailable {
        platform: &'static str,
        detail: String,
    },

    #[error("{platform} requires an API key (set CURSEFORGE_API_KEY)")]
    AuthRequired { platform: &'static str },

    #[error("Download failed for {url}: {detail}")]
    DownloadFailed { url: String, detail: String },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Matching ────────────────────────────────────────
    #[error("Ambiguous match for '{identifier}': {}", candidates.join(", "))]
    AmbiguousMatch {
        identifier: String,
        candidates: Vec<String>,
    },

    // ── Parsing ─────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type UpdaterResult<T> = Result<T, UpdaterError>;

impl From<std::io::Error> for UpdaterError {
    fn from(source: std::io::Error) -> Self {
        UpdaterError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
