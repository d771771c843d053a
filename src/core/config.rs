use std::path::PathBuf;

/// Where superseded mod files are moved after a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposal {
    /// Subfolder of the mods directory named after the prior game version.
    Backup { label: String },
    /// `.trash` subfolder of the mods directory.
    Trash,
}

/// Runtime configuration resolved from CLI flags and the environment.
///
/// The CurseForge key is carried here explicitly and handed to the client at
/// construction; no module reads the environment on its own.
#[derive(Debug, Clone)]
pub struct Config {
    pub mods_dir: PathBuf,
    pub curseforge_api_key: Option<String>,
    /// Maximum number of concurrent platform lookups.
    pub concurrency: usize,
    pub disposal: Disposal,
    /// Apply every available update without prompting.
    pub assume_yes: bool,
}

/// Standard `.minecraft/mods` location for the current platform.
pub fn default_mods_dir() -> PathBuf {
    let base = if cfg!(target_os = "windows") {
        // %APPDATA%\.minecraft
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minecraft")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".minecraft")
    };
    base.join("mods")
}

/// Treats an empty or whitespace-only key as absent.
pub fn normalize_api_key(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty())
}
