// ─── Version Resolver ───
// Selects the best remote build for a target game version and decides
// whether it is an update over the installed file.

use tracing::debug;

use crate::core::loader::ModLoader;
use crate::core::platform::RemoteFile;

/// Outcome of resolving a project's file list against one local mod.
#[derive(Debug)]
pub enum Resolution {
    /// A newer (or differently-versioned) compatible build exists.
    Update(RemoteFile),
    NoUpdateAvailable,
}

/// Pick the most recently released file compatible with `target_version`.
///
/// Files are skipped when they do not list the target game version, publish
/// no download URL, or name a different mod loader in their file name.
///
/// Version comparison is a plain inequality on the raw strings. When the
/// installed version is unknown, any compatible build counts as an available
/// update; the report marks those results instead of guessing an ordering
/// between arbitrary version schemes.
pub fn resolve(
    files: Vec<RemoteFile>,
    target_version: &str,
    installed_version: Option<&str>,
    installed_file_name: &str,
    loader: Option<ModLoader>,
) -> Resolution {
    let best = files
        .into_iter()
        .filter(|f| f.game_versions.iter().any(|v| v == target_version))
        .filter(|f| f.download_url.is_some())
        .filter(|f| loader_compatible(&f.file_name, loader))
        .max_by_key(|f| f.released_at);

    let Some(best) = best else {
        return Resolution::NoUpdateAvailable;
    };

    // The exact installed file republished for the target version is not an
    // update.
    if best.file_name == installed_file_name {
        return Resolution::NoUpdateAvailable;
    }

    match installed_version {
        Some(installed) if installed == best.version => Resolution::NoUpdateAvailable,
        _ => {
            debug!(
                "Update candidate {} ({} -> {})",
                best.file_name,
                installed_version.unwrap_or("unknown"),
                best.version
            );
            Resolution::Update(best)
        }
    }
}

/// A file naming another loader is incompatible; a file naming no loader at
/// all is accepted.
fn loader_compatible(file_name: &str, loader: Option<ModLoader>) -> bool {
    match (ModLoader::detect_in(file_name), loader) {
        (Some(file_loader), Some(wanted)) => file_loader == wanted,
        _ => true,
    }
}
