// ─── Local Mod Scanner ───
// Lists mod archives in the mods directory and derives identifying metadata
// from file names and embedded fabric.mod.json manifests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::error::{UpdaterError, UpdaterResult};
use crate::core::loader::ModLoader;

/// A mod archive found in the mods directory.
#[derive(Debug, Clone)]
pub struct LocalMod {
    pub path: PathBuf,
    pub file_name: String,
    /// Best-effort slug-like identifier used for platform lookups.
    pub identifier: String,
    pub installed_version: Option<String>,
}

/// `fabric.mod.json` fields we care about.
#[derive(Debug, Deserialize)]
struct FabricManifest {
    id: Option<String>,
    version: Option<String>,
}

/// Scan the mods directory, sorted by file name.
///
/// A missing directory is fatal; individual unreadable entries are logged
/// and skipped.
pub fn scan(mods_dir: &Path) -> UpdaterResult<Vec<LocalMod>> {
    if !mods_dir.is_dir() {
        return Err(UpdaterError::DirectoryNotFound(mods_dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(mods_dir).map_err(|source| UpdaterError::Io {
        path: mods_dir.to_path_buf(),
        source,
    })?;

    let mut mods = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("jar"))
        {
            continue;
        }
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                warn!("Skipping file with non-UTF-8 name: {:?}", path);
                continue;
            }
        };

        let manifest = read_fabric_manifest(&path);
        let identifier = manifest
            .as_ref()
            .and_then(|m| m.id.as_deref())
            .map(|id| id.to_lowercase().replace('_', "-"))
            .unwrap_or_else(|| derive_identifier(&file_name));
        let installed_version = manifest
            .as_ref()
            .and_then(|m| m.version.clone())
            .filter(|v| !v.contains("${"))
            .or_else(|| infer_version_from_name(&file_name));

        mods.push(LocalMod {
            path,
            file_name,
            identifier,
            installed_version,
        });
    }

    mods.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    info!("Scanned {} mod archives in {:?}", mods.len(), mods_dir);
    Ok(mods)
}

fn read_fabric_manifest(path: &Path) -> Option<FabricManifest> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Cannot open {:?}: {}", path, e);
            return None;
        }
    };
    let mut archive = zip::ZipArchive::new(file).ok()?;
    let entry = archive.by_name("fabric.mod.json").ok()?;
    match serde_json::from_reader(entry) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!("Malformed fabric.mod.json in {:?}: {}", path, e);
            None
        }
    }
}

// ─── File-name heuristics ───
// All pure functions so they stay unit-testable without touching the network
// or the filesystem.

fn normalize(file_name: &str) -> String {
    let stem = file_name
        .strip_suffix(".jar")
        .unwrap_or(file_name)
        .to_lowercase();
    stem.replace(['+', ' ', '_'], "-")
}

/// Token that starts a version: digits after an optional `v`/`mc` prefix.
fn is_version_token(token: &str) -> bool {
    let stripped = token
        .strip_prefix("mc")
        .or_else(|| token.strip_prefix('v'))
        .unwrap_or(token);
    stripped.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Token that looks like a Minecraft release (`1.x` / `1.x.y`, optional `mc`
/// prefix).
fn is_game_version_token(token: &str) -> bool {
    let stripped = token.strip_prefix("mc").unwrap_or(token);
    let parts: Vec<&str> = stripped.split('.').collect();
    (2..=3).contains(&parts.len())
        && parts[0] == "1"
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Derive a slug-like identifier from a mod file name.
///
/// Keeps the tokens before the first version-like token and drops a trailing
/// loader token, so `Sodium-Fabric-0.5.8+mc1.20.1.jar` becomes `sodium`.
pub fn derive_identifier(file_name: &str) -> String {
    let normalized = normalize(file_name);
    let tokens: Vec<&str> = normalized.split('-').filter(|t| !t.is_empty()).collect();

    let cutoff = tokens
        .iter()
        .position(|t| is_version_token(t))
        .unwrap_or(tokens.len());
    let mut name_tokens = &tokens[..cutoff];

    if let Some(last) = name_tokens.last() {
        if ModLoader::ALL.iter().any(|l| l.to_string() == *last) {
            name_tokens = &name_tokens[..name_tokens.len() - 1];
        }
    }

    if name_tokens.is_empty() {
        // File name starts with a version; fall back to the whole stem.
        return normalized;
    }
    name_tokens.join("-")
}

/// Infer the installed mod version from a file name.
///
/// Prefers the last version-like token that does not look like a Minecraft
/// release, so the game-version tag in `sodium-0.5.8-mc1.20.1.jar` is not
/// mistaken for the mod version.
pub fn infer_version_from_name(file_name: &str) -> Option<String> {
    let normalized = normalize(file_name);
    let versions: Vec<&str> = normalized
        .split('-')
        .filter(|t| is_version_token(t))
        .collect();

    versions
        .iter()
        .rev()
        .find(|t| !is_game_version_token(t))
        .or_else(|| versions.last())
        .map(|t| t.strip_prefix('v').unwrap_or(t).to_string())
}

/// Majority vote for the Minecraft version the installed mods were built for.
/// Equal counts resolve to the newer version.
pub fn detect_game_version(mods: &[LocalMod]) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for local in mods {
        let normalized = normalize(&local.file_name);
        for token in normalized.split('-') {
            if is_game_version_token(token) {
                let version = token.strip_prefix("mc").unwrap_or(token).to_string();
                *counts.entry(version).or_insert(0) += 1;
            }
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(version, _)| version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(file_name: &str) -> LocalMod {
        LocalMod {
            path: PathBuf::from(file_name),
            file_name: file_name.to_string(),
            identifier: derive_identifier(file_name),
            installed_version: infer_version_from_name(file_name),
        }
    }

    #[test]
    fn identifier_strips_version_and_loader() {
        assert_eq!(derive_identifier("Sodium-Fabric-0.5.8+mc1.20.1.jar"), "sodium");
        assert_eq!(derive_identifier("examplemod-1.2.0.jar"), "examplemod");
        assert_eq!(derive_identifier("iron_chests-forge-14.4.4.jar"), "iron-chests");
    }

    #[test]
    fn identifier_keeps_multi_word_names() {
        assert_eq!(
            derive_identifier("appleskin-fabric-mc1.20.1-2.5.1.jar"),
            "appleskin"
        );
        assert_eq!(
            derive_identifier("fabric-api-0.92.0+1.20.1.jar"),
            "fabric-api"
        );
    }

    #[test]
    fn identifier_falls_back_when_name_starts_with_version() {
        assert_eq!(derive_identifier("1.20.1-mod.jar"), "1.20.1-mod");
    }

    #[test]
    fn version_inference_prefers_mod_version_over_game_version() {
        assert_eq!(
            infer_version_from_name("sodium-fabric-0.5.8-mc1.20.1.jar"),
            Some("0.5.8".to_string())
        );
        assert_eq!(
            infer_version_from_name("examplemod-1.2.0.jar"),
            Some("1.2.0".to_string())
        );
        assert_eq!(infer_version_from_name("examplemod.jar"), None);
    }

    #[test]
    fn version_inference_strips_v_prefix() {
        assert_eq!(
            infer_version_from_name("journeymap-v5.9.7.jar"),
            Some("5.9.7".to_string())
        );
    }

    #[test]
    fn game_version_majority_vote() {
        let mods = vec![
            local("sodium-fabric-0.5.8-mc1.20.1.jar"),
            local("appleskin-fabric-mc1.20.1-2.5.1.jar"),
            local("oldmod-1.19.2-3.0.0.jar"),
        ];
        assert_eq!(detect_game_version(&mods), Some("1.20.1".to_string()));
    }

    #[test]
    fn game_version_tie_prefers_newer() {
        let mods = vec![
            local("sodium-fabric-mc1.20.1-2.0.0.jar"),
            local("lithium-fabric-mc1.20.4-3.0.0.jar"),
        ];
        assert_eq!(detect_game_version(&mods), Some("1.20.4".to_string()));
    }

    #[test]
    fn game_version_none_without_tags() {
        let mods = vec![local("examplemod.jar")];
        assert_eq!(detect_game_version(&mods), None);
    }

    #[test]
    fn missing_directory_is_fatal() {
        let err = scan(Path::new("/definitely/not/a/mods/dir")).unwrap_err();
        assert!(matches!(err, UpdaterError::DirectoryNotFound(_)));
    }
}
