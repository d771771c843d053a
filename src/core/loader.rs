use std::collections::HashMap;

/// Supported mod loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModLoader {
    Forge,
    Fabric,
    Quilt,
    NeoForge,
}

impl ModLoader {
    pub const ALL: [ModLoader; 4] = [
        ModLoader::Forge,
        ModLoader::Fabric,
        ModLoader::Quilt,
        ModLoader::NeoForge,
    ];

    /// Numeric `modLoaderType` id used by the CurseForge API.
    pub fn curseforge_id(self) -> u8 {
        match self {
            ModLoader::Forge => 1,
            ModLoader::Fabric => 4,
            ModLoader::Quilt => 5,
            ModLoader::NeoForge => 6,
        }
    }

    /// Loader mentioned in a mod file name, if any.
    ///
    /// NeoForge is checked before Forge so that "neoforge" never reads as
    /// plain Forge.
    pub fn detect_in(name: &str) -> Option<ModLoader> {
        let lower = name.to_lowercase();
        if lower.contains("neoforge") {
            return Some(ModLoader::NeoForge);
        }
        [ModLoader::Fabric, ModLoader::Quilt, ModLoader::Forge]
            .into_iter()
            .find(|loader| lower.contains(&loader.to_string()))
    }

    /// Majority vote over a set of file names. Ties resolve to the loader
    /// encountered first.
    pub fn detect_dominant<'a, I>(names: I) -> Option<ModLoader>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts: HashMap<ModLoader, usize> = HashMap::new();
        let mut order: Vec<ModLoader> = Vec::new();
        for name in names {
            if let Some(loader) = ModLoader::detect_in(name) {
                *counts.entry(loader).or_insert(0) += 1;
                if !order.contains(&loader) {
                    order.push(loader);
                }
            }
        }

        let mut best: Option<ModLoader> = None;
        for loader in order {
            if best.map_or(true, |b| counts[&loader] > counts[&b]) {
                best = Some(loader);
            }
        }
        best
    }
}

impl std::fmt::Display for ModLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModLoader::Forge => write!(f, "forge"),
            ModLoader::Fabric => write!(f, "fabric"),
            ModLoader::Quilt => write!(f, "quilt"),
            ModLoader::NeoForge => write!(f, "neoforge"),
        }
    }
}
