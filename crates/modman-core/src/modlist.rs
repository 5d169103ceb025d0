//! In-memory installed-mod registry, optionally loaded from a TOML mod list.
//!
//! ```toml
//! [[mod]]
//! package-id = "author.mymod"
//! name = "My Mod"
//! root = "MyMod"          # relative to the list file
//! active = true
//! dependencies = [{ package-id = "brrainz.harmony", display-name = "Harmony" }]
//! load-after = ["brrainz.harmony"]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use modman_util::errors::ModmanError;
use serde::Deserialize;

use crate::package_id;
use crate::registry::{HostDependency, ModIdentity, ModRegistry};

#[derive(Debug, Deserialize)]
struct ModListFile {
    #[serde(default, rename = "mod")]
    mods: Vec<ModEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ModEntry {
    package_id: String,
    name: String,
    #[serde(default)]
    identifier: Option<String>,
    root: PathBuf,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    load_order: Option<usize>,
    #[serde(default)]
    dependencies: Vec<HostDependency>,
    #[serde(default)]
    incompatible_with: Vec<String>,
    #[serde(default)]
    load_before: Vec<String>,
    #[serde(default)]
    load_after: Vec<String>,
}

/// The set of installed mods for one session.
///
/// A package id may be installed more than once (a local copy next to a
/// workshop copy). Lookups answer with the active copy, or the first one
/// declared when none is active.
#[derive(Debug, Clone, Default)]
pub struct InstalledMods {
    mods: Vec<ModIdentity>,
    by_id: HashMap<String, Vec<usize>>,
    /// Distinct package ids in first-registration order.
    order: Vec<String>,
}

impl InstalledMods {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and parse a mod list file.
    ///
    /// Relative `root` paths are resolved against the list's directory.
    pub fn from_path(path: &Path) -> Result<Self, ModmanError> {
        let content = std::fs::read_to_string(path).map_err(|e| ModmanError::ModList {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::from_str(&content, base)
    }

    /// Parse a mod list from a string, resolving roots against `base`.
    ///
    /// Entries without a package id are skipped with a warning.
    pub fn from_str(content: &str, base: &Path) -> Result<Self, ModmanError> {
        let file: ModListFile = toml::from_str(content).map_err(|e| ModmanError::ModList {
            message: format!("Failed to parse mod list: {e}"),
        })?;

        let mut installed = Self::new();
        let mut next_position = 0;
        for entry in file.mods {
            let load_order = match (entry.active, entry.load_order) {
                (_, Some(pos)) => Some(pos),
                (true, None) => Some(next_position),
                (false, None) => None,
            };
            if let Some(pos) = load_order {
                next_position = next_position.max(pos + 1);
            }
            let identity = ModIdentity {
                package_id: package_id::normalize(&entry.package_id),
                name: entry.name,
                identifier: entry.identifier,
                active: entry.active,
                load_order,
                root_dir: modman_util::fs::resolve_relative(base, &entry.root),
                dependencies: entry.dependencies,
                incompatible_with: entry.incompatible_with,
                load_before: entry.load_before,
                load_after: entry.load_after,
            };
            if let Err(e) = installed.insert(identity) {
                tracing::warn!("Skipping mod list entry: {e}");
            }
        }
        tracing::debug!("loaded {} mods from mod list", installed.len());
        Ok(installed)
    }

    /// Register a mod. A second copy of a known package id is kept next to
    /// the first; only an empty package id is rejected.
    pub fn insert(&mut self, identity: ModIdentity) -> Result<(), ModmanError> {
        let key = package_id::normalize(&identity.package_id);
        if key.is_empty() {
            return Err(ModmanError::ModList {
                message: format!("'{}' has no package id", identity.name),
            });
        }
        match self.by_id.get_mut(&key) {
            Some(copies) => {
                tracing::warn!(
                    "'{key}' is installed more than once ({} at {})",
                    identity.name,
                    identity.root_dir.display()
                );
                copies.push(self.mods.len());
            }
            None => {
                self.by_id.insert(key.clone(), vec![self.mods.len()]);
                self.order.push(key);
            }
        }
        self.mods.push(identity);
        Ok(())
    }

    /// Change a mod's activation flag. Activating a package id with several
    /// copies activates the first one unless a copy is already active;
    /// deactivating clears every copy. Returns `false` if the mod is unknown.
    pub fn set_active(&mut self, package_id: &str, active: bool) -> bool {
        let Some(copies) = self.by_id.get(&package_id::normalize(package_id)) else {
            return false;
        };
        if active {
            if !copies.iter().any(|&idx| self.mods[idx].active) {
                self.mods[copies[0]].active = true;
            }
        } else {
            for &idx in copies {
                self.mods[idx].active = false;
            }
        }
        true
    }

    /// Every installed copy of `package_id`, in declaration order.
    pub fn copies(&self, package_id: &str) -> Vec<&ModIdentity> {
        self.by_id
            .get(&package_id::normalize(package_id))
            .map(|copies| copies.iter().map(|&idx| &self.mods[idx]).collect())
            .unwrap_or_default()
    }

    /// Number of distinct package ids.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Active mods ordered by load-order position.
    pub fn active_in_load_order(&self) -> Vec<&ModIdentity> {
        let mut active: Vec<&ModIdentity> = self.mods().filter(|m| m.active).collect();
        active.sort_by_key(|m| m.load_order.unwrap_or(usize::MAX));
        active
    }

    fn preferred(&self, key: &str) -> Option<&ModIdentity> {
        let copies = self.by_id.get(key)?;
        copies
            .iter()
            .map(|&idx| &self.mods[idx])
            .find(|m| m.active)
            .or_else(|| copies.first().map(|&idx| &self.mods[idx]))
    }
}

impl ModRegistry for InstalledMods {
    fn find_by_package_id(&self, package_id: &str) -> Option<&ModIdentity> {
        self.preferred(&package_id::normalize(package_id))
    }

    fn package_id_for_alias(&self, alias: &str) -> Option<String> {
        let alias = alias.trim();
        if alias.is_empty() {
            return None;
        }
        self.mods()
            .find(|m| m.answers_to(alias))
            .map(|m| m.package_id.clone())
    }

    /// One copy per package id, in first-registration order.
    fn mods(&self) -> Box<dyn Iterator<Item = &ModIdentity> + '_> {
        Box::new(self.order.iter().filter_map(|key| self.preferred(key)))
    }
}
