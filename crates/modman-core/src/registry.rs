//! The host's view of installed mods.
//!
//! The resolver never discovers mods itself; it reads them through
//! [`ModRegistry`], keyed by package id.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::package_id;

/// A dependency declared in the host's own mod metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDependency {
    #[serde(rename = "package-id")]
    pub package_id: String,
    #[serde(default, rename = "display-name")]
    pub display_name: Option<String>,
}

impl HostDependency {
    pub fn new(package_id: impl Into<String>) -> Self {
        Self {
            package_id: package_id.into(),
            display_name: None,
        }
    }
}

/// An installed mod as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModIdentity {
    pub package_id: String,
    pub name: String,
    /// Legacy identifier (usually the folder name), used for alias lookups.
    pub identifier: Option<String>,
    pub active: bool,
    pub load_order: Option<usize>,
    pub root_dir: PathBuf,
    pub dependencies: Vec<HostDependency>,
    pub incompatible_with: Vec<String>,
    pub load_before: Vec<String>,
    pub load_after: Vec<String>,
}

impl ModIdentity {
    /// A bare, inactive mod with no native constraints.
    pub fn new(package_id: &str, name: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            package_id: package_id::normalize(package_id),
            name: name.into(),
            identifier: None,
            active: false,
            load_order: None,
            root_dir: root_dir.into(),
            dependencies: Vec::new(),
            incompatible_with: Vec::new(),
            load_before: Vec::new(),
            load_after: Vec::new(),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_dependency(mut self, dep: HostDependency) -> Self {
        self.dependencies.push(dep);
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Whether `alias` names this mod by display name or legacy identifier.
    pub fn answers_to(&self, alias: &str) -> bool {
        self.name.eq_ignore_ascii_case(alias)
            || self
                .identifier
                .as_deref()
                .is_some_and(|i| i.eq_ignore_ascii_case(alias))
    }
}

/// Read access to the installed-mod set.
pub trait ModRegistry {
    /// Look up a mod by package id (ASCII case-insensitive).
    fn find_by_package_id(&self, package_id: &str) -> Option<&ModIdentity>;

    /// Resolve a legacy mod name or identifier to a real package id.
    fn package_id_for_alias(&self, alias: &str) -> Option<String>;

    /// One identity per installed package id, in registration order.
    fn mods(&self) -> Box<dyn Iterator<Item = &ModIdentity> + '_>;
}
