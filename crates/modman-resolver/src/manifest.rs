//! Per-mod manifest: version, constraint lists and suggestions.
//!
//! Constraint lists are unique by target package id. Entries from the
//! mod's `Manifest.xml` are added first, so on a clash they win over the
//! host's native metadata.

use std::cell::OnceCell;

use modman_core::registry::{ModIdentity, ModRegistry};
use modman_util::errors::ModmanError;

use crate::dependency::{Dependency, DependencyKind, TargetSnapshot};
use crate::manifest_xml::{ManifestDocument, ManifestEntry};
use crate::version::ModVersion;

/// Remote version-check endpoint declared by a manifest.
///
/// Only the URI is recorded; nothing is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCheck {
    pub uri: String,
}

/// The partition of a manifest's constraints at the last recheck.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub missing: Vec<Dependency>,
    pub met: Vec<Dependency>,
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub package_id: String,
    pub name: String,
    /// Explicit version string from `Manifest.xml`.
    pub version: Option<String>,
    /// Legacy identifier from `Manifest.xml`.
    pub identifier: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub incompatibilities: Vec<Dependency>,
    pub load_before: Vec<Dependency>,
    pub load_after: Vec<Dependency>,
    pub version_check: Option<VersionCheck>,
    pub download_uri: Option<String>,
    pub suggests: Vec<String>,
    pub show_cross_promotions: bool,
    resolved_version: OnceCell<ModVersion>,
    requirements: Option<Requirements>,
}

impl Manifest {
    /// A manifest with no declared data.
    pub fn empty(owner: &ModIdentity) -> Self {
        Self {
            package_id: owner.package_id.clone(),
            name: owner.name.clone(),
            version: None,
            identifier: None,
            dependencies: Vec::new(),
            incompatibilities: Vec::new(),
            load_before: Vec::new(),
            load_after: Vec::new(),
            version_check: None,
            download_uri: None,
            suggests: Vec::new(),
            show_cross_promotions: true,
            resolved_version: OnceCell::new(),
            requirements: None,
        }
    }

    /// An otherwise empty manifest with an explicit version string.
    pub fn with_version(owner: &ModIdentity, version: impl Into<String>) -> Self {
        let mut manifest = Self::empty(owner);
        manifest.version = Some(version.into());
        manifest
    }

    /// Build a manifest from a parsed document.
    ///
    /// Lines that fail to parse are logged and dropped; the rest of the
    /// manifest is kept.
    pub fn from_document<R>(
        owner: &ModIdentity,
        doc: ManifestDocument,
        registry: &R,
        dev_mode: bool,
    ) -> Self
    where
        R: ModRegistry + ?Sized,
    {
        let mut manifest = Self::empty(owner);
        for kind in DependencyKind::ALL {
            for entry in doc.entries(kind) {
                match entry_to_dependency(entry, kind, &owner.package_id, registry) {
                    Ok(dep) => {
                        if let Some(alias) = &dep.declared_as {
                            if dev_mode {
                                tracing::info!(
                                    "Invalid packageId '{alias}' resolved to '{}'",
                                    dep.package_id
                                );
                            } else {
                                tracing::debug!(
                                    "Invalid packageId '{alias}' resolved to '{}'",
                                    dep.package_id
                                );
                            }
                        }
                        manifest.push_unique(dep);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse {kind} entry for {}: {e}", owner.name);
                    }
                }
            }
        }

        manifest.version = doc.version;
        manifest.identifier = doc.identifier;
        manifest.version_check = doc.manifest_uri.map(|uri| VersionCheck { uri });
        manifest.download_uri = doc.download_uri;
        manifest.suggests = doc.suggests;
        manifest.show_cross_promotions = doc.show_cross_promotions;
        manifest
    }

    /// Add the host's native constraints for targets not already present.
    pub fn merge_host<R>(&mut self, owner: &ModIdentity, registry: &R)
    where
        R: ModRegistry + ?Sized,
    {
        let mut incoming = Vec::new();
        for id in &owner.load_before {
            incoming.push(Dependency::new(DependencyKind::LoadBefore, &owner.package_id, id));
        }
        for id in &owner.load_after {
            incoming.push(Dependency::new(DependencyKind::LoadAfter, &owner.package_id, id));
        }
        for id in &owner.incompatible_with {
            incoming.push(Dependency::new(DependencyKind::Incompatible, &owner.package_id, id));
        }
        for dep in &owner.dependencies {
            incoming.push(
                Dependency::new(DependencyKind::DependsOn, &owner.package_id, &dep.package_id)
                    .with_display_name(dep.display_name.clone()),
            );
        }
        for mut dep in incoming {
            dep.resolve_target(registry);
            self.push_unique(dep);
        }
    }

    /// Append `dep` unless its list already targets the same package id.
    pub fn push_unique(&mut self, dep: Dependency) -> bool {
        let list = self.constraints_mut(dep.kind);
        if list.iter().any(|d| d.package_id == dep.package_id) {
            return false;
        }
        list.push(dep);
        true
    }

    pub fn constraints(&self, kind: DependencyKind) -> &[Dependency] {
        match kind {
            DependencyKind::DependsOn => &self.dependencies,
            DependencyKind::Incompatible => &self.incompatibilities,
            DependencyKind::LoadBefore => &self.load_before,
            DependencyKind::LoadAfter => &self.load_after,
        }
    }

    fn constraints_mut(&mut self, kind: DependencyKind) -> &mut Vec<Dependency> {
        match kind {
            DependencyKind::DependsOn => &mut self.dependencies,
            DependencyKind::Incompatible => &mut self.incompatibilities,
            DependencyKind::LoadBefore => &mut self.load_before,
            DependencyKind::LoadAfter => &mut self.load_after,
        }
    }

    /// Every constraint: dependencies, incompatibilities, load-before, load-after.
    pub fn all_requirements(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies
            .iter()
            .chain(&self.incompatibilities)
            .chain(&self.load_before)
            .chain(&self.load_after)
    }

    /// Resolve and memoize the version: explicit string, then the version
    /// reported by `assembly_version`, then `0.0`. Later calls return the
    /// memoized value without consulting `assembly_version`.
    pub fn resolve_version<F>(&self, assembly_version: F) -> &ModVersion
    where
        F: FnOnce() -> Option<String>,
    {
        self.resolved_version.get_or_init(|| {
            if let Some(explicit) = self.version.as_deref().filter(|v| !v.trim().is_empty()) {
                return ModVersion::parse_or_zero(explicit, &self.name);
            }
            match assembly_version() {
                Some(file_version) => ModVersion::parse_or_zero(&file_version, &self.name),
                None => ModVersion::ZERO,
            }
        })
    }

    /// The memoized version, or `None` before [`Manifest::resolve_version`]
    /// has run.
    pub fn resolved_version(&self) -> Option<&ModVersion> {
        self.resolved_version.get()
    }

    /// Whether a version above `0.0` has been resolved.
    pub fn has_version(&self) -> bool {
        self.resolved_version().is_some_and(ModVersion::is_known)
    }

    /// Drop the cached requirement partition; the next query recomputes it.
    pub fn recheck_requirements(&mut self) {
        self.requirements = None;
    }

    /// The cached partition, if computed since the last recheck.
    pub fn requirements(&self) -> Option<&Requirements> {
        self.requirements.as_ref()
    }

    /// Re-target every constraint and partition them by satisfaction.
    pub fn refresh_requirements<F>(&mut self, snapshot_of: F) -> &Requirements
    where
        F: Fn(&str) -> Option<TargetSnapshot>,
    {
        for kind in DependencyKind::ALL {
            for dep in self.constraints_mut(kind) {
                let target = snapshot_of(&dep.package_id);
                dep.set_target(target);
            }
        }
        let (met, missing): (Vec<Dependency>, Vec<Dependency>) = self
            .all_requirements()
            .cloned()
            .partition(Dependency::is_satisfied);
        tracing::debug!(
            "{}: {} requirements met, {} missing",
            self.package_id,
            met.len(),
            missing.len()
        );
        self.requirements.insert(Requirements { missing, met })
    }
}

fn entry_to_dependency<R>(
    entry: &ManifestEntry,
    kind: DependencyKind,
    owner: &str,
    registry: &R,
) -> Result<Dependency, ModmanError>
where
    R: ModRegistry + ?Sized,
{
    match entry {
        ManifestEntry::Line(line) => Dependency::parse(line, kind, owner, registry),
        ManifestEntry::Structured {
            package_id,
            display_name,
        } => {
            let mut dep = Dependency::parse(package_id, kind, owner, registry)?;
            dep.display_name = display_name.clone().filter(|n| !n.trim().is_empty());
            Ok(dep)
        }
    }
}
