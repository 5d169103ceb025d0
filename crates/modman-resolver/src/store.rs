//! Session cache of resolved manifests, keyed by package id.
//!
//! Manifests are created on first access and live until [`ManifestStore::clear`]
//! (a full mod-list reload). Requirement partitions are memoized per manifest
//! and recomputed only after an explicit recheck.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use modman_core::config::ResolverConfig;
use modman_core::package_id;
use modman_core::registry::{ModIdentity, ModRegistry};

use crate::assembly::{self, FileVersionReader, PeFileVersion};
use crate::dependency::{Dependency, TargetSnapshot};
use crate::manifest::{Manifest, Requirements};
use crate::manifest_xml;
use crate::report::RequirementReport;

/// Resolves and caches one [`Manifest`] per installed mod.
#[derive(Debug)]
pub struct ManifestStore<V = PeFileVersion> {
    config: ResolverConfig,
    reader: V,
    manifests: HashMap<String, Manifest>,
}

impl ManifestStore<PeFileVersion> {
    pub fn new(config: ResolverConfig) -> Self {
        Self::with_reader(config, PeFileVersion)
    }
}

impl<V: FileVersionReader> ManifestStore<V> {
    /// A store that reads assembly versions with `reader`.
    pub fn with_reader(config: ResolverConfig, reader: V) -> Self {
        Self {
            config,
            reader,
            manifests: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The cached manifest for `identity`, loading it on first access.
    ///
    /// Never fails: an unreadable or malformed `Manifest.xml` is logged and
    /// replaced by an empty manifest, which still receives the host's
    /// native constraints.
    pub fn resolve<R>(&mut self, identity: &ModIdentity, registry: &R) -> &mut Manifest
    where
        R: ModRegistry + ?Sized,
    {
        match self.manifests.entry(package_id::normalize(&identity.package_id)) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let manifest = load(&self.config, &self.reader, identity, registry);
                e.insert(manifest)
            }
        }
    }

    /// Resolve every mod the registry knows about.
    pub fn resolve_all<R>(&mut self, registry: &R)
    where
        R: ModRegistry + ?Sized,
    {
        for identity in registry.mods() {
            self.resolve(identity, registry);
        }
    }

    pub fn get(&self, package_id: &str) -> Option<&Manifest> {
        self.manifests.get(&package_id::normalize(package_id))
    }

    pub fn get_mut(&mut self, package_id: &str) -> Option<&mut Manifest> {
        self.manifests.get_mut(&package_id::normalize(package_id))
    }

    /// The met/missing partition for `package_id`, computing it if the
    /// manifest has none cached. Returns `None` for mods the registry
    /// doesn't know.
    pub fn requirements<R>(&mut self, package_id: &str, registry: &R) -> Option<&Requirements>
    where
        R: ModRegistry + ?Sized,
    {
        let key = package_id::normalize(package_id);
        if !self.manifests.contains_key(&key) {
            let identity = registry.find_by_package_id(&key)?;
            self.resolve(identity, registry);
        }

        if self.manifests.get(&key)?.requirements().is_none() {
            let targets: Vec<String> = self
                .manifests
                .get(&key)?
                .all_requirements()
                .map(|d| d.package_id.clone())
                .collect();
            let mut snapshots: HashMap<String, Option<TargetSnapshot>> = HashMap::new();
            for target in targets {
                if !snapshots.contains_key(&target) {
                    let snapshot = self.snapshot(&target, registry);
                    snapshots.insert(target, snapshot);
                }
            }
            self.manifests
                .get_mut(&key)?
                .refresh_requirements(|id| snapshots.get(id).cloned().flatten());
        }

        self.manifests.get(&key)?.requirements()
    }

    pub fn missing_requirements<R>(&mut self, package_id: &str, registry: &R) -> Option<&[Dependency]>
    where
        R: ModRegistry + ?Sized,
    {
        self.requirements(package_id, registry)
            .map(|r| r.missing.as_slice())
    }

    pub fn met_requirements<R>(&mut self, package_id: &str, registry: &R) -> Option<&[Dependency]>
    where
        R: ModRegistry + ?Sized,
    {
        self.requirements(package_id, registry)
            .map(|r| r.met.as_slice())
    }

    /// Summarize the requirements of one mod.
    pub fn report<R>(&mut self, package_id: &str, registry: &R) -> Option<RequirementReport>
    where
        R: ModRegistry + ?Sized,
    {
        let requirements = self.requirements(package_id, registry)?.clone();
        let manifest = self.get(package_id)?;
        Some(RequirementReport::new(manifest, &requirements))
    }

    /// Invalidate one manifest's requirement partition. Returns `false` if
    /// the manifest isn't cached.
    pub fn recheck_requirements(&mut self, package_id: &str) -> bool {
        match self.get_mut(package_id) {
            Some(manifest) => {
                manifest.recheck_requirements();
                true
            }
            None => false,
        }
    }

    /// Invalidate every cached requirement partition.
    pub fn recheck_all(&mut self) {
        for manifest in self.manifests.values_mut() {
            manifest.recheck_requirements();
        }
    }

    /// Forget every manifest (full mod-list reload).
    pub fn clear(&mut self) {
        self.manifests.clear();
    }

    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    fn snapshot<R>(&mut self, package_id: &str, registry: &R) -> Option<TargetSnapshot>
    where
        R: ModRegistry + ?Sized,
    {
        let identity = registry.find_by_package_id(package_id)?;
        let version = self.resolve(identity, registry).resolved_version().cloned();
        Some(TargetSnapshot::of(identity, version))
    }
}

fn load<V, R>(config: &ResolverConfig, reader: &V, identity: &ModIdentity, registry: &R) -> Manifest
where
    V: FileVersionReader,
    R: ModRegistry + ?Sized,
{
    let path = config.manifest_path(&identity.root_dir);
    let mut manifest = if path.is_file() {
        match manifest_xml::load_manifest(&path) {
            Ok(doc) => Manifest::from_document(identity, doc, registry, config.dev_mode),
            Err(e) => {
                tracing::error!("Error loading manifest for '{}': {e}", identity.name);
                Manifest::empty(identity)
            }
        }
    } else {
        Manifest::empty(identity)
    };

    manifest.merge_host(identity, registry);

    let assemblies = config.assemblies_dir(&identity.root_dir);
    let version = manifest.resolve_version(|| {
        let dll = assembly::last_assembly(&assemblies)?;
        reader.file_version(&dll)
    });
    tracing::debug!("resolved {} v{version}", identity.package_id);

    manifest
}
