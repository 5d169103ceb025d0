mod common;

use std::path::Path;

use modman_core::config::ResolverConfig;
use modman_core::modlist::InstalledMods;
use modman_core::registry::{HostDependency, ModIdentity, ModRegistry};
use modman_resolver::dependency::{DependencyKind, Severity};
use modman_resolver::store::ManifestStore;
use modman_resolver::version::{ModVersion, VersionRange};
use tempfile::TempDir;

struct ModDir<'a> {
    root: &'a Path,
}

impl ModDir<'_> {
    fn manifest(&self, xml: &str) -> &Self {
        let about = self.root.join("About");
        std::fs::create_dir_all(&about).unwrap();
        std::fs::write(about.join("Manifest.xml"), xml).unwrap();
        self
    }

    fn assembly(&self, name: &str, bytes: &[u8]) -> &Self {
        let dir = self.root.join("Assemblies");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), bytes).unwrap();
        self
    }
}

fn mod_dir(root: &Path) -> ModDir<'_> {
    std::fs::create_dir_all(root).unwrap();
    ModDir { root }
}

fn store() -> ManifestStore {
    ManifestStore::new(ResolverConfig::default())
}

fn version_of(store: &mut ManifestStore, mods: &InstalledMods, id: &str) -> ModVersion {
    let identity = mods.find_by_package_id(id).unwrap();
    store
        .resolve(identity, mods)
        .resolved_version()
        .cloned()
        .unwrap()
}

#[test]
fn test_explicit_version_beats_assembly() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("A");
    mod_dir(&root)
        .manifest("<Manifest><version>1.2.3</version></Manifest>")
        .assembly("A.dll", &common::versioned_dll(2, 0, 0, 0));

    let mut mods = InstalledMods::new();
    mods.insert(ModIdentity::new("a.mod", "A", &root)).unwrap();
    assert_eq!(version_of(&mut store(), &mods, "a.mod"), ModVersion::new(1, 2, 3));
}

#[test]
fn test_assembly_version_without_explicit() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("A");
    mod_dir(&root)
        .assembly("0Harmony.dll", &common::versioned_dll(9, 9, 9, 9))
        .assembly("A.dll", &common::versioned_dll(2, 0, 0, 0));

    let mut mods = InstalledMods::new();
    mods.insert(ModIdentity::new("a.mod", "A", &root)).unwrap();
    let mut store = store();
    assert_eq!(version_of(&mut store, &mods, "a.mod"), ModVersion::new(2, 0, 0));
    assert!(store.get("a.mod").unwrap().has_version());
}

#[test]
fn test_revision_only_assembly_version_is_known() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("A");
    mod_dir(&root).assembly("A.dll", &common::versioned_dll(0, 0, 0, 5));

    let mut mods = InstalledMods::new();
    mods.insert(ModIdentity::new("a.mod", "A", &root)).unwrap();
    let mut store = store();
    let version = version_of(&mut store, &mods, "a.mod");
    assert_eq!(version, ModVersion::new(0, 0, 0).with_revision(5));
    assert_eq!(version.to_string(), "0.0.0.5");
    assert!(store.get("a.mod").unwrap().has_version());
}

#[test]
fn test_no_version_sources_is_zero() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("A");
    mod_dir(&root).assembly("A.dll", &common::pe_image(b"\xC3"));

    let mut mods = InstalledMods::new();
    mods.insert(ModIdentity::new("a.mod", "A", &root)).unwrap();
    let mut store = store();
    assert_eq!(version_of(&mut store, &mods, "a.mod"), ModVersion::ZERO);
    assert!(!store.get("a.mod").unwrap().has_version());
}

#[test]
fn test_malformed_manifest_falls_back_to_host_data() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("A");
    mod_dir(&root).manifest("<Manifest><version>1.0</Manifest>");

    let mut mods = InstalledMods::new();
    mods.insert(
        ModIdentity::new("a.mod", "A", &root).with_dependency(HostDependency::new("b.mod")),
    )
    .unwrap();

    let mut store = store();
    let identity = mods.find_by_package_id("a.mod").unwrap();
    let manifest = store.resolve(identity, &mods);
    assert!(manifest.version.is_none());
    assert_eq!(manifest.resolved_version(), Some(&ModVersion::ZERO));
    assert_eq!(manifest.dependencies.len(), 1);
    assert_eq!(manifest.dependencies[0].package_id, "b.mod");
}

#[test]
fn test_manifest_range_wins_over_host_dependency() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("A");
    mod_dir(&root).manifest(
        "<Manifest><dependencies><li>foo.lib >=1.0.0</li></dependencies></Manifest>",
    );

    let mut mods = InstalledMods::new();
    mods.insert(
        ModIdentity::new("a.mod", "A", &root).with_dependency(HostDependency::new("foo.lib")),
    )
    .unwrap();

    let mut store = store();
    let identity = mods.find_by_package_id("a.mod").unwrap();
    let manifest = store.resolve(identity, &mods);
    assert_eq!(manifest.dependencies.len(), 1);
    assert_eq!(
        manifest.dependencies[0].range,
        VersionRange::parse(">=1.0.0").unwrap()
    );
}

#[test]
fn test_recheck_after_activation_moves_requirement() {
    let tmp = TempDir::new().unwrap();
    let mut mods = InstalledMods::new();
    mods.insert(
        ModIdentity::new("a.mod", "A", tmp.path().join("A"))
            .with_active(true)
            .with_dependency(HostDependency::new("bar.mod")),
    )
    .unwrap();
    mods.insert(ModIdentity::new("bar.mod", "Bar", tmp.path().join("Bar")))
        .unwrap();

    let mut store = store();
    let missing = store.missing_requirements("a.mod", &mods).unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].package_id, "bar.mod");
    assert_eq!(missing[0].severity(), Severity::Unsatisfied);

    mods.set_active("bar.mod", true);

    // Still cached until rechecked.
    assert_eq!(store.missing_requirements("a.mod", &mods).unwrap().len(), 1);

    assert!(store.recheck_requirements("a.mod"));
    assert!(store.missing_requirements("a.mod", &mods).unwrap().is_empty());
    let met = store.met_requirements("a.mod", &mods).unwrap();
    assert_eq!(met.len(), 1);
    assert_eq!(met[0].package_id, "bar.mod");
    assert_eq!(store.len(), 2);
}

#[test]
fn test_version_constraint_against_target_manifest() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("A");
    let lib = tmp.path().join("Lib");
    mod_dir(&a).manifest(
        "<Manifest><dependencies><li>author.lib >= 2.0</li></dependencies></Manifest>",
    );
    mod_dir(&lib).manifest("<Manifest><version>1.5.0</version></Manifest>");

    let mut mods = InstalledMods::new();
    mods.insert(ModIdentity::new("a.mod", "A", &a).with_active(true))
        .unwrap();
    mods.insert(ModIdentity::new("author.lib", "Lib", &lib).with_active(true))
        .unwrap();

    let mut store = store();
    let missing = store.missing_requirements("a.mod", &mods).unwrap();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].severity(), Severity::WrongVersion);
    assert_eq!(missing[0].tooltip(), "Lib v1.5.0 does not satisfy >=2.0.0");
}

#[test]
fn test_incompatibility_partition() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("A");
    mod_dir(&a).manifest(
        "<Manifest><incompatibleWith><li>x.active</li><li>x.inactive</li><li>x.absent</li></incompatibleWith></Manifest>",
    );

    let mut mods = InstalledMods::new();
    mods.insert(ModIdentity::new("a.mod", "A", &a).with_active(true))
        .unwrap();
    mods.insert(ModIdentity::new("x.active", "XA", tmp.path().join("XA")).with_active(true))
        .unwrap();
    mods.insert(ModIdentity::new("x.inactive", "XI", tmp.path().join("XI")))
        .unwrap();

    let mut store = store();
    let reqs = store.requirements("a.mod", &mods).unwrap();
    let missing: Vec<&str> = reqs.missing.iter().map(|d| d.package_id.as_str()).collect();
    let met: Vec<&str> = reqs.met.iter().map(|d| d.package_id.as_str()).collect();
    assert_eq!(missing, vec!["x.active"]);
    assert_eq!(met, vec!["x.inactive", "x.absent"]);
    assert!(reqs
        .missing
        .iter()
        .all(|d| d.kind == DependencyKind::Incompatible));
}

#[test]
fn test_legacy_alias_in_manifest() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("A");
    mod_dir(&a).manifest("<Manifest><loadAfter><li>HugsLib</li></loadAfter></Manifest>");

    let mut mods = InstalledMods::new();
    mods.insert(ModIdentity::new("a.mod", "A", &a)).unwrap();
    mods.insert(ModIdentity::new("unlimitedhugs.hugslib", "HugsLib", tmp.path().join("H")))
        .unwrap();

    let mut store = store();
    let identity = mods.find_by_package_id("a.mod").unwrap();
    let manifest = store.resolve(identity, &mods);
    assert_eq!(manifest.load_after.len(), 1);
    assert_eq!(manifest.load_after[0].package_id, "unlimitedhugs.hugslib");
    assert_eq!(manifest.load_after[0].declared_as.as_deref(), Some("HugsLib"));
}

#[test]
fn test_resolve_all_and_clear() {
    let tmp = TempDir::new().unwrap();
    let mut mods = InstalledMods::new();
    for id in ["a.one", "a.two", "a.three"] {
        mods.insert(ModIdentity::new(id, id, tmp.path().join(id)))
            .unwrap();
    }
    let mut store = store();
    store.resolve_all(&mods);
    assert_eq!(store.len(), 3);
    store.clear();
    assert!(store.is_empty());
}

#[test]
fn test_report_for_mod() {
    let tmp = TempDir::new().unwrap();
    let mut mods = InstalledMods::new();
    mods.insert(
        ModIdentity::new("a.mod", "A", tmp.path().join("A"))
            .with_active(true)
            .with_dependency(HostDependency {
                package_id: "gone.mod".into(),
                display_name: Some("Gone".into()),
            }),
    )
    .unwrap();

    let mut store = store();
    let report = store.report("a.mod", &mods).unwrap();
    assert_eq!(report.missing.len(), 1);
    assert_eq!(report.worst(), Severity::Unsatisfied);
    assert!(report.to_string().contains("Gone is not installed"));
}
