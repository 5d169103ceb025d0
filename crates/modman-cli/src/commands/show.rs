//! Handler for `modman show`.

use std::path::Path;

use miette::Result;
use modman_core::config::GlobalConfig;
use modman_core::registry::ModRegistry;
use modman_resolver::dependency::DependencyKind;
use modman_resolver::store::ManifestStore;
use modman_resolver::version::ModVersion;
use modman_util::errors::ModmanError;

pub fn exec(config: &GlobalConfig, mod_list: Option<&Path>, package_id: &str) -> Result<()> {
    let mods = super::load_mods(config, mod_list)?;
    let identity = mods
        .find_by_package_id(package_id)
        .ok_or_else(|| ModmanError::Generic {
            message: format!("No installed mod with packageId '{package_id}'"),
        })?;

    let mut store = ManifestStore::new(config.resolver());
    let manifest = store.resolve(identity, &mods);

    println!("{} ({})", manifest.name, manifest.package_id);
    let source = if manifest.has_version() {
        ""
    } else {
        " (unknown)"
    };
    let version = manifest
        .resolved_version()
        .cloned()
        .unwrap_or(ModVersion::ZERO);
    println!("version: {version}{source}");
    if let Some(identifier) = &manifest.identifier {
        println!("identifier: {identifier}");
    }
    if let Some(check) = &manifest.version_check {
        println!("manifestUri: {}", check.uri);
    }
    if let Some(uri) = &manifest.download_uri {
        println!("downloadUri: {uri}");
    }

    for kind in DependencyKind::ALL {
        let constraints = manifest.constraints(kind);
        if constraints.is_empty() {
            continue;
        }
        println!("{kind}:");
        for dep in constraints {
            match &dep.declared_as {
                Some(alias) => println!("  {} (declared as {alias})", dep.to_line()),
                None => println!("  {}", dep.to_line()),
            }
        }
    }

    if !manifest.suggests.is_empty() {
        println!("suggests:");
        for id in &manifest.suggests {
            println!("  {id}");
        }
    }

    if let Some(report) = store.report(package_id, &mods) {
        println!(
            "requirements: {} met, {} missing",
            report.met,
            report.missing.len()
        );
    }
    Ok(())
}
