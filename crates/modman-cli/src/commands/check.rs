//! Handler for `modman check`.

use std::path::Path;

use miette::Result;
use modman_core::config::GlobalConfig;
use modman_core::registry::ModRegistry;
use modman_resolver::dependency::Severity;
use modman_resolver::store::ManifestStore;
use modman_util::errors::ModmanError;
use modman_util::progress::{self, Tone};

pub fn exec(
    config: &GlobalConfig,
    mod_list: Option<&Path>,
    package_id: Option<&str>,
    strict: bool,
) -> Result<()> {
    let mods = super::load_mods(config, mod_list)?;
    progress::status(Tone::Info, "Loaded", &format!("{} installed mods", mods.len()));
    let mut store = ManifestStore::new(config.resolver());

    let targets: Vec<String> = match package_id {
        Some(id) => {
            let identity = mods.find_by_package_id(id).ok_or_else(|| ModmanError::Generic {
                message: format!("No installed mod with packageId '{id}'"),
            })?;
            vec![identity.package_id.clone()]
        }
        None => mods
            .active_in_load_order()
            .into_iter()
            .map(|m| m.package_id.clone())
            .collect(),
    };

    if targets.is_empty() {
        progress::status(Tone::Warning, "Warning", "no active mods to check");
        return Ok(());
    }

    let mut failing = 0;
    for id in &targets {
        let Some(report) = store.report(id, &mods) else {
            continue;
        };
        let (tone, label) = severity_status(report.worst());
        progress::status(
            tone,
            label,
            &format!("{} v{}", report.package_id, report.version),
        );
        if report.is_satisfied() {
            println!("{report}");
        } else {
            failing += 1;
            print!("{report}");
        }
    }

    let summary = format!("{} mods, {failing} with missing requirements", targets.len());
    if failing == 0 {
        progress::status(Tone::Progress, "Finished", &summary);
        return Ok(());
    }
    progress::status(Tone::Warning, "Finished", &summary);

    if strict {
        return Err(ModmanError::Generic {
            message: format!("{failing} mods have missing requirements"),
        }
        .into());
    }
    Ok(())
}

/// Status label for a mod's most severe missing requirement.
fn severity_status(worst: Severity) -> (Tone, &'static str) {
    match worst {
        Severity::Satisfied => (Tone::Progress, "Satisfied"),
        Severity::Notice => (Tone::Info, "Notice"),
        Severity::WrongVersion => (Tone::Warning, "Outdated"),
        Severity::Unsatisfied => (Tone::Error, "Missing"),
    }
}
